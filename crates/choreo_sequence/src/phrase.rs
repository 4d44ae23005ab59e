// SPDX-License-Identifier: MIT OR Apache-2.0
//! Phrases: single timed segments of motion.
//!
//! A [`Sequence`](crate::sequence::Sequence) is generic over the [`Phrase`]
//! trait, so different phrase kinds plug into the same timeline:
//! - [`RampPhrase`] blends straight from start to end value
//! - [`CurvePhrase`] follows a cubic Bézier through two control values

use crate::ease::Ease;
use crate::value::Interpolate;
use serde::{Deserialize, Serialize};

/// Time in seconds
pub type Time = f32;

/// A value pinned to a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position<T> {
    /// Value at this point
    pub value: T,
    /// Time in seconds
    pub time: Time,
}

impl<T> Position<T> {
    /// Create a new position
    pub fn new(value: T, time: Time) -> Self {
        Self { value, time }
    }
}

/// Normalized progress of `time` through `[start, end]`.
///
/// Zero-length spans report full progress so a jump cut lands on its end value.
pub fn progress(start: Time, end: Time, time: Time) -> f32 {
    let duration = end - start;
    if duration <= 0.0 {
        return 1.0;
    }
    ((time - start) / duration).clamp(0.0, 1.0)
}

/// A directed time segment producing values between two positions
pub trait Phrase<T: Interpolate>: Clone {
    /// Extra construction parameters for [`Sequence::then`](crate::sequence::Sequence::then)
    type Args;

    /// Build a phrase shaped only by an ease; used for ramps and holds
    fn with_ease(start: Position<T>, end: Position<T>, ease: Ease) -> Self;

    /// Build a phrase from its kind-specific arguments
    fn from_args(start: Position<T>, end: Position<T>, args: Self::Args) -> Self;

    /// Value at `time`, expected within `[start_time, end_time]`
    fn value(&self, time: Time) -> T;

    /// Value at the start of the phrase
    fn start_value(&self) -> T;

    /// Value at the end of the phrase
    fn end_value(&self) -> T;

    /// Start time in seconds
    fn start_time(&self) -> Time;

    /// End time in seconds, never before the start
    fn end_time(&self) -> Time;

    /// Length of the phrase in seconds
    fn duration(&self) -> Time {
        self.end_time() - self.start_time()
    }

    /// Replace the start value, keeping everything else
    fn set_start_value(&mut self, value: T);

    /// Move the phrase so it starts at `time`, preserving its duration
    fn shift_start_time_to(&mut self, time: Time);

    /// Easing function shaping the phrase
    fn ease(&self) -> &Ease;

    /// Replace the easing function
    fn set_ease(&mut self, ease: Ease);
}

/// Eased blend from one position to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampPhrase<T> {
    /// Start position
    pub start: Position<T>,
    /// End position
    pub end: Position<T>,
    /// Easing curve
    #[serde(default)]
    pub ease: Ease,
}

impl<T: Interpolate> RampPhrase<T> {
    /// Create a ramp between two positions
    pub fn new(start: Position<T>, end: Position<T>, ease: Ease) -> Self {
        Self { start, end, ease }
    }

    /// Linear ramp
    pub fn linear(start: Position<T>, end: Position<T>) -> Self {
        Self::new(start, end, Ease::Linear)
    }
}

impl<T: Interpolate> Phrase<T> for RampPhrase<T> {
    type Args = Ease;

    fn with_ease(start: Position<T>, end: Position<T>, ease: Ease) -> Self {
        Self::new(start, end, ease)
    }

    fn from_args(start: Position<T>, end: Position<T>, ease: Ease) -> Self {
        Self::new(start, end, ease)
    }

    fn value(&self, time: Time) -> T {
        let t = self.ease.apply(progress(self.start.time, self.end.time, time));
        self.start.value.interpolate(&self.end.value, t)
    }

    fn start_value(&self) -> T {
        self.start.value.clone()
    }

    fn end_value(&self) -> T {
        self.end.value.clone()
    }

    fn start_time(&self) -> Time {
        self.start.time
    }

    fn end_time(&self) -> Time {
        self.end.time
    }

    fn set_start_value(&mut self, value: T) {
        self.start.value = value;
    }

    fn shift_start_time_to(&mut self, time: Time) {
        let duration = self.end.time - self.start.time;
        self.start.time = time;
        self.end.time = time + duration;
    }

    fn ease(&self) -> &Ease {
        &self.ease
    }

    fn set_ease(&mut self, ease: Ease) {
        self.ease = ease;
    }
}

/// Cubic Bézier in value space.
///
/// The curve leaves `start` heading for `control_in` and arrives at `end`
/// coming from `control_out`. The ease reshapes progress before the curve is
/// evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePhrase<T> {
    /// Start position
    pub start: Position<T>,
    /// End position
    pub end: Position<T>,
    /// First control value
    pub control_in: T,
    /// Second control value
    pub control_out: T,
    /// Easing curve
    #[serde(default)]
    pub ease: Ease,
}

impl<T: Interpolate> CurvePhrase<T> {
    /// Create a curve with explicit control values
    pub fn new(start: Position<T>, end: Position<T>, control_in: T, control_out: T) -> Self {
        Self {
            start,
            end,
            control_in,
            control_out,
            ease: Ease::Linear,
        }
    }

    /// Set the easing curve
    pub fn with_ease_fn(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

impl<T: Interpolate> Phrase<T> for CurvePhrase<T> {
    type Args = (T, T);

    fn with_ease(start: Position<T>, end: Position<T>, ease: Ease) -> Self {
        // Controls at thirds make the cubic exactly linear, leaving the shape to the ease
        let control_in = start.value.interpolate(&end.value, 1.0 / 3.0);
        let control_out = start.value.interpolate(&end.value, 2.0 / 3.0);
        Self::new(start, end, control_in, control_out).with_ease_fn(ease)
    }

    fn from_args(start: Position<T>, end: Position<T>, (control_in, control_out): (T, T)) -> Self {
        Self::new(start, end, control_in, control_out)
    }

    fn value(&self, time: Time) -> T {
        let t = self.ease.apply(progress(self.start.time, self.end.time, time));

        // de Casteljau
        let a = self.start.value.interpolate(&self.control_in, t);
        let b = self.control_in.interpolate(&self.control_out, t);
        let c = self.control_out.interpolate(&self.end.value, t);
        let ab = a.interpolate(&b, t);
        let bc = b.interpolate(&c, t);
        ab.interpolate(&bc, t)
    }

    fn start_value(&self) -> T {
        self.start.value.clone()
    }

    fn end_value(&self) -> T {
        self.end.value.clone()
    }

    fn start_time(&self) -> Time {
        self.start.time
    }

    fn end_time(&self) -> Time {
        self.end.time
    }

    fn set_start_value(&mut self, value: T) {
        self.start.value = value;
    }

    fn shift_start_time_to(&mut self, time: Time) {
        let duration = self.end.time - self.start.time;
        self.start.time = time;
        self.end.time = time + duration;
    }

    fn ease(&self) -> &Ease {
        &self.ease
    }

    fn set_ease(&mut self, ease: Ease) {
        self.ease = ease;
    }
}
