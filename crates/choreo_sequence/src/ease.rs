// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing functions.
//!
//! An ease maps normalized progress through a phrase (`0.0..=1.0`) to the
//! interpolation factor handed to [`Interpolate`](crate::value::Interpolate).
//! Named eases serialize by name; [`Ease::Custom`] wraps an arbitrary closure
//! and is skipped by serde.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

const BACK_OVERSHOOT: f32 = 1.701_58;

/// Shared, thread-safe easing closure
#[derive(Clone)]
pub struct CustomEase(Arc<dyn Fn(f32) -> f32 + Send + Sync>);

impl CustomEase {
    /// Wrap a closure
    pub fn new(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the closure
    pub fn apply(&self, t: f32) -> f32 {
        (self.0)(t)
    }
}

impl fmt::Debug for CustomEase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEase(..)")
    }
}

impl PartialEq for CustomEase {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Easing curve applied across a phrase
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Ease {
    /// No easing; progress passes through unchanged
    #[default]
    Linear,
    /// Ignores progress and stays at the start value
    Hold,
    /// Quadratic, accelerating
    InQuad,
    /// Quadratic, decelerating
    OutQuad,
    /// Quadratic, accelerating then decelerating
    InOutQuad,
    /// Cubic, accelerating
    InCubic,
    /// Cubic, decelerating
    OutCubic,
    /// Cubic, accelerating then decelerating
    InOutCubic,
    /// Quartic, accelerating
    InQuart,
    /// Quartic, decelerating
    OutQuart,
    /// Quartic, accelerating then decelerating
    InOutQuart,
    /// Sinusoidal, accelerating
    InSine,
    /// Sinusoidal, decelerating
    OutSine,
    /// Sinusoidal, accelerating then decelerating
    InOutSine,
    /// Exponential, accelerating
    InExpo,
    /// Exponential, decelerating
    OutExpo,
    /// Exponential, accelerating then decelerating
    InOutExpo,
    /// Pulls back before accelerating
    InBack,
    /// Overshoots the target before settling
    OutBack,
    /// Pulls back, then overshoots
    InOutBack,
    /// Hermite smoothstep
    SmoothStep,
    /// User-supplied curve (not serializable)
    #[serde(skip)]
    Custom(CustomEase),
}

impl Ease {
    /// Build a custom ease from a closure
    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self::Custom(CustomEase::new(f))
    }

    /// Map progress `t` to an interpolation factor
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Self::Linear => ease_none(t),
            Self::Hold => ease_hold(t),
            Self::InQuad => ease_in_quad(t),
            Self::OutQuad => ease_out_quad(t),
            Self::InOutQuad => ease_in_out_quad(t),
            Self::InCubic => ease_in_cubic(t),
            Self::OutCubic => ease_out_cubic(t),
            Self::InOutCubic => ease_in_out_cubic(t),
            Self::InQuart => ease_in_quart(t),
            Self::OutQuart => ease_out_quart(t),
            Self::InOutQuart => ease_in_out_quart(t),
            Self::InSine => ease_in_sine(t),
            Self::OutSine => ease_out_sine(t),
            Self::InOutSine => ease_in_out_sine(t),
            Self::InExpo => ease_in_expo(t),
            Self::OutExpo => ease_out_expo(t),
            Self::InOutExpo => ease_in_out_expo(t),
            Self::InBack => ease_in_back(t),
            Self::OutBack => ease_out_back(t),
            Self::InOutBack => ease_in_out_back(t),
            Self::SmoothStep => ease_smooth_step(t),
            Self::Custom(f) => f.apply(t),
        }
    }

    /// Whether this ease can be written out with serde
    pub fn is_serializable(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<CustomEase> for Ease {
    fn from(f: CustomEase) -> Self {
        Self::Custom(f)
    }
}

/// Linear, no easing
pub fn ease_none(t: f32) -> f32 {
    t
}

/// Always the start of the phrase
pub fn ease_hold(_t: f32) -> f32 {
    0.0
}

/// Quadratic ease-in
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

/// Quadratic ease-out
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Quadratic ease-in-out
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Cubic ease-in
pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

/// Cubic ease-out
pub fn ease_out_cubic(t: f32) -> f32 {
    let u = t - 1.0;
    u * u * u + 1.0
}

/// Cubic ease-in-out
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        0.5 * u * u * u + 1.0
    }
}

/// Quartic ease-in
pub fn ease_in_quart(t: f32) -> f32 {
    t * t * t * t
}

/// Quartic ease-out
pub fn ease_out_quart(t: f32) -> f32 {
    let u = t - 1.0;
    1.0 - u * u * u * u
}

/// Quartic ease-in-out
pub fn ease_in_out_quart(t: f32) -> f32 {
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        let u = t - 1.0;
        1.0 - 8.0 * u * u * u * u
    }
}

/// Sinusoidal ease-in
pub fn ease_in_sine(t: f32) -> f32 {
    1.0 - (t * PI * 0.5).cos()
}

/// Sinusoidal ease-out
pub fn ease_out_sine(t: f32) -> f32 {
    (t * PI * 0.5).sin()
}

/// Sinusoidal ease-in-out
pub fn ease_in_out_sine(t: f32) -> f32 {
    -0.5 * ((PI * t).cos() - 1.0)
}

/// Exponential ease-in
pub fn ease_in_expo(t: f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else {
        2.0_f32.powf(10.0 * t - 10.0)
    }
}

/// Exponential ease-out
pub fn ease_out_expo(t: f32) -> f32 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f32.powf(-10.0 * t)
    }
}

/// Exponential ease-in-out
pub fn ease_in_out_expo(t: f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else if t < 0.5 {
        2.0_f32.powf(20.0 * t - 10.0) * 0.5
    } else {
        (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) * 0.5
    }
}

/// Ease-in that dips below zero first
pub fn ease_in_back(t: f32) -> f32 {
    let c3 = BACK_OVERSHOOT + 1.0;
    c3 * t * t * t - BACK_OVERSHOOT * t * t
}

/// Ease-out that overshoots one before settling
pub fn ease_out_back(t: f32) -> f32 {
    let c3 = BACK_OVERSHOOT + 1.0;
    let u = t - 1.0;
    1.0 + c3 * u * u * u + BACK_OVERSHOOT * u * u
}

/// Combined back ease
pub fn ease_in_out_back(t: f32) -> f32 {
    let c2 = BACK_OVERSHOOT * 1.525;
    if t < 0.5 {
        let u = 2.0 * t;
        (u * u * ((c2 + 1.0) * u - c2)) * 0.5
    } else {
        let u = 2.0 * t - 2.0;
        (u * u * ((c2 + 1.0) * u + c2) + 2.0) * 0.5
    }
}

/// Smoothstep, a Hermite curve with flat tangents at both ends
pub fn ease_smooth_step(t: f32) -> f32 {
    hermite(0.0, 0.0, 1.0, 0.0, t)
}

/// Cubic Hermite spline between `p0` and `p1` with tangents `m0`, `m1`
pub fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}
