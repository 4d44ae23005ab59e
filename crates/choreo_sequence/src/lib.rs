// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time-indexed value sequences for tweening.
//!
//! This crate provides the compositional core of an animation toolkit:
//! - Phrases: timed segments from one value to another
//! - Easing curves shaping each phrase
//! - Sequences: contiguous phrase timelines for one property
//! - Looping lookup with an inflection point
//!
//! ## Architecture
//!
//! A [`Sequence`] is built with fluent mutators and queried by time:
//!
//! ```
//! use choreo_sequence::{Ease, Sequence};
//!
//! let mut seq: Sequence<f32> = Sequence::new(0.0);
//! seq.ramp_to(10.0, 2.0).ease(Ease::OutCubic).hold(1.0);
//!
//! assert_eq!(seq.duration(), 3.0);
//! assert_eq!(seq.value_at(2.5), 10.0);
//! assert_eq!(seq.value_at(-1.0), 0.0);
//! ```
//!
//! Sequences own no clock and no output target; playback drivers feed them
//! times and apply the values they get back.

pub mod ease;
pub mod phrase;
pub mod sequence;
pub mod value;

pub use ease::{CustomEase, Ease};
pub use phrase::{CurvePhrase, Phrase, Position, RampPhrase, Time};
pub use sequence::{Sequence, SequenceError, SequenceRef, CONTIGUITY_EPSILON};
pub use value::{Interpolate, Quat};
