// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence of phrases describing the motion of one property.
//!
//! A [`Sequence`] holds an initial value and a contiguous run of phrases
//! starting at time zero. It answers "what is the value at time `t`?" for
//! any `t`: before the start it reports the initial value, past the end it
//! clamps to the end value. It owns no clock and no output.

use crate::ease::Ease;
use crate::phrase::{Phrase, Position, RampPhrase, Time};
use crate::value::Interpolate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest gap or overlap tolerated between consecutive phrases
pub const CONTIGUITY_EPSILON: Time = 1e-4;

/// Shared handle to an independent copy of a sequence
pub type SequenceRef<T, P = RampPhrase<T>> = Arc<Sequence<T, P>>;

/// Errors raised when a caller breaks a sequence contract
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// Built from an empty phrase list
    #[error("Sequence requires at least one phrase")]
    EmptyPhrases,

    /// A phrase ends before it starts
    #[error("Phrase {index} ends before it starts")]
    ReversedPhrase {
        /// Offending phrase
        index: usize,
    },

    /// A phrase does not start where its predecessor ends, or ends before it
    #[error("Phrase {index} does not start where phrase {} ends", .index.saturating_sub(1))]
    Discontinuous {
        /// First phrase after the gap
        index: usize,
    },

    /// Slice range outside the phrase list
    #[error("Slice of {size} phrases at {begin} out of range for {count} phrases")]
    SliceOutOfRange {
        /// First requested phrase
        begin: usize,
        /// Requested phrase count
        size: usize,
        /// Phrases available
        count: usize,
    },

    /// Loop region would be negative
    #[error("Inflection point {inflection_point} is past the sequence duration {duration}")]
    InvalidInflectionPoint {
        /// Requested inflection point
        inflection_point: Time,
        /// Sequence duration
        duration: Time,
    },

    /// A phrase uses an ease that cannot be written out
    #[error("Phrase {index} uses a custom ease, which cannot be serialized")]
    UnserializableEase {
        /// Offending phrase
        index: usize,
    },

    /// RON encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),

    /// RON decoding failed
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] ron::error::SpannedError),
}

/// Timeline of phrases for one animatable property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "SequenceData<T, P>",
    bound(
        serialize = "T: Serialize, P: Serialize",
        deserialize = "T: Interpolate + Deserialize<'de>, P: Phrase<T> + Deserialize<'de>"
    )
)]
pub struct Sequence<T, P = RampPhrase<T>> {
    /// Value before the first phrase
    initial_value: T,
    /// Contiguous phrases in chronological order
    phrases: Vec<P>,
    /// End time of the last phrase
    #[serde(skip_serializing)]
    duration: Time,
}

/// Serialized form; validated on the way back in
#[derive(Deserialize)]
#[serde(rename = "Sequence")]
struct SequenceData<T, P> {
    initial_value: T,
    #[serde(default = "Vec::new")]
    phrases: Vec<P>,
}

impl<T: Interpolate, P: Phrase<T>> TryFrom<SequenceData<T, P>> for Sequence<T, P> {
    type Error = SequenceError;

    fn try_from(data: SequenceData<T, P>) -> Result<Self, Self::Error> {
        Self::from_parts(data.initial_value, data.phrases)
    }
}

impl<T: Interpolate, P: Phrase<T>> Sequence<T, P> {
    /// Create a sequence holding `value` with no phrases
    pub fn new(value: T) -> Self {
        Self {
            initial_value: value,
            phrases: Vec::new(),
            duration: 0.0,
        }
    }

    /// Create a sequence from prebuilt phrases.
    ///
    /// The initial value is the first phrase's start value and the duration
    /// the last phrase's end time. Phrase times are kept as given.
    pub fn from_phrases(phrases: Vec<P>) -> Result<Self, SequenceError> {
        let Some(first) = phrases.first() else {
            tracing::warn!("Rejected sequence construction from an empty phrase list");
            return Err(SequenceError::EmptyPhrases);
        };
        let initial_value = first.start_value();
        Self::from_parts(initial_value, phrases)
    }

    fn from_parts(initial_value: T, phrases: Vec<P>) -> Result<Self, SequenceError> {
        check_phrases::<T, P>(&phrases).inspect_err(|e| {
            tracing::warn!("Rejected sequence construction: {}", e);
        })?;
        let duration = phrases.last().map_or(0.0, |p| p.end_time());
        Ok(Self {
            initial_value,
            phrases,
            duration,
        })
    }

    /// Value of the sequence at `time`.
    ///
    /// Times before zero give the initial value, times at or past the end give
    /// the end value. A time exactly on a boundary between two phrases belongs
    /// to the later one.
    pub fn value_at(&self, time: Time) -> T {
        if time < 0.0 {
            return self.initial_value.clone();
        }
        // NaN never lands inside a phrase
        if time >= self.duration || time.is_nan() {
            return self.end_value();
        }

        // End times are sorted, so this finds the first phrase ending after `time`
        let index = self.phrases.partition_point(|p| p.end_time() <= time);
        match self.phrases.get(index) {
            Some(phrase) => phrase.value(time),
            None => self.end_value(),
        }
    }

    /// Map `time` into the sequence, looping the span from `inflection_point`
    /// to the end once `time` runs past the duration.
    ///
    /// Everything before the inflection point plays once. An inflection point
    /// equal to the duration leaves nothing to loop and pins the result to the
    /// end. An inflection point past the duration is rejected.
    pub fn wrap_time(&self, time: Time, inflection_point: Time) -> Result<Time, SequenceError> {
        if inflection_point > self.duration {
            tracing::warn!(
                inflection_point,
                duration = self.duration,
                "Rejected wrap with inflection point past the end"
            );
            return Err(SequenceError::InvalidInflectionPoint {
                inflection_point,
                duration: self.duration,
            });
        }

        if time <= self.duration {
            return Ok(time);
        }

        let span = self.duration - inflection_point;
        if span <= 0.0 {
            return Ok(self.duration);
        }
        Ok(inflection_point + time % span)
    }

    /// Value at `time`, looping past the end. See [`Self::wrap_time`].
    pub fn value_wrapped(&self, time: Time, inflection_point: Time) -> Result<T, SequenceError> {
        Ok(self.value_at(self.wrap_time(time, inflection_point)?))
    }

    /// Set the current value.
    ///
    /// Replaces the initial value while there are no phrases, otherwise
    /// appends an instantaneous hold.
    pub fn set(&mut self, value: T) -> &mut Self {
        if self.phrases.is_empty() {
            self.initial_value = value;
            self
        } else {
            self.hold_value(value, 0.0)
        }
    }

    /// Hold the end value for `duration` seconds
    pub fn hold(&mut self, duration: Time) -> &mut Self {
        let value = self.end_value();
        self.hold_value(value, duration)
    }

    /// Same as [`Self::hold`]
    pub fn wait(&mut self, duration: Time) -> &mut Self {
        self.hold(duration)
    }

    /// Hold `value` for `duration` seconds
    pub fn hold_value(&mut self, value: T, duration: Time) -> &mut Self {
        let start = Position::new(value.clone(), self.duration);
        let end = Position::new(value, self.duration + duration);
        self.push(P::with_ease(start, end, Ease::Hold))
    }

    /// Move linearly to `value` over `duration` seconds
    pub fn ramp_to(&mut self, value: T, duration: Time) -> &mut Self {
        self.ramp_to_with(value, duration, Ease::Linear)
    }

    /// Move to `value` over `duration` seconds using `ease`
    pub fn ramp_to_with(&mut self, value: T, duration: Time, ease: Ease) -> &mut Self {
        let start = Position::new(self.end_value(), self.duration);
        let end = Position::new(value, self.duration + duration);
        self.push(P::with_ease(start, end, ease))
    }

    /// Move to `value` over `duration` seconds with a phrase built from
    /// kind-specific `args`
    pub fn then(&mut self, value: T, duration: Time, args: P::Args) -> &mut Self {
        let start = Position::new(self.end_value(), self.duration);
        let end = Position::new(value, self.duration + duration);
        self.push(P::from_args(start, end, args))
    }

    /// Append a prebuilt phrase.
    ///
    /// Its start value is overwritten with the current end value and it is
    /// moved to start at the current duration, keeping its own length.
    pub fn then_phrase(&mut self, mut phrase: P) -> &mut Self {
        phrase.set_start_value(self.end_value());
        phrase.shift_start_time_to(self.duration);
        self.push(phrase)
    }

    /// Replace the ease of the last phrase. Does nothing without phrases.
    pub fn ease(&mut self, ease: Ease) -> &mut Self {
        if let Some(last) = self.phrases.last_mut() {
            last.set_ease(ease);
        }
        self
    }

    fn push(&mut self, phrase: P) -> &mut Self {
        debug_assert!(
            phrase.end_time() >= phrase.start_time(),
            "phrase duration must not be negative"
        );
        self.duration = phrase.end_time();
        self.phrases.push(phrase);
        self
    }

    /// New sequence from the phrases in `[begin, begin + size)`.
    ///
    /// Phrase times are kept, so the slice generally does not start at zero.
    pub fn slice(&self, begin: usize, size: usize) -> Result<Self, SequenceError> {
        let count = self.phrases.len();
        let end = begin.checked_add(size).filter(|&end| begin < count && end <= count);
        let Some(end) = end else {
            tracing::warn!(begin, size, count, "Rejected out of range slice");
            return Err(SequenceError::SliceOutOfRange { begin, size, count });
        };

        tracing::debug!(begin, size, "Slicing sequence");
        Self::from_phrases(self.phrases[begin..end].to_vec())
    }

    /// Independent copy behind a shared handle
    pub fn copy(&self) -> SequenceRef<T, P> {
        tracing::debug!(phrases = self.phrases.len(), "Copying sequence");
        Arc::new(self.clone())
    }

    /// Seconds needed to play through every phrase
    pub fn duration(&self) -> Time {
        self.duration
    }

    /// Value at the end of the sequence
    pub fn end_value(&self) -> T {
        match self.phrases.last() {
            Some(phrase) => phrase.end_value(),
            None => self.initial_value.clone(),
        }
    }

    /// Value before the sequence starts
    pub fn initial_value(&self) -> T {
        self.initial_value.clone()
    }

    /// Number of phrases
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// All phrases in chronological order
    pub fn phrases(&self) -> &[P] {
        &self.phrases
    }
}

impl<T, P> Sequence<T, P>
where
    T: Interpolate + Serialize,
    P: Phrase<T> + Serialize,
{
    /// Serialize to pretty RON.
    ///
    /// Fails if any phrase uses a custom ease.
    pub fn to_ron(&self) -> Result<String, SequenceError> {
        if let Some(index) = self.phrases.iter().position(|p| !p.ease().is_serializable()) {
            tracing::warn!(index, "Rejected serialization of a custom ease");
            return Err(SequenceError::UnserializableEase { index });
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        tracing::debug!(phrases = self.phrases.len(), "Serialized sequence");
        Ok(text)
    }
}

impl<T, P> Sequence<T, P>
where
    T: Interpolate + DeserializeOwned,
    P: Phrase<T> + DeserializeOwned,
{
    /// Load from RON, re-checking phrase contiguity
    pub fn from_ron(s: &str) -> Result<Self, SequenceError> {
        let sequence: Self = ron::from_str(s)?;
        tracing::debug!(phrases = sequence.phrases.len(), "Loaded sequence");
        Ok(sequence)
    }
}

impl<T: Interpolate + Default, P: Phrase<T>> Default for Sequence<T, P> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

fn check_phrases<T: Interpolate, P: Phrase<T>>(phrases: &[P]) -> Result<(), SequenceError> {
    for (index, phrase) in phrases.iter().enumerate() {
        if phrase.end_time() < phrase.start_time() {
            return Err(SequenceError::ReversedPhrase { index });
        }
    }
    for (index, pair) in phrases.windows(2).enumerate() {
        // End times must stay sorted for the lookup search
        if (pair[1].start_time() - pair[0].end_time()).abs() > CONTIGUITY_EPSILON
            || pair[1].end_time() < pair[0].end_time()
        {
            return Err(SequenceError::Discontinuous { index: index + 1 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrase::CurvePhrase;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn three_ramps() -> Sequence<f32> {
        let mut seq: Sequence<f32> = Sequence::new(0.0);
        seq.ramp_to(1.0, 1.0).ramp_to(3.0, 2.0).ramp_to(0.0, 1.0);
        seq
    }

    #[test]
    fn test_new_sequence() {
        let seq: Sequence<f32> = Sequence::new(5.0);
        assert_eq!(seq.duration(), 0.0);
        assert_eq!(seq.phrase_count(), 0);
        assert_eq!(seq.initial_value(), 5.0);
        assert_eq!(seq.end_value(), 5.0);
        assert_eq!(seq.value_at(-1.0), 5.0);
        assert_eq!(seq.value_at(0.0), 5.0);
        assert_eq!(seq.value_at(100.0), 5.0);
    }

    #[test]
    fn test_from_phrases() {
        let phrases = vec![
            RampPhrase::linear(Position::new(2.0_f32, 0.0), Position::new(4.0, 1.0)),
            RampPhrase::linear(Position::new(4.0, 1.0), Position::new(8.0, 3.0)),
        ];
        let seq: Sequence<f32> = Sequence::from_phrases(phrases).unwrap();
        assert_eq!(seq.initial_value(), 2.0);
        assert_eq!(seq.duration(), 3.0);
        assert_eq!(seq.end_value(), 8.0);
        assert_eq!(seq.value_at(2.0), 6.0);
    }

    #[test]
    fn test_from_phrases_rejects_bad_input() {
        let empty: Vec<RampPhrase<f32>> = Vec::new();
        assert!(matches!(
            Sequence::<f32>::from_phrases(empty),
            Err(SequenceError::EmptyPhrases)
        ));

        let gap = vec![
            RampPhrase::linear(Position::new(0.0_f32, 0.0), Position::new(1.0, 1.0)),
            RampPhrase::linear(Position::new(1.0, 2.0), Position::new(2.0, 3.0)),
        ];
        assert!(matches!(
            Sequence::<f32>::from_phrases(gap),
            Err(SequenceError::Discontinuous { index: 1 })
        ));

        // Zero-length phrase tucked inside the tolerance but ending early
        let backwards = vec![
            RampPhrase::linear(Position::new(0.0_f32, 0.0), Position::new(1.0, 1.0)),
            RampPhrase::linear(Position::new(1.0, 1.0 - 5e-5), Position::new(1.0, 1.0 - 5e-5)),
        ];
        assert!(matches!(
            Sequence::<f32>::from_phrases(backwards),
            Err(SequenceError::Discontinuous { index: 1 })
        ));

        // Within tolerance and moving forward is accepted
        let nudged = vec![
            RampPhrase::linear(Position::new(0.0_f32, 0.0), Position::new(1.0, 1.0)),
            RampPhrase::linear(Position::new(1.0, 1.0 + 5e-5), Position::new(2.0, 2.0)),
        ];
        assert_eq!(Sequence::<f32>::from_phrases(nudged).unwrap().duration(), 2.0);

        let reversed = vec![RampPhrase::linear(Position::new(0.0_f32, 2.0), Position::new(1.0, 1.0))];
        assert!(matches!(
            Sequence::<f32>::from_phrases(reversed),
            Err(SequenceError::ReversedPhrase { index: 0 })
        ));
    }

    #[test]
    fn test_boundary_belongs_to_later_phrase() {
        let mut seq: Sequence<f32> = Sequence::new(0.0);
        // Jump cut at t = 1: a zero-length ramp from 1 to 5
        seq.ramp_to(1.0, 1.0).ramp_to(5.0, 0.0).hold(1.0);
        assert_eq!(seq.phrase_count(), 3);
        assert_eq!(seq.value_at(1.0), 5.0);
        assert!(close(seq.value_at(0.999), 0.999));
    }

    #[test]
    fn test_lookup_visits_every_phrase() {
        let seq = three_ramps();
        assert_eq!(seq.duration(), 4.0);
        assert_eq!(seq.value_at(0.5), 0.5);
        assert_eq!(seq.value_at(1.0), 1.0);
        assert_eq!(seq.value_at(2.0), 2.0);
        assert_eq!(seq.value_at(3.5), 1.5);
        assert_eq!(seq.value_at(4.0), 0.0);
        assert_eq!(seq.value_at(f32::NAN), 0.0);
    }

    #[test]
    fn test_set_before_and_after_phrases() {
        let mut seq: Sequence<f32> = Sequence::new(5.0);
        seq.set(7.0);
        assert_eq!(seq.phrase_count(), 0);
        assert_eq!(seq.initial_value(), 7.0);

        seq.ramp_to(10.0, 1.0).set(20.0);
        assert_eq!(seq.phrase_count(), 2);
        assert_eq!(seq.duration(), 1.0);
        assert_eq!(seq.value_at(1.0), 20.0);
        assert_eq!(seq.end_value(), 20.0);
    }

    #[test]
    fn test_hold_and_wait() {
        let mut seq: Sequence<f32> = Sequence::new(3.0);
        seq.hold(1.0).wait(2.0).hold_value(9.0, 1.0);
        assert_eq!(seq.duration(), 4.0);
        assert_eq!(seq.value_at(2.5), 3.0);
        assert_eq!(seq.value_at(3.5), 9.0);
        assert_eq!(seq.phrases()[0].ease, Ease::Hold);
    }

    #[test]
    fn test_ramp_with_ease() {
        let mut seq: Sequence<f32> = Sequence::new(0.0);
        seq.ramp_to_with(10.0, 2.0, Ease::InQuad);
        assert_eq!(seq.value_at(1.0), 2.5);
    }

    #[test]
    fn test_ease_replaces_last_only() {
        let mut empty = Sequence::<f32>::new(1.0);
        empty.ease(Ease::InQuad);
        assert_eq!(empty.phrase_count(), 0);

        let mut seq: Sequence<f32> = Sequence::new(0.0);
        seq.ramp_to(10.0, 2.0).ramp_to(20.0, 2.0).ease(Ease::InQuad);
        assert_eq!(seq.phrases()[0].ease, Ease::Linear);
        assert_eq!(seq.phrases()[1].ease, Ease::InQuad);
        assert_eq!(seq.value_at(1.0), 5.0);
        assert_eq!(seq.value_at(3.0), 12.5);
    }

    #[test]
    fn test_then_with_phrase_args() {
        let mut seq: Sequence<f32, CurvePhrase<f32>> = Sequence::new(0.0);
        seq.then(10.0, 1.0, (0.0, 10.0)).ramp_to(0.0, 1.0);
        assert_eq!(seq.duration(), 2.0);
        assert!(close(seq.value_at(0.5), 5.0));
        assert!(seq.value_at(0.1) < 1.0);
        assert_eq!(seq.phrases()[1].start_value(), 10.0);

        let mut ramps: Sequence<f32> = Sequence::new(0.0);
        ramps.then(8.0, 2.0, Ease::InQuad);
        assert_eq!(ramps.value_at(1.0), 2.0);
    }

    #[test]
    fn test_then_phrase_rebases_phrase() {
        let mut seq: Sequence<f32> = Sequence::new(0.0);
        seq.ramp_to(4.0, 2.0);

        let outside = RampPhrase::linear(Position::new(100.0, 10.0), Position::new(8.0, 13.0));
        seq.then_phrase(outside);

        let last = &seq.phrases()[1];
        assert_eq!(last.start_value(), 4.0);
        assert_eq!(last.start_time(), 2.0);
        assert_eq!(last.end_time(), 5.0);
        assert_eq!(seq.duration(), 5.0);
        assert_eq!(seq.value_at(3.5), 6.0);
    }

    #[test]
    fn test_slice_keeps_absolute_times() {
        let seq = three_ramps();
        let slice = seq.slice(1, 1).unwrap();
        assert_eq!(slice.phrase_count(), 1);
        assert_eq!(slice.phrases()[0].start_time(), 1.0);
        assert_eq!(slice.phrases()[0].end_time(), 3.0);
        assert_eq!(slice.initial_value(), 1.0);
        assert_eq!(slice.duration(), 3.0);
        // Before the slice's first phrase the lookup falls into that phrase
        assert_eq!(slice.value_at(0.5), 1.0);
        assert_eq!(slice.value_at(2.0), 2.0);
    }

    #[test]
    fn test_slice_out_of_range() {
        let seq = three_ramps();
        assert!(matches!(
            seq.slice(3, 1),
            Err(SequenceError::SliceOutOfRange { begin: 3, size: 1, count: 3 })
        ));
        assert!(matches!(seq.slice(2, 2), Err(SequenceError::SliceOutOfRange { .. })));
        assert!(matches!(seq.slice(1, usize::MAX), Err(SequenceError::SliceOutOfRange { .. })));
        assert!(matches!(seq.slice(0, 0), Err(SequenceError::EmptyPhrases)));
        assert_eq!(seq.slice(0, 3).unwrap().phrase_count(), 3);
    }

    #[test]
    fn test_wrap_time() {
        let mut seq: Sequence<f32> = Sequence::new(0.0);
        seq.ramp_to(10.0, 10.0);

        assert_eq!(seq.wrap_time(4.0, 0.0).unwrap(), 4.0);
        assert_eq!(seq.wrap_time(10.0, 0.0).unwrap(), 10.0);
        assert!(close(seq.wrap_time(13.0, 0.0).unwrap(), 3.0));
        assert!(close(seq.wrap_time(23.0, 2.0).unwrap(), 9.0));
        assert_eq!(seq.wrap_time(23.0, 10.0).unwrap(), 10.0);
        assert!(matches!(
            seq.wrap_time(23.0, 11.0),
            Err(SequenceError::InvalidInflectionPoint { .. })
        ));
    }

    #[test]
    fn test_wrap_empty_sequence_holds() {
        let seq: Sequence<f32> = Sequence::new(2.0);
        assert_eq!(seq.wrap_time(5.0, 0.0).unwrap(), 0.0);
        assert_eq!(seq.value_wrapped(5.0, 0.0).unwrap(), 2.0);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut seq = three_ramps();
        let shared = seq.copy();
        seq.ramp_to(50.0, 1.0);
        assert_eq!(shared.phrase_count(), 3);
        assert_eq!(shared.duration(), 4.0);
        assert_eq!(seq.phrase_count(), 4);

        let again = Arc::clone(&shared);
        assert_eq!(Arc::strong_count(&shared), 2);
        assert_eq!(again.end_value(), 0.0);
    }

    #[test]
    fn test_default_sequence() {
        let seq: Sequence<[f32; 3]> = Sequence::default();
        assert_eq!(seq.initial_value(), [0.0; 3]);
    }

    #[test]
    fn test_to_ron_names_custom_ease() {
        let mut seq: Sequence<f32> = Sequence::new(0.0);
        seq.ramp_to(1.0, 1.0).ramp_to(2.0, 1.0).ease(Ease::custom(|t| t * t));
        let err = seq.to_ron().unwrap_err();
        assert!(matches!(err, SequenceError::UnserializableEase { index: 1 }));
        assert_eq!(
            err.to_string(),
            "Phrase 1 uses a custom ease, which cannot be serialized"
        );

        seq.ease(Ease::OutQuad);
        assert!(seq.to_ron().is_ok());
    }

    #[test]
    fn test_error_messages() {
        let err = SequenceError::Discontinuous { index: 2 };
        assert_eq!(err.to_string(), "Phrase 2 does not start where phrase 1 ends");
        let err = SequenceError::InvalidInflectionPoint {
            inflection_point: 3.0,
            duration: 2.0,
        };
        assert_eq!(
            err.to_string(),
            "Inflection point 3 is past the sequence duration 2"
        );
    }
}
