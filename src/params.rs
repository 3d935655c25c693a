//! Note output parameters edited through the sliders.
//!
//! These values live only in the editor. Nothing here is sent to the module yet.

use core::ops::RangeInclusive;

/// Lowest and highest MIDI note numbers.
pub const NOTE_BOUNDS: RangeInclusive<i32> = 0..=127;
/// Smallest allowed distance between the two note range thumbs.
pub const MIN_NOTE_GAP: i32 = 1;

/// A slider value held inside fixed inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounded {
    value: i32,
    min: i32,
    max: i32,
}

impl Bounded {
    /// Constructs a [`Bounded`], clamping `value` into `min..=max`.
    pub const fn new(value: i32, min: i32, max: i32) -> Self {
        let value = if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        };
        Self { value, min, max }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Sets the value, clamped into bounds.
    pub fn set(&mut self, value: i32) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Moves the value by `delta` steps, stopping at the bounds.
    pub fn nudge(&mut self, delta: i32) {
        self.set(self.value.saturating_add(delta));
    }

    /// Position of the value within its bounds, from 0.0 to 1.0.
    pub fn ratio(&self) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        (self.value - self.min) as f64 / (self.max - self.min) as f64
    }
}

/// Two-thumb range of MIDI notes to output.
///
/// The thumbs never cross and always stay at least [`MIN_NOTE_GAP`] apart; moving
/// one into the other stops it short instead of pushing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteRange {
    low: i32,
    high: i32,
}

impl NoteRange {
    pub fn low(&self) -> i32 {
        self.low
    }

    pub fn high(&self) -> i32 {
        self.high
    }

    pub fn set_low(&mut self, value: i32) {
        self.low = value.clamp(*NOTE_BOUNDS.start(), self.high - MIN_NOTE_GAP);
    }

    pub fn set_high(&mut self, value: i32) {
        self.high = value.clamp(self.low + MIN_NOTE_GAP, *NOTE_BOUNDS.end());
    }
}

impl Default for NoteRange {
    fn default() -> Self {
        Self {
            low: *NOTE_BOUNDS.start(),
            high: *NOTE_BOUNDS.end(),
        }
    }
}

/// The five slider controls, in panel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamId {
    NoteLow,
    NoteHigh,
    Transpose,
    Glide,
    BendRange,
}

impl ParamId {
    pub const ALL: [ParamId; 5] = [
        ParamId::NoteLow,
        ParamId::NoteHigh,
        ParamId::Transpose,
        ParamId::Glide,
        ParamId::BendRange,
    ];

    /// Explanation shown while the control has focus.
    pub fn help(self) -> &'static str {
        match self {
            ParamId::NoteLow | ParamId::NoteHigh => {
                "Select the MIDI note range to output. Notes outside this range will be ignored."
            }
            ParamId::Transpose => "Transpose the note output in semitones.",
            ParamId::Glide => "Apply a glide between notes.",
            ParamId::BendRange => "Set the pitch bend range.",
        }
    }
}

/// All note output settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameters {
    pub note_range: NoteRange,
    /// Semitones.
    pub transpose: Bounded,
    /// Milliseconds.
    pub glide: Bounded,
    /// Semitones either side.
    pub bend_range: Bounded,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            note_range: NoteRange::default(),
            transpose: Bounded::new(0, -12, 12),
            glide: Bounded::new(0, 0, 500),
            bend_range: Bounded::new(2, 0, 24),
        }
    }
}

impl Parameters {
    pub fn value(&self, id: ParamId) -> i32 {
        match id {
            ParamId::NoteLow => self.note_range.low(),
            ParamId::NoteHigh => self.note_range.high(),
            ParamId::Transpose => self.transpose.value(),
            ParamId::Glide => self.glide.value(),
            ParamId::BendRange => self.bend_range.value(),
        }
    }

    pub fn set(&mut self, id: ParamId, value: i32) {
        match id {
            ParamId::NoteLow => self.note_range.set_low(value),
            ParamId::NoteHigh => self.note_range.set_high(value),
            ParamId::Transpose => self.transpose.set(value),
            ParamId::Glide => self.glide.set(value),
            ParamId::BendRange => self.bend_range.set(value),
        }
    }

    pub fn nudge(&mut self, id: ParamId, delta: i32) {
        self.set(id, self.value(id).saturating_add(delta));
    }

    /// Slider position for `id`, from 0.0 to 1.0.
    pub fn ratio(&self, id: ParamId) -> f64 {
        match id {
            ParamId::NoteLow | ParamId::NoteHigh => {
                let span = (NOTE_BOUNDS.end() - NOTE_BOUNDS.start()) as f64;
                (self.value(id) - NOTE_BOUNDS.start()) as f64 / span
            }
            ParamId::Transpose => self.transpose.ratio(),
            ParamId::Glide => self.glide.ratio(),
            ParamId::BendRange => self.bend_range.ratio(),
        }
    }

    /// Caption for the control, e.g. `Glide: 120 ms`.
    pub fn label(&self, id: ParamId) -> String {
        match id {
            ParamId::NoteLow | ParamId::NoteHigh => format!(
                "Note Range: {} to {}",
                self.note_range.low(),
                self.note_range.high()
            ),
            ParamId::Transpose => format!("Transpose: {}", self.transpose.value()),
            ParamId::Glide => format!("Glide: {} ms", self.glide.value()),
            ParamId::BendRange => format!("Pitch Bend Range: +/- {}", self.bend_range.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = Parameters::default();
        assert_eq!(params.note_range.low(), 0);
        assert_eq!(params.note_range.high(), 127);
        assert_eq!(params.transpose.value(), 0);
        assert_eq!(params.glide.value(), 0);
        assert_eq!(params.bend_range.value(), 2);
    }

    #[test]
    fn test_note_thumbs_never_cross() {
        let mut range = NoteRange::default();
        range.set_high(40);
        range.set_low(90);
        assert_eq!(range.low(), 39);
        assert_eq!(range.high(), 40);

        range.set_high(0);
        assert_eq!(range.high(), 40);
        assert!(range.low() < range.high());
    }

    #[test]
    fn test_note_range_clamps_to_midi_bounds() {
        let mut range = NoteRange::default();
        range.set_low(-5);
        range.set_high(300);
        assert_eq!((range.low(), range.high()), (0, 127));
    }

    #[test]
    fn test_bounds_hold_under_any_nudges() {
        let mut params = Parameters::default();
        let deltas = [-1000, 7, -3, 250, 1, -1, 999, -40, 12, -12];
        for (i, delta) in deltas.iter().cycle().take(200).enumerate() {
            let id = ParamId::ALL[i % ParamId::ALL.len()];
            params.nudge(id, *delta);

            assert!(params.note_range.low() < params.note_range.high());
            assert!(params.note_range.high() - params.note_range.low() >= MIN_NOTE_GAP);
            assert!(NOTE_BOUNDS.contains(&params.note_range.low()));
            assert!(NOTE_BOUNDS.contains(&params.note_range.high()));
            assert!((-12..=12).contains(&params.transpose.value()));
            assert!((0..=500).contains(&params.glide.value()));
            assert!((0..=24).contains(&params.bend_range.value()));
        }
    }

    #[test]
    fn test_labels() {
        let mut params = Parameters::default();
        params.set(ParamId::Glide, 120);
        params.set(ParamId::Transpose, -7);
        assert_eq!(params.label(ParamId::NoteLow), "Note Range: 0 to 127");
        assert_eq!(params.label(ParamId::Transpose), "Transpose: -7");
        assert_eq!(params.label(ParamId::Glide), "Glide: 120 ms");
        assert_eq!(params.label(ParamId::BendRange), "Pitch Bend Range: +/- 2");
    }

    #[test]
    fn test_ratio() {
        let mut params = Parameters::default();
        assert_eq!(params.ratio(ParamId::Transpose), 0.5);
        params.set(ParamId::Glide, 500);
        assert_eq!(params.ratio(ParamId::Glide), 1.0);
        assert_eq!(params.ratio(ParamId::NoteLow), 0.0);
    }
}
