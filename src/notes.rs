//! Note names and 12-tone equal temperament
//!
//! Names are pitch class plus octave ("A4", "C#5"), octave 4 containing the
//! tuning reference A4.

use std::collections::HashMap;
use std::ops::RangeInclusive;

pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const DEFAULT_REF_FREQ: f64 = 440.0;
pub const DEFAULT_TOLERANCE_CENTS: f64 = 50.0;

lazy_static::lazy_static! {
    /// Octaves 0..=8 tuned to A4 = 440 Hz
    pub static ref DEFAULT_NOTE_TABLE: NoteTable =
        NoteTable::equal_temperament(0..=8, DEFAULT_REF_FREQ);
}

/// Frequency of `pitch_class` (0 = C) in `octave`
pub fn note_frequency(pitch_class: usize, octave: i32, ref_freq: f64) -> f64 {
    let note_number = (octave - 4) * 12 + pitch_class as i32 - 9;
    ref_freq * 2f64.powf(note_number as f64 / 12.0)
}

/// Distance from `reference` to `freq` in cents
pub fn cents_between(freq: f64, reference: f64) -> f64 {
    1200.0 * (freq / reference).log2()
}

/// Ordered note-name to frequency mapping
#[derive(Debug, Clone)]
pub struct NoteTable {
    ref_freq: f64,
    notes: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl NoteTable {
    pub fn equal_temperament(octaves: RangeInclusive<i32>, ref_freq: f64) -> Self {
        let mut notes = Vec::new();
        for octave in octaves {
            for (pc, name) in PITCH_CLASSES.iter().enumerate() {
                notes.push((
                    format!("{}{}", name, octave),
                    note_frequency(pc, octave, ref_freq),
                ));
            }
        }
        let index = notes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            ref_freq,
            notes,
            index,
        }
    }

    pub fn ref_freq(&self) -> f64 {
        self.ref_freq
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.notes.iter().map(|(name, f)| (name.as_str(), *f))
    }

    /// Frequency of a note name. Flats ("Bb4") are accepted as their sharp spelling.
    pub fn frequency(&self, name: &str) -> Option<f64> {
        let canonical = canonical_name(name)?;
        self.index.get(&canonical).map(|&i| self.notes[i].1)
    }

    /// Closest note within `tolerance_cents`, or `None`
    pub fn nearest(&self, freq: f64, tolerance_cents: f64) -> Option<&str> {
        if freq <= 0.0 || !freq.is_finite() {
            return None;
        }
        self.notes
            .iter()
            .map(|(name, f)| (name.as_str(), cents_between(freq, *f).abs()))
            .filter(|(_, cents)| *cents <= tolerance_cents)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name)
    }
}

/// Normalize case and flats: "bb4" -> "A#4", "c#3" -> "C#3"
fn canonical_name(name: &str) -> Option<String> {
    let name = name.trim();
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') | Some('s') if rest.len() > 1 => (1i32, &rest[1..]),
        Some('b') | Some('f') if rest.len() > 1 => (-1i32, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave.parse().ok()?;
    let base = PITCH_CLASSES.iter().position(|pc| pc.len() == 1 && pc.starts_with(letter))? as i32;
    let pc = base + accidental;
    let (pc, octave) = match pc {
        -1 => (11, octave - 1),
        12 => (0, octave + 1),
        pc => (pc, octave),
    };
    Some(format!("{}{}", PITCH_CLASSES[pc as usize], octave))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_is_reference() {
        let table = NoteTable::equal_temperament(0..=8, 440.0);
        assert_eq!(table.len(), 108);
        assert!((table.frequency("A4").unwrap() - 440.0).abs() < 1e-9);
        assert!((table.frequency("A5").unwrap() - 880.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_frequencies() {
        let table = &*DEFAULT_NOTE_TABLE;
        assert!((table.frequency("C4").unwrap() - 261.6256).abs() < 1e-3);
        assert!((table.frequency("C5").unwrap() - 523.2511).abs() < 1e-3);
        assert!((table.frequency("B4").unwrap() - 493.8833).abs() < 1e-3);
        assert!((table.frequency("C0").unwrap() - 16.3516).abs() < 1e-3);
    }

    #[test]
    fn test_table_order() {
        let table = NoteTable::equal_temperament(3..=3, 440.0);
        let names: Vec<&str> = table
            .iter()
            .map(|(n, _)| n)
            .take(3)
            .collect();
        assert_eq!(names, vec!["C3", "C#3", "D3"]);
    }

    #[test]
    fn test_flats_and_case() {
        let table = &*DEFAULT_NOTE_TABLE;
        assert_eq!(table.frequency("Bb4"), table.frequency("A#4"));
        assert_eq!(table.frequency("c#4"), table.frequency("C#4"));
        assert_eq!(table.frequency("Cb4"), table.frequency("B3"));
        assert_eq!(table.frequency("B#3"), table.frequency("C4"));
        assert!(table.frequency("H4").is_none());
        assert!(table.frequency("A").is_none());
        assert!(table.frequency("A9").is_none());
    }

    #[test]
    fn test_nearest() {
        let table = &*DEFAULT_NOTE_TABLE;
        assert_eq!(table.nearest(440.0, 50.0), Some("A4"));
        assert_eq!(table.nearest(445.0, 50.0), Some("A4"));
        assert_eq!(table.nearest(261.63, 50.0), Some("C4"));
        // A quarter tone above A4 is 50 cents from both A4 and A#4
        let quarter = 440.0 * 2f64.powf(0.5 / 12.0);
        assert!(table.nearest(quarter * 1.001, 10.0).is_none());
        assert!(table.nearest(0.0, 50.0).is_none());
        assert!(table.nearest(-5.0, 50.0).is_none());
    }

    #[test]
    fn test_ref_freq_shifts_table() {
        let table = NoteTable::equal_temperament(4..=4, 432.0);
        assert!((table.frequency("A4").unwrap() - 432.0).abs() < 1e-9);
        assert_eq!(table.ref_freq(), 432.0);
    }
}
