use super::key::{MusicalKey, UNKNOWN_CAMELOT, UNKNOWN_KEY_LABEL};
use serde::{Deserialize, Deserializer, Serialize};

/// Analysis of one audio file, as reported by the analyzer binary
///
/// Serializes back to the analyzer's wire shape (camelCase keys, tags
/// flattened into the top-level object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Path as echoed back by the analyzer
    pub file: String,

    /// Tempo in BPM, `None` when detection failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,

    /// Key label, e.g. "A minor", or the unknown sentinel
    pub key: String,

    /// Camelot code derived from `key`, e.g. "8A"
    pub camelot: String,

    /// Integrated loudness (LUFS)
    pub lufs: f64,

    /// ReplayGain adjustment in dB
    pub replay_gain: f64,

    /// End of the intro, in seconds
    pub intro_secs: f64,

    /// Start of the outro, in seconds
    pub outro_secs: f64,

    /// Embedded metadata tags
    #[serde(flatten)]
    pub tags: Tags,

    /// Beat positions in seconds, empty when `bpm` is absent
    #[serde(default, deserialize_with = "null_as_default")]
    pub beatgrid: Vec<f64>,
}

impl AnalysisResult {
    /// Parsed key, `None` for the unknown sentinel or unrecognised labels
    pub fn musical_key(&self) -> Option<MusicalKey> {
        MusicalKey::from_label(&self.key)
    }

    /// Whether the analyzer failed to find a key
    pub fn is_key_unknown(&self) -> bool {
        self.key.is_empty() || self.key == UNKNOWN_KEY_LABEL || self.camelot == UNKNOWN_CAMELOT
    }

    /// Track length between intro end and outro start
    pub fn body_secs(&self) -> f64 {
        (self.outro_secs - self.intro_secs).max(0.0)
    }

    /// Check cross-field invariants that typed decoding cannot express
    pub fn check_invariants(&self) -> Result<(), String> {
        let scalars = [
            ("bpm", self.bpm.unwrap_or(0.0)),
            ("lufs", self.lufs),
            ("replayGain", self.replay_gain),
            ("introSecs", self.intro_secs),
            ("outroSecs", self.outro_secs),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(format!("`{}` is not finite", name));
            }
        }

        if self.bpm.is_none() && !self.beatgrid.is_empty() {
            return Err(format!(
                "beatgrid has {} beats but bpm is absent",
                self.beatgrid.len()
            ));
        }

        if let Some(pos) = self.beatgrid.iter().position(|b| !b.is_finite()) {
            return Err(format!("beatgrid[{}] is not finite", pos));
        }

        if let Some(pos) = self.beatgrid.windows(2).position(|w| w[1] < w[0]) {
            return Err(format!(
                "beatgrid decreases at position {} ({} -> {})",
                pos + 1,
                self.beatgrid[pos],
                self.beatgrid[pos + 1]
            ));
        }

        Ok(())
    }
}

/// Embedded metadata tags read by the analyzer
///
/// Every field is always present; tags missing from the file are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tags {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub track_number: String,
    /// BPM as written in the file's tags, not the detected tempo
    #[serde(default, deserialize_with = "null_as_default")]
    pub bpm_tag: String,
}

impl Tags {
    /// Wire names of the tag keys, in output order
    pub const KEYS: [&'static str; 9] = [
        "title",
        "artist",
        "album",
        "year",
        "genre",
        "label",
        "comment",
        "trackNumber",
        "bpmTag",
    ];

    /// Look up a tag by its wire name
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "title" => &self.title,
            "artist" => &self.artist,
            "album" => &self.album,
            "year" => &self.year,
            "genre" => &self.genre,
            "label" => &self.label,
            "comment" => &self.comment,
            "trackNumber" => &self.track_number,
            "bpmTag" => &self.bpm_tag,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// All nine `(wire name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Self::KEYS
            .into_iter()
            .map(move |k| (k, self.get(k).unwrap_or_default()))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, v)| v.is_empty())
    }
}

/// Treat an explicit JSON `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
