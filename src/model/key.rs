use serde::{Deserialize, Serialize};

/// Key label the analyzer emits when no tonal centre was found
pub const UNKNOWN_KEY_LABEL: &str = "Silence / Unknown";

/// Camelot code paired with [`UNKNOWN_KEY_LABEL`]
pub const UNKNOWN_CAMELOT: &str = "-";

/// Musical key representation (Camelot/Open Key notation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicalKey {
    // Major keys
    CMajor,
    DbMajor,
    DMajor,
    EbMajor,
    EMajor,
    FMajor,
    GbMajor,
    GMajor,
    AbMajor,
    AMajor,
    BbMajor,
    BMajor,

    // Minor keys
    CMinor,
    CsMinor,
    DMinor,
    EbMinor,
    EMinor,
    FMinor,
    FsMinor,
    GMinor,
    AbMinor,
    AMinor,
    BbMinor,
    BMinor,
}

/// Camelot wheel letter: `A` for minor keys, `B` for major keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Minor,
    Major,
}

impl MusicalKey {
    pub const ALL: [MusicalKey; 24] = [
        MusicalKey::CMajor,
        MusicalKey::DbMajor,
        MusicalKey::DMajor,
        MusicalKey::EbMajor,
        MusicalKey::EMajor,
        MusicalKey::FMajor,
        MusicalKey::GbMajor,
        MusicalKey::GMajor,
        MusicalKey::AbMajor,
        MusicalKey::AMajor,
        MusicalKey::BbMajor,
        MusicalKey::BMajor,
        MusicalKey::CMinor,
        MusicalKey::CsMinor,
        MusicalKey::DMinor,
        MusicalKey::EbMinor,
        MusicalKey::EMinor,
        MusicalKey::FMinor,
        MusicalKey::FsMinor,
        MusicalKey::GMinor,
        MusicalKey::AbMinor,
        MusicalKey::AMinor,
        MusicalKey::BbMinor,
        MusicalKey::BMinor,
    ];

    /// Label in the analyzer's spelling, e.g. "A minor" or "F# major"
    pub fn label(&self) -> &'static str {
        match self {
            MusicalKey::CMajor => "C major",
            MusicalKey::DbMajor => "Db major",
            MusicalKey::DMajor => "D major",
            MusicalKey::EbMajor => "Eb major",
            MusicalKey::EMajor => "E major",
            MusicalKey::FMajor => "F major",
            MusicalKey::GbMajor => "F# major",
            MusicalKey::GMajor => "G major",
            MusicalKey::AbMajor => "Ab major",
            MusicalKey::AMajor => "A major",
            MusicalKey::BbMajor => "Bb major",
            MusicalKey::BMajor => "B major",

            MusicalKey::CMinor => "C minor",
            MusicalKey::CsMinor => "Db minor",
            MusicalKey::DMinor => "D minor",
            MusicalKey::EbMinor => "Eb minor",
            MusicalKey::EMinor => "E minor",
            MusicalKey::FMinor => "F minor",
            MusicalKey::FsMinor => "F# minor",
            MusicalKey::GMinor => "G minor",
            MusicalKey::AbMinor => "Ab minor",
            MusicalKey::AMinor => "A minor",
            MusicalKey::BbMinor => "Bb minor",
            MusicalKey::BMinor => "B minor",
        }
    }

    /// Position on the Camelot wheel (1..=12)
    pub fn camelot_number(&self) -> u8 {
        match self {
            MusicalKey::BMajor | MusicalKey::AbMinor => 1,
            MusicalKey::GbMajor | MusicalKey::EbMinor => 2,
            MusicalKey::DbMajor | MusicalKey::BbMinor => 3,
            MusicalKey::AbMajor | MusicalKey::FMinor => 4,
            MusicalKey::EbMajor | MusicalKey::CMinor => 5,
            MusicalKey::BbMajor | MusicalKey::GMinor => 6,
            MusicalKey::FMajor | MusicalKey::DMinor => 7,
            MusicalKey::CMajor | MusicalKey::AMinor => 8,
            MusicalKey::GMajor | MusicalKey::EMinor => 9,
            MusicalKey::DMajor | MusicalKey::BMinor => 10,
            MusicalKey::AMajor | MusicalKey::FsMinor => 11,
            MusicalKey::EMajor | MusicalKey::CsMinor => 12,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.is_minor() {
            Mode::Minor
        } else {
            Mode::Major
        }
    }

    pub fn is_minor(&self) -> bool {
        matches!(
            self,
            MusicalKey::CMinor
                | MusicalKey::CsMinor
                | MusicalKey::DMinor
                | MusicalKey::EbMinor
                | MusicalKey::EMinor
                | MusicalKey::FMinor
                | MusicalKey::FsMinor
                | MusicalKey::GMinor
                | MusicalKey::AbMinor
                | MusicalKey::AMinor
                | MusicalKey::BbMinor
                | MusicalKey::BMinor
        )
    }

    /// Camelot code, e.g. "8A" for A minor
    pub fn camelot(&self) -> String {
        let letter = match self.mode() {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        };
        format!("{}{}", self.camelot_number(), letter)
    }

    /// Parse a key label such as "A minor", "F# Major" or "C#m".
    ///
    /// Enharmonic spellings (sharps and flats) resolve to the same key.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let (tonic, minor) = if let Some((tonic, mode)) = label.split_once(char::is_whitespace) {
            match mode.trim().to_ascii_lowercase().as_str() {
                "major" | "maj" => (tonic, false),
                "minor" | "min" => (tonic, true),
                _ => return None,
            }
        } else if let Some(tonic) = label.strip_suffix('m') {
            (tonic, true)
        } else {
            (label, false)
        };

        let pitch = pitch_class(tonic)?;
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.is_minor() == minor && k.pitch_class() == pitch)
    }

    /// Parse a Camelot code such as "8A" or "12b"
    pub fn from_camelot(code: &str) -> Option<Self> {
        let code = code.trim();
        let letter = code.chars().last()?;
        let mode = match letter.to_ascii_uppercase() {
            'A' => Mode::Minor,
            'B' => Mode::Major,
            _ => return None,
        };
        let number: u8 = code[..code.len() - 1].parse().ok()?;
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.mode() == mode && k.camelot_number() == number)
    }

    /// Whether two keys mix harmonically on the Camelot wheel:
    /// same number, or same letter one step apart (12 wraps to 1).
    pub fn is_harmonic_match(&self, other: &MusicalKey) -> bool {
        let a = self.camelot_number();
        let b = other.camelot_number();
        if a == b {
            return true;
        }
        if self.mode() != other.mode() {
            return false;
        }
        let diff = (12 + a - b) % 12;
        diff == 1 || diff == 11
    }

    fn pitch_class(&self) -> u8 {
        match self {
            MusicalKey::CMajor | MusicalKey::CMinor => 0,
            MusicalKey::DbMajor | MusicalKey::CsMinor => 1,
            MusicalKey::DMajor | MusicalKey::DMinor => 2,
            MusicalKey::EbMajor | MusicalKey::EbMinor => 3,
            MusicalKey::EMajor | MusicalKey::EMinor => 4,
            MusicalKey::FMajor | MusicalKey::FMinor => 5,
            MusicalKey::GbMajor | MusicalKey::FsMinor => 6,
            MusicalKey::GMajor | MusicalKey::GMinor => 7,
            MusicalKey::AbMajor | MusicalKey::AbMinor => 8,
            MusicalKey::AMajor | MusicalKey::AMinor => 9,
            MusicalKey::BbMajor | MusicalKey::BbMinor => 10,
            MusicalKey::BMajor | MusicalKey::BMinor => 11,
        }
    }
}

fn pitch_class(tonic: &str) -> Option<u8> {
    let mut chars = tonic.chars();
    let base = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental: i8 = match chars.as_str() {
        "" => 0,
        "#" | "♯" => 1,
        "b" | "♭" => -1,
        _ => return None,
    };
    Some(((base + 12 + accidental) % 12) as u8)
}
