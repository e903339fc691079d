use serde::{Deserialize, Serialize};

/// Trust ranking of a title field, fixed by what the field means.
///
/// Ordering follows the rank: `Romanized < Native < English < Display < Alternate`,
/// so "smaller" always means "more trusted for automatic merging".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlePriority {
    /// Romanized / primary transliteration.
    Romanized = 1,
    /// Title in its native script.
    Native = 2,
    /// English or otherwise localized title.
    English = 3,
    /// Display title, language depends on the source.
    Display = 4,
    /// Alternate / aka titles. Known to collide across unrelated works.
    Alternate = 5,
}

impl TitlePriority {
    pub const ALL: [TitlePriority; 5] = [
        Self::Romanized,
        Self::Native,
        Self::English,
        Self::Display,
        Self::Alternate,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.rank() == rank)
    }

    /// Whether an exact agreement on a field of this priority may be merged
    /// without a human looking at it.
    pub fn allows_auto_merge(self) -> bool {
        self <= Self::Display
    }
}

impl std::fmt::Display for TitlePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Romanized => write!(f, "romanized"),
            Self::Native => write!(f, "native"),
            Self::English => write!(f, "english"),
            Self::Display => write!(f, "display"),
            Self::Alternate => write!(f, "alternate"),
        }
    }
}

impl std::str::FromStr for TitlePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "romanized" | "romaji" => Ok(Self::Romanized),
            "native" => Ok(Self::Native),
            "english" => Ok(Self::English),
            "display" => Ok(Self::Display),
            "alternate" | "aka" => Ok(Self::Alternate),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(Self::from_rank)
                .ok_or_else(|| format!("Invalid TitlePriority: {s}")),
        }
    }
}

/// One populated title slot of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleField {
    pub text: String,
    pub priority: TitlePriority,
}

impl TitleField {
    pub fn new(text: impl Into<String>, priority: TitlePriority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }

    pub fn romanized(text: impl Into<String>) -> Self {
        Self::new(text, TitlePriority::Romanized)
    }

    pub fn native(text: impl Into<String>) -> Self {
        Self::new(text, TitlePriority::Native)
    }

    pub fn english(text: impl Into<String>) -> Self {
        Self::new(text, TitlePriority::English)
    }

    pub fn display(text: impl Into<String>) -> Self {
        Self::new(text, TitlePriority::Display)
    }

    pub fn alternate(text: impl Into<String>) -> Self {
        Self::new(text, TitlePriority::Alternate)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Collects the populated slots of a record shape into title fields.
/// Blank slots are dropped; they carry no signal.
pub(crate) fn collect_fields<'a>(
    slots: impl IntoIterator<Item = (Option<&'a str>, TitlePriority)>,
) -> Vec<TitleField> {
    slots
        .into_iter()
        .filter_map(|(text, priority)| {
            text.map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| TitleField::new(t, priority))
        })
        .collect()
}
