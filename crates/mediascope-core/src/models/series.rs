use serde::{Deserialize, Serialize};

use super::record::{ExternalId, LibraryEntry, RecordId, TitledRecord};
use super::title::{TitleField, TitlePriority, collect_fields};

pub const BOOK_CATEGORY: &str = "book";
pub const ANIME_CATEGORY: &str = "anime";

/// Book or manga series as stored in the library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSeries {
    #[serde(default)]
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,

    /// Display title as entered or imported.
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_romaji: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_native: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,

    /// Alternate titles, usually several packed into one field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_titles: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<u32>,
}

impl BookSeries {
    pub fn new(id: RecordId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Default::default()
        }
    }
}

impl TitledRecord for BookSeries {
    fn title_fields(&self) -> Vec<TitleField> {
        collect_fields([
            (self.title_romaji.as_deref(), TitlePriority::Romanized),
            (self.title_native.as_deref(), TitlePriority::Native),
            (self.title_english.as_deref(), TitlePriority::English),
            (Some(self.title.as_str()), TitlePriority::Display),
            (self.alternate_titles.as_deref(), TitlePriority::Alternate),
        ])
    }

    fn external_id(&self) -> Option<ExternalId> {
        self.external_id
    }

    fn category(&self) -> Option<&str> {
        Some(BOOK_CATEGORY)
    }
}

impl LibraryEntry for BookSeries {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

/// Animated series as stored in the library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeSeries {
    #[serde(default)]
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_romaji: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_native: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,

    /// Synonyms as returned by the catalog, one entry per title.
    #[serde(default)]
    pub synonyms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
}

impl AnimeSeries {
    pub fn new(id: RecordId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Default::default()
        }
    }
}

impl TitledRecord for AnimeSeries {
    fn title_fields(&self) -> Vec<TitleField> {
        let mut fields = collect_fields([
            (self.title_romaji.as_deref(), TitlePriority::Romanized),
            (self.title_native.as_deref(), TitlePriority::Native),
            (self.title_english.as_deref(), TitlePriority::English),
            (Some(self.title.as_str()), TitlePriority::Display),
        ]);
        fields.extend(collect_fields(
            self.synonyms
                .iter()
                .map(|s| (Some(s.as_str()), TitlePriority::Alternate)),
        ));
        fields
    }

    fn external_id(&self) -> Option<ExternalId> {
        self.external_id
    }

    fn category(&self) -> Option<&str> {
        Some(ANIME_CATEGORY)
    }
}

impl LibraryEntry for AnimeSeries {
    fn record_id(&self) -> RecordId {
        self.id
    }
}
