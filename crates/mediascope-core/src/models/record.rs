use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::title::{TitleField, TitlePriority};

/// Opaque id of a library record.
pub type RecordId = Uuid;

/// Authoritative numeric id from a third-party catalog (AniList, MAL, MangaUpdates...).
pub type ExternalId = i64;

/// Anything that can be matched by its titles and external identifier.
///
/// Every media category (book/manga series, anime series, ...) implements this
/// once and goes through the same resolution engine.
pub trait TitledRecord {
    /// Populated title slots with their semantic priority. Blank slots are omitted.
    fn title_fields(&self) -> Vec<TitleField>;

    fn external_id(&self) -> Option<ExternalId>;

    /// Category tag used to prune the corpus before comparison.
    fn category(&self) -> Option<&str> {
        None
    }
}

/// A record that already exists in the library.
pub trait LibraryEntry: TitledRecord {
    fn record_id(&self) -> RecordId;
}

impl<T: TitledRecord + ?Sized> TitledRecord for &T {
    fn title_fields(&self) -> Vec<TitleField> {
        (**self).title_fields()
    }

    fn external_id(&self) -> Option<ExternalId> {
        (**self).external_id()
    }

    fn category(&self) -> Option<&str> {
        (**self).category()
    }
}

impl<T: LibraryEntry + ?Sized> LibraryEntry for &T {
    fn record_id(&self) -> RecordId {
        (**self).record_id()
    }
}

/// True when both sides carry an external id and the ids differ.
pub fn ids_conflict(left: Option<ExternalId>, right: Option<ExternalId>) -> bool {
    matches!((left, right), (Some(a), Some(b)) if a != b)
}

/// External ids are unique across a corpus; two records sharing one means the
/// snapshot is corrupt and identifier matching would be ambiguous.
pub fn check_unique_external_ids<T: LibraryEntry>(corpus: &[T]) -> crate::Result<()> {
    let mut seen: HashMap<ExternalId, RecordId> = HashMap::new();
    for record in corpus {
        let Some(external_id) = record.external_id() else {
            continue;
        };
        if let Some(first) = seen.insert(external_id, record.record_id())
            && first != record.record_id()
        {
            return Err(crate::MediascopeError::InvalidRecord(format!(
                "external id {external_id} is shared by records {first} and {}",
                record.record_id()
            )));
        }
    }
    Ok(())
}

/// Category-agnostic library record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRecord {
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub titles: Vec<TitleField>,
}

impl LibraryRecord {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            external_id: None,
            category: None,
            titles: Vec::new(),
        }
    }

    pub fn with_external_id(mut self, external_id: ExternalId) -> Self {
        self.external_id = Some(external_id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_title(mut self, text: impl Into<String>, priority: TitlePriority) -> Self {
        self.titles.push(TitleField::new(text, priority));
        self
    }
}

impl TitledRecord for LibraryRecord {
    fn title_fields(&self) -> Vec<TitleField> {
        self.titles.iter().filter(|f| !f.is_blank()).cloned().collect()
    }

    fn external_id(&self) -> Option<ExternalId> {
        self.external_id
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl LibraryEntry for LibraryRecord {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

/// A record coming from an external catalog or a backup, not persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,

    /// Category hint, compared by equality only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub titles: Vec<TitleField>,
}

impl IncomingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_external_id(mut self, external_id: ExternalId) -> Self {
        self.external_id = Some(external_id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_title(mut self, text: impl Into<String>, priority: TitlePriority) -> Self {
        self.titles.push(TitleField::new(text, priority));
        self
    }
}

impl TitledRecord for IncomingRecord {
    fn title_fields(&self) -> Vec<TitleField> {
        self.titles.iter().filter(|f| !f.is_blank()).cloned().collect()
    }

    fn external_id(&self) -> Option<ExternalId> {
        self.external_id
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
