//! The four fixed document slots tracked per reservation.
//!
//! Only existence and upload metadata are tracked; document content is never
//! inspected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rihla_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One of the four required-document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Passport scan.
    Passport,
    /// Identity photo.
    Photo,
    /// National identity card.
    Identity,
    /// Vaccination certificate.
    Vaccination,
}

impl DocumentKind {
    /// All slots, in display order.
    pub const ALL: [Self; 4] = [
        Self::Passport,
        Self::Photo,
        Self::Identity,
        Self::Vaccination,
    ];

    /// Returns the slot key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Photo => "photo",
            Self::Identity => "identity",
            Self::Vaccination => "vaccination",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| {
                DomainError::InvalidSlot(format!(
                    "'{s}' is not a document slot (expected passport, photo, identity or vaccination)"
                ))
            })
    }
}

/// Metadata supplied with an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    /// Storage path of the uploaded file.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Original file name.
    #[serde(default)]
    pub filename: Option<String>,
    /// Public URL of the file.
    #[serde(default)]
    pub url: Option<String>,
}

/// Existence and metadata of a single document slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSlot {
    /// Whether a document has been uploaded into this slot.
    pub exists: bool,
    /// Storage path of the latest upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// When the latest upload happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Original file name of the latest upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Public URL of the latest upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The four document slots of a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    /// Passport slot.
    pub passport: DocumentSlot,
    /// Photo slot.
    pub photo: DocumentSlot,
    /// Identity slot.
    pub identity: DocumentSlot,
    /// Vaccination slot.
    pub vaccination: DocumentSlot,
}

impl DocumentSet {
    /// Returns the slot for `kind`.
    #[must_use]
    pub fn slot(&self, kind: DocumentKind) -> &DocumentSlot {
        match kind {
            DocumentKind::Passport => &self.passport,
            DocumentKind::Photo => &self.photo,
            DocumentKind::Identity => &self.identity,
            DocumentKind::Vaccination => &self.vaccination,
        }
    }

    fn slot_mut(&mut self, kind: DocumentKind) -> &mut DocumentSlot {
        match kind {
            DocumentKind::Passport => &mut self.passport,
            DocumentKind::Photo => &mut self.photo,
            DocumentKind::Identity => &mut self.identity,
            DocumentKind::Vaccination => &mut self.vaccination,
        }
    }

    /// Marks `kind` as present, overwriting any earlier metadata for that
    /// slot. Other slots are left untouched.
    pub fn record(&mut self, kind: DocumentKind, upload: &DocumentUpload, at: DateTime<Utc>) {
        *self.slot_mut(kind) = DocumentSlot {
            exists: true,
            file_path: upload.file_path.clone(),
            uploaded_at: Some(at),
            filename: upload.filename.clone(),
            url: upload.url.clone(),
        };
    }

    /// `true` iff all four slots exist.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        DocumentKind::ALL.iter().all(|kind| self.slot(*kind).exists)
    }

    /// Slots that have not been uploaded yet.
    #[must_use]
    pub fn missing(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|kind| !self.slot(*kind).exists)
            .collect()
    }
}
