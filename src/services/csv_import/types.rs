use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Contact, ContactStatus};

/// Number of mapped rows shown before committing an import.
pub const PREVIEW_ROWS: usize = 5;

/// One parsed data line keyed by header name.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUpload {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Contact fields a source column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetField {
    Name,
    Email,
    Phone,
    Company,
    Status,
    Tags,
}

impl TargetField {
    pub const REQUIRED: [TargetField; 2] = [TargetField::Name, TargetField::Email];
}

/// Source column -> target field. Unmapped ("skipped") columns are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(pub(crate) BTreeMap<String, TargetField>);

/// A row after mapping. Fields with no mapped column, or an empty cell, are
/// `None` and left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ContactCandidate {
    /// Fills the fields the upload did not provide: `lead` status, no tags,
    /// empty phone and company.
    pub fn into_contact(self, id: u64, now: DateTime<Utc>) -> Contact {
        Contact {
            id,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            status: self.status.unwrap_or(ContactStatus::Lead),
            tags: self.tags.unwrap_or_default(),
            created_at: now,
            last_activity: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Name and email are required")]
    MissingRequired,
    #[error("Email already exists")]
    DuplicateEmail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRow {
    /// 1-based position in the uploaded rows.
    pub row: usize,
    pub data: ContactCandidate,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub successful: Vec<Contact>,
    pub failed: Vec<FailedRow>,
}
