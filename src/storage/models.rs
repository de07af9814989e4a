use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading status of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    /// Not started yet
    BelumBaca,
    /// Currently reading
    SedangBaca,
    /// Finished
    SudahBaca,
}

impl Progress {
    pub fn as_str(&self) -> &'static str {
        match self {
            Progress::BelumBaca => "belum_baca",
            Progress::SedangBaca => "sedang_baca",
            Progress::SudahBaca => "sudah_baca",
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProgress(pub String);

impl fmt::Display for InvalidProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid progres '{}', expected one of belum_baca, sedang_baca, sudah_baca",
            self.0
        )
    }
}

impl std::error::Error for InvalidProgress {}

impl FromStr for Progress {
    type Err = InvalidProgress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "belum_baca" => Ok(Progress::BelumBaca),
            "sedang_baca" => Ok(Progress::SedangBaca),
            "sudah_baca" => Ok(Progress::SudahBaca),
            other => Err(InvalidProgress(other.to_string())),
        }
    }
}

/// A book record stored in redb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    // System fields
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub title: String,
    pub description: String,
    pub author: String,
    pub progress: Progress,
    /// Generated filename in the cover store
    #[serde(default)]
    pub cover_id: Option<String>,

    // Ownership (only populated when the caller was identified)
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl BookRecord {
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner_email.as_deref() == Some(email)
    }
}

/// Fields supplied when creating a book. The id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub author: String,
    pub progress: Progress,
    pub cover_id: Option<String>,
    pub owner_email: Option<String>,
    pub is_public: bool,
}

/// Full overwrite of a book's mutable fields. The cover is immutable after creation.
#[derive(Debug, Clone)]
pub struct BookUpdate {
    pub title: String,
    pub description: String,
    pub author: String,
    pub progress: Progress,
    /// `None` keeps the current visibility
    pub is_public: Option<bool>,
}
