use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaseStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Closed => "Closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Processing" => Some(Self::Processing),
            "Completed" => Some(Self::Completed),
            "Closed" => Some(Self::Closed),
            _ => None,
        }
    }

    // Unrecognized stored values render as Pending instead of failing.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CaseStatus),
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        if value == "All" {
            return Some(Self::All);
        }
        CaseStatus::parse(value).map(Self::Only)
    }

    pub fn matches(self, status: CaseStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status == wanted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: CaseStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraft {
    pub title: String,
    pub description: String,
    pub status: CaseStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub remark: Option<String>,
}

impl CaseDraft {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Case title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation(
                "Case description is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&CaseRecord> for CaseDraft {
    fn from(record: &CaseRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            status: record.status,
            start_date: record.start_date,
            end_date: record.end_date,
            remark: record.remark.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
}
