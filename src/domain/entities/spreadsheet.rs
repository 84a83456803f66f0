use crate::domain::errors::DomainError;
use serde::{Deserialize, Serialize};

/// How a client import treats codes that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Existing codes are skipped.
    #[default]
    Add,
    /// Existing codes are updated in place.
    Replace,
}

impl std::str::FromStr for ImportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "add" => Ok(ImportMode::Add),
            "replace" => Ok(ImportMode::Replace),
            other => Err(DomainError::ValidationError(format!(
                "Invalid import mode '{}', expected 'add' or 'replace'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: i64,
    pub updated: i64,
    pub skipped: i64,
    pub total: i64,
    pub errors: Vec<String>,
    pub mode: ImportMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub stats: ImportStats,
}
