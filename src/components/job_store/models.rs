use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Status shown for jobs nobody has touched yet
pub const DEFAULT_STATUS: &str = "Scheduled";

/// User-entered annotation for one calendar event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobMeta {
    pub status: String,
    pub tech: String,
}

impl Default for JobMeta {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
            tech: String::new(),
        }
    }
}

impl JobMeta {
    /// Overwrite only the fields set in `patch`
    pub fn merge(&mut self, patch: JobMetaPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tech) = patch.tech {
            self.tech = tech;
        }
    }
}

/// Stored shapes: the current object form, or a bare status string from older data
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMeta {
    Record {
        #[serde(default = "default_status")]
        status: String,
        #[serde(default)]
        tech: String,
    },
    Status(String),
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl<'de> Deserialize<'de> for JobMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StoredMeta::deserialize(deserializer)? {
            StoredMeta::Record { status, tech } => JobMeta { status, tech },
            StoredMeta::Status(status) if status.is_empty() => JobMeta::default(),
            StoredMeta::Status(status) => JobMeta {
                status,
                tech: String::new(),
            },
        })
    }
}

/// Partial update; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMetaPatch {
    pub status: Option<String>,
    pub tech: Option<String>,
}

impl JobMetaPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            tech: None,
        }
    }

    pub fn tech(tech: impl Into<String>) -> Self {
        Self {
            status: None,
            tech: Some(tech.into()),
        }
    }
}

/// Every annotation, keyed by event id
pub type JobMetaMap = BTreeMap<String, JobMeta>;
