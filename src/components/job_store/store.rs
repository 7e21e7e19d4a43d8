use super::models::{JobMeta, JobMetaMap, JobMetaPatch};
use crate::components::storage::{keys, KeyValueStore};
use crate::error::JobResult;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Local annotations for calendar events, persisted as one JSON blob
#[derive(Clone)]
pub struct JobStore {
    storage: Arc<dyn KeyValueStore>,
}

impl JobStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The whole mapping. Unreadable content counts as empty.
    pub async fn load(&self) -> JobResult<JobMetaMap> {
        let Some(raw) = self.storage.get(keys::JOB_META).await? else {
            return Ok(JobMetaMap::new());
        };
        Ok(parse_blob(&raw))
    }

    /// Replace the whole mapping
    pub async fn save(&self, map: &JobMetaMap) -> JobResult<()> {
        let json = serde_json::to_string(map)?;
        self.storage.set(keys::JOB_META, json).await
    }

    /// Annotation for `event_id`, or the default when there is none
    pub async fn get(&self, event_id: &str) -> JobResult<JobMeta> {
        let mut map = self.load().await?;
        Ok(map.remove(event_id).unwrap_or_default())
    }

    /// Merge `patch` into the stored (or default) annotation and persist the mapping
    pub async fn update(&self, event_id: &str, patch: JobMetaPatch) -> JobResult<JobMeta> {
        let mut map = self.load().await?;
        let meta = map.entry(event_id.to_string()).or_default();
        meta.merge(patch);
        let updated = meta.clone();

        self.save(&map).await?;
        debug!(event_id, status = %updated.status, tech = %updated.tech, "Job updated");
        Ok(updated)
    }
}

/// Parse a stored blob, dropping anything that is not a recognizable annotation
fn parse_blob(raw: &str) -> JobMetaMap {
    let entries: Map<String, Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Stored job annotations are malformed, starting empty: {}", e);
            return JobMetaMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<JobMeta>(value) {
            Ok(meta) => Some((id, meta)),
            Err(e) => {
                warn!("Skipping unreadable annotation for {}: {}", id, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blob_not_an_object() {
        assert!(parse_blob("[1, 2]").is_empty());
        assert!(parse_blob("{oops").is_empty());
        assert!(parse_blob("").is_empty());
    }

    #[test]
    fn test_parse_blob_skips_bad_entries() {
        let map = parse_blob(r#"{"good": {"status": "Completed", "tech": "Ana"}, "bad": 42}"#);
        assert_eq!(map.len(), 1);
        assert_eq!(map["good"].tech, "Ana");
    }
}
