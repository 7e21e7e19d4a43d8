mod filter;
pub mod models;
mod store;

pub use filter::{Job, JobFilter, StatusFilter};
pub use models::{JobMeta, JobMetaMap, JobMetaPatch, DEFAULT_STATUS};
pub use store::JobStore;
