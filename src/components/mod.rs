// Export components
pub mod google_calendar;
pub mod job_board;
pub mod job_store;
pub mod storage;

pub use google_calendar::{CalendarSession, CalendarSource};
pub use job_board::{BoardState, EmptyState, JobBoard};
pub use job_store::JobStore;
