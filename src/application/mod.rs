//! Application layer: use cases orchestrating domain and ports.

mod assessment;
mod history;

pub use assessment::{score, AssessmentConfig, AssessmentService};
pub use history::HistoryService;
