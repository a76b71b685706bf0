//! Service layer for bugdesk
//!
//! Builds the dashboard and project views on top of the API client.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::let_underscore_must_use, reason = "Intentionally ignoring results")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

pub mod error;
mod overview_service;
mod stats_service;
mod status_board;


pub use error::ServiceError;
pub use overview_service::{ProjectDetail, ProjectOverview, ProjectOverviewService, summarize};
pub use status_board::{ProjectStatusRow, StatusBoard, StatusCount};
pub use stats_service::{PollHandle, RefreshOutcome, StatsAggregator, StatsView, poll_period};
