//! Core types for bugdesk
//!
//! Resource projections, envelope normalization, status tallies and form
//! validation shared by the client, service and CLI crates.

pub mod bug;
pub mod constants;
pub mod env_config;
mod error;
pub mod identity;
pub mod normalize;
pub mod project;
pub mod relation;
pub mod stats;
pub mod validation;

pub use bug::{Bug, BugFilter, BugStatus, NewBug, Priority};
pub use env_config::{env_non_empty, env_parse_with_default};
pub use error::*;
pub use identity::{Identity, Role};
pub use normalize::{NormalizePolicy, Normalizer, ResourceKind};
pub use project::{NewProject, Project, ProjectStatus, ProjectUpdate, User, available_users};
pub use relation::{RelatedRecord, Relation};
pub use stats::{BugHealth, StatsSnapshot};
pub use validation::{FieldError, LoginInput, RegisterInput, ValidationErrors};
