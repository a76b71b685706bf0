//! Aggregate bug counts and per-project health.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bug::{Bug, BugStatus};

/// Point-in-time counts derived from the bug and project collections.
///
/// `total` counts every bug, including ones whose status is unknown, so it
/// may exceed the sum of the per-status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub closed: u64,
    pub resolved: u64,
    pub project_count: u64,
}

impl StatsSnapshot {
    /// Single pass over status tokens, compared case-sensitively.
    pub fn from_statuses<'a, I>(statuses: I, project_count: usize) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut snapshot = Self { project_count: project_count as u64, ..Self::default() };
        for status in statuses {
            snapshot.total += 1;
            match status {
                Some("OPEN") => snapshot.open += 1,
                Some("IN_PROGRESS") => snapshot.in_progress += 1,
                Some("CLOSED") => snapshot.closed += 1,
                Some("RESOLVED") => snapshot.resolved += 1,
                _ => {},
            }
        }
        snapshot
    }

    /// Tally over raw, already-normalized bug elements.
    #[must_use]
    pub fn from_raw(bugs: &[Value], project_count: usize) -> Self {
        Self::from_statuses(bugs.iter().map(|b| b.get("status").and_then(Value::as_str)), project_count)
    }

    /// Tally over decoded bugs.
    #[must_use]
    pub fn from_bugs<'a, I>(bugs: I, project_count: usize) -> Self
    where
        I: IntoIterator<Item = &'a Bug>,
    {
        Self::from_statuses(
            bugs.into_iter().map(|b| b.status.as_ref().map(BugStatus::as_str)),
            project_count,
        )
    }
}

/// Summary badge for a project's bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BugHealth {
    Empty,
    Open,
    InProgress,
    Completed,
}

impl BugHealth {
    /// Precedence: no bugs → `Empty`; all closed/resolved → `Completed`;
    /// any in progress → `InProgress`; any open → `Open`; else `Empty`.
    #[must_use]
    pub fn assess<'a, I>(bugs: I) -> Self
    where
        I: IntoIterator<Item = &'a Bug>,
    {
        let mut seen = false;
        let mut all_done = true;
        let mut has_open = false;
        let mut has_in_progress = false;
        for bug in bugs {
            seen = true;
            match bug.status {
                Some(BugStatus::Open) => has_open = true,
                Some(BugStatus::InProgress) => has_in_progress = true,
                _ => {},
            }
            if !bug.status.as_ref().is_some_and(BugStatus::is_done) {
                all_done = false;
            }
        }
        if !seen {
            Self::Empty
        } else if all_done {
            Self::Completed
        } else if has_in_progress {
            Self::InProgress
        } else if has_open {
            Self::Open
        } else {
            Self::Empty
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Empty => "EMPTY",
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

impl Display for BugHealth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
