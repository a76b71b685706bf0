//! Bugs and projects grouped by status.

use bugdesk_core::{Bug, BugStatus, Project, ProjectStatus};
use serde::Serialize;

const BUG_STATUSES: [BugStatus; 4] = [BugStatus::Open, BugStatus::InProgress, BugStatus::Closed, BugStatus::Resolved];

const PROJECT_STATUSES: [ProjectStatus; 4] =
    [ProjectStatus::Active, ProjectStatus::OnHold, ProjectStatus::Completed, ProjectStatus::Archived];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: u64,
}

/// One project line of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusRow {
    pub project_id: String,
    pub name: String,
    /// `ACTIVE` when the backend sent none.
    pub status: ProjectStatus,
    pub total_bugs: u64,
    pub open_bugs: u64,
}

/// Counts keyed by status. The four known statuses are always listed, in
/// workflow order, followed by any unknown ones in the order first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBoard {
    pub bug_total: u64,
    pub bugs_by_status: Vec<StatusCount<BugStatus>>,
    pub project_total: u64,
    pub projects_by_status: Vec<StatusCount<ProjectStatus>>,
    pub projects: Vec<ProjectStatusRow>,
}

impl StatusBoard {
    #[must_use]
    pub fn build(projects: &[Project], bugs: &[Bug]) -> Self {
        let rows = projects
            .iter()
            .map(|project| {
                let (total_bugs, open_bugs) = bugs
                    .iter()
                    .filter(|b| b.project_ref() == Some(project.id()))
                    .fold((0, 0), |(total, open), b| {
                        (total + 1, open + u64::from(b.board_status() == BugStatus::Open))
                    });
                ProjectStatusRow {
                    project_id: project.id().to_owned(),
                    name: project.name.clone(),
                    status: project.status_or_default(),
                    total_bugs,
                    open_bugs,
                }
            })
            .collect();

        Self {
            bug_total: bugs.len() as u64,
            bugs_by_status: count_by(BUG_STATUSES, bugs.iter().map(Bug::board_status)),
            project_total: projects.len() as u64,
            projects_by_status: count_by(PROJECT_STATUSES, projects.iter().map(Project::status_or_default)),
            projects: rows,
        }
    }
}

fn count_by<S: PartialEq>(known: [S; 4], statuses: impl IntoIterator<Item = S>) -> Vec<StatusCount<S>> {
    let mut counts: Vec<StatusCount<S>> = known.into_iter().map(|status| StatusCount { status, count: 0 }).collect();
    for status in statuses {
        match counts.iter_mut().find(|c| c.status == status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount { status, count: 1 }),
        }
    }
    counts
}
