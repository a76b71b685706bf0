//! Per-project health badges and member management views.

use std::collections::HashMap;
use std::sync::Arc;

use bugdesk_client::ApiClient;
use bugdesk_core::{Bug, BugFilter, BugHealth, Project, StatsSnapshot, User, available_users};
use serde::Serialize;

use crate::error::ServiceError;
use crate::status_board::StatusBoard;

/// One row of the projects page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    pub project: Project,
    pub health: BugHealth,
    pub tally: StatsSnapshot,
}

/// Everything the project detail view shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project: Project,
    pub bugs: Vec<Bug>,
    pub health: BugHealth,
    pub tally: StatsSnapshot,
    /// Users who are not members yet.
    pub available_users: Vec<User>,
}

pub struct ProjectOverviewService {
    client: Arc<ApiClient>,
}

impl ProjectOverviewService {
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Lists projects with the health of their bugs.
    pub async fn overview(&self) -> Result<Vec<ProjectOverview>, ServiceError> {
        let filter = BugFilter::default();
        let (projects, bugs) = tokio::try_join!(self.client.list_projects(), self.client.list_bugs(&filter))?;
        Ok(summarize(projects, &bugs))
    }

    /// Groups every bug and project by status.
    pub async fn status_board(&self) -> Result<StatusBoard, ServiceError> {
        let filter = BugFilter::default();
        let (projects, bugs) = tokio::try_join!(self.client.list_projects(), self.client.list_bugs(&filter))?;
        Ok(StatusBoard::build(&projects, &bugs))
    }

    /// Loads one project with its bugs and the users that could join it.
    pub async fn detail(&self, project_id: &str) -> Result<ProjectDetail, ServiceError> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(ServiceError::InvalidInput("project id is required".to_owned()));
        }
        let filter = BugFilter { project_id: Some(project_id.to_owned()), ..BugFilter::default() };
        let (project, bugs, users) = tokio::try_join!(
            self.client.get_project(project_id),
            self.client.list_bugs(&filter),
            self.client.list_users(),
        )?;

        // the backend may ignore the filter; keep only this project's bugs
        let bugs: Vec<Bug> = bugs.into_iter().filter(|b| b.project_ref().is_none_or(|id| id == project.id())).collect();
        let available = available_users(&users, &project).into_iter().cloned().collect();

        Ok(ProjectDetail {
            health: BugHealth::assess(&bugs),
            tally: StatsSnapshot::from_bugs(&bugs, 1),
            project,
            bugs,
            available_users: available,
        })
    }
}

/// Groups bugs by the project they reference and rates each project.
#[must_use]
pub fn summarize(projects: Vec<Project>, bugs: &[Bug]) -> Vec<ProjectOverview> {
    let mut by_project: HashMap<&str, Vec<&Bug>> = HashMap::new();
    for bug in bugs {
        match bug.project_ref() {
            Some(id) => by_project.entry(id).or_default().push(bug),
            None => tracing::debug!(bug = bug.id(), "bug has no project reference"),
        }
    }

    projects
        .into_iter()
        .map(|project| {
            let project_bugs = by_project.get(project.id()).map(Vec::as_slice).unwrap_or_default();
            ProjectOverview {
                health: BugHealth::assess(project_bugs.iter().copied()),
                tally: StatsSnapshot::from_bugs(project_bugs.iter().copied(), 1),
                project,
            }
        })
        .collect()
}
