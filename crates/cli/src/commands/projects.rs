use std::str::FromStr;

use anyhow::{Result, bail};
use bugdesk_core::{NewProject, ProjectStatus, ProjectUpdate};
use bugdesk_service::ProjectOverviewService;
use clap::Subcommand;

use super::{App, print_json};

#[derive(Subcommand)]
pub(crate) enum ProjectCommands {
    /// List projects
    List,
    /// Show a project with its bugs and the users who can join it
    Show { id: String },
    /// Create a project
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change name, description or status
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// active, on-hold, completed or archived
        #[arg(short, long, value_parser = ProjectStatus::from_str)]
        status: Option<ProjectStatus>,
    },
    /// Change only the status
    Status {
        id: String,
        #[arg(value_parser = ProjectStatus::from_str)]
        status: ProjectStatus,
    },
    /// Delete a project
    Delete { id: String },
    /// Add a user to a project
    AddMember { id: String, user_id: String },
    /// Remove a member from a project
    RemoveMember { id: String, member_id: String },
    /// Health badge and bug counts for every project
    Overview,
    /// Bugs and projects grouped by status
    Board {
        /// Only list projects with this status
        #[arg(short, long, value_parser = ProjectStatus::from_str)]
        status: Option<ProjectStatus>,
    },
}

pub(crate) async fn run(app: &App, command: ProjectCommands) -> Result<()> {
    let service = ProjectOverviewService::new(std::sync::Arc::clone(&app.client));
    match command {
        ProjectCommands::List => print_json(&app.client.list_projects().await?),
        ProjectCommands::Show { id } => print_json(&service.detail(&id).await?),
        ProjectCommands::Create { name, description } => {
            let created = app.client.create_project(&NewProject { name, description }).await?;
            print_or(created.as_ref(), "Project created")
        },
        ProjectCommands::Update { id, name, description, status } => {
            let update = ProjectUpdate { name, description, status };
            if update.is_empty() {
                bail!("nothing to update, pass --name, --description or --status");
            }
            let updated = app.client.update_project(&id, &update).await?;
            print_or(updated.as_ref(), "Project updated")
        },
        ProjectCommands::Status { id, status } => {
            let updated = app.client.update_project_status(&id, &status).await?;
            print_or(updated.as_ref(), "Project status updated")
        },
        ProjectCommands::Delete { id } => {
            app.client.delete_project(&id).await?;
            println!("Deleted project {id}");
            Ok(())
        },
        ProjectCommands::AddMember { id, user_id } => {
            let updated = app.client.add_member(&id, &user_id).await?;
            print_or(updated.as_ref(), "Member added")
        },
        ProjectCommands::RemoveMember { id, member_id } => {
            let updated = app.client.remove_member(&id, &member_id).await?;
            print_or(updated.as_ref(), "Member removed")
        },
        ProjectCommands::Overview => print_json(&service.overview().await?),
        ProjectCommands::Board { status } => {
            let mut board = service.status_board().await?;
            if let Some(status) = status {
                board.projects.retain(|row| row.status == status);
            }
            print_json(&board)
        },
    }
}

pub(crate) async fn run_users(app: &App) -> Result<()> {
    print_json(&app.client.list_users().await?)
}

fn print_or<T: serde::Serialize>(value: Option<&T>, fallback: &str) -> Result<()> {
    match value {
        Some(v) => print_json(v),
        None => {
            println!("{fallback}");
            Ok(())
        },
    }
}
