use std::str::FromStr;

use anyhow::Result;
use bugdesk_core::{BugFilter, BugStatus, NewBug, Priority};
use clap::Subcommand;

use super::{App, print_json};

#[derive(Subcommand)]
pub(crate) enum BugCommands {
    /// List bugs, optionally filtered
    List {
        /// open, in-progress, closed or resolved
        #[arg(short, long, value_parser = BugStatus::from_str)]
        status: Option<BugStatus>,
        /// low, medium or high
        #[arg(long, value_parser = Priority::from_str)]
        priority: Option<Priority>,
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Show one bug
    Show { id: String },
    /// Report a new bug (testers only)
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(long, default_value = "MEDIUM", value_parser = Priority::from_str)]
        priority: Priority,
        #[arg(short, long)]
        project: String,
    },
    /// Move a bug to another status
    Status {
        id: String,
        #[arg(value_parser = BugStatus::from_str)]
        status: BugStatus,
    },
    /// Delete a bug
    Delete { id: String },
}

pub(crate) async fn run(app: &App, command: BugCommands) -> Result<()> {
    match command {
        BugCommands::List { status, priority, project } => {
            let bugs = app.client.list_bugs(&BugFilter { status, priority, project_id: project }).await?;
            print_json(&bugs)
        },
        BugCommands::Show { id } => print_json(&app.client.get_bug(&id).await?),
        BugCommands::Create { title, description, priority, project } => {
            let bug = NewBug { title, description, priority, project_id: project };
            match app.client.create_bug(&bug).await? {
                Some(created) => print_json(&created),
                None => {
                    println!("Bug reported");
                    Ok(())
                },
            }
        },
        BugCommands::Status { id, status } => {
            match app.client.update_bug_status(&id, &status).await? {
                Some(updated) => print_json(&updated)?,
                None => println!("Bug {id} is now {status}"),
            }
            Ok(())
        },
        BugCommands::Delete { id } => {
            app.client.delete_bug(&id).await?;
            println!("Deleted bug {id}");
            Ok(())
        },
    }
}
