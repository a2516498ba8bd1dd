use anyhow::Result;
use colored::Colorize;
use devdeck_application::{Navigation, ProjectCoordinator};
use devdeck_core::connection::ConnectionSession;
use devdeck_core::project::{ProjectCatalog, ProjectId};

use super::ProjectCommand;

pub async fn run(coordinator: &ProjectCoordinator, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::List => {
            let catalog = coordinator.catalog().list_all().await?;
            for line in render_catalog(&catalog) {
                println!("{}", line);
            }
        }
        ProjectCommand::AddLocal { path } => {
            let id = coordinator.catalog().add_local(path).await?;
            println!("{}", format!("Added local project {}", id).green());
        }
        ProjectCommand::AddRemote {
            host,
            port,
            user,
            password,
        } => {
            let id = coordinator
                .catalog()
                .add_remote(host, port, user, password)
                .await?;
            println!("{}", format!("Added remote project {}", id).green());
        }
        ProjectCommand::RemoveRemote { id } => {
            let id = ProjectId::from(id);
            coordinator.remove_remote(&id).await?;
            println!("{}", format!("Removed remote project {}", id).green());
        }
        ProjectCommand::RemoveLocal { id } => {
            let id = ProjectId::from(id);
            coordinator.catalog().remove_local(&id).await?;
            println!("{}", format!("Removed local project {}", id).green());
        }
        ProjectCommand::Open { id } => {
            let navigation = coordinator.open_project(&ProjectId::from(id)).await?;
            println!("{}", render_navigation(&navigation).green());
        }
    }

    Ok(())
}

/// Prints the backend's current session.
pub async fn active(coordinator: &ProjectCoordinator) -> Result<()> {
    let session = coordinator.tracker().get_active().await?;
    println!("{}", render_active(session.as_ref()));
    Ok(())
}

fn render_catalog(catalog: &ProjectCatalog) -> Vec<String> {
    let mut lines = vec!["Local projects:".bold().to_string()];
    let local = catalog.local_sorted();
    if local.is_empty() {
        lines.push("  (none)".bright_black().to_string());
    }
    for (id, project) in local {
        lines.push(format!("  {}  {}", id, project.path));
    }

    lines.push("Remote projects:".bold().to_string());
    let remote = catalog.remote_sorted();
    if remote.is_empty() {
        lines.push("  (none)".bright_black().to_string());
    }
    for (id, project) in remote {
        lines.push(format!("  {}  {}", id, project.address()));
    }

    lines
}

fn render_navigation(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Local { id, project } => {
            format!("Opening local project {} at {}", id, project.path)
        }
        Navigation::Remote {
            session,
            connected_now: true,
        } => format!(
            "Connected to {}; opening workspace for {}",
            session.project.address(),
            session.id
        ),
        Navigation::Remote {
            session,
            connected_now: false,
        } => format!(
            "Reusing session on {}; opening workspace for {}",
            session.project.address(),
            session.id
        ),
    }
}

fn render_active(session: Option<&ConnectionSession>) -> String {
    match session {
        Some(session) => format!(
            "Connected to {} ({}) since {}",
            session.id,
            session.project.address(),
            session.connected_at
        ),
        None => "No active connection".to_string(),
    }
}
