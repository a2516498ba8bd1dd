pub mod projects;
pub mod shell;

use clap::Subcommand;
use devdeck_core::project::{DEFAULT_SSH_PORT, DEFAULT_SSH_USER};

/// Verbs shared by the one-shot CLI and the shell.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProjectCommand {
    /// List local and remote projects
    List,
    /// Register a local project
    AddLocal {
        /// Project root directory
        path: String,
    },
    /// Register a remote project
    AddRemote {
        host: String,
        #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
        port: u16,
        #[arg(long, default_value = DEFAULT_SSH_USER)]
        user: String,
        #[arg(long)]
        password: String,
    },
    /// Remove a remote project
    RemoveRemote { id: String },
    /// Remove a local project
    RemoveLocal { id: String },
    /// Open a project, connecting first if it is remote
    Open { id: String },
}
