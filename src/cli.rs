use clap::{Parser, Subcommand};

/// Stamp — access-request and approval workflow core
#[derive(Parser)]
#[command(name = "stampd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the stamp server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Inspect and decide approval requests
    Approval {
        #[command(subcommand)]
        command: ApprovalCommands,
    },

    /// Inspect approver groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
}

#[derive(Subcommand)]
pub enum ApprovalCommands {
    /// List approval requests for a user
    List {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Only show requests in this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Approve a pending request
    Approve {
        request_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Reject a pending request
    Reject {
        request_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Revoke an approved request
    Revoke {
        request_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// List approver groups
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List members of a group
    Members {
        group_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}
