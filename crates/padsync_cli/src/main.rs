//! padsync CLI
//!
//! Command-line tools for inspecting local mirrors and exercising the sync
//! engine against the reference server.
//!
//! # Commands
//!
//! - `inspect` - Display the records held in a mirror directory
//! - `go-local` - Register a user in a mirror directory
//! - `forget` - Drop a user's mirrored record
//! - `parse-response` - Interpret a raw server response
//! - `simulate` - Run an editing session against an in-process server

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// padsync command-line tools.
#[derive(Parser)]
#[command(name = "padsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the local mirror directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Who the command acts for.
#[derive(Args)]
struct IdentityArgs {
    /// User id
    #[arg(short, long)]
    user: Option<String>,

    /// Raw Cookie header carrying the session cookie
    #[arg(long, conflicts_with = "user")]
    cookie: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the records held in a mirror directory
    Inspect {
        /// Only show this user
        #[arg(short, long)]
        user: Option<String>,

        /// Include record content
        #[arg(short, long)]
        content: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Register a user in a mirror directory
    GoLocal {
        #[command(flatten)]
        who: IdentityArgs,

        /// Initial version of the mirrored record
        #[arg(long, default_value = "0")]
        version: u64,

        /// Initial content of the mirrored record
        #[arg(long, default_value = "")]
        content: String,
    },

    /// Drop a user's mirrored record
    Forget {
        #[command(flatten)]
        who: IdentityArgs,
    },

    /// Interpret a raw server response
    ParseResponse {
        /// HTTP status (omit for a request that never reached the server)
        #[arg(short, long)]
        status: Option<u16>,

        /// HTTP status text
        #[arg(long, default_value = "OK")]
        status_text: String,

        /// Response body, or `-` to read it from stdin
        body: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run an editing session against an in-process server
    Simulate {
        #[command(flatten)]
        who: IdentityArgs,

        /// Version of the server document before the session
        #[arg(long, default_value = "1")]
        seed_version: u64,

        /// Content of the server document before the session
        #[arg(long, default_value = "")]
        seed_content: String,

        /// Take the server offline before this edit (0-based)
        #[arg(long)]
        offline_from: Option<usize>,

        /// Keep local edits when they conflict with the server
        #[arg(long)]
        client_wins: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Edits to sync, in order
        edits: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect {
            user,
            content,
            format,
        } => {
            let path = cli.path.ok_or("Mirror path required for inspect")?;
            commands::inspect::run(&path, user.as_deref(), content, &format)?;
        }
        Commands::GoLocal {
            who,
            version,
            content,
        } => {
            let path = cli.path.ok_or("Mirror path required for go-local")?;
            let identity = commands::resolve_identity(who.user, who.cookie)?;
            commands::mirror::go_local(&path, &identity, version, &content)?;
        }
        Commands::Forget { who } => {
            let path = cli.path.ok_or("Mirror path required for forget")?;
            let identity = commands::resolve_identity(who.user, who.cookie)?;
            commands::mirror::forget(&path, &identity)?;
        }
        Commands::ParseResponse {
            status,
            status_text,
            body,
            format,
        } => {
            commands::parse_response::run(status, &status_text, &body, &format)?;
        }
        Commands::Simulate {
            who,
            seed_version,
            seed_content,
            offline_from,
            client_wins,
            format,
            edits,
        } => {
            let identity = commands::resolve_identity(who.user, who.cookie)?;
            let options = commands::simulate::SimulateOptions {
                identity,
                seed_version,
                seed_content,
                edits,
                offline_from,
                client_wins,
                mirror: cli.path,
            };
            commands::simulate::run(options, &format)?;
        }
        Commands::Version => {
            println!("padsync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
