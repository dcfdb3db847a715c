//! LogStore CLI
//!
//! Command-line tools for rotating log stores.
//!
//! # Commands
//!
//! - `inspect` - Display file size, record counts and rotated archives
//! - `count` - Count records, optionally filtered
//! - `show` - Show one record by id
//! - `list` - List records with filtering and paging
//! - `append` - Write one record
//! - `rotate` - Rotate the active file now
//! - `extract` - Decompress a rotated archive

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line tools for rotating log stores.
#[derive(Parser)]
#[command(name = "logstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the active log file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Rotation threshold in bytes used when writing
    #[arg(global = true, long, default_value_t = 10 * 1024 * 1024)]
    max_size: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display file size, record counts and rotated archives
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Count records
    Count {
        /// Raw SQL clause appended to the query, e.g. "where channel = 1"
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Show one record by id
    Show {
        /// Record id
        id: i64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List records
    List {
        /// Raw SQL clause appended to the query, e.g. "where channel = 1"
        #[arg(long, default_value = "")]
        filter: String,

        /// Only records on this channel (bound, not interpolated)
        #[arg(short, long, conflicts_with = "filter")]
        channel: Option<i32>,

        /// Maximum number of records (0 = unbounded)
        #[arg(short, long, default_value = "50")]
        limit: u32,

        /// Number of matching records to skip
        #[arg(short, long, default_value = "0")]
        offset: u32,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write one record
    Append {
        /// Channel tag
        #[arg(short, long, default_value = "0")]
        channel: i32,

        /// Message text
        message: String,
    },

    /// Rotate the active file now
    Rotate,

    /// Decompress a rotated archive into a readable log file
    Extract {
        /// Archive to decompress
        archive: PathBuf,

        /// Destination log file
        dest: PathBuf,
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
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Log file path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Count { filter } => {
            let path = cli.path.ok_or("Log file path required for count")?;
            commands::query::count(&path, &filter)?;
        }
        Commands::Show { id, format } => {
            let path = cli.path.ok_or("Log file path required for show")?;
            commands::query::show(&path, id, &format)?;
        }
        Commands::List {
            filter,
            channel,
            limit,
            offset,
            format,
        } => {
            let path = cli.path.ok_or("Log file path required for list")?;
            let selection = match channel {
                Some(channel) => commands::query::Selection::Channel(channel),
                None => commands::query::Selection::Raw(filter),
            };
            commands::query::list(&path, &selection, limit, offset, &format)?;
        }
        Commands::Append { channel, message } => {
            let path = cli.path.ok_or("Log file path required for append")?;
            commands::append::run(&path, cli.max_size, channel, &message)?;
        }
        Commands::Rotate => {
            let path = cli.path.ok_or("Log file path required for rotate")?;
            commands::rotate::run(&path, cli.max_size)?;
        }
        Commands::Extract { archive, dest } => {
            commands::rotate::extract(&archive, &dest)?;
        }
        Commands::Version => {
            println!("LogStore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("LogStore Core v{}", logstore_core::VERSION);
        }
    }

    Ok(())
}
