//! attrgraph - command-line front end for the typed-attribute multigraph store.

use attrgraph::cli;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attrgraph", version, about = "Typed-attribute directed multigraph store")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty store file
    Init {
        #[arg(long)]
        db: PathBuf,
        /// Attribute declaration as name:type (boolean, integer, float, string)
        #[arg(long = "key")]
        keys: Vec<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Add a node and print its uid
    AddNode {
        #[arg(long)]
        db: PathBuf,
        /// Preferred uid; a node-<n> uid is minted when absent or taken
        #[arg(long)]
        uid: Option<String>,
        /// Attribute as name=value
        #[arg(long = "attr")]
        attrs: Vec<String>,
    },
    /// Merge attributes into an existing node
    ModifyNode {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        uid: String,
        #[arg(long = "attr")]
        attrs: Vec<String>,
    },
    /// Delete a node and every edge touching it
    DelNode {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        uid: String,
    },
    /// Add a typed edge
    AddEdge {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long = "type")]
        edge_type: String,
    },
    /// Delete a typed edge
    DelEdge {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long = "type")]
        edge_type: String,
    },
    /// List successors, or predecessors with --reverse
    Neighbors {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        uid: String,
        /// Restrict to one edge type
        #[arg(long = "type")]
        edge_type: Option<String>,
        #[arg(long)]
        reverse: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show store statistics
    Status {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Write the store as json or graphml
    Export {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Build a store from a json or graphml document
    Import {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "json")]
        format: String,
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Init { db, keys, force } => cli::cmd_init(&db, &keys, force),
        Commands::AddNode { db, uid, attrs } => cli::cmd_add_node(&db, uid.as_deref(), &attrs),
        Commands::ModifyNode { db, uid, attrs } => cli::cmd_modify_node(&db, &uid, &attrs),
        Commands::DelNode { db, uid } => cli::cmd_del_node(&db, &uid),
        Commands::AddEdge {
            db,
            source,
            target,
            edge_type,
        } => cli::cmd_add_edge(&db, &source, &target, &edge_type),
        Commands::DelEdge {
            db,
            source,
            target,
            edge_type,
        } => cli::cmd_del_edge(&db, &source, &target, &edge_type),
        Commands::Neighbors {
            db,
            uid,
            edge_type,
            reverse,
            json,
        } => cli::cmd_neighbors(&db, &uid, edge_type.as_deref(), reverse, json),
        Commands::Status { db, json } => cli::cmd_status(&db, json),
        Commands::Export { db, out, format } => cli::cmd_export(&db, &out, &format),
        Commands::Import {
            input,
            format,
            db,
            force,
        } => cli::cmd_import(&input, &format, &db, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
