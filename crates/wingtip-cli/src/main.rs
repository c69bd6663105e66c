use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "wingtip")]
#[command(about = "Offset resolution and feature automation toolkit")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "WINGTIP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available offset sources
    Sources,
    /// Fetch offsets from the configured source and resolve them
    Fetch {
        /// Print the resolved map as JSON
        #[arg(long)]
        json: bool,
        /// Write the resolved map to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve three local documents without touching the config
    Resolve {
        #[arg(long)]
        offsets: PathBuf,
        #[arg(long)]
        client: PathBuf,
        #[arg(long)]
        buttons: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Look up one field through a class's parent chain
    Field {
        /// Class dump document (client_dll.json)
        #[arg(long)]
        client: PathBuf,
        class: String,
        field: String,
    },
    /// Refresh offsets periodically until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
    /// List bindable key names
    Keys,
    /// Run bunnyhop on live input with memory writes only logged
    Simulate,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let directive = if args.verbose {
        "wingtip=debug"
    } else {
        "wingtip=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    match args.command {
        Command::Sources => commands::sources::run(),
        Command::Fetch { json, output } => {
            commands::fetch::run(args.config.as_deref(), json, output.as_deref())
        }
        Command::Resolve {
            offsets,
            client,
            buttons,
            json,
        } => commands::resolve::run(&offsets, &client, &buttons, json),
        Command::Field {
            client,
            class,
            field,
        } => commands::field::run(&client, &class, &field),
        Command::Watch { interval } => commands::watch::run(args.config.as_deref(), interval),
        Command::Keys => commands::keys::run(),
        Command::Simulate => commands::simulate::run(args.config.as_deref()),
    }
}
