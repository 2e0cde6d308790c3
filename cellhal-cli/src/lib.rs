pub mod commands;
pub mod config;
pub mod file_lock;
pub mod logging;
pub mod state;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::commands::{Command, Output};
use crate::file_lock::acquire_agent_lock;

#[derive(Parser, Debug)]
#[command(name = "cellhal")]
#[command(about = "Query and control a cellular modem")]
#[command(disable_version_flag = true)]
#[command(version)]
struct Args {
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    /// Configuration file [default: $XDG_CONFIG_HOME/cellhal/modem.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Saved modem state [default: $XDG_DATA_HOME/cellhal/state.toml]
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output; repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.version {
        println!("cellhal {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    logging::init(args.verbose)?;
    let config = config::load(args.config.as_deref())?;
    let output = if args.json { Output::Json } else { Output::Text };
    let command = args.command.unwrap_or(Command::Status);

    if let Command::Config = command {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let _lock = match acquire_agent_lock() {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let state_path = args.state.unwrap_or_else(state::default_state_path);
    runtime.block_on(async {
        let saved = state::load(&state_path)?;
        let modem = commands::open_modem(&config, saved.as_ref()).await?;
        let result = match command {
            Command::Shell => commands::shell(&modem, output, Some(&state_path)).await,
            command => commands::execute(&modem, command, output).await,
        };
        // saved even after a failure; earlier steps may have changed the modem
        result.and(state::persist(&modem, &state_path).await)
    })
}
