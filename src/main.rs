use betbook::args::{AddSubcommand, Args, Command, UpdateSubcommand};
use betbook::commands::{self, OutputFormat};
use betbook::model::{Collection, MatchNote, NormalNote, Profit};
use betbook::{Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();
    let table = OutputFormat::Table;

    // Route to appropriate command handler
    match args.command() {
        Command::Init => commands::init(home).await?.print(table),

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            match add_args.entity() {
                AddSubcommand::Profit(args) => {
                    commands::add_profit(config, args).await?.print(table)
                }
                AddSubcommand::Match(args) => commands::add_match(config, args).await?.print(table),
                AddSubcommand::Note(args) => commands::add_note(config, args).await?.print(table),
            }
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            match update_args.entity() {
                UpdateSubcommand::Profit(args) => {
                    commands::update_profit(config, args).await?.print(table)
                }
                UpdateSubcommand::Match(args) => {
                    commands::update_match(config, args).await?.print(table)
                }
                UpdateSubcommand::Note(args) => {
                    commands::update_note(config, args).await?.print(table)
                }
            }
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, delete_args).await?.print(table)
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            let limit = list_args.limit();
            let format = list_args.format();
            match list_args.collection() {
                Collection::Profit => commands::list::<Profit>(config, limit)
                    .await?
                    .print(format),
                Collection::MatchNotes => commands::list::<MatchNote>(config, limit)
                    .await?
                    .print(format),
                Collection::NormalNotes => commands::list::<NormalNote>(config, limit)
                    .await?
                    .print(format),
            }
        }

        Command::History(history_args) => {
            let config = Config::load(home).await?;
            commands::history(config, history_args.month())
                .await?
                .print(history_args.format())
        }

        Command::Backup => commands::backup(Config::load(home).await?)
            .await?
            .print(table),

        Command::Restore(restore_args) => {
            let config = Config::load(home).await?;
            commands::restore(config, restore_args.file())
                .await?
                .print(table)
        }
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
