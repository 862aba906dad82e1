#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod services;
pub mod state;
mod storage;
pub mod types;

use clap::Parser;
use cli::{Cli, Command, SettingsArgs, ShowArgs};
use commands::balance::{CommandState, ShowBalance};
use commands::settings::{apply_settings, describe_settings, SettingsUpdate};
use host::terminal::{HtmlFilePanel, SpinnerProgress, TerminalNotifier};
use services::cursor_api::CursorApi;
use state::AppState;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open_state(config_dir: Option<std::path::PathBuf>) -> anyhow::Result<AppState> {
    config_dir.map_or_else(AppState::new, AppState::with_dir)
}

async fn show_balance(state: &AppState, args: ShowArgs) -> ExitCode {
    let client = args
        .base_url
        .map_or_else(CursorApi::default, CursorApi::new);
    let progress = SpinnerProgress::default();
    let notifier = TerminalNotifier::new(state.config_path());
    let panels = HtmlFilePanel::new(state.panels_dir(), !args.no_open);

    let command = ShowBalance {
        config: state,
        client: &client,
        progress: &progress,
        notifier: &notifier,
        panels: &panels,
    };
    match command.run().await {
        CommandState::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn settings(state: &mut AppState, args: SettingsArgs) -> anyhow::Result<()> {
    let update = SettingsUpdate {
        token: args.token,
        clear_token: args.clear_token,
        language: args.language,
    };
    apply_settings(state, update)?;
    println!("{}", describe_settings(state));
    Ok(())
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut state = open_state(cli.config_dir)?;
    match cli.command {
        None => Ok(show_balance(&state, ShowArgs::default()).await),
        Some(Command::Show(args)) => Ok(show_balance(&state, args).await),
        Some(Command::Settings(args)) => {
            settings(&mut state, args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Entry point of the `cursor-balance` binary.
#[must_use]
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(dispatch(cli)));

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
