use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cursor-balance", version, about = "Show your Cursor usage as an HTML panel")]
pub struct Cli {
    /// Directory holding config.json and rendered panels (default: ~/.cursor-balance)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch current usage and open it in the browser (default)
    Show(ShowArgs),
    /// View or change settings
    Settings(SettingsArgs),
}

#[derive(Debug, Default, Args)]
pub struct ShowArgs {
    /// Write the panel and print its path instead of opening it
    #[arg(long)]
    pub no_open: bool,

    #[arg(long, hide = true, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Session token, in the form <prefix>::<userId>
    #[arg(long, conflicts_with = "clear_token")]
    pub token: Option<String>,

    /// Remove the stored session token
    #[arg(long)]
    pub clear_token: bool,

    /// Panel language: en or zh
    #[arg(long)]
    pub language: Option<String>,
}
