use std::path::PathBuf;

use clap::{ArgAction, Parser};

use super::config::LogTarget;

/// Price a fitting import by streaming it through the calculator service.
#[derive(Debug, Parser)]
#[command(name = "fitcalc", version)]
pub struct Cli {
    /// File holding the fitting text. Reads stdin when omitted or `-`.
    #[arg(short, long)]
    pub fitting: Option<PathBuf>,

    /// Price the hull along with the fitted modules.
    #[arg(long)]
    pub include_hull: bool,

    /// Calculator service base URL, e.g. `http://127.0.0.1:5002`.
    #[arg(long)]
    pub base_url: Option<String>,

    /// RON config file. Defaults to `./fitcalc.ron` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,

    /// More log detail (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
