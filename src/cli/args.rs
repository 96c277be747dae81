use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airq-explorer")]
#[command(about = "Explorer for multi-station air quality time series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

/// Data directory and filter selection, shared by every subcommand
#[derive(Args, Clone)]
pub struct SelectionArgs {
    #[arg(short, long, help = "Directory of per-station CSV files")]
    pub data_dir: PathBuf,

    #[arg(
        short,
        long = "station",
        help = "Station to include (repeatable) [default: all discovered stations]"
    )]
    pub stations: Vec<String>,

    #[arg(long, help = "First year of the inclusive range [default: observed minimum]")]
    pub year_from: Option<i32>,

    #[arg(long, help = "Last year of the inclusive range [default: observed maximum]")]
    pub year_to: Option<i32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Key metrics, correlation matrix, monthly trend and seasonal pattern
    Report {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },

    /// Weather-vs-PM2.5 scatter samples (temperature, wind, rain)
    Weather {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Run k-means clustering over the current selection
    Cluster {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}
