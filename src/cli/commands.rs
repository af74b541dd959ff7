use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scrapefeed")]
#[command(about = "Generate RSS feeds from blogs and changelogs that do not publish one")]
#[command(version)]
pub struct Cli {
    /// Directory holding the feed_<name>.xml files (overrides SCRAPEFEED_FEEDS_DIR)
    #[arg(long, global = true)]
    pub feeds_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate or update one feed
    Run {
        /// Feed name, see `scrapefeed list`
        feed: String,

        /// Read the listing page from a local HTML file instead of fetching it
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Generate or update every registered feed
    All {
        /// Read each listing page from <DIR>/<feed>.html instead of fetching it
        #[arg(long, value_name = "DIR")]
        pages_dir: Option<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// List registered feeds and their output files
    List,
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Republish the stored feed when the page yields no articles
    #[arg(long)]
    pub allow_empty: bool,

    /// Replace stored entries with the freshly extracted copy
    #[arg(long)]
    pub prefer_latest: bool,

    /// Print run reports as JSON
    #[arg(long)]
    pub json: bool,
}
