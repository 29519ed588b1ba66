pub mod commands;

use clap::Parser;

use crate::fetcher::FetchBudget;

pub const DEFAULT_LIMIT: u64 = 40;

#[derive(Parser)]
#[command(name = "fedicat", version)]
#[command(about = "Print Mastodon statuses and timelines as plain text", long_about = None)]
pub struct Cli {
    /// Status or profile URL, or a handle like @user@example.social
    pub address: String,

    /// Maximum number of statuses to print
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_LIMIT,
        value_parser = clap::value_parser!(u64).range(1..),
        conflicts_with = "all"
    )]
    pub limit: u64,

    /// Print the whole timeline
    #[arg(long)]
    pub all: bool,

    /// Write to stdout even on a terminal
    #[arg(long)]
    pub no_pager: bool,

    /// Log HTTP requests and responses to stderr
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    pub fn budget(&self) -> FetchBudget {
        if self.all {
            FetchBudget::unbounded()
        } else {
            FetchBudget::limited(self.limit as usize)
        }
    }
}
