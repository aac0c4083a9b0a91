use clap::Parser;
use std::time::Duration;

use crate::controller::context::ServiceSettings;
use crate::controller::nba::{DEFAULT_STATS_BASE_URL, RetryPolicy};
use crate::model::{DEFAULT_FIRST_SEASON, DEFAULT_SEASON_START_MONTH};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,
    #[arg(long, value_name = "ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,
    /// Base url of the upstream stats api.
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_STATS_BASE_URL,
        value_parser = crate::args::validation::check_url
    )]
    pub stats_base_url: String,
    /// Proxy every upstream call goes through.
    #[arg(
        long,
        env = "NBA_STATS_PROXY",
        value_name = "URL",
        value_parser = crate::args::validation::check_url
    )]
    pub proxy: Option<String>,
    /// Per-call upstream timeout.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..=600)
    )]
    pub timeout_secs: u64,
    /// Attempts per upstream call, including the first.
    #[arg(
        long,
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..=10)
    )]
    pub retries: u32,
    /// Backoff unit; the wait after failed attempt n is n times this.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        default_value = "500",
        value_parser = clap::value_parser!(u64).range(0..=60_000)
    )]
    pub backoff_ms: u64,
    /// How long a team game log stays fresh, at most a week.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value = "1800",
        value_parser = clap::value_parser!(i64).range(0..=604_800)
    )]
    pub cache_ttl_secs: i64,
    /// Month (1-12) on or after which a new season is the current one.
    #[arg(
        long,
        default_value_t = DEFAULT_SEASON_START_MONTH,
        value_parser = crate::args::validation::check_month
    )]
    pub season_start_month: u32,
    /// Oldest season start year offered.
    #[arg(long, value_name = "YEAR", default_value_t = DEFAULT_FIRST_SEASON)]
    pub first_season: i32,
}

#[derive(Debug, Clone)]
pub struct CleanArgs {
    pub port: u16,
    pub bind: String,
    pub stats_base_url: String,
    pub proxy: Option<String>,
    pub settings: ServiceSettings,
}

impl From<Args> for CleanArgs {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            bind: args.bind,
            stats_base_url: args.stats_base_url,
            proxy: args.proxy,
            settings: ServiceSettings {
                retry: RetryPolicy::new(args.retries, Duration::from_millis(args.backoff_ms)),
                timeout: Duration::from_secs(args.timeout_secs),
                cache_ttl: chrono::Duration::seconds(args.cache_ttl_secs.max(0)),
                season_start_month: args.season_start_month,
                first_season: args.first_season,
            },
        }
    }
}
