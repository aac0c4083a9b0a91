use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use crate::controller::nba::{
    Clock, DEFAULT_TIMEOUT, RetryPolicy, StatsApiClient, StatsCall, TEAM_GAME_LOG_TTL,
    TeamGameLogCache, fetch_with_retry,
};
use crate::error::StatsError;
use crate::model::{
    DEFAULT_FIRST_SEASON, DEFAULT_SEASON_START_MONTH, StatsResponse, current_season,
    parse_season_label, seasons_since,
};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub cache_ttl: chrono::Duration,
    pub season_start_month: u32,
    pub first_season: i32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: TEAM_GAME_LOG_TTL,
            season_start_month: DEFAULT_SEASON_START_MONTH,
            first_season: DEFAULT_FIRST_SEASON,
        }
    }
}

/// Everything a request handler needs, shared across actix workers.
#[derive(Clone)]
pub struct StatsContext {
    pub client: Arc<dyn StatsApiClient>,
    pub clock: Arc<dyn Clock>,
    pub cache: Arc<TeamGameLogCache>,
    pub settings: ServiceSettings,
}

impl StatsContext {
    #[must_use]
    pub fn new(
        client: Arc<dyn StatsApiClient>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let cache = TeamGameLogCache::new(
            client.clone(),
            clock.clone(),
            settings.retry,
            settings.cache_ttl,
        );
        Self {
            client,
            clock,
            cache: Arc::new(cache),
            settings,
        }
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    #[must_use]
    pub fn current_season(&self) -> String {
        current_season(self.today(), self.settings.season_start_month)
    }

    #[must_use]
    pub fn available_seasons(&self) -> Vec<String> {
        seasons_since(
            self.settings.first_season,
            self.today(),
            self.settings.season_start_month,
        )
    }

    /// Validates a `season` query value, defaulting to the current season.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the value is not a `YYYY-YY` label
    pub fn resolve_season(&self, raw: Option<&str>) -> Result<String, StatsError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(self.current_season()),
            Some(label) => match parse_season_label(label) {
                Some(_) => Ok(label.to_string()),
                None => Err(StatsError::BadInput(format!(
                    "season '{label}' is not in YYYY-YY form"
                ))),
            },
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if every attempt at the upstream call fails
    pub async fn fetch(&self, call: &StatsCall) -> Result<StatsResponse, StatsError> {
        fetch_with_retry(self.client.as_ref(), call, &self.settings.retry).await
    }
}
