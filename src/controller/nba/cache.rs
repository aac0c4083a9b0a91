use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::controller::nba::{Endpoint, RetryPolicy, StatsApiClient, StatsCall, fetch_with_retry};
use crate::model::ResultSet;

pub const TEAM_GAME_LOG_TTL: chrono::Duration = chrono::Duration::minutes(30);
pub const TEAM_GAME_LOG_TABLE: &str = "TeamGameLog";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type CacheKey = (i64, String);

#[derive(Clone, Debug)]
struct CacheEntry {
    snapshot: ResultSet,
    fetched_at: DateTime<Utc>,
}

/// Read-through cache of team game logs keyed by `(team_id, season)`.
///
/// The lock is only held around map reads and writes, never across the
/// upstream call. Two concurrent misses on one key may both fetch; the later
/// write wins.
pub struct TeamGameLogCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    client: Arc<dyn StatsApiClient>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    ttl: chrono::Duration,
}

impl TeamGameLogCache {
    #[must_use]
    pub fn new(
        client: Arc<dyn StatsApiClient>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            client,
            clock,
            retry,
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Fresh entry if one exists, else an upstream fetch. A failed fetch falls
    /// back to the stale entry, or to an empty table when there is none.
    pub async fn get(&self, team_id: i64, season: &str, timeout: Duration) -> ResultSet {
        let key: CacheKey = (team_id, season.to_string());

        if let Some(snapshot) = self.fresh(&key).await {
            debug!("team game log cache hit for {team_id} {season}");
            return snapshot;
        }
        debug!("team game log cache miss for {team_id} {season}");

        let call = StatsCall::new(Endpoint::TeamGameLog)
            .param("TeamID", team_id)
            .param("Season", season)
            .timeout(timeout);

        let fetched = fetch_with_retry(self.client.as_ref(), &call, &self.retry)
            .await
            .and_then(|resp| resp.into_result_set(TEAM_GAME_LOG_TABLE));

        match fetched {
            Ok(snapshot) => {
                let entry = CacheEntry {
                    snapshot: snapshot.clone(),
                    fetched_at: self.clock.now(),
                };
                self.entries.write().await.insert(key, entry);
                snapshot
            }
            Err(e) => {
                warn!("team game log fetch failed for {team_id} {season}: {e}");
                self.entries.read().await.get(&key).map_or_else(
                    || ResultSet::empty(TEAM_GAME_LOG_TABLE),
                    |entry| entry.snapshot.clone(),
                )
            }
        }
    }

    async fn fresh(&self, key: &CacheKey) -> Option<ResultSet> {
        let now = self.clock.now();
        let map = self.entries.read().await;
        map.get(key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| entry.snapshot.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
