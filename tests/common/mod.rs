#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusty_hoops::controller::nba::{Clock, Endpoint, RetryPolicy, StatsApiClient, StatsCall};
use rusty_hoops::model::StatsResponse;
use rusty_hoops::{ServiceSettings, StatsContext, StatsError};

pub const GSW: i64 = 1_610_612_744;
pub const LAL: i64 = 1_610_612_747;
pub const CHA: i64 = 1_610_612_766;
pub const STEPHEN_CURRY: i64 = 201_939;
pub const LEBRON_JAMES: i64 = 2544;
pub const ANTHONY_DAVIS: i64 = 203_076;

/// Serves canned upstream payloads per endpoint and records every call.
#[derive(Default)]
pub struct FakeStatsClient {
    responses: Mutex<HashMap<Endpoint, Value>>,
    param_responses: Mutex<Vec<(Endpoint, String, String, Value)>>,
    failures_left: AtomicU32,
    always_fail: AtomicBool,
    calls: Mutex<Vec<StatsCall>>,
}

impl FakeStatsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixtures() -> Self {
        let client = Self::new();
        client.set_response(Endpoint::LeagueDashPlayerStats, league_dash_json());
        client.set_response(Endpoint::TeamGameLog, team_game_log_json());
        client.set_response(Endpoint::CommonTeamRoster, roster_json());
        client.set_response(Endpoint::CommonPlayerInfo, player_info_json());
        client.set_response(Endpoint::PlayerCareerStats, career_json());
        client.set_response(Endpoint::CommonAllPlayers, all_players_json());
        client
    }

    pub fn set_response(&self, endpoint: Endpoint, value: Value) {
        self.responses.lock().unwrap().insert(endpoint, value);
    }

    /// Served instead of the endpoint's payload when the call carries `key=value`.
    pub fn set_response_for(&self, endpoint: Endpoint, key: &str, value: &str, response: Value) {
        self.param_responses.lock().unwrap().push((
            endpoint,
            key.to_string(),
            value.to_string(),
            response,
        ));
    }

    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.always_fail.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<StatsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    pub fn last_call(&self, endpoint: Endpoint) -> Option<StatsCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.endpoint == endpoint)
            .cloned()
    }
}

#[async_trait]
impl StatsApiClient for FakeStatsClient {
    async fn call(&self, call: &StatsCall) -> Result<StatsResponse, StatsError> {
        self.calls.lock().unwrap().push(call.clone());
        if self.always_fail.load(Ordering::SeqCst) {
            return Err(StatsError::Upstream("stats provider offline".into()));
        }
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StatsError::Upstream("connection reset".into()));
        }
        let by_param = self.param_responses.lock().unwrap();
        if let Some((.., response)) = by_param
            .iter()
            .find(|(e, k, v, _)| *e == call.endpoint && call.get_param(k) == Some(v.as_str()))
        {
            return StatsResponse::from_json(response);
        }
        let responses = self.responses.lock().unwrap();
        match responses.get(&call.endpoint) {
            Some(value) => StatsResponse::from_json(value),
            None => Err(StatsError::Upstream(format!("no canned {}", call.endpoint))),
        }
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date");
        let now = date
            .and_hms_opt(12, 0, 0)
            .expect("valid fixture time")
            .and_utc();
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

/// Context pinned to mid January 2024, i.e. inside the 2023-24 season.
pub fn test_context(client: Arc<FakeStatsClient>, clock: Arc<ManualClock>) -> StatsContext {
    let settings = ServiceSettings {
        retry: fast_retry(),
        ..ServiceSettings::default()
    };
    StatsContext::new(client, clock, settings)
}

pub fn fixture_context() -> (StatsContext, Arc<FakeStatsClient>, Arc<ManualClock>) {
    let client = Arc::new(FakeStatsClient::with_fixtures());
    let clock = Arc::new(ManualClock::on(2024, 1, 15));
    (test_context(client.clone(), clock.clone()), client, clock)
}

pub fn league_dash_json() -> Value {
    json!({
        "resource": "leaguedashplayerstats",
        "resultSets": [{
            "name": "LeagueDashPlayerStats",
            "headers": [
                "PLAYER_ID", "PLAYER_NAME", "TEAM_ID", "TEAM_ABBREVIATION", "AGE", "GP", "MIN",
                "FGM", "FGA", "FG_PCT", "FG3M", "FG3A", "FG3_PCT", "FTM", "FTA", "FT_PCT",
                "OREB", "DREB", "REB", "AST", "TOV", "STL", "BLK", "PF", "PTS"
            ],
            "rowSet": [
                [201939, "Stephen Curry", GSW, "GSW", 36.0, 74, 32.7,
                 10.0, 22.2, 0.45, 4.8, 11.8, 0.408, 4.4, 4.9, 0.923,
                 0.5, 4.0, 4.5, 5.1, 2.8, 0.7, 0.4, 1.6, 26.4],
                [202691, "Klay Thompson", GSW, "GSW", 34.0, 77, 29.7,
                 6.9, 16.0, 0.432, 3.5, 9.0, 0.387, 1.4, 1.5, 0.927,
                 0.5, 2.8, 3.3, 2.3, 1.5, 0.6, 0.5, 1.7, 17.9],
                [203552, "Seth Curry", CHA, "CHA", 33.0, 61, 17.3,
                 2.2, 5.0, 0.44, 1.1, 2.6, 0.41, 0.5, 0.6, 0.85,
                 0.2, 1.3, 1.5, 1.1, 0.6, 0.4, 0.1, 1.2, 6.0],
                [2544, "LeBron James", LAL, "LAL", 39.0, 71, 35.3,
                 9.6, 17.9, 0.54, 2.1, 5.1, 0.41, 4.3, 5.7, 0.75,
                 0.9, 6.4, 7.3, 8.3, 3.5, 1.3, 0.5, 1.1, 25.7],
                [203076, "Anthony Davis", LAL, "LAL", 31.0, 76, 35.5,
                 9.4, 16.9, 0.556, 0.4, 1.4, 0.271, 5.2, 6.6, 0.816,
                 3.1, 9.5, 12.6, 3.5, 2.1, 1.2, 2.3, 2.3, 24.7]
            ]
        }]
    })
}

/// The league table restricted to the given player ids.
pub fn league_dash_subset(player_ids: &[i64]) -> Value {
    let mut value = league_dash_json();
    if let Some(rows) = value["resultSets"][0]["rowSet"].as_array_mut() {
        rows.retain(|row| row[0].as_i64().is_some_and(|id| player_ids.contains(&id)));
    }
    value
}

/// Six Warriors games, newest first the way upstream sends them.
pub fn team_game_log_json() -> Value {
    json!({
        "resource": "teamgamelog",
        "resultSets": [{
            "name": "TeamGameLog",
            "headers": [
                "Team_ID", "Game_ID", "GAME_DATE", "MATCHUP", "WL", "FGM", "FGA", "FG3M",
                "FG3A", "FTM", "FTA", "REB", "AST", "STL", "BLK", "TOV", "PTS"
            ],
            "rowSet": [
                [GSW, "0022300106", "NOV 05, 2023", "GSW @ CLE", "W", 43, 91, 13, 37, 16, 19, 47, 28, 8, 5, 12, 115],
                [GSW, "0022300092", "NOV 03, 2023", "GSW vs. OKC", "L", 47, 97, 14, 40, 20, 24, 44, 29, 6, 3, 13, 128],
                [GSW, "0022300071", "NOV 01, 2023", "GSW vs. SAC", "W", 38, 88, 10, 36, 16, 22, 52, 24, 10, 7, 16, 102],
                [GSW, "0022300048", "OCT 29, 2023", "GSW @ NOP", "W", 48, 95, 18, 42, 16, 18, 48, 32, 9, 6, 11, 130],
                [GSW, "0022300027", "OCT 27, 2023", "GSW @ SAC", "W", 45, 92, 15, 38, 17, 20, 46, 30, 7, 4, 12, 122],
                [GSW, "0022300002", "OCT 24, 2023", "GSW vs. PHX", "L", 36, 90, 12, 40, 20, 25, 50, 25, 8, 5, 14, 104]
            ]
        }]
    })
}

pub fn roster_json() -> Value {
    json!({
        "resource": "commonteamroster",
        "resultSets": [
            {
                "name": "CommonTeamRoster",
                "headers": ["TeamID", "SEASON", "PLAYER", "NUM", "POSITION", "AGE", "EXP", "PLAYER_ID"],
                "rowSet": [
                    [GSW, "2023", "Draymond Green", "23", "F", 34.0, "11", 203110],
                    [GSW, "2023", "Stephen Curry", "30", "G", 36.0, "14", 201939],
                    [GSW, "2023", "Brandin Podziemski", "2", "G", 21.0, "R", 1641764],
                    [GSW, "2023", "Klay Thompson", "11", "G", 34.0, "10", 202691]
                ]
            },
            {
                "name": "Coaches",
                "headers": ["TEAM_ID", "COACH_NAME"],
                "rowSet": [[GSW, "Steve Kerr"]]
            }
        ]
    })
}

pub fn player_info_json() -> Value {
    json!({
        "resource": "commonplayerinfo",
        "resultSets": [{
            "name": "CommonPlayerInfo",
            "headers": ["PERSON_ID", "DISPLAY_FIRST_LAST", "TEAM_ABBREVIATION", "POSITION", "HEIGHT", "FROM_YEAR"],
            "rowSet": [[201939, "Stephen Curry", "GSW", "Guard", "6-2", 2009]]
        }]
    })
}

pub fn career_json() -> Value {
    json!({
        "resource": "playercareerstats",
        "resultSets": [
            {
                "name": "SeasonTotalsRegularSeason",
                "headers": [
                    "PLAYER_ID", "SEASON_ID", "TEAM_ABBREVIATION", "GP", "MIN", "FGM", "FGA",
                    "FG_PCT", "FTM", "FTA", "FT_PCT", "REB", "AST", "STL", "BLK", "TOV", "PTS"
                ],
                "rowSet": [
                    [201939, "2021-22", "GSW", 64, 34.5, 8.4, 19.1, 0.437, 4.3, 4.7, 0.923, 5.2, 6.3, 1.3, 0.4, 3.2, 25.5],
                    [201939, "2022-23", "GSW", 56, 34.7, 10.0, 20.2, 0.493, 4.6, 5.0, 0.915, 6.1, 6.3, 0.9, 0.4, 3.2, 29.4],
                    [201939, "2023-24", "GSW", 74, 32.7, 10.0, 22.2, 0.45, 4.4, 4.9, 0.923, 4.5, 5.1, 0.7, 0.4, 2.8, 26.4]
                ]
            },
            {
                "name": "CareerTotalsRegularSeason",
                "headers": ["PLAYER_ID", "GP", "MIN", "FGM", "FGA", "FG_PCT", "FTM", "FTA", "REB", "AST", "STL", "BLK", "TOV", "PTS"],
                "rowSet": [[201939, 956, 34.3, 8.6, 18.2, 0.473, 4.2, 4.6, 4.7, 6.4, 1.5, 0.2, 3.1, 24.7]]
            }
        ]
    })
}

pub fn all_players_json() -> Value {
    let players = [
        (201939, "Stephen Curry", 1, "GSW"),
        (203552, "Seth Curry", 1, "CHA"),
        (209, "Dell Curry", 0, ""),
        (2031, "Eddy Curry", 0, ""),
        (2544, "LeBron James", 1, "LAL"),
        (201935, "James Harden", 1, "LAC"),
        (1630164, "James Wiseman", 1, "DET"),
        (1628960, "Mike James", 0, ""),
        (1629713, "Justin James", 0, ""),
        (1641919, "Bronny James", 1, "LAL"),
        (1627750, "Jamal Murray", 1, "DEN"),
        (2037, "Jamal Crawford", 0, ""),
        (77141, "Jamaal Wilkes", 0, ""),
        (77142, "James Worthy", 0, ""),
        (201949, "James Johnson", 0, ""),
        (1712, "Antawn Jamison", 0, ""),
        (203110, "Draymond Green", 1, "GSW"),
    ];
    let rows: Vec<Value> = players
        .iter()
        .map(|(id, name, status, team)| json!([id, name, status, team]))
        .collect();
    json!({
        "resource": "commonallplayers",
        "resultSets": [{
            "name": "CommonAllPlayers",
            "headers": ["PERSON_ID", "DISPLAY_FIRST_LAST", "ROSTERSTATUS", "TEAM_ABBREVIATION"],
            "rowSet": rows
        }]
    })
}
