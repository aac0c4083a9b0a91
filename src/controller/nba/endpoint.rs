use std::fmt;
use std::time::Duration;

/// The upstream stats endpoints this service reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    LeagueDashPlayerStats,
    CommonPlayerInfo,
    PlayerCareerStats,
    TeamGameLog,
    CommonTeamRoster,
    CommonAllPlayers,
}

impl Endpoint {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::LeagueDashPlayerStats => "leaguedashplayerstats",
            Self::CommonPlayerInfo => "commonplayerinfo",
            Self::PlayerCareerStats => "playercareerstats",
            Self::TeamGameLog => "teamgamelog",
            Self::CommonTeamRoster => "commonteamroster",
            Self::CommonAllPlayers => "commonallplayers",
        }
    }

    /// Parameters upstream rejects the request without.
    #[must_use]
    pub fn default_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::LeagueDashPlayerStats => &[
                ("LeagueID", "00"),
                ("SeasonType", "Regular Season"),
                ("PerMode", "PerGame"),
                ("MeasureType", "Base"),
                ("PaceAdjust", "N"),
                ("PlusMinus", "N"),
                ("Rank", "N"),
                ("LastNGames", "0"),
                ("Month", "0"),
                ("OpponentTeamID", "0"),
                ("Period", "0"),
                ("PORound", "0"),
                ("TeamID", "0"),
                ("TwoWay", "0"),
                ("PlayerPosition", ""),
                ("DateFrom", ""),
                ("DateTo", ""),
                ("GameSegment", ""),
                ("Location", ""),
                ("Outcome", ""),
                ("SeasonSegment", ""),
                ("VsConference", ""),
                ("VsDivision", ""),
            ],
            Self::CommonPlayerInfo => &[("LeagueID", "")],
            Self::PlayerCareerStats => &[("LeagueID", "00"), ("PerMode", "PerGame")],
            Self::TeamGameLog => &[
                ("LeagueID", "00"),
                ("SeasonType", "Regular Season"),
                ("DateFrom", ""),
                ("DateTo", ""),
            ],
            Self::CommonTeamRoster => &[("LeagueID", "00")],
            Self::CommonAllPlayers => &[("LeagueID", "00"), ("IsOnlyCurrentSeason", "0")],
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Describes one outbound call. Anything left unset falls back to the
/// client's defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsCall {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub proxy: Option<String>,
}

impl StatsCall {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
            timeout: None,
            headers: Vec::new(),
            proxy: None,
        }
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.to_string());
        self
    }

    #[must_use]
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Endpoint defaults with caller parameters layered on top.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .endpoint
            .default_params()
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        for (key, value) in &self.params {
            match pairs.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1.clone_from(value),
                None => pairs.push((key.clone(), value.clone())),
            }
        }
        pairs
    }
}
