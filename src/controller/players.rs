use ahash::RandomState;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::controller::context::StatsContext;
use crate::controller::nba::{Endpoint, StatsCall};
use crate::controller::stats::{apply_derived, apply_shooting, format_for_display};
use crate::error::StatsError;
use crate::model::{ResultSet, StatRow, parse_season_label};

pub const LEAGUE_DASH_TABLE: &str = "LeagueDashPlayerStats";
pub const DEFAULT_SORT_COLUMN: &str = "PTS";
pub const SEARCH_LIMIT: usize = 10;
pub const MAX_COMPARE: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerListQuery {
    pub season: Option<String>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub sort_by: Option<String>,
    pub search: Option<String>,
}

impl PlayerListQuery {
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            query
                .get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            season: get("season"),
            team: get("team"),
            position: get("position"),
            sort_by: get("sort_by"),
            search: get("search"),
        }
    }
}

/// Maps the dashboard's position filter onto upstream's `PlayerPosition`.
///
/// # Errors
///
/// Will return `Err` for anything other than guard, forward, center or all
pub fn normalize_position(raw: Option<&str>) -> Result<Option<&'static str>, StatsError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().to_ascii_uppercase().as_str() {
        "" | "ALL" => Ok(None),
        "G" | "GUARD" => Ok(Some("G")),
        "F" | "FORWARD" => Ok(Some("F")),
        "C" | "CENTER" => Ok(Some("C")),
        other => Err(StatsError::BadInput(format!(
            "position '{other}' must be one of G, F, C"
        ))),
    }
}

/// # Errors
///
/// Will return `Err` if the upstream call fails or returns no players
pub async fn league_player_table(
    ctx: &StatsContext,
    season: &str,
    position: Option<&str>,
) -> Result<ResultSet, StatsError> {
    let mut call = StatsCall::new(Endpoint::LeagueDashPlayerStats).param("Season", season);
    if let Some(position) = position {
        call = call.param("PlayerPosition", position);
    }
    let table = ctx.fetch(&call).await?.into_result_set(LEAGUE_DASH_TABLE)?;
    if table.is_empty() {
        return Err(StatsError::NoData(format!("no player stats for {season}")));
    }
    Ok(table)
}

/// League rows with every derived column added, before display rounding.
/// Team totals and the PIE denominator always cover the whole league.
///
/// # Errors
///
/// Will return `Err` if the upstream call fails or returns no players
pub async fn league_player_rows(
    ctx: &StatsContext,
    season: &str,
) -> Result<Vec<StatRow>, StatsError> {
    let mut rows = league_player_table(ctx, season, None).await?.rows();
    apply_derived(&mut rows);
    Ok(rows)
}

/// Whole-league rows narrowed to the players upstream lists for `position`.
async fn league_rows_at_position(
    ctx: &StatsContext,
    season: &str,
    position: &str,
) -> Result<Vec<StatRow>, StatsError> {
    let (mut rows, at_position) = futures::try_join!(
        league_player_rows(ctx, season),
        league_player_table(ctx, season, Some(position))
    )?;
    let ids: HashSet<i64, RandomState> = at_position
        .rows()
        .iter()
        .filter_map(|row| row.id("PLAYER_ID"))
        .collect();
    rows.retain(|row| row.id("PLAYER_ID").is_some_and(|id| ids.contains(&id)));
    Ok(rows)
}

fn matches_team(row: &StatRow, team: &str) -> bool {
    match team.parse::<i64>() {
        Ok(team_id) => row.id("TEAM_ID") == Some(team_id),
        Err(_) => row
            .text("TEAM_ABBREVIATION")
            .is_some_and(|abbr| abbr.eq_ignore_ascii_case(team)),
    }
}

fn name_contains(row: &StatRow, key: &str, needle_lower: &str) -> bool {
    row.text(key)
        .is_some_and(|name| name.to_lowercase().contains(needle_lower))
}

/// Numeric columns sort high to low, text columns alphabetically. Columns no
/// row carries leave the upstream order alone.
pub fn sort_rows(rows: &mut [StatRow], column: &str) {
    if !rows.iter().any(|r| r.get(column).is_some()) {
        return;
    }
    let is_text = rows.iter().any(|r| {
        matches!(r.get(column), Some(Value::String(s)) if s.trim().parse::<f64>().is_err())
    });
    if is_text {
        rows.sort_by(|a, b| {
            let a = a.text(column).unwrap_or_default().to_lowercase();
            let b = b.text(column).unwrap_or_default().to_lowercase();
            a.cmp(&b)
        });
    } else {
        rows.sort_by(|a, b| b.num(column).total_cmp(&a.num(column)));
    }
}

/// # Errors
///
/// Will return `Err` on bad filters or when upstream is unavailable
pub async fn list_players(
    ctx: &StatsContext,
    query: &PlayerListQuery,
) -> Result<Vec<StatRow>, StatsError> {
    let season = ctx.resolve_season(query.season.as_deref())?;
    let position = normalize_position(query.position.as_deref())?;
    let mut rows = match position {
        Some(position) => league_rows_at_position(ctx, &season, position).await?,
        None => league_player_rows(ctx, &season).await?,
    };

    if let Some(team) = &query.team {
        rows.retain(|row| matches_team(row, team));
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        rows.retain(|row| name_contains(row, "PLAYER_NAME", &needle));
    }

    sort_rows(
        &mut rows,
        query.sort_by.as_deref().unwrap_or(DEFAULT_SORT_COLUMN),
    );
    format_for_display(&mut rows);
    Ok(rows)
}

#[derive(Serialize, Debug, Clone)]
pub struct PlayerDetail {
    pub player_info: StatRow,
    pub seasons_regular: Vec<StatRow>,
    pub career_regular: Option<StatRow>,
    pub available_seasons: Vec<String>,
    pub selected_season: Option<String>,
}

/// # Errors
///
/// Will return `Err` if the id is not numeric
pub fn parse_id(raw: &str, what: &str) -> Result<i64, StatsError> {
    raw.trim()
        .parse()
        .map_err(|_| StatsError::BadInput(format!("{what} '{raw}' is not a number")))
}

/// # Errors
///
/// Will return `Err` if the player is unknown, has no stats for the asked
/// season, or upstream is unavailable
pub async fn player_detail(
    ctx: &StatsContext,
    player_id: i64,
    season: Option<&str>,
) -> Result<PlayerDetail, StatsError> {
    let season = season.map(str::trim).filter(|s| !s.is_empty());
    if let Some(label) = season
        && parse_season_label(label).is_none()
    {
        return Err(StatsError::BadInput(format!(
            "season '{label}' is not in YYYY-YY form"
        )));
    }

    let info_call = StatsCall::new(Endpoint::CommonPlayerInfo).param("PlayerID", player_id);
    let career_call = StatsCall::new(Endpoint::PlayerCareerStats).param("PlayerID", player_id);
    let (info, career) = futures::try_join!(ctx.fetch(&info_call), ctx.fetch(&career_call))?;

    let player_info = info
        .into_result_set("CommonPlayerInfo")?
        .rows()
        .into_iter()
        .next()
        .ok_or_else(|| StatsError::NoData(format!("player {player_id} not found")))?;

    let mut seasons_regular = career
        .result_set("SeasonTotalsRegularSeason")
        .map(ResultSet::rows)
        .unwrap_or_default();
    let mut career_regular: Vec<StatRow> = career
        .result_set("CareerTotalsRegularSeason")
        .map(ResultSet::rows)
        .unwrap_or_default()
        .into_iter()
        .take(1)
        .collect();

    apply_shooting(&mut seasons_regular);
    apply_shooting(&mut career_regular);
    format_for_display(&mut seasons_regular);
    format_for_display(&mut career_regular);

    let mut available_seasons: Vec<String> = seasons_regular
        .iter()
        .filter_map(|row| row.text("SEASON_ID").map(str::to_string))
        .collect();
    available_seasons.sort_by(|a, b| b.cmp(a));
    available_seasons.dedup();

    let selected_season = match season {
        Some(label) if available_seasons.iter().any(|s| s == label) => Some(label.to_string()),
        Some(label) => {
            return Err(StatsError::NoData(format!(
                "player {player_id} has no regular season stats for {label}"
            )));
        }
        None => available_seasons.first().cloned(),
    };

    Ok(PlayerDetail {
        player_info,
        seasons_regular,
        career_regular: career_regular.into_iter().next(),
        available_seasons,
        selected_season,
    })
}

/// # Errors
///
/// Will return `Err` unless between two and [`MAX_COMPARE`] numeric ids are given
pub fn parse_player_ids(raw: &str) -> Result<Vec<i64>, StatsError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, "player id"))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.len() < 2 || ids.len() > MAX_COMPARE {
        return Err(StatsError::BadInput(format!(
            "compare needs between 2 and {MAX_COMPARE} player ids"
        )));
    }
    Ok(ids)
}

/// Rows of the asked players, in the asked order, with derived columns
/// measured against the whole league.
///
/// # Errors
///
/// Will return `Err` if any player has no row for the season
pub async fn compare_players(
    ctx: &StatsContext,
    player_ids: &[i64],
    season: Option<&str>,
) -> Result<(String, Vec<StatRow>), StatsError> {
    let season = ctx.resolve_season(season)?;
    let rows = league_player_rows(ctx, &season).await?;

    let mut picked = Vec::with_capacity(player_ids.len());
    let mut missing = Vec::new();
    for id in player_ids {
        match rows.iter().find(|row| row.id("PLAYER_ID") == Some(*id)) {
            Some(row) => picked.push(row.clone()),
            None => missing.push(id.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(StatsError::NoData(format!(
            "no {season} stats for player(s) {}",
            missing.join(", ")
        )));
    }

    format_for_display(&mut picked);
    Ok((season, picked))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerMatch {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub active: bool,
}

fn match_rank(name_lower: &str, needle: &str) -> u8 {
    if name_lower.starts_with(needle) {
        0
    } else if name_lower.split_whitespace().any(|word| word.starts_with(needle)) {
        1
    } else {
        2
    }
}

/// Up to [`SEARCH_LIMIT`] players whose name contains `term`, best matches
/// (name or word prefix) first.
///
/// # Errors
///
/// Will return `Err` if the term is blank or upstream is unavailable
pub async fn search_players(
    ctx: &StatsContext,
    term: &str,
) -> Result<Vec<PlayerMatch>, StatsError> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Err(StatsError::BadInput("q (search term) is required".into()));
    }

    let call = StatsCall::new(Endpoint::CommonAllPlayers).param("Season", ctx.current_season());
    let table = ctx.fetch(&call).await?.into_result_set("CommonAllPlayers")?;

    let mut ranked: Vec<(u8, PlayerMatch)> = table
        .rows()
        .into_iter()
        .filter_map(|row| {
            let name = row.text("DISPLAY_FIRST_LAST")?.to_string();
            let lower = name.to_lowercase();
            if !lower.contains(&needle) {
                return None;
            }
            let player = PlayerMatch {
                id: row.id("PERSON_ID")?,
                team: row.text("TEAM_ABBREVIATION").unwrap_or_default().to_string(),
                active: row.num("ROSTERSTATUS") > 0.0,
                name,
            };
            Some((match_rank(&lower, &needle), player))
        })
        .collect();

    ranked.sort_by(|(rank_a, a), (rank_b, b)| {
        rank_a
            .cmp(rank_b)
            .then_with(|| b.active.cmp(&a.active))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(ranked
        .into_iter()
        .take(SEARCH_LIMIT)
        .map(|(_, player)| player)
        .collect())
}
