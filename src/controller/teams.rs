use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::controller::context::StatsContext;
use crate::controller::nba::{Endpoint, StatsCall};
use crate::controller::players::{league_player_rows, parse_id};
use crate::controller::stats::{format_for_display, round1};
use crate::error::StatsError;
use crate::model::StatRow;

pub const DEFAULT_TREND_WINDOW: usize = 5;
pub const MAX_TREND_WINDOW: usize = 82;
pub const DEFAULT_SERIES_METRIC: &str = "PTS";

/// # Errors
///
/// Will return `Err` if the team id is not numeric
pub fn parse_team_id(raw: &str) -> Result<i64, StatsError> {
    parse_id(raw, "team id")
}

/// Upstream writes game dates as `APR 14, 2024`; older payloads use ISO dates.
#[must_use]
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let normalized: String = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
        }
        _ => raw.to_string(),
    };
    NaiveDate::parse_from_str(&normalized, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn is_win(row: &StatRow) -> bool {
    row.text("WL").is_some_and(|wl| wl.eq_ignore_ascii_case("W"))
}

fn is_loss(row: &StatRow) -> bool {
    row.text("WL").is_some_and(|wl| wl.eq_ignore_ascii_case("L"))
}

fn is_home(row: &StatRow) -> bool {
    row.text("MATCHUP").is_some_and(|m| m.contains("vs."))
}

fn is_road(row: &StatRow) -> bool {
    row.text("MATCHUP").is_some_and(|m| m.contains('@'))
}

fn record<'a>(rows: impl Iterator<Item = &'a StatRow>) -> String {
    let (wins, losses) = rows.fold((0, 0), |(w, l), row| {
        (w + usize::from(is_win(row)), l + usize::from(is_loss(row)))
    });
    format!("{wins}-{losses}")
}

fn per_game(rows: &[StatRow], column: &str) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let total: f64 = rows.iter().map(|r| r.num(column)).sum();
    round1(total / rows.len() as f64)
}

fn made_pct(rows: &[StatRow], made: &str, attempted: &str) -> f64 {
    let made: f64 = rows.iter().map(|r| r.num(made)).sum();
    let attempted: f64 = rows.iter().map(|r| r.num(attempted)).sum();
    if attempted > 0.0 {
        round1(made / attempted * 100.0)
    } else {
        0.0
    }
}

fn win_pct(wins: usize, games: usize) -> f64 {
    if games == 0 {
        0.0
    } else {
        round1(wins as f64 / games as f64 * 100.0)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TeamSummary {
    pub gp: usize,
    pub w: usize,
    pub l: usize,
    pub win_pct: f64,
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
    pub spg: f64,
    pub bpg: f64,
    pub topg: f64,
    pub fg_pct: f64,
    pub fg3_pct: f64,
    pub ft_pct: f64,
    pub home_record: String,
    pub road_record: String,
}

#[must_use]
pub fn team_summary(rows: &[StatRow]) -> TeamSummary {
    let w = rows.iter().filter(|r| is_win(r)).count();
    let l = rows.iter().filter(|r| is_loss(r)).count();
    TeamSummary {
        gp: rows.len(),
        w,
        l,
        win_pct: win_pct(w, rows.len()),
        ppg: per_game(rows, "PTS"),
        rpg: per_game(rows, "REB"),
        apg: per_game(rows, "AST"),
        spg: per_game(rows, "STL"),
        bpg: per_game(rows, "BLK"),
        topg: per_game(rows, "TOV"),
        fg_pct: made_pct(rows, "FGM", "FGA"),
        fg3_pct: made_pct(rows, "FG3M", "FG3A"),
        ft_pct: made_pct(rows, "FTM", "FTA"),
        home_record: record(rows.iter().filter(|r| is_home(r))),
        road_record: record(rows.iter().filter(|r| is_road(r))),
    }
}

/// Game log rows for one team and season, oldest game first.
///
/// # Errors
///
/// Will return `Err` if neither a fresh fetch nor the cache has any games
pub async fn game_log_rows(
    ctx: &StatsContext,
    team_id: i64,
    season: &str,
) -> Result<Vec<StatRow>, StatsError> {
    let table = ctx.cache.get(team_id, season, ctx.settings.timeout).await;
    if table.is_empty() {
        return Err(StatsError::NoData(format!(
            "no games for team {team_id} in {season}"
        )));
    }
    let mut rows = table.rows();
    rows.sort_by_key(|row| row.text("GAME_DATE").and_then(parse_game_date));
    Ok(rows)
}

/// # Errors
///
/// Will return `Err` on a bad team id or season, or when there are no games
pub async fn team_stats(
    ctx: &StatsContext,
    team_id: i64,
    season: Option<&str>,
) -> Result<TeamSummary, StatsError> {
    let season = ctx.resolve_season(season)?;
    let rows = game_log_rows(ctx, team_id, &season).await?;
    Ok(team_summary(&rows))
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthlySplit {
    pub month: String,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_pct: f64,
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
    pub fg_pct: f64,
}

fn group_by_month(rows: &[StatRow]) -> BTreeMap<String, Vec<StatRow>> {
    let mut months: BTreeMap<String, Vec<StatRow>> = BTreeMap::new();
    for row in rows {
        if let Some(date) = row.text("GAME_DATE").and_then(parse_game_date) {
            months
                .entry(format!("{}-{:02}", date.year(), date.month()))
                .or_default()
                .push(row.clone());
        }
    }
    months
}

/// Per calendar month (`YYYY-MM`) splits in chronological order. Rows with an
/// unreadable date are skipped.
#[must_use]
pub fn monthly_splits(rows: &[StatRow]) -> Vec<MonthlySplit> {
    group_by_month(rows)
        .into_iter()
        .map(|(month, games)| {
            let wins = games.iter().filter(|r| is_win(r)).count();
            let losses = games.iter().filter(|r| is_loss(r)).count();
            MonthlySplit {
                month,
                games: games.len(),
                wins,
                losses,
                win_pct: win_pct(wins, games.len()),
                ppg: per_game(&games, "PTS"),
                rpg: per_game(&games, "REB"),
                apg: per_game(&games, "AST"),
                fg_pct: made_pct(&games, "FGM", "FGA"),
            }
        })
        .collect()
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub metric: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Monthly per-game average of one game log column, shaped for a chart.
///
/// # Errors
///
/// Will return `Err` if no game carries the column
pub fn monthly_series(rows: &[StatRow], metric: &str) -> Result<MonthlySeries, StatsError> {
    let metric = metric.trim().to_ascii_uppercase();
    if !rows.iter().any(|r| r.get(&metric).is_some()) {
        return Err(StatsError::BadInput(format!(
            "metric '{metric}' is not a game log column"
        )));
    }
    let (labels, values) = group_by_month(rows)
        .into_iter()
        .map(|(month, games)| (month, per_game(&games, &metric)))
        .unzip();
    Ok(MonthlySeries {
        metric,
        labels,
        values,
    })
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub game_date: String,
    pub matchup: String,
    pub wl: String,
    pub pts: f64,
    pub rolling_pts: f64,
    pub win_pct_to_date: f64,
}

/// # Errors
///
/// Will return `Err` if the window is not between 1 and [`MAX_TREND_WINDOW`]
pub fn parse_window(raw: Option<&str>) -> Result<usize, StatsError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_TREND_WINDOW);
    };
    match raw.parse::<usize>() {
        Ok(window) if (1..=MAX_TREND_WINDOW).contains(&window) => Ok(window),
        _ => Err(StatsError::BadInput(format!(
            "window must be between 1 and {MAX_TREND_WINDOW}"
        ))),
    }
}

/// Game-by-game points with a trailing `window`-game average and the running
/// win percentage. Expects rows oldest first.
#[must_use]
pub fn trend_points(rows: &[StatRow], window: usize) -> Vec<TrendPoint> {
    let window = window.max(1);
    let mut wins = 0;
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            wins += usize::from(is_win(row));
            let start = (idx + 1).saturating_sub(window);
            TrendPoint {
                game_date: row.text("GAME_DATE").unwrap_or_default().to_string(),
                matchup: row.text("MATCHUP").unwrap_or_default().to_string(),
                wl: row.text("WL").unwrap_or_default().to_string(),
                pts: row.num("PTS"),
                rolling_pts: per_game(&rows[start..=idx], "PTS"),
                win_pct_to_date: win_pct(wins, idx + 1),
            }
        })
        .collect()
}

#[derive(Serialize, Debug, Clone)]
pub struct RosterPlayer {
    pub player_id: i64,
    pub name: String,
    pub position: String,
    pub age: f64,
    pub experience: u32,
    pub stats: Option<StatRow>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopScorer {
    pub player_id: i64,
    pub name: String,
    pub ppg: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct RosterAnalysis {
    pub team_id: i64,
    pub season: String,
    pub roster_size: usize,
    pub average_age: f64,
    pub average_experience: f64,
    pub positions: BTreeMap<String, usize>,
    pub top_scorer: Option<TopScorer>,
    pub players: Vec<RosterPlayer>,
}

/// Rookies are listed with experience `R`.
fn years_of_experience(row: &StatRow) -> u32 {
    match row.get("EXP") {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Joins the roster with the league stat rows of its players.
///
/// # Errors
///
/// Will return `Err` if the roster is empty or upstream is unavailable
pub async fn roster_analysis(
    ctx: &StatsContext,
    team_id: i64,
    season: Option<&str>,
) -> Result<RosterAnalysis, StatsError> {
    let season = ctx.resolve_season(season)?;
    let roster_call = StatsCall::new(Endpoint::CommonTeamRoster)
        .param("TeamID", team_id)
        .param("Season", &season);
    let (roster, league_rows) = futures::try_join!(
        ctx.fetch(&roster_call),
        league_player_rows(ctx, &season)
    )?;
    let roster = roster.into_result_set("CommonTeamRoster")?.rows();
    if roster.is_empty() {
        return Err(StatsError::NoData(format!(
            "no roster for team {team_id} in {season}"
        )));
    }

    let mut players: Vec<RosterPlayer> = roster
        .iter()
        .map(|row| {
            let player_id = row.id("PLAYER_ID").unwrap_or_default();
            let stats = league_rows
                .iter()
                .find(|s| s.id("PLAYER_ID") == Some(player_id))
                .cloned();
            RosterPlayer {
                player_id,
                name: row.text("PLAYER").unwrap_or_default().to_string(),
                position: row.text("POSITION").unwrap_or_default().to_string(),
                age: row.num("AGE"),
                experience: years_of_experience(row),
                stats,
            }
        })
        .collect();

    players.sort_by(|a, b| {
        let pts = |p: &RosterPlayer| p.stats.as_ref().map_or(0.0, |s| s.num("PTS"));
        pts(b).total_cmp(&pts(a))
    });

    let top_scorer = players.first().and_then(|p| {
        p.stats.as_ref().map(|s| TopScorer {
            player_id: p.player_id,
            name: p.name.clone(),
            ppg: round1(s.num("PTS")),
        })
    });

    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    for player in &players {
        let key = if player.position.is_empty() {
            "N/A".to_string()
        } else {
            player.position.clone()
        };
        *positions.entry(key).or_insert(0) += 1;
    }

    let roster_size = players.len();
    let average_age = round1(players.iter().map(|p| p.age).sum::<f64>() / roster_size as f64);
    let average_experience = round1(
        players.iter().map(|p| f64::from(p.experience)).sum::<f64>() / roster_size as f64,
    );

    for player in &mut players {
        if let Some(stats) = player.stats.as_mut() {
            format_for_display(std::slice::from_mut(stats));
        }
    }

    Ok(RosterAnalysis {
        team_id,
        season,
        roster_size,
        average_age,
        average_experience,
        positions,
        top_scorer,
        players,
    })
}
