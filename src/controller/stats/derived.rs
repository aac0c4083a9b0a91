//! Advanced metrics computed from raw box-score columns. Every function reads
//! missing columns as 0 and returns 0 instead of dividing by zero.

use ahash::RandomState;
use std::collections::HashMap;

use crate::model::StatRow;

pub const TS_PCT: &str = "TS_PCT";
pub const EFF: &str = "EFF";
pub const USG_PCT: &str = "USG_PCT";
pub const AST_PCT: &str = "AST_PCT";
pub const REB_PCT: &str = "REB_PCT";
pub const PIE: &str = "PIE";

/// Columns appended by [`apply_derived`], in output order.
pub const DERIVED_COLUMNS: [&str; 6] = [TS_PCT, EFF, USG_PCT, AST_PCT, REB_PCT, PIE];

fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 && den.is_finite() {
        num / den
    } else {
        0.0
    }
}

#[must_use]
pub fn true_shooting_pct(row: &StatRow) -> f64 {
    let attempts = row.num("FGA") + 0.44 * row.num("FTA");
    safe_div(row.num("PTS"), 2.0 * attempts) * 100.0
}

#[must_use]
pub fn efficiency(row: &StatRow) -> f64 {
    let positive =
        row.num("PTS") + row.num("REB") + row.num("AST") + row.num("STL") + row.num("BLK");
    let negative = (row.num("FGA") - row.num("FGM"))
        + (row.num("FTA") - row.num("FTM"))
        + row.num("TOV");
    positive - negative
}

/// Sums of the team-level columns the percentage metrics divide by.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TeamTotals {
    pub min: f64,
    pub fgm: f64,
    pub fga: f64,
    pub fta: f64,
    pub tov: f64,
    pub reb: f64,
}

impl TeamTotals {
    pub fn add(&mut self, row: &StatRow) {
        self.min += row.num("MIN");
        self.fgm += row.num("FGM");
        self.fga += row.num("FGA");
        self.fta += row.num("FTA");
        self.tov += row.num("TOV");
        self.reb += row.num("REB");
    }

    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a StatRow>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            totals.add(row);
        }
        totals
    }

    /// Minutes of one on-court slot, i.e. team minutes split five ways.
    #[must_use]
    pub fn slot_minutes(&self) -> f64 {
        self.min / 5.0
    }
}

#[must_use]
pub fn usage_pct(row: &StatRow, team: &TeamTotals) -> f64 {
    let player_plays = row.num("FGA") + 0.44 * row.num("FTA") + row.num("TOV");
    let team_plays = team.fga + 0.44 * team.fta + team.tov;
    100.0 * safe_div(player_plays * team.slot_minutes(), row.num("MIN") * team_plays)
}

#[must_use]
pub fn assist_pct(row: &StatRow, team: &TeamTotals) -> f64 {
    let on_court_share = safe_div(row.num("MIN"), team.slot_minutes());
    let teammate_fgm = on_court_share * team.fgm - row.num("FGM");
    100.0 * safe_div(row.num("AST"), teammate_fgm)
}

#[must_use]
pub fn rebound_pct(row: &StatRow, team: &TeamTotals) -> f64 {
    100.0 * safe_div(row.num("REB") * team.slot_minutes(), row.num("MIN") * team.reb)
}

#[must_use]
pub fn pie_numerator(row: &StatRow) -> f64 {
    row.num("PTS") + row.num("FGM") + row.num("FTM") - row.num("FGA") - row.num("FTA")
        + row.num("DREB")
        + row.num("OREB") / 2.0
        + row.num("AST")
        + row.num("STL")
        + row.num("BLK") / 2.0
        - row.num("PF")
        - row.num("TOV")
}

/// Share of `total` (the numerator summed over the whole result set).
#[must_use]
pub fn pie(row: &StatRow, total: f64) -> f64 {
    100.0 * safe_div(pie_numerator(row), total)
}

/// Adds the row-local metrics (true shooting and efficiency).
pub fn apply_shooting(rows: &mut [StatRow]) {
    for row in rows.iter_mut() {
        let ts = true_shooting_pct(row);
        let eff = efficiency(row);
        row.set_num(TS_PCT, ts);
        row.set_num(EFF, eff);
    }
}

/// Adds every derived column to every row. Team aggregates come from the
/// rows sharing `TEAM_ID`; rows without one are measured against the whole
/// set, as is PIE.
pub fn apply_derived(rows: &mut [StatRow]) {
    let league = TeamTotals::from_rows(rows.iter());
    let mut by_team: HashMap<i64, TeamTotals, RandomState> = HashMap::default();
    for row in rows.iter() {
        if let Some(team_id) = row.id("TEAM_ID") {
            by_team.entry(team_id).or_default().add(row);
        }
    }
    let pie_total: f64 = rows.iter().map(pie_numerator).sum();

    apply_shooting(rows);
    for row in rows.iter_mut() {
        let team = row
            .id("TEAM_ID")
            .and_then(|id| by_team.get(&id))
            .copied()
            .unwrap_or(league);
        let usg = usage_pct(row, &team);
        let ast = assist_pct(row, &team);
        let reb = rebound_pct(row, &team);
        let impact = pie(row, pie_total);
        row.set_num(USG_PCT, usg);
        row.set_num(AST_PCT, ast);
        row.set_num(REB_PCT, reb);
        row.set_num(PIE, impact);
    }
}
