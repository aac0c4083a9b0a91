use serde_json::Value;

use crate::controller::context::StatsContext;
use crate::controller::players::league_player_table;
use crate::controller::stats::{DERIVED_COLUMNS, apply_derived, format_for_display};
use crate::error::StatsError;

pub struct CsvExport {
    pub filename: String,
    pub body: Vec<u8>,
}

#[must_use]
pub fn export_filename(season: &str, date_stamp: &str) -> String {
    format!("nba_players_{season}_{date_stamp}.csv")
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Every league row for the season, upstream columns first, then the derived
/// ones, formatted the same way `/api/players` formats them.
///
/// # Errors
///
/// Will return `Err` on a bad season, upstream failure or csv write failure
pub async fn export_players(
    ctx: &StatsContext,
    season: Option<&str>,
) -> Result<CsvExport, StatsError> {
    let season = ctx.resolve_season(season)?;
    let table = league_player_table(ctx, &season, None).await?;

    let mut columns = table.headers.clone();
    for derived in DERIVED_COLUMNS {
        if !columns.iter().any(|c| c == derived) {
            columns.push(derived.to_string());
        }
    }

    let mut rows = table.rows();
    apply_derived(&mut rows);
    format_for_display(&mut rows);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in &rows {
        writer.write_record(columns.iter().map(|c| cell(row.get(c))))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| StatsError::Other(e.to_string()))?;

    Ok(CsvExport {
        filename: export_filename(&season, &ctx.today().format("%Y%m%d").to_string()),
        body,
    })
}
