use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{self, Data};
use actix_web::{HttpResponse, Responder, ResponseError};
use log::error;
use serde_json::json;
use std::collections::HashMap;

use crate::controller::context::StatsContext;
use crate::controller::export::export_players;
use crate::controller::players::{
    PlayerListQuery, compare_players, list_players, parse_id, parse_player_ids, player_detail,
    search_players,
};
use crate::controller::teams::{
    DEFAULT_SERIES_METRIC, game_log_rows, monthly_series, monthly_splits, parse_team_id,
    parse_window, roster_analysis, team_stats, trend_points,
};
use crate::error::StatsError;
use crate::view::index::{DEFAULT_INDEX_TITLE, render_index_template};

type Query = web::Query<HashMap<String, String>>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(HttpResponse::Ok))
        .route("/api/seasons", web::get().to(seasons))
        .route("/api/players", web::get().to(players))
        .route("/api/player/{id}", web::get().to(player))
        .route("/api/compare-players", web::get().to(compare))
        .route("/api/search-players", web::get().to(search))
        .route("/api/export/players", web::get().to(export))
        .route("/api/team-stats/{id}", web::get().to(team_stats_handler))
        .route("/api/team-monthly", web::get().to(team_monthly))
        .route("/api/team-monthly-series", web::get().to(team_monthly_series))
        .route("/api/team_trends_data", web::get().to(team_trends))
        .route("/api/roster-analysis/{id}", web::get().to(roster));
}

fn param<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query.get(key).map(String::as_str)
}

fn failure(route: &str, err: &StatsError) -> HttpResponse {
    error!("{route} failed: {err}");
    err.error_response()
}

/// The team endpoints without a path id take it as `team_id` (or `team`).
fn team_id_from_query(query: &HashMap<String, String>) -> Result<i64, StatsError> {
    let raw = param(query, "team_id")
        .or_else(|| param(query, "team"))
        .ok_or_else(|| StatsError::BadInput("team_id parameter is required".into()))?;
    parse_team_id(raw)
}

pub async fn index(ctx: Data<StatsContext>) -> impl Responder {
    let ctx = ctx.get_ref();
    let markup = render_index_template(
        DEFAULT_INDEX_TITLE,
        &ctx.current_season(),
        &ctx.available_seasons(),
    );
    HttpResponse::Ok()
        .content_type("text/html")
        .body(markup.into_string())
}

pub async fn seasons(ctx: Data<StatsContext>) -> impl Responder {
    let ctx = ctx.get_ref();
    HttpResponse::Ok().json(json!({
        "success": true,
        "seasons": ctx.available_seasons(),
        "current": ctx.current_season(),
    }))
}

pub async fn players(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    let request = PlayerListQuery::from_query(&query);
    match list_players(ctx.get_ref(), &request).await {
        Ok(rows) => {
            let count = rows.len();
            HttpResponse::Ok().json(json!({"success": true, "data": rows, "count": count}))
        }
        Err(e) => failure("/api/players", &e),
    }
}

pub async fn player(
    path: web::Path<String>,
    query: Query,
    ctx: Data<StatsContext>,
) -> impl Responder {
    let result = match parse_id(&path, "player id") {
        Ok(player_id) => player_detail(ctx.get_ref(), player_id, param(&query, "season")).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(detail) => HttpResponse::Ok().json(json!({
            "success": true,
            "player_info": detail.player_info,
            "seasons_regular": detail.seasons_regular,
            "career_regular": detail.career_regular,
            "available_seasons": detail.available_seasons,
            "selected_season": detail.selected_season,
        })),
        Err(e) => failure("/api/player", &e),
    }
}

pub async fn compare(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    let ids = param(&query, "ids").unwrap_or_default();
    let result = match parse_player_ids(ids) {
        Ok(ids) => compare_players(ctx.get_ref(), &ids, param(&query, "season")).await,
        Err(e) => Err(e),
    };
    match result {
        Ok((season, rows)) => HttpResponse::Ok().json(json!({
            "success": true,
            "season": season,
            "players": rows,
        })),
        Err(e) => failure("/api/compare-players", &e),
    }
}

pub async fn search(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    let term = param(&query, "q").unwrap_or_default();
    match search_players(ctx.get_ref(), term).await {
        Ok(matches) => {
            let count = matches.len();
            HttpResponse::Ok().json(json!({"success": true, "data": matches, "count": count}))
        }
        Err(e) => failure("/api/search-players", &e),
    }
}

pub async fn export(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    match export_players(ctx.get_ref(), param(&query, "season")).await {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(csv.filename)],
            })
            .body(csv.body),
        Err(e) => failure("/api/export/players", &e),
    }
}

pub async fn team_stats_handler(
    path: web::Path<String>,
    query: Query,
    ctx: Data<StatsContext>,
) -> impl Responder {
    let result = match parse_team_id(&path) {
        Ok(team_id) => team_stats(ctx.get_ref(), team_id, param(&query, "season")).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(stats) => HttpResponse::Ok().json(json!({"success": true, "stats": stats})),
        Err(e) => failure("/api/team-stats", &e),
    }
}

async fn team_game_log(
    ctx: &StatsContext,
    query: &HashMap<String, String>,
) -> Result<(i64, String, Vec<crate::model::StatRow>), StatsError> {
    let team_id = team_id_from_query(query)?;
    let season = ctx.resolve_season(param(query, "season"))?;
    let rows = game_log_rows(ctx, team_id, &season).await?;
    Ok((team_id, season, rows))
}

pub async fn team_monthly(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    match team_game_log(ctx.get_ref(), &query).await {
        Ok((team_id, season, rows)) => HttpResponse::Ok().json(json!({
            "success": true,
            "team_id": team_id,
            "season": season,
            "months": monthly_splits(&rows),
        })),
        Err(e) => failure("/api/team-monthly", &e),
    }
}

pub async fn team_monthly_series(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    let metric = param(&query, "metric").unwrap_or(DEFAULT_SERIES_METRIC);
    let result = match team_game_log(ctx.get_ref(), &query).await {
        Ok((_, _, rows)) => monthly_series(&rows, metric),
        Err(e) => Err(e),
    };
    match result {
        Ok(series) => HttpResponse::Ok().json(json!({
            "success": true,
            "metric": series.metric,
            "labels": series.labels,
            "values": series.values,
        })),
        Err(e) => failure("/api/team-monthly-series", &e),
    }
}

pub async fn team_trends(query: Query, ctx: Data<StatsContext>) -> impl Responder {
    let result = match parse_window(param(&query, "window")) {
        Ok(window) => team_game_log(ctx.get_ref(), &query)
            .await
            .map(|(_, _, rows)| (window, trend_points(&rows, window))),
        Err(e) => Err(e),
    };
    match result {
        Ok((window, games)) => HttpResponse::Ok().json(json!({
            "success": true,
            "window": window,
            "games": games,
        })),
        Err(e) => failure("/api/team_trends_data", &e),
    }
}

pub async fn roster(
    path: web::Path<String>,
    query: Query,
    ctx: Data<StatsContext>,
) -> impl Responder {
    let result = match parse_team_id(&path) {
        Ok(team_id) => roster_analysis(ctx.get_ref(), team_id, param(&query, "season")).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(analysis) => {
            let mut body = json!(analysis);
            body["success"] = json!(true);
            HttpResponse::Ok().json(body)
        }
        Err(e) => failure("/api/roster-analysis", &e),
    }
}
