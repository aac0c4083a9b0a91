use rusty_hoops::args;
use rusty_hoops::controller::http_handlers;
use rusty_hoops::controller::nba::{HttpStatsClient, SystemClock};
use rusty_hoops::StatsContext;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::args_checks();
    let client = HttpStatsClient::new(
        &args.stats_base_url,
        args.settings.timeout,
        args.proxy.as_deref(),
    )?;
    let context = StatsContext::new(
        Arc::new(client),
        Arc::new(SystemClock),
        args.settings.clone(),
    );

    info!(
        "Serving stats from {} on {}:{} (current season {})",
        args.stats_base_url,
        args.bind,
        args.port,
        context.current_season()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(context.clone()))
            .configure(http_handlers::configure)
    })
    .bind((args.bind.as_str(), args.port))?
    .run()
    .await?;
    Ok(())
}
