use std::env;
use std::path::Path;
use std::sync::Mutex;

use actix_web::{web, App, HttpServer};
use maverick::http::dashboard_v1::server::*;
use maverick::http::dashboard_v1::AppState;
use maverick::session::SessionState;
use maverick::source;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let address: String = args[1].clone();
    let port: u16 = args[2].parse().unwrap();
    let master_path = Path::new(&args[3]);
    let teams_path = Path::new(&args[4]);

    // Missing or empty sources are fatal: the session never runs without prices and teams
    let price_table = source::from_master_csv(master_path).unwrap();
    let roster = source::from_teams_csv(teams_path).unwrap();

    let dataset_name = master_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("master");
    let session = SessionState::new(price_table, &roster);
    let app_state = AppState::single(dataset_name, session);

    let dashboard_state = web::Data::new(Mutex::new(app_state));

    HttpServer::new(move || {
        App::new()
            .app_data(dashboard_state.clone())
            .service(info)
            .service(now)
            .service(set_round)
            .service(add_trade)
            .service(pending)
            .service(clear_pending)
            .service(process_round)
            .service(market_board)
            .service(leaderboard)
            .service(team)
            .service(history)
    })
    .bind((address, port))?
    .run()
    .await
}
