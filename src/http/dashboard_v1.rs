use std::future::Future;
use std::sync::Mutex;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ledger::{TradeRecord, TradeRequest};
use crate::session::{
    LeaderboardRow, MarketQuote, RoundSnapshot, SessionError, SessionState, TeamDetail,
};

/// One session exposed over JSON, plus the name of the dataset it was loaded from.
pub struct AppState {
    pub session: SessionState,
    pub dataset_name: String,
}

impl AppState {
    pub fn single(name: &str, session: SessionState) -> Self {
        Self {
            session,
            dataset_name: name.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub dataset: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NowResponse {
    pub round: u8,
    pub processed: bool,
    pub has_next: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetRoundRequest {
    pub round: u8,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddTradeRequest {
    pub trade: TradeRequest,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PendingResponse {
    pub trades: Vec<TradeRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProcessRoundResponse {
    pub round: u8,
    pub results: Vec<TradeRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarketBoardResponse {
    pub round: u8,
    pub companies: Vec<MarketQuote>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LeaderboardResponse {
    pub rows: Vec<LeaderboardRow>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TeamResponse {
    pub team: TeamDetail,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HistoryResponse {
    pub snapshots: Vec<RoundSnapshot>,
}

#[derive(Debug)]
pub struct DashboardError(SessionError);

impl std::error::Error for DashboardError {}

impl core::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SessionError> for DashboardError {
    fn from(value: SessionError) -> Self {
        DashboardError(value)
    }
}

impl actix_web::ResponseError for DashboardError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::BAD_REQUEST
    }
}

pub trait Client {
    fn info(&mut self) -> impl Future<Output = Result<InfoResponse>>;
    fn now(&mut self) -> impl Future<Output = Result<NowResponse>>;
    fn set_round(&mut self, round: u8) -> impl Future<Output = Result<NowResponse>>;
    fn add_trade(&mut self, trade: TradeRequest) -> impl Future<Output = Result<()>>;
    fn pending(&mut self) -> impl Future<Output = Result<PendingResponse>>;
    fn clear_pending(&mut self) -> impl Future<Output = Result<()>>;
    fn process_round(&mut self) -> impl Future<Output = Result<ProcessRoundResponse>>;
    fn market_board(&mut self) -> impl Future<Output = Result<MarketBoardResponse>>;
    fn leaderboard(&mut self) -> impl Future<Output = Result<LeaderboardResponse>>;
    fn team(&mut self, team_id: String) -> impl Future<Output = Result<TeamResponse>>;
    fn history(&mut self) -> impl Future<Output = Result<HistoryResponse>>;
}

pub type DashboardState = Mutex<AppState>;

pub mod server {
    use actix_web::{get, post, web};

    use super::{
        AddTradeRequest, DashboardError, DashboardState, HistoryResponse, InfoResponse,
        LeaderboardResponse, MarketBoardResponse, NowResponse, PendingResponse,
        ProcessRoundResponse, SetRoundRequest, TeamResponse,
    };

    #[get("/")]
    pub async fn info(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<InfoResponse>, DashboardError> {
        let state = app.lock().unwrap();
        Ok(web::Json(InfoResponse {
            version: "v1".to_string(),
            dataset: state.dataset_name.clone(),
        }))
    }

    #[get("/now")]
    pub async fn now(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<NowResponse>, DashboardError> {
        let state = app.lock().unwrap();
        let round = state.session.current_round();
        Ok(web::Json(NowResponse {
            round,
            processed: state.session.is_processed(round),
            has_next: state.session.has_next(),
        }))
    }

    #[post("/set_round")]
    pub async fn set_round(
        app: web::Data<DashboardState>,
        set_round: web::Json<SetRoundRequest>,
    ) -> Result<web::Json<NowResponse>, DashboardError> {
        let mut state = app.lock().unwrap();
        state.session.set_round(set_round.round)?;
        let round = state.session.current_round();
        Ok(web::Json(NowResponse {
            round,
            processed: state.session.is_processed(round),
            has_next: state.session.has_next(),
        }))
    }

    #[post("/add_trade")]
    pub async fn add_trade(
        app: web::Data<DashboardState>,
        add_trade: web::Json<AddTradeRequest>,
    ) -> Result<web::Json<()>, DashboardError> {
        let mut state = app.lock().unwrap();
        state.session.enqueue_trade(add_trade.trade.clone())?;
        Ok(web::Json(()))
    }

    #[get("/pending")]
    pub async fn pending(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<PendingResponse>, DashboardError> {
        let state = app.lock().unwrap();
        Ok(web::Json(PendingResponse {
            trades: state.session.pending_trades().to_vec(),
        }))
    }

    #[post("/clear_pending")]
    pub async fn clear_pending(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<()>, DashboardError> {
        let mut state = app.lock().unwrap();
        state.session.clear_pending();
        Ok(web::Json(()))
    }

    #[post("/process_round")]
    pub async fn process_round(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<ProcessRoundResponse>, DashboardError> {
        let mut state = app.lock().unwrap();
        let round = state.session.current_round();
        let results = state.session.process_round()?;
        Ok(web::Json(ProcessRoundResponse { round, results }))
    }

    #[get("/market_board")]
    pub async fn market_board(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<MarketBoardResponse>, DashboardError> {
        let state = app.lock().unwrap();
        Ok(web::Json(MarketBoardResponse {
            round: state.session.current_round(),
            companies: state.session.market_board()?,
        }))
    }

    #[get("/leaderboard")]
    pub async fn leaderboard(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<LeaderboardResponse>, DashboardError> {
        let mut state = app.lock().unwrap();
        Ok(web::Json(LeaderboardResponse {
            rows: state.session.leaderboard()?,
        }))
    }

    #[get("/team/{team_id}")]
    pub async fn team(
        app: web::Data<DashboardState>,
        path: web::Path<(String,)>,
    ) -> Result<web::Json<TeamResponse>, DashboardError> {
        let state = app.lock().unwrap();
        let (team_id,) = path.into_inner();
        Ok(web::Json(TeamResponse {
            team: state.session.team_detail(&team_id)?,
        }))
    }

    #[get("/history")]
    pub async fn history(
        app: web::Data<DashboardState>,
    ) -> Result<web::Json<HistoryResponse>, DashboardError> {
        let state = app.lock().unwrap();
        Ok(web::Json(HistoryResponse {
            snapshots: state.session.history().to_vec(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};

    use crate::input::price_table::PriceTableBuilder;
    use crate::input::roster::Roster;
    use crate::ledger::TradeRequest;
    use crate::session::SessionState;

    use super::server::*;
    use super::{
        AddTradeRequest, AppState, HistoryResponse, LeaderboardResponse, NowResponse,
        PendingResponse, ProcessRoundResponse, SetRoundRequest,
    };
    use std::sync::Mutex;

    fn setup() -> AppState {
        let mut builder = PriceTableBuilder::new();
        builder.add_base_price("Acme", 40);
        for round in 1..=7 {
            builder.add_price("Acme", round, 50);
        }
        let mut roster = Roster::new();
        roster.add_team("T1", 10_000);
        AppState::single("fake", SessionState::new(builder.build(), &roster))
    }

    #[actix_web::test]
    async fn test_single_admin_loop() {
        let dashboard_state = web::Data::new(Mutex::new(setup()));

        let app = test::init_service(
            App::new()
                .app_data(dashboard_state)
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
                .service(history),
        )
        .await;

        let req = test::TestRequest::post()
            .set_json(SetRoundRequest { round: 1 })
            .uri("/set_round")
            .to_request();
        let resp: NowResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.round, 1);

        let req1 = test::TestRequest::post()
            .set_json(AddTradeRequest {
                trade: TradeRequest::buy("T1", "Acme", 100),
            })
            .uri("/add_trade")
            .to_request();
        test::call_and_read_body(&app, req1).await;

        let req2 = test::TestRequest::get().uri("/pending").to_request();
        let resp2: PendingResponse = test::call_and_read_body_json(&app, req2).await;
        assert_eq!(resp2.trades.len(), 1);

        let req3 = test::TestRequest::post().uri("/process_round").to_request();
        let resp3: ProcessRoundResponse = test::call_and_read_body_json(&app, req3).await;
        assert_eq!(resp3.round, 1);
        assert!(resp3.results.get(0).unwrap().success);

        let req4 = test::TestRequest::get().uri("/leaderboard").to_request();
        let resp4: LeaderboardResponse = test::call_and_read_body_json(&app, req4).await;
        assert_eq!(resp4.rows.get(0).unwrap().team_id, "T1");
        assert_eq!(resp4.rows.get(0).unwrap().total_portfolio_value, 10_000);

        let req5 = test::TestRequest::get().uri("/history").to_request();
        let resp5: HistoryResponse = test::call_and_read_body_json(&app, req5).await;
        assert_eq!(resp5.snapshots.len(), 1);
        assert_eq!(*resp5.snapshots[0].values.get("T1").unwrap(), 10_000);
    }

    #[std::prelude::v1::test]
    fn test_that_trade_requests_parse_from_wire_json() {
        let parsed: AddTradeRequest = serde_json::from_str(
            r#"{"trade":{"team_id":"T1","company":"Acme","action":"Buy","qty":5}}"#,
        )
        .unwrap();

        assert_eq!(parsed.trade, TradeRequest::buy("T1", "Acme", 5));
    }

    #[actix_web::test]
    async fn test_that_processing_base_round_returns_client_error() {
        let dashboard_state = web::Data::new(Mutex::new(setup()));

        let app = test::init_service(
            App::new()
                .app_data(dashboard_state)
                .service(add_trade)
                .service(process_round),
        )
        .await;

        let req = test::TestRequest::post()
            .set_json(AddTradeRequest {
                trade: TradeRequest::buy("T1", "Acme", 1),
            })
            .uri("/add_trade")
            .to_request();
        test::call_and_read_body(&app, req).await;

        let req1 = test::TestRequest::post().uri("/process_round").to_request();
        let resp = test::call_service(&app, req1).await;
        assert!(resp.status().is_client_error());
    }
}
