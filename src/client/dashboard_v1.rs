use std::future::{self, Future};

use anyhow::{Error, Result};

use crate::http::dashboard_v1::{
    AddTradeRequest, AppState, Client, HistoryResponse, InfoResponse, LeaderboardResponse,
    MarketBoardResponse, NowResponse, PendingResponse, ProcessRoundResponse, SetRoundRequest,
    TeamResponse,
};
use crate::ledger::TradeRequest;

#[derive(Debug)]
pub struct HttpClient {
    pub path: String,
    pub client: reqwest::Client,
}

impl Client for HttpClient {
    async fn info(&mut self) -> Result<InfoResponse> {
        Ok(self
            .client
            .get(self.path.clone() + "/")
            .send()
            .await?
            .json::<InfoResponse>()
            .await?)
    }

    async fn now(&mut self) -> Result<NowResponse> {
        Ok(self
            .client
            .get(self.path.clone() + "/now")
            .send()
            .await?
            .json::<NowResponse>()
            .await?)
    }

    async fn set_round(&mut self, round: u8) -> Result<NowResponse> {
        let req = SetRoundRequest { round };
        Ok(self
            .client
            .post(self.path.clone() + "/set_round")
            .json(&req)
            .send()
            .await?
            .json::<NowResponse>()
            .await?)
    }

    async fn add_trade(&mut self, trade: TradeRequest) -> Result<()> {
        let req = AddTradeRequest { trade };
        Ok(self
            .client
            .post(self.path.clone() + "/add_trade")
            .json(&req)
            .send()
            .await?
            .json::<()>()
            .await?)
    }

    async fn pending(&mut self) -> Result<PendingResponse> {
        Ok(self
            .client
            .get(self.path.clone() + "/pending")
            .send()
            .await?
            .json::<PendingResponse>()
            .await?)
    }

    async fn clear_pending(&mut self) -> Result<()> {
        Ok(self
            .client
            .post(self.path.clone() + "/clear_pending")
            .send()
            .await?
            .json::<()>()
            .await?)
    }

    async fn process_round(&mut self) -> Result<ProcessRoundResponse> {
        Ok(self
            .client
            .post(self.path.clone() + "/process_round")
            .send()
            .await?
            .json::<ProcessRoundResponse>()
            .await?)
    }

    async fn market_board(&mut self) -> Result<MarketBoardResponse> {
        Ok(self
            .client
            .get(self.path.clone() + "/market_board")
            .send()
            .await?
            .json::<MarketBoardResponse>()
            .await?)
    }

    async fn leaderboard(&mut self) -> Result<LeaderboardResponse> {
        Ok(self
            .client
            .get(self.path.clone() + "/leaderboard")
            .send()
            .await?
            .json::<LeaderboardResponse>()
            .await?)
    }

    async fn team(&mut self, team_id: String) -> Result<TeamResponse> {
        Ok(self
            .client
            .get(self.path.clone() + format!("/team/{team_id}").as_str())
            .send()
            .await?
            .json::<TeamResponse>()
            .await?)
    }

    async fn history(&mut self) -> Result<HistoryResponse> {
        Ok(self
            .client
            .get(self.path.clone() + "/history")
            .send()
            .await?
            .json::<HistoryResponse>()
            .await?)
    }
}

impl HttpClient {
    pub fn new(path: String) -> Self {
        Self {
            path,
            client: reqwest::Client::new(),
        }
    }
}

/// In-process implementation of [Client], useful for tests and examples that don't want
/// to stand up a server.
pub struct LocalClient {
    state: AppState,
}

impl LocalClient {
    pub fn single(state: AppState) -> Self {
        Self { state }
    }

    fn now_response(&self) -> NowResponse {
        let round = self.state.session.current_round();
        NowResponse {
            round,
            processed: self.state.session.is_processed(round),
            has_next: self.state.session.has_next(),
        }
    }
}

impl Client for LocalClient {
    fn info(&mut self) -> impl Future<Output = Result<InfoResponse>> {
        future::ready(Ok(InfoResponse {
            version: "v1".to_string(),
            dataset: self.state.dataset_name.clone(),
        }))
    }

    fn now(&mut self) -> impl Future<Output = Result<NowResponse>> {
        future::ready(Ok(self.now_response()))
    }

    fn set_round(&mut self, round: u8) -> impl Future<Output = Result<NowResponse>> {
        match self.state.session.set_round(round) {
            Ok(()) => future::ready(Ok(self.now_response())),
            Err(err) => future::ready(Err(Error::new(err))),
        }
    }

    fn add_trade(&mut self, trade: TradeRequest) -> impl Future<Output = Result<()>> {
        match self.state.session.enqueue_trade(trade) {
            Ok(()) => future::ready(Ok(())),
            Err(err) => future::ready(Err(Error::new(err))),
        }
    }

    fn pending(&mut self) -> impl Future<Output = Result<PendingResponse>> {
        future::ready(Ok(PendingResponse {
            trades: self.state.session.pending_trades().to_vec(),
        }))
    }

    fn clear_pending(&mut self) -> impl Future<Output = Result<()>> {
        self.state.session.clear_pending();
        future::ready(Ok(()))
    }

    fn process_round(&mut self) -> impl Future<Output = Result<ProcessRoundResponse>> {
        let round = self.state.session.current_round();
        match self.state.session.process_round() {
            Ok(results) => future::ready(Ok(ProcessRoundResponse { round, results })),
            Err(err) => future::ready(Err(Error::new(err))),
        }
    }

    fn market_board(&mut self) -> impl Future<Output = Result<MarketBoardResponse>> {
        let round = self.state.session.current_round();
        match self.state.session.market_board() {
            Ok(companies) => future::ready(Ok(MarketBoardResponse { round, companies })),
            Err(err) => future::ready(Err(Error::new(err))),
        }
    }

    fn leaderboard(&mut self) -> impl Future<Output = Result<LeaderboardResponse>> {
        match self.state.session.leaderboard() {
            Ok(rows) => future::ready(Ok(LeaderboardResponse { rows })),
            Err(err) => future::ready(Err(Error::new(err))),
        }
    }

    fn team(&mut self, team_id: String) -> impl Future<Output = Result<TeamResponse>> {
        match self.state.session.team_detail(&team_id) {
            Ok(team) => future::ready(Ok(TeamResponse { team })),
            Err(err) => future::ready(Err(Error::new(err))),
        }
    }

    fn history(&mut self) -> impl Future<Output = Result<HistoryResponse>> {
        future::ready(Ok(HistoryResponse {
            snapshots: self.state.session.history().to_vec(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, LocalClient};
    use crate::http::dashboard_v1::AppState;
    use crate::input::price_table::PriceTable;
    use crate::input::roster::Roster;
    use crate::ledger::TradeRequest;
    use crate::session::SessionState;

    #[tokio::test]
    async fn test_that_local_client_runs_a_round() {
        let table = PriceTable::random(vec!["ABC", "BCD"]);
        let mut roster = Roster::new();
        roster.add_team("T1", 1_000_000);
        let state = AppState::single("fake", SessionState::new(table, &roster));
        let mut client = LocalClient::single(state);

        client.set_round(1).await.unwrap();
        client
            .add_trade(TradeRequest::buy("T1", "ABC", 10))
            .await
            .unwrap();
        let resp = client.process_round().await.unwrap();

        assert_eq!(resp.round, 1);
        assert!(resp.results.get(0).unwrap().success);
        assert_eq!(client.history().await.unwrap().snapshots.len(), 1);
    }
}
