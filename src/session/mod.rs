use std::collections::{HashMap, HashSet};

use log::info;
use serde::{Deserialize, Serialize};

use crate::input::price_table::{PriceError, PriceTable, MAX_ROUND};
use crate::input::roster::Roster;
use crate::ledger::{Ledger, TeamId, TradeAction, TradeRecord, TradeRequest};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    BaseRound,
    NoPendingTrades,
    RoundAlreadyProcessed(u8),
    InvalidRound(u8),
    InvalidQuantity(i64),
    UnknownTeam(String),
    Price(PriceError),
}

impl std::error::Error for SessionError {}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::BaseRound => write!(f, "round 0 is the base round and cannot be traded"),
            SessionError::NoPendingTrades => write!(f, "no trades to process"),
            SessionError::RoundAlreadyProcessed(round) => {
                write!(f, "round {round} has already been processed")
            }
            SessionError::InvalidRound(round) => {
                write!(f, "round {round} is outside 0..={MAX_ROUND}")
            }
            SessionError::InvalidQuantity(qty) => write!(f, "quantity {qty} is not positive"),
            SessionError::UnknownTeam(team_id) => write!(f, "unknown team {team_id}"),
            SessionError::Price(err) => write!(f, "{err}"),
        }
    }
}

impl From<PriceError> for SessionError {
    fn from(value: PriceError) -> Self {
        SessionError::Price(value)
    }
}

/// Portfolio value of every team at the close of a processed round. Append-only.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoundSnapshot {
    pub round: u8,
    pub values: HashMap<TeamId, i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MarketQuote {
    pub company: String,
    pub prev: i64,
    pub now: i64,
    pub change_pct: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LeaderboardRow {
    pub team_id: TeamId,
    pub cash: i64,
    pub total_share_value: i64,
    pub total_portfolio_value: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HoldingLine {
    pub company: String,
    pub qty: i64,
    pub price: i64,
    pub value: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TeamDetail {
    pub team_id: TeamId,
    pub cash: i64,
    pub holdings: Vec<HoldingLine>,
}

/// One administrator session: the price table, the ledger, the round counter, the
/// pending trade queue, and the history of round snapshots.
///
/// The session is constructed once by the hosting application and passed by reference
/// to every action handler. It holds no ambient state and performs no synchronization;
/// the server dispatches one action at a time.
#[derive(Debug)]
pub struct SessionState {
    price_table: PriceTable,
    ledger: Ledger,
    current_round: u8,
    processed_rounds: HashSet<u8>,
    pending_trades: Vec<TradeRequest>,
    history: Vec<RoundSnapshot>,
}

impl SessionState {
    pub fn new(price_table: PriceTable, roster: &Roster) -> Self {
        Self {
            price_table,
            ledger: Ledger::from_roster(roster),
            current_round: 0,
            processed_rounds: HashSet::new(),
            pending_trades: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn current_round(&self) -> u8 {
        self.current_round
    }

    pub fn has_next(&self) -> bool {
        self.current_round < MAX_ROUND
    }

    pub fn is_processed(&self, round: u8) -> bool {
        self.processed_rounds.contains(&round)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn price_table(&self) -> &PriceTable {
        &self.price_table
    }

    pub fn pending_trades(&self) -> &[TradeRequest] {
        &self.pending_trades
    }

    pub fn history(&self) -> &[RoundSnapshot] {
        &self.history
    }

    /// Any round within range is accepted, including already-processed ones, so past
    /// rounds can be re-displayed. Reprocessing is guarded in [SessionState::process_round].
    pub fn set_round(&mut self, round: u8) -> Result<(), SessionError> {
        if round > MAX_ROUND {
            return Err(SessionError::InvalidRound(round));
        }
        self.current_round = round;
        info!("round set to {round}");
        Ok(())
    }

    /// Queues a trade for the next processing pass. Quantity positivity is the only
    /// validation done here; cash and holdings are checked when the round is processed.
    pub fn enqueue_trade(&mut self, trade: TradeRequest) -> Result<(), SessionError> {
        if matches!(trade.action, TradeAction::Buy | TradeAction::Sell) && trade.qty <= 0 {
            return Err(SessionError::InvalidQuantity(trade.qty));
        }
        self.pending_trades.push(trade);
        Ok(())
    }

    pub fn clear_pending(&mut self) {
        self.pending_trades.clear();
    }

    /// Drains the pending queue through the ledger at the current round's prices.
    ///
    /// Individual trade failures (insufficient cash or shares, missing price) are
    /// reported in the returned records and never stop the pass. The queue is cleared
    /// unconditionally, the round is marked processed, valuations are refreshed, a
    /// history snapshot is appended, and the round auto-advances until [MAX_ROUND].
    ///
    /// When an already-held company has no price at this round the whole call fails
    /// up front: the queue, the ledger, and history are left untouched.
    pub fn process_round(&mut self) -> Result<Vec<TradeRecord>, SessionError> {
        let round = self.current_round;
        if round == 0 {
            return Err(SessionError::BaseRound);
        }
        if self.pending_trades.is_empty() {
            return Err(SessionError::NoPendingTrades);
        }
        if self.processed_rounds.contains(&round) {
            return Err(SessionError::RoundAlreadyProcessed(round));
        }

        //Every held position must be priceable at this round before anything is
        //mutated; valuation below would otherwise fail halfway through the pass
        for team_id in self.ledger.teams() {
            //Teams always resolve because the roster never shrinks during a session
            let account = self.ledger.account(team_id).unwrap();
            for (company, qty) in account.holdings.iter() {
                if *qty == 0 {
                    continue;
                }
                self.price_table.price_at(company, round)?;
            }
        }

        let pending = std::mem::take(&mut self.pending_trades);
        let mut results = Vec::with_capacity(pending.len());
        for trade in &pending {
            match self.price_table.price_at(&trade.company, round) {
                Ok(price) => results.push(self.ledger.apply_trade(trade, price)),
                Err(err) => results.push(TradeRecord::rejected(err.to_string())),
            }
        }

        self.processed_rounds.insert(round);
        self.recalculate_all()?;
        self.record_snapshot(round)?;

        if self.current_round < MAX_ROUND {
            self.current_round += 1;
            info!("moved to round {}", self.current_round);
        }
        Ok(results)
    }

    /// Recomputes every team's share value and portfolio value at the current round.
    /// Pure recomputation over cash and holdings, so calling it twice changes nothing.
    pub fn recalculate_all(&mut self) -> Result<(), SessionError> {
        let round = self.current_round;
        let price_table = &self.price_table;
        for (_team_id, account) in self.ledger.accounts_mut() {
            let mut total_share_value = 0;
            for (company, qty) in account.holdings.iter() {
                //Zero-quantity entries are left over from round-trip trades and are harmless
                if *qty == 0 {
                    continue;
                }
                total_share_value += qty * price_table.price_at(company, round)?;
            }
            account.total_share_value = total_share_value;
            account.total_portfolio_value = account.cash + total_share_value;
        }
        Ok(())
    }

    /// Cash plus the value of all holdings at the current round.
    pub fn portfolio_value(&self, team_id: &str) -> Result<i64, SessionError> {
        let account = self
            .ledger
            .account(team_id)
            .ok_or_else(|| SessionError::UnknownTeam(team_id.to_string()))?;
        let mut total = account.cash;
        for (company, qty) in account.holdings.iter() {
            if *qty == 0 {
                continue;
            }
            total += qty * self.price_table.price_at(company, self.current_round)?;
        }
        Ok(total)
    }

    /// Appends the portfolio value of every team to history. Called once per processed
    /// round from [SessionState::process_round].
    pub fn record_snapshot(&mut self, round: u8) -> Result<(), SessionError> {
        let mut values = HashMap::new();
        for team_id in self.ledger.teams() {
            values.insert(team_id.clone(), self.portfolio_value(team_id)?);
        }
        self.history.push(RoundSnapshot { round, values });
        Ok(())
    }

    /// Previous-round and current-round price per company with the percent change
    /// between them. The previous round is clamped at the base round.
    pub fn market_board(&self) -> Result<Vec<MarketQuote>, SessionError> {
        let prev_round = self.current_round.saturating_sub(1);
        let mut quotes = Vec::new();
        for company in self.price_table.companies() {
            let prev = self.price_table.price_at(company, prev_round)?;
            let now = self.price_table.price_at(company, self.current_round)?;
            let change_pct = if prev != 0 {
                ((now - prev) as f64 / prev as f64) * 100.0
            } else {
                0.0
            };
            quotes.push(MarketQuote {
                company: company.clone(),
                prev,
                now,
                change_pct,
            });
        }
        Ok(quotes)
    }

    /// Rows sorted descending by portfolio value. Valuations are refreshed first so the
    /// board reflects the current round even when no trades were processed for it.
    pub fn leaderboard(&mut self) -> Result<Vec<LeaderboardRow>, SessionError> {
        self.recalculate_all()?;
        let mut rows = Vec::new();
        for team_id in self.ledger.teams() {
            //Teams always resolve because the roster never shrinks during a session
            let account = self.ledger.account(team_id).unwrap();
            rows.push(LeaderboardRow {
                team_id: team_id.clone(),
                cash: account.cash,
                total_share_value: account.total_share_value,
                total_portfolio_value: account.total_portfolio_value,
            });
        }
        rows.sort_by(|a, b| b.total_portfolio_value.cmp(&a.total_portfolio_value));
        Ok(rows)
    }

    /// Positive holdings of one team priced at the current round.
    pub fn team_detail(&self, team_id: &str) -> Result<TeamDetail, SessionError> {
        let account = self
            .ledger
            .account(team_id)
            .ok_or_else(|| SessionError::UnknownTeam(team_id.to_string()))?;
        let mut holdings = Vec::new();
        for (company, qty) in account.holdings.iter() {
            if *qty <= 0 {
                continue;
            }
            let price = self.price_table.price_at(company, self.current_round)?;
            holdings.push(HoldingLine {
                company: company.clone(),
                qty: *qty,
                price,
                value: qty * price,
            });
        }
        holdings.sort_by(|a, b| a.company.cmp(&b.company));
        Ok(TeamDetail {
            team_id: team_id.to_string(),
            cash: account.cash,
            holdings,
        })
    }
}
