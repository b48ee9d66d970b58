use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::input::roster::Roster;

pub type TeamId = String;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TradeRequest {
    pub team_id: String,
    pub company: String,
    pub action: TradeAction,
    pub qty: i64,
}

impl TradeRequest {
    fn new(
        action: TradeAction,
        team_id: impl Into<String>,
        company: impl Into<String>,
        qty: i64,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            company: company.into(),
            action,
            qty,
        }
    }

    pub fn buy(team_id: impl Into<String>, company: impl Into<String>, qty: i64) -> Self {
        TradeRequest::new(TradeAction::Buy, team_id, company, qty)
    }

    pub fn sell(team_id: impl Into<String>, company: impl Into<String>, qty: i64) -> Self {
        TradeRequest::new(TradeAction::Sell, team_id, company, qty)
    }

    pub fn hold(team_id: impl Into<String>, company: impl Into<String>) -> Self {
        TradeRequest::new(TradeAction::Hold, team_id, company, 0)
    }
}

/// Outcome of one trade application. Rejections are expected and never stop the batch,
/// so the outcome is data rather than an error.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TradeRecord {
    pub success: bool,
    pub message: String,
}

impl TradeRecord {
    pub fn filled(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TeamAccount {
    pub cash: i64,
    pub holdings: HashMap<String, i64>,
    pub total_share_value: i64,
    pub total_portfolio_value: i64,
}

impl TeamAccount {
    pub fn with_cash(cash: i64) -> Self {
        Self {
            cash,
            holdings: HashMap::new(),
            total_share_value: 0,
            total_portfolio_value: cash,
        }
    }

    /// Quantity held of a company, 0 when the company was never traded.
    pub fn qty(&self, company: &str) -> i64 {
        self.holdings.get(company).copied().unwrap_or(0)
    }
}

/// All teams' cash and holdings. The ledger owns every mutation of money and shares:
/// trades either apply fully to the named team's account or leave it untouched.
///
/// Prices are supplied by the caller, resolved once per round against the price table.
/// Keeping pricing out of the engine means trade mechanics can be tested with bare
/// numbers and the pricing policy can change without touching this module.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    inner: HashMap<TeamId, TeamAccount>,
    teams: Vec<TeamId>,
}

impl Ledger {
    pub fn from_roster(roster: &Roster) -> Self {
        let mut inner = HashMap::new();
        let mut teams = Vec::new();
        for entry in roster.entries() {
            inner.insert(entry.team_id.clone(), TeamAccount::with_cash(entry.cash));
            teams.push(entry.team_id.clone());
        }
        Self { inner, teams }
    }

    /// Team identifiers in roster order.
    pub fn teams(&self) -> &[TeamId] {
        &self.teams
    }

    pub fn account(&self, team_id: &str) -> Option<&TeamAccount> {
        self.inner.get(team_id)
    }

    pub(crate) fn accounts_mut(&mut self) -> impl Iterator<Item = (&TeamId, &mut TeamAccount)> {
        self.inner.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Applies a single trade at the given price. Buys fail on insufficient cash, sells
    /// fail on insufficient shares, holds always succeed without mutation.
    pub fn apply_trade(&mut self, trade: &TradeRequest, price: i64) -> TradeRecord {
        let Some(account) = self.inner.get_mut(&trade.team_id) else {
            return TradeRecord::rejected(format!("unknown team {}", trade.team_id));
        };

        match trade.action {
            TradeAction::Buy => {
                //Quantities arrive from the wire unchecked, so the cost must not wrap
                let Some(cost) = price.checked_mul(trade.qty) else {
                    return TradeRecord::rejected(format!(
                        "{} order of {} {} is too large",
                        trade.team_id, trade.qty, trade.company
                    ));
                };
                if cost > account.cash {
                    return TradeRecord::rejected(format!(
                        "{} doesn't have enough cash",
                        trade.team_id
                    ));
                }
                account.cash -= cost;
                *account.holdings.entry(trade.company.clone()).or_insert(0) += trade.qty;
                info!(
                    "{} bought {} of {} @ {}",
                    trade.team_id, trade.qty, trade.company, price
                );
                TradeRecord::filled(format!(
                    "{} bought {} of {} @ {}",
                    trade.team_id, trade.qty, trade.company, price
                ))
            }
            TradeAction::Sell => {
                if trade.qty > account.qty(&trade.company) {
                    return TradeRecord::rejected(format!(
                        "{} doesn't own {} shares of {}",
                        trade.team_id, trade.qty, trade.company
                    ));
                }
                let proceeds = price.checked_mul(trade.qty);
                let Some(cash) = proceeds.and_then(|p| account.cash.checked_add(p)) else {
                    return TradeRecord::rejected(format!(
                        "{} order of {} {} is too large",
                        trade.team_id, trade.qty, trade.company
                    ));
                };
                account.cash = cash;
                *account.holdings.entry(trade.company.clone()).or_insert(0) -= trade.qty;
                info!(
                    "{} sold {} of {} @ {}",
                    trade.team_id, trade.qty, trade.company, price
                );
                TradeRecord::filled(format!(
                    "{} sold {} of {} @ {}",
                    trade.team_id, trade.qty, trade.company, price
                ))
            }
            TradeAction::Hold => TradeRecord::filled("Hold - no action"),
        }
    }
}
