//! # What is Maverick?
//!
//! Maverick is a library and JSON server for running classroom trading simulations. An
//! administrator advances a fixed sequence of market rounds, queues buy/sell/hold trades
//! for teams, and the engine recomputes cash, holdings, and portfolio values against
//! per-round prices loaded from a CSV table.
//!
//! # Implementation
//!
//! A running simulation is composed of:
//! - An input, [PriceTable](crate::input::price_table::PriceTable), which maps
//!   (company, round) to a price and is immutable for the lifetime of a session. The
//!   table is loaded once at startup from a CSV source in [source](crate::source).
//! - A [Ledger](crate::ledger::Ledger) holding one account per team. The ledger owns all
//!   mutation of cash and holdings and applies one trade at a time against a price
//!   resolved by the caller.
//! - A [SessionState](crate::session::SessionState) which tracks the current round, the
//!   pending trade queue, and the per-round history of portfolio values. Processing a
//!   round drains the queue through the ledger and appends a snapshot.
//! - The server implementation of the dashboard returning JSON responses over the
//!   session, in [http](crate::http).
//! - The client implementation of the dashboard which provides a Rust API for the
//!   server, in [client](crate::client).
//!
//! In addition there is an offline cleaning pass in [clean](crate::clean) that
//! normalizes a raw (company, round, price) table before it is pivoted into the master
//! format the dashboard consumes.
//!
//! The session contains no native synchronization features. The server wraps it in a
//! Mutex and dispatches one administrator action at a time; two concurrent
//! administrators against the same session are not supported.
//!
//! ``
//! cargo run --bin dashboard_server_v1 [ipv4_address] [port] [master_csv] [teams_csv]
//! ``
pub mod clean;
pub mod client;
pub mod http;
pub mod input;
pub mod ledger;
pub mod session;
pub mod source;
