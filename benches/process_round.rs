use criterion::{criterion_group, criterion_main, Criterion};

use maverick::input::price_table::{PriceTableBuilder, MAX_ROUND};
use maverick::input::roster::Roster;
use maverick::ledger::TradeRequest;
use maverick::session::SessionState;

fn session_core_loop_test() {
    let mut builder = PriceTableBuilder::new();
    for company in ["ABC", "BCD", "CDE", "DEF"] {
        builder.add_base_price(company, 100);
        for round in 1..=MAX_ROUND {
            builder.add_price(company, round, 100 + i64::from(round));
        }
    }

    let mut roster = Roster::new();
    for team in ["T1", "T2", "T3", "T4", "T5"] {
        roster.add_team(team, 1_000_000);
    }

    let mut session = SessionState::new(builder.build(), &roster);
    session.set_round(1).unwrap();

    for _ in 1..=MAX_ROUND {
        for team in ["T1", "T2", "T3", "T4", "T5"] {
            session
                .enqueue_trade(TradeRequest::buy(team, "ABC", 10))
                .unwrap();
            session
                .enqueue_trade(TradeRequest::sell(team, "ABC", 5))
                .unwrap();
        }
        session.process_round().unwrap();
    }
}

fn benchmarks(c: &mut Criterion) {
    c.bench_function("session core loop", |b| b.iter(session_core_loop_test));
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
