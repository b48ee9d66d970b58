use maverick::input::price_table::{PriceTableBuilder, MAX_ROUND};
use maverick::input::roster::Roster;
use maverick::ledger::TradeRequest;
use maverick::session::SessionState;

fn setup() -> SessionState {
    let mut builder = PriceTableBuilder::new();
    builder.add_base_price("Acme", 40);
    builder.add_base_price("Bolt", 200);
    for round in 1..=MAX_ROUND {
        builder.add_price("Acme", round, 50 + i64::from(round) * 10);
        builder.add_price("Bolt", round, 200 - i64::from(round) * 5);
    }

    let mut roster = Roster::new();
    roster.add_team("T1", 10_000);
    roster.add_team("T2", 10_000);
    SessionState::new(builder.build(), &roster)
}

#[test]
fn test_that_a_full_session_keeps_the_ledger_consistent() {
    let mut session = setup();
    session.set_round(1).unwrap();

    // Round 1: Acme @ 60, Bolt @ 195
    session
        .enqueue_trade(TradeRequest::buy("T1", "Acme", 100))
        .unwrap();
    session
        .enqueue_trade(TradeRequest::buy("T2", "Bolt", 20))
        .unwrap();
    session.process_round().unwrap();

    // Round 2: Acme @ 70, T1 takes profit on half
    session
        .enqueue_trade(TradeRequest::sell("T1", "Acme", 50))
        .unwrap();
    session
        .enqueue_trade(TradeRequest::hold("T2", "Bolt"))
        .unwrap();
    session.process_round().unwrap();

    let t1 = session.ledger().account("T1").unwrap();
    assert_eq!(t1.cash, 10_000 - 100 * 60 + 50 * 70);
    assert_eq!(t1.qty("Acme"), 50);

    let t2 = session.ledger().account("T2").unwrap();
    assert_eq!(t2.cash, 10_000 - 20 * 195);
    assert_eq!(t2.qty("Bolt"), 20);

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.current_round(), 3);

    // Invariants hold for every team after every round
    for team_id in ["T1", "T2"] {
        let account = session.ledger().account(team_id).unwrap();
        assert!(account.cash >= 0);
        assert!(account.holdings.values().all(|qty| *qty >= 0));
    }
}

#[test]
fn test_that_portfolio_values_reconcile_with_history() {
    let mut session = setup();
    session.set_round(1).unwrap();
    session
        .enqueue_trade(TradeRequest::buy("T1", "Acme", 100))
        .unwrap();
    session.process_round().unwrap();

    let snapshot = &session.history()[0];
    // Bought 100 Acme @ 60 in round 1, valued at 60 in the same round
    assert_eq!(*snapshot.values.get("T1").unwrap(), 10_000);
    assert_eq!(*snapshot.values.get("T2").unwrap(), 10_000);

    session.recalculate_all().unwrap();
    let t1 = session.ledger().account("T1").unwrap();
    assert_eq!(
        t1.total_portfolio_value,
        t1.cash + t1.total_share_value
    );
    // Round advanced to 2 where Acme trades at 70
    assert_eq!(t1.total_share_value, 100 * 70);
}

#[test]
fn test_that_session_runs_through_the_last_round() {
    let mut session = setup();
    session.set_round(1).unwrap();

    for _ in 1..=MAX_ROUND {
        session
            .enqueue_trade(TradeRequest::buy("T1", "Acme", 1))
            .unwrap();
        session.process_round().unwrap();
    }

    assert_eq!(session.current_round(), MAX_ROUND);
    assert!(!session.has_next());
    assert_eq!(session.history().len(), usize::from(MAX_ROUND));
    assert_eq!(session.ledger().account("T1").unwrap().qty("Acme"), 7);
}
