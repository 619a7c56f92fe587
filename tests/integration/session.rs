//! End-to-end games against the simulated server.

use skysmuggler::config::AppConfig;
use skysmuggler::engine::session::SessionRunner;
use skysmuggler::storage;
use skysmuggler::types::{CargoKind, Hold, Intent, Market, Planet};

use crate::mock_server::{start_state, SimulatedServer};

fn temp_log() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("skysmuggler_test_it_{}.txt", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

fn config(score_log: &str, games: u32, seed: u64) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.agent.score_log = score_log.to_string();
    cfg.agent.games_to_play = games;
    cfg.agent.seed = Some(seed);
    cfg
}

fn runner(server: &SimulatedServer, cfg: &AppConfig) -> SessionRunner {
    SessionRunner::new(Box::new(server.clone()), cfg)
}

fn cleanup(path: &str) {
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_repays_loan_in_full_at_loan_market() {
    let mut start = start_state(Planet::Umbriel, 6_000, 1);
    start.loan_balance = 5_000;
    let server = SimulatedServer::new(start);

    let log = temp_log();
    let report = runner(&server, &config(&log, 1, 1)).run().await.unwrap();

    assert_eq!(server.calls(), vec![Intent::RepayLoan { amount: 5_000 }]);
    assert_eq!(server.current_state().loan_balance, 0);
    assert_eq!(report.games[0].score, 1_000);
    assert_eq!(storage::read_scores(Some(&log)).unwrap(), vec![1_000]);
    cleanup(&log);
}

#[tokio::test]
async fn test_buys_bays_with_surplus_and_refills_them() {
    // 500 metal at 650 leaves exactly 4000 credits for the shipyard.
    let mut start = start_state(Planet::Taspra, 329_000, 5);
    start.total_bays = 500;
    let server = SimulatedServer::new(start)
        .with_market(Planet::Taspra, Market::from_prices([(CargoKind::Metal, 650)]));

    let log = temp_log();
    runner(&server, &config(&log, 1, 2)).run().await.unwrap();

    let calls = server.calls();
    assert_eq!(
        &calls[..3],
        &[
            Intent::Buy {
                kind: CargoKind::Metal,
                quantity: 500
            },
            Intent::BuyBays { quantity: 2 },
            Intent::Buy {
                kind: CargoKind::Metal,
                quantity: 2
            },
        ]
    );
    assert!(server.current_state().total_bays >= 502);
    cleanup(&log);
}

#[tokio::test]
async fn test_never_flies_metal_to_pertia() {
    for seed in 0..25 {
        let mut start = start_state(Planet::Caliban, 20_000, 2);
        start.total_bays = 1_000;
        let server = SimulatedServer::new(start)
            .with_market(Planet::Caliban, Market::from_prices([(CargoKind::Metal, 400)]));

        let log = temp_log();
        runner(&server, &config(&log, 1, seed)).run().await.unwrap();

        let calls = server.calls();
        assert_eq!(
            calls[0],
            Intent::Buy {
                kind: CargoKind::Metal,
                quantity: 50
            }
        );
        let destination = calls
            .iter()
            .find_map(|c| match c {
                Intent::Travel { to } => Some(*to),
                _ => None,
            })
            .unwrap();
        assert_ne!(destination, Planet::Pertia, "seed {seed}");
        assert!(
            matches!(destination, Planet::Taspra | Planet::Setebos),
            "seed {seed} explored to {destination}"
        );
        assert!(server.rejections().is_empty());
        cleanup(&log);
    }
}

#[tokio::test]
async fn test_last_turn_liquidates_and_records_score() {
    let mut start = start_state(Planet::Earth, 1_000, 1);
    start.current_hold = Hold::from_quantities([(CargoKind::Water, 10)]);
    start.used_bays = 10;
    start.bank_balance = 500;
    start.loan_balance = 200;
    let server = SimulatedServer::new(start);

    let log = temp_log();
    let report = runner(&server, &config(&log, 1, 3)).run().await.unwrap();

    assert_eq!(
        server.calls(),
        vec![
            Intent::Sell {
                kind: CargoKind::Water,
                quantity: 10
            },
            Intent::Withdraw { amount: 500 },
            Intent::Deposit { amount: 186_500 },
        ]
    );
    // 10 water at 18500 plus 1000 credits and 500 withdrawn, all banked.
    assert_eq!(report.games[0].score, 186_300);
    assert_eq!(report.games[0].turns_played, 1);
    assert_eq!(storage::read_scores(Some(&log)).unwrap(), vec![186_300]);
    assert_eq!(
        server.submitted_scores(),
        vec![("sim-1".to_string(), 186_300)]
    );
    assert!(server.names().is_empty());
    cleanup(&log);
}

#[tokio::test]
async fn test_full_session_plays_every_game() {
    let mut start = start_state(Planet::Earth, 20_000, 20);
    start.loan_balance = 5_000;
    let server = SimulatedServer::new(start);

    let log = temp_log();
    let report = runner(&server, &config(&log, 3, 42)).run().await.unwrap();

    assert_eq!(report.games_played(), 3);
    assert_eq!(report.games_failed, 0);
    assert_eq!(server.games_started(), 3);

    let logged = storage::read_scores(Some(&log)).unwrap();
    let submitted: Vec<i64> = server
        .submitted_scores()
        .into_iter()
        .map(|(_, score)| score)
        .collect();
    let reported: Vec<i64> = report.games.iter().map(|g| g.score).collect();
    assert_eq!(logged, submitted);
    assert_eq!(logged, reported);

    // Fuel is bought without a credit check; everything else must be legal.
    let illegal: Vec<_> = server
        .rejections()
        .into_iter()
        .filter(|(intent, _)| !matches!(intent, Intent::BuyFuel { .. }))
        .collect();
    assert!(illegal.is_empty(), "rejected: {illegal:?}");

    let s = server.current_state();
    assert!(s.used_bays <= s.total_bays);
    assert!(s.total_bays <= 1_000);
    assert!(s.current_hold.is_empty());
    cleanup(&log);
}

#[tokio::test]
async fn test_same_seed_plays_the_same_game() {
    let mut routes = Vec::new();
    for _ in 0..2 {
        let server = SimulatedServer::new(start_state(Planet::Pertia, 20_000, 12));
        let log = temp_log();
        runner(&server, &config(&log, 1, 7)).run().await.unwrap();
        routes.push(server.calls());
        cleanup(&log);
    }
    assert_eq!(routes[0], routes[1]);
}

#[tokio::test]
async fn test_high_score_claims_display_name() {
    let server = SimulatedServer::new(start_state(Planet::Caliban, 20_000, 1));
    server.set_score_message("New high score!");

    let log = temp_log();
    let report = runner(&server, &config(&log, 1, 4)).run().await.unwrap();

    assert_eq!(report.high_scores(), 1);
    assert_eq!(
        server.names(),
        vec![("sim-1".to_string(), "El Capitan".to_string())]
    );
    cleanup(&log);
}

#[tokio::test]
async fn test_rejected_purchase_is_reconciled() {
    let server = SimulatedServer::new(start_state(Planet::Caliban, 20_000, 1))
        .with_market(Planet::Caliban, Market::from_prices([(CargoKind::Metal, 400)]));
    server.reject_next_buys(1);

    let log = temp_log();
    let report = runner(&server, &config(&log, 1, 5)).run().await.unwrap();

    let rejections = server.rejections();
    assert_eq!(rejections.len(), 1);
    assert!(matches!(rejections[0].0, Intent::Buy { .. }));
    assert!(server.state_fetches() >= 1);
    assert_eq!(report.games[0].score, 20_000);
    assert_eq!(storage::read_scores(Some(&log)).unwrap(), vec![20_000]);
    cleanup(&log);
}

#[tokio::test]
async fn test_repeated_travel_refusal_abandons_game() {
    let mut start = start_state(Planet::Caliban, 20_000, 10);
    start.total_bays = 1_000;
    let server = SimulatedServer::new(start);
    server.block_travel();

    let log = temp_log();
    let mut cfg = config(&log, 1, 6);
    cfg.agent.max_stalled_turns = 3;
    let err = runner(&server, &cfg).run().await.unwrap_err();

    assert!(format!("{err:#}").contains("Travel stalled"));
    let travels = server
        .calls()
        .iter()
        .filter(|c| matches!(c, Intent::Travel { .. }))
        .count();
    assert_eq!(travels, 3);
    assert!(storage::read_scores(Some(&log)).unwrap().is_empty());
    assert!(server.submitted_scores().is_empty());
    cleanup(&log);
}

#[tokio::test]
async fn test_unreachable_server_fails_session() {
    let server = SimulatedServer::new(start_state(Planet::Earth, 20_000, 20));
    server.set_error("connection refused");

    let log = temp_log();
    let err = runner(&server, &config(&log, 2, 8)).run().await.unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("Every game in the session failed"));
    assert!(msg.contains("connection refused"));
    assert_eq!(server.games_started(), 0);
    cleanup(&log);
}
