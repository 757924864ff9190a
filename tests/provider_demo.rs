use std::sync::mpsc;
use std::time::Duration;

use anyhow::anyhow;
use fpl_terminal::catalog::{CaptainPick, Catalog, Injury, TransferSuggestion};
use fpl_terminal::demo_data::DemoFeed;
use fpl_terminal::feed::CatalogFeed;
use fpl_terminal::logging;
use fpl_terminal::provider::{handle_command, spawn_provider};
use fpl_terminal::rating::OfflineRatingService;
use fpl_terminal::squad::Squad;
use fpl_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};

struct DownFeed;

impl CatalogFeed for DownFeed {
    fn label(&self) -> &'static str {
        "down"
    }
    fn players(&self) -> anyhow::Result<Catalog> {
        Err(anyhow!("http 503 Service Unavailable: maintenance"))
    }
    fn best_xi(&self) -> anyhow::Result<Catalog> {
        Err(anyhow!("http 503"))
    }
    fn injuries(&self) -> anyhow::Result<Vec<Injury>> {
        Err(anyhow!("http 503"))
    }
    fn transfers(&self) -> anyhow::Result<Vec<TransferSuggestion>> {
        Err(anyhow!("http 503"))
    }
    fn captain(&self) -> anyhow::Result<CaptainPick> {
        Err(anyhow!("No valid captain found"))
    }
}

fn demo() -> (DemoFeed, OfflineRatingService) {
    let feed = DemoFeed::new(26);
    let rater = OfflineRatingService::new(feed.all_players().to_vec());
    (feed, rater)
}

#[test]
fn demo_feed_fills_every_panel() {
    logging::init_test();
    let (feed, rater) = demo();
    let (tx, rx) = mpsc::channel();
    let mut state = AppState::new();

    for cmd in [
        ProviderCommand::FetchCatalog,
        ProviderCommand::FetchBestXi,
        ProviderCommand::FetchInjuries,
        ProviderCommand::FetchTransfers,
        ProviderCommand::FetchCaptain,
    ] {
        assert!(handle_command(cmd, &feed, &rater, &tx));
    }
    drop(tx);
    for delta in rx.iter() {
        apply_delta(&mut state, delta);
    }

    assert_eq!(state.players.len(), 300);
    assert_eq!(state.catalog_source, Some("demo"));
    assert_eq!(state.best_xi.len(), 11);
    assert_eq!(state.transfers.len(), 5);
    assert!(state.captain.is_some());
    assert!(state.injuries.iter().all(|i| !i.status.is_empty()));
}

#[test]
fn rating_round_trip_through_the_provider() {
    let (feed, rater) = demo();
    let (tx, rx) = mpsc::channel();
    let mut state = AppState::new();

    handle_command(ProviderCommand::FetchBestXi, &feed, &rater, &tx);
    apply_delta(&mut state, rx.recv().unwrap());
    state.apply_recommended().expect("demo XI is legal");

    let squad = state.begin_rating().expect("recommended XI is submittable");
    handle_command(ProviderCommand::RateSquad { squad }, &feed, &rater, &tx);
    apply_delta(&mut state, rx.recv().unwrap());

    let outcome = state.rating.expect("rating applied");
    assert!((0.0..=100.0).contains(&outcome.rating));
    assert!(state.rating_error.is_none());
}

#[test]
fn provider_refuses_an_incomplete_squad() {
    let (feed, rater) = demo();
    let (tx, rx) = mpsc::channel();
    let squad = Squad::new();

    handle_command(ProviderCommand::RateSquad { squad }, &feed, &rater, &tx);
    match rx.recv().unwrap() {
        Delta::RatingFailed { players, message } => {
            assert!(players.is_empty());
            assert!(message.contains("not ready"));
        }
        other => panic!("unexpected delta: {other:?}"),
    }
}

#[test]
fn feed_errors_become_warnings() {
    let (_, rater) = demo();
    let (tx, rx) = mpsc::channel();
    let mut state = AppState::new();

    handle_command(ProviderCommand::FetchCatalog, &DownFeed, &rater, &tx);
    handle_command(ProviderCommand::FetchInjuries, &DownFeed, &rater, &tx);
    handle_command(ProviderCommand::FetchCaptain, &DownFeed, &rater, &tx);
    drop(tx);
    for delta in rx.iter() {
        apply_delta(&mut state, delta);
    }

    assert!(state.players.is_empty());
    assert!(!state.catalog_loading);
    assert!(
        state
            .catalog_error
            .as_deref()
            .is_some_and(|e| e.contains("maintenance"))
    );
    assert_eq!(state.captain_error.as_deref(), Some("No valid captain found"));
    assert!(state.logs.iter().any(|l| l.contains("Injuries error")));
}

#[test]
fn handle_command_reports_a_closed_channel() {
    let (feed, rater) = demo();
    let (tx, rx) = mpsc::channel();
    drop(rx);
    assert!(!handle_command(ProviderCommand::FetchTransfers, &feed, &rater, &tx));
}

#[test]
fn spawned_provider_loads_on_start_and_stops_on_hangup() {
    let (feed, rater) = demo();
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider(
        tx,
        cmd_rx,
        Box::new(feed),
        Box::new(rater),
        Duration::from_secs(60),
    );

    let first = rx.recv_timeout(Duration::from_secs(5)).expect("startup catalog");
    assert!(matches!(first, Delta::SetCatalog { source: "demo", .. }));

    drop(cmd_tx);
    handle.join().expect("provider thread exits cleanly");
}
