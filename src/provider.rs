use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::feed::CatalogFeed;
use crate::rating::{self, RatingService};
use crate::state::{Delta, ProviderCommand};

/// Runs every network call off the UI thread. Commands are handled one at a time in arrival
/// order; the catalog is refreshed again whenever `refresh` passes without a command.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    feed: Box<dyn CatalogFeed>,
    rater: Box<dyn RatingService + Send>,
    refresh: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tracing::info!(source = feed.label(), "provider started");
        for cmd in [
            ProviderCommand::FetchCatalog,
            ProviderCommand::FetchBestXi,
            ProviderCommand::FetchInjuries,
            ProviderCommand::FetchTransfers,
            ProviderCommand::FetchCaptain,
        ] {
            if !handle_command(cmd, feed.as_ref(), rater.as_ref(), &tx) {
                return;
            }
        }

        loop {
            let cmd = match cmd_rx.recv_timeout(refresh) {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => ProviderCommand::FetchCatalog,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if !handle_command(cmd, feed.as_ref(), rater.as_ref(), &tx) {
                break;
            }
        }
        tracing::info!("provider stopped");
    })
}

/// Returns false once the UI side has hung up.
pub fn handle_command(
    cmd: ProviderCommand,
    feed: &dyn CatalogFeed,
    rater: &(dyn RatingService + Send),
    tx: &Sender<Delta>,
) -> bool {
    let delta = match cmd {
        ProviderCommand::FetchCatalog => match feed.players() {
            Ok(catalog) => {
                tracing::info!(
                    accepted = catalog.report.accepted,
                    rejected = catalog.report.rejected(),
                    "catalog fetched"
                );
                Delta::SetCatalog {
                    source: feed.label(),
                    catalog,
                }
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "catalog fetch failed");
                Delta::CatalogFailed(format!("{err:#}"))
            }
        },
        ProviderCommand::FetchBestXi => match feed.best_xi() {
            Ok(catalog) => Delta::SetBestXi(catalog.players),
            Err(err) => Delta::Log(format!("[WARN] Recommended XI error: {err:#}")),
        },
        ProviderCommand::FetchInjuries => match feed.injuries() {
            Ok(items) => Delta::SetInjuries(items),
            Err(err) => Delta::Log(format!("[WARN] Injuries error: {err:#}")),
        },
        ProviderCommand::FetchTransfers => match feed.transfers() {
            Ok(items) => Delta::SetTransfers(items),
            Err(err) => Delta::Log(format!("[WARN] Transfers error: {err:#}")),
        },
        ProviderCommand::FetchCaptain => match feed.captain() {
            Ok(pick) => Delta::SetCaptain(pick),
            Err(err) => Delta::CaptainFailed(format!("{err:#}")),
        },
        ProviderCommand::RateSquad { squad } => {
            let players = squad.member_ids();
            match rating::submit_squad(&squad, rater) {
                Ok(outcome) => {
                    tracing::info!(rating = outcome.rating, "squad rated");
                    Delta::Rated { players, outcome }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "rating failed");
                    Delta::RatingFailed {
                        players,
                        message: err.to_string(),
                    }
                }
            }
        }
    };
    tx.send(delta).is_ok()
}
