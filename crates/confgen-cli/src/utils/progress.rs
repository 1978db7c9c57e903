use confgen::engine::progress::{Progress, ProgressCallback, TrialFailure};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug, Default)]
struct TrialTally {
    started: usize,
    failed: usize,
    accepted: usize,
}

/// Spinner that follows the trial loop.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: ProgressBar,
    tally: Arc<Mutex<TrialTally>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner()
            .with_style(Self::spinner_style())
            .with_message("Preparing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        Self {
            pb,
            tally: Arc::new(Mutex::new(TrialTally::default())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        let tally = self.tally.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut tally) = tally.lock() else {
                warn!("Progress tally mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::TrialStart { trial } => {
                    tally.started = trial;
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                }
                Progress::TrialFailed { trial, reason } => {
                    tally.failed += 1;
                    pb.set_message(format!(
                        "Trial {} failed ({})",
                        trial,
                        describe_failure(reason)
                    ));
                    return;
                }
                Progress::ConformerAccepted { trial, energy } => {
                    tally.accepted += 1;
                    pb.println(format!(
                        "  ✓ Trial {}: conformer accepted at {:.4} kcal/mol",
                        trial, energy
                    ));
                }
                Progress::Message(msg) => {
                    pb.set_message(msg);
                    return;
                }
            }
            pb.set_message(format!(
                "Trial {} ({} accepted, {} failed)",
                tally.started, tally.accepted, tally.failed
            ));
        })
    }

    pub fn finish(&self) {
        let summary = match self.tally.lock() {
            Ok(t) => format!("✓ {} trial(s), {} accepted", t.started, t.accepted),
            Err(_) => "✓ Done".to_string(),
        };
        self.pb.disable_steady_tick();
        self.pb.finish_with_message(summary);
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_failure(reason: TrialFailure) -> &'static str {
    match reason {
        TrialFailure::EmbeddingFailed => "embedding did not converge",
        TrialFailure::NonFiniteEnergy => "non-finite energy",
        TrialFailure::AtomConfigurationMismatch => "wrong atom configuration",
        TrialFailure::BondConfigurationMismatch => "wrong bond configuration",
        TrialFailure::OutsideEnergyWindow => "outside energy window",
    }
}
