/// Why a single trial did not yield a conformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialFailure {
    EmbeddingFailed,
    NonFiniteEnergy,
    AtomConfigurationMismatch,
    BondConfigurationMismatch,
    OutsideEnergyWindow,
}

#[derive(Debug, Clone)]
pub enum Progress {
    TrialStart { trial: usize },
    TrialFailed { trial: usize, reason: TrialFailure },
    ConformerAccepted { trial: usize, energy: f64 },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Polled at every timeout checkpoint; returning `true` stops the generation call.
pub type AbortCallback<'a> = Box<dyn Fn() -> bool + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
    abort: Option<AbortCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
            abort: None,
        }
    }

    pub fn with_abort(mut self, abort: AbortCallback<'a>) -> Self {
        self.abort = Some(abort);
        self
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    #[inline]
    pub fn should_abort(&self) -> bool {
        self.abort.as_ref().is_some_and(|abort| abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::TrialStart { trial } = event {
                seen.lock().unwrap().push(trial);
            }
        }));
        reporter.report(Progress::TrialStart { trial: 1 });
        reporter.report(Progress::Message("ignored".into()));
        reporter.report(Progress::TrialStart { trial: 2 });
        drop(reporter);
        assert_eq!(seen.into_inner().unwrap(), vec![1, 2]);
    }

    #[test]
    fn abort_defaults_to_false() {
        assert!(!ProgressReporter::new().should_abort());
        let reporter = ProgressReporter::new().with_abort(Box::new(|| true));
        assert!(reporter.should_abort());
    }
}
