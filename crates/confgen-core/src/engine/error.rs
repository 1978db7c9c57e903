use crate::core::forcefield::parameterization::ParameterizationError;
use std::time::Duration;
use thiserror::Error;

/// Plain exit status of a generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    Success,
    Uninitialized,
    MaxNumTrialsExceeded,
    TimeoutExceeded,
    ForcefieldSetupFailed,
    ForcefieldMinimizationFailed,
    Aborted,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Structure generator was used before setup")]
    Uninitialized,

    #[error("No valid structure found within {trials} trials")]
    MaxNumTrialsExceeded { trials: usize },

    #[error("Timeout exceeded after {elapsed:?} without a valid structure")]
    TimeoutExceeded { elapsed: Duration },

    #[error("Force-field setup failed: {source}")]
    ForcefieldSetupFailed {
        #[from]
        source: ParameterizationError,
    },

    #[error("Force-field minimization produced a non-finite energy in trial {trial}")]
    ForcefieldMinimizationFailed { trial: usize },

    #[error("Generation aborted by caller")]
    Aborted,
}

impl GenerationError {
    pub fn code(&self) -> ReturnCode {
        match self {
            Self::Uninitialized => ReturnCode::Uninitialized,
            Self::MaxNumTrialsExceeded { .. } => ReturnCode::MaxNumTrialsExceeded,
            Self::TimeoutExceeded { .. } => ReturnCode::TimeoutExceeded,
            Self::ForcefieldSetupFailed { .. } => ReturnCode::ForcefieldSetupFailed,
            Self::ForcefieldMinimizationFailed { .. } => ReturnCode::ForcefieldMinimizationFailed,
            Self::Aborted => ReturnCode::Aborted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_return_codes() {
        assert_eq!(GenerationError::Uninitialized.code(), ReturnCode::Uninitialized);
        assert_eq!(
            GenerationError::MaxNumTrialsExceeded { trials: 3 }.code(),
            ReturnCode::MaxNumTrialsExceeded
        );
        let setup: GenerationError = ParameterizationError::NoAtoms.into();
        assert_eq!(setup.code(), ReturnCode::ForcefieldSetupFailed);
        assert!(setup.to_string().contains("without atoms"));
    }
}
