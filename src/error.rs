//! Error taxonomy for one analysis run.
//!
//! Only failures that leave the pipeline with no graph at all are modeled
//! here. Recovered failures (unreadable files, malformed model output) are
//! logged and folded into the output instead.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error type returned by port traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The repository could not be fetched (auth, not found, network).
    #[error("failed to retrieve {url}: {reason}")]
    Retrieval {
        /// Repository URL that was requested.
        url: String,
        /// Collaborator-reported reason.
        reason: String,
    },

    /// A bounded external call exceeded its deadline.
    #[error("{stage} timed out after {secs}s")]
    Timeout {
        /// Pipeline stage that timed out.
        stage: &'static str,
        /// Configured limit in seconds.
        secs: u64,
    },

    /// The scratch workspace for a checkout could not be prepared.
    #[error("cannot prepare workspace {path}: {reason}")]
    Workspace {
        /// Directory that could not be created or listed.
        path: PathBuf,
        /// Underlying I/O reason.
        reason: String,
    },

    /// The persistence collaborator rejected a read or write.
    #[error("store error: {reason}")]
    Store {
        /// Underlying reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_message_names_url() {
        let err = AnalysisError::Retrieval {
            url: "https://github.com/acme/app".into(),
            reason: "repository not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to retrieve https://github.com/acme/app: repository not found"
        );
    }

    #[test]
    fn timeout_message_names_stage() {
        let err = AnalysisError::Timeout { stage: "clone", secs: 30 };
        assert_eq!(err.to_string(), "clone timed out after 30s");
    }
}
