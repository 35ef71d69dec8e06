/// Crate-level error types for refsift.
use std::path::PathBuf;

/// All errors in refsift carry enough context to produce a useful
/// diagnostic without a debugger. None of them are fatal to the serve
/// loop: oracle failures degrade to `Unknown` classifications and tree
/// failures clear the view instead of leaving it stale.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An inbound protocol message could not be understood.
    #[error("invalid message: {reason}")]
    InvalidMessage {
        /// Description of the malformation.
        reason: String,
    },

    /// Underlying I/O error from the filesystem or a pipe.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization or deserialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A preview was requested before any reference set with an origin
    /// was stored.
    #[error("no origin context stored for preview")]
    MissingOrigin,

    /// The external highlight oracle failed or returned nothing usable.
    #[error("oracle unavailable: {reason}")]
    OracleUnavailable {
        /// Description of the transport or protocol failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A reference list could not be rendered as a tree.
    #[error("tree build failed for {}: {reason}", path.display())]
    TreeBuild {
        /// The path that broke the tree structure.
        path: PathBuf,
        /// Description of the structural problem.
        reason: String,
    },
}
