//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
///
/// Precondition errors (bad scope, missing library/file/members) abort a
/// run before any transfer is dispatched. Catalog and IO errors are
/// infrastructure failures: the environment cannot support any work.
/// Per-member transfer failures are *not* errors - they are reported as
/// [`TransferOutcome::Failure`](crate::transfer::TransferOutcome) and
/// counted in the summary.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration or scope error (invalid YAML, missing fields,
    /// members specified without a source file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested library does not exist on the host.
    #[error("Library {0} does not exist on the system")]
    LibraryNotFound(String),

    /// The requested source physical file does not exist in the library
    /// (or has no members with a source type).
    #[error("Source file {file} does not exist in library {library}")]
    SourceFileNotFound {
        file: String,
        library: String,
        /// Eligible source files in the library, for diagnostics.
        available: Vec<String>,
    },

    /// One or more explicitly requested members do not exist.
    #[error("Members not found in {library}/{file}: {}", missing.join(", "))]
    MembersNotFound {
        file: String,
        library: String,
        missing: Vec<String>,
    },

    /// Catalog query or host connection error with context.
    #[error("Catalog error: {message}\n  Context: {context}")]
    Catalog { message: String, context: String },

    /// IO error (directory creation, config file reads).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Catalog error with context about where it occurred.
    pub fn catalog(message: impl Into<String>, context: impl Into<String>) -> Self {
        MigrateError::Catalog {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Whether this error is a precondition failure (bad request) as
    /// opposed to an infrastructure failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MigrateError::Config(_)
                | MigrateError::LibraryNotFound(_)
                | MigrateError::SourceFileNotFound { .. }
                | MigrateError::MembersNotFound { .. }
        )
    }

    /// Process exit code for this error.
    ///
    /// Precondition errors exit with 2, infrastructure errors with 3.
    pub fn exit_code(&self) -> u8 {
        if self.is_precondition() {
            2
        } else {
            3
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_not_found_lists_names() {
        let err = MigrateError::MembersNotFound {
            file: "QRPGSRC".into(),
            library: "PRODLIB".into(),
            missing: vec!["PGMX".into(), "PGMY".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("PGMX"));
        assert!(msg.contains("PGMY"));
        assert!(msg.contains("PRODLIB/QRPGSRC"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(MigrateError::LibraryNotFound("X".into()).is_precondition());
        assert!(MigrateError::Config("bad".into()).is_precondition());
        assert!(!MigrateError::catalog("down", "probe").is_precondition());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::LibraryNotFound("X".into()).exit_code(), 2);
        assert_eq!(MigrateError::catalog("down", "probe").exit_code(), 3);
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MigrateError::Io(io);
        let detail = err.format_detailed();
        assert!(detail.starts_with("Error: IO error"));
        assert!(detail.contains("denied"));
    }
}
