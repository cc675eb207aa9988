//! Catalog access to the host's source member metadata.
//!
//! The catalog is a consumed collaborator: the orchestrator only needs
//! to enumerate libraries, source physical files, and members. Name
//! matching on the host is case-insensitive; the canonical form is
//! uppercase, and implementations return uppercase names.

use crate::error::Result;
use async_trait::async_trait;

/// A source member as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name (uppercase).
    pub name: String,
    /// Source type tag, e.g. `RPGLE` or `CLLE`. Becomes the stream
    /// file extension. Always non-empty for members the catalog
    /// reports.
    pub source_type: String,
}

/// Read-only queries against the host's member catalog.
///
/// A source physical file is *eligible* when it holds at least one
/// member with a non-empty source type; listing methods only report
/// eligible files and typed members.
///
/// Any error from these methods is an infrastructure failure: the run
/// aborts, since no scope can be resolved without the catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Whether the library exists on the system.
    async fn library_exists(&self, library: &str) -> Result<bool>;

    /// Whether an eligible source physical file by this name exists in
    /// the library.
    async fn source_file_exists(&self, library: &str, file: &str) -> Result<bool>;

    /// Eligible source physical files in the library, in lexicographic
    /// order.
    async fn list_source_files(&self, library: &str) -> Result<Vec<String>>;

    /// Members of a source physical file that carry a source type, in
    /// lexicographic order.
    async fn list_members(&self, library: &str, file: &str) -> Result<Vec<Member>>;
}
