//! # srcpf-migrate
//!
//! Migrates IBM i source physical file members to stream files.
//!
//! The library walks a library / source physical file / member
//! hierarchy, mirrors it as a directory tree, and copies each member
//! to a stream file named `MEMBER.TYPE`, with support for:
//!
//! - **Scoped runs**: a whole library, one source file, or an explicit
//!   member list
//! - **Concurrent transfers** bounded by a configurable worker count
//! - **Per-member failure isolation** - one bad member never stops the
//!   batch
//! - **Graceful cancellation** that drains in-flight transfers
//!
//! ## Example
//!
//! ```rust,no_run
//! use srcpf_migrate::{MigrationRequest, Orchestrator};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(catalog: Arc<dyn srcpf_migrate::Catalog>, copier: Arc<dyn srcpf_migrate::Copier>) -> srcpf_migrate::Result<()> {
//! let orchestrator = Orchestrator::new(catalog, copier, Default::default());
//! let request = MigrationRequest {
//!     library: "PRODLIB".into(),
//!     output_root: "sources".into(),
//!     ..Default::default()
//! };
//! let summary = orchestrator.run(request, CancellationToken::new()).await?;
//! println!("Migrated {} members", summary.members_migrated);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod host;
pub mod mirror;
pub mod orchestrator;
pub mod query;
pub mod transfer;
pub mod validate;

// Re-exports for convenient access
pub use catalog::{Catalog, Member};
pub use config::{Config, HostConfig, MigrationConfig};
pub use error::{MigrateError, Result};
pub use orchestrator::{MigrationRequest, MigrationSummary, Orchestrator};
pub use transfer::{Copier, MigrationTarget, TransferOutcome};

#[cfg(feature = "odbc")]
pub use host::OdbcHost;
