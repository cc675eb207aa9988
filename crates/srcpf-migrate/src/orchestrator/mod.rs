//! Migration orchestrator - main workflow coordinator.
//!
//! A run moves through validation, enumeration, directory mirroring,
//! concurrent dispatch, and summary aggregation. Precondition and
//! infrastructure failures abort before any transfer is dispatched;
//! per-member failures are counted and never interrupt the batch.

use crate::catalog::Catalog;
use crate::config::MigrationConfig;
use crate::error::{MigrateError, Result};
use crate::mirror;
use crate::transfer::{Copier, MigrationTarget, TransferOutcome};
use crate::validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The requested migration scope.
///
/// Names are canonicalized (trimmed, uppercased, de-duplicated) before
/// validation; matching against the host is case-insensitive as a
/// result.
#[derive(Debug, Clone, Default)]
pub struct MigrationRequest {
    /// Source library.
    pub library: String,

    /// Restrict to one source physical file.
    pub source_file: Option<String>,

    /// Restrict to these members; requires `source_file`.
    pub members: Vec<String>,

    /// Output root; absolute, or relative to the user's home
    /// directory.
    pub output_root: String,
}

impl MigrationRequest {
    /// Canonicalize names and reject conflicting scopes.
    fn canonicalized(self) -> Result<Self> {
        let library = self.library.trim().to_uppercase();
        if library.is_empty() {
            return Err(MigrateError::Config("library is required".into()));
        }

        let source_file = self
            .source_file
            .as_deref()
            .map(|f| f.trim().to_uppercase())
            .filter(|f| !f.is_empty());

        let mut members: Vec<String> = Vec::new();
        for member in &self.members {
            let member = member.trim().to_uppercase();
            if !member.is_empty() && !members.contains(&member) {
                members.push(member);
            }
        }

        if !members.is_empty() && source_file.is_none() {
            return Err(MigrateError::Config(
                "members can only be specified together with a source file".into(),
            ));
        }

        Ok(Self {
            library,
            source_file,
            members,
            output_root: self.output_root.trim().to_string(),
        })
    }
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: `completed` or `cancelled`.
    pub status: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Source physical files processed (counted at dispatch, not at
    /// error-free completion).
    pub source_files_migrated: usize,

    /// Members successfully copied.
    pub members_migrated: usize,

    /// Members that failed to copy.
    pub errors: usize,

    /// `FILE/MEMBER.TYPE` labels of failed members.
    pub failed_members: Vec<String>,

    /// Destination paths of successfully copied members.
    pub migrated_paths: Vec<String>,
}

impl MigrationSummary {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Migration orchestrator.
pub struct Orchestrator {
    catalog: Arc<dyn Catalog>,
    copier: Arc<dyn Copier>,
    config: MigrationConfig,
}

impl Orchestrator {
    /// Create a new orchestrator over a catalog and a copier.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        copier: Arc<dyn Copier>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            catalog,
            copier,
            config,
        }
    }

    /// Run the migration.
    ///
    /// Returns a summary once every dispatched transfer has finished.
    /// Cancellation stops dispatching new work but in-flight transfers
    /// are drained before the summary is produced.
    pub async fn run(
        &self,
        request: MigrationRequest,
        cancel: CancellationToken,
    ) -> Result<MigrationSummary> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let request = request.canonicalized()?;
        let output_root = mirror::resolve_output_root(&request.output_root)?;

        info!(
            "Starting migration run {}: library {} -> {}",
            run_id,
            request.library,
            output_root.display()
        );

        // Phase 1: Validate scope
        validate::validate_library(self.catalog.as_ref(), &request.library).await?;
        if let Some(ref file) = request.source_file {
            validate::validate_source_file(self.catalog.as_ref(), &request.library, file).await?;
        }

        // Phase 2: Enumerate targets
        let groups = self.enumerate(&request, &output_root).await?;
        let total_targets: usize = groups.iter().map(|(_, t)| t.len()).sum();
        info!(
            "Enumerated {} members across {} source files",
            total_targets,
            groups.len()
        );

        // Phase 3: Mirror directories and dispatch transfers.
        // Directory creation is a sequential prerequisite per source
        // file; the member copies within and across files run
        // concurrently, bounded by the worker semaphore.
        let workers = self.config.get_workers();
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles: Vec<(String, JoinHandle<(MigrationTarget, TransferOutcome)>)> =
            Vec::new();

        let mut source_files_migrated = 0;
        let mut fatal: Option<MigrateError> = None;
        let mut cancelled = false;

        'files: for (file, targets) in groups {
            if cancel.is_cancelled() {
                warn!("Cancellation requested, no further source files dispatched");
                cancelled = true;
                break;
            }

            let dir = output_root.join(&request.library).join(&file);
            if let Err(e) = mirror::ensure(&dir).await {
                // The environment cannot support further work; stop
                // dispatching but drain what is already in flight.
                fatal = Some(e);
                break;
            }
            info!("Migrating source file {}/{}", request.library, file);

            for target in targets {
                if cancel.is_cancelled() {
                    warn!("Cancellation requested, no further members dispatched");
                    cancelled = true;
                    break 'files;
                }

                let permit = semaphore.clone().acquire_owned().await.unwrap();
                let copier = self.copier.clone();
                let label = target.label();

                let handle = tokio::spawn(async move {
                    let outcome = match copier.copy(&target).await {
                        Ok(outcome) => outcome,
                        Err(e) => TransferOutcome::Failure(e.to_string()),
                    };
                    drop(permit);
                    (target, outcome)
                });

                handles.push((label, handle));
            }

            // Counted once all of the file's members are dispatched.
            source_files_migrated += 1;
        }

        // Phase 4: Await every dispatched transfer
        let mut members_migrated = 0;
        let mut errors = 0;
        let mut failed_members = Vec::new();
        let mut migrated_paths = Vec::new();

        for (label, handle) in handles {
            match handle.await {
                Ok((target, TransferOutcome::Success)) => {
                    info!("Migrated {}: OK", label);
                    members_migrated += 1;
                    migrated_paths.push(target.destination.display().to_string());
                }
                Ok((_, TransferOutcome::Failure(reason))) => {
                    error!("Could not migrate {}: {}", label, reason);
                    errors += 1;
                    failed_members.push(label);
                }
                Err(e) => {
                    error!("{}: transfer task panicked - {}", label, e);
                    errors += 1;
                    failed_members.push(label);
                }
            }
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let status = if cancelled { "cancelled" } else { "completed" };

        let summary = MigrationSummary {
            run_id,
            status: status.to_string(),
            started_at,
            completed_at,
            duration_seconds: duration,
            source_files_migrated,
            members_migrated,
            errors,
            failed_members,
            migrated_paths,
        };

        info!(
            "Migration {}: {} source files, {} members, {} errors in {:.2}s",
            summary.status,
            summary.source_files_migrated,
            summary.members_migrated,
            summary.errors,
            summary.duration_seconds
        );

        Ok(summary)
    }

    /// Resolve the scope into per-file target groups.
    ///
    /// One path covers all three scopes: whole library, one source
    /// file, one source file with an explicit member list. Files that
    /// contribute no targets are omitted, not errors.
    async fn enumerate(
        &self,
        request: &MigrationRequest,
        output_root: &Path,
    ) -> Result<Vec<(String, Vec<MigrationTarget>)>> {
        let files = match request.source_file {
            Some(ref file) => vec![file.clone()],
            None => self.catalog.list_source_files(&request.library).await?,
        };

        let mut groups = Vec::with_capacity(files.len());
        for file in files {
            let members = self.catalog.list_members(&request.library, &file).await?;

            let selected = if request.members.is_empty() {
                members
            } else {
                validate::validate_members(&request.members, &members, &request.library, &file)?;
                members
                    .into_iter()
                    .filter(|m| request.members.contains(&m.name))
                    .collect()
            };

            if selected.is_empty() {
                continue;
            }

            let dir = output_root.join(&request.library).join(&file);
            let targets = selected
                .into_iter()
                .map(|m| MigrationTarget {
                    library: request.library.clone(),
                    source_file: file.clone(),
                    destination: dir.join(format!("{}.{}", m.name, m.source_type)),
                    member: m.name,
                    source_type: m.source_type,
                })
                .collect();

            groups.push((file, targets));
        }

        Ok(groups)
    }
}
