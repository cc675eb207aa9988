//! Scope validation against the catalog.
//!
//! Validation is all-or-nothing and runs before any directory is
//! created or any transfer is dispatched: a request naming anything
//! the host does not have fails fast with the missing identifiers.

use crate::catalog::{Catalog, Member};
use crate::error::{MigrateError, Result};
use tracing::warn;

/// The scratch library, always considered valid without a lookup.
pub const SCRATCH_LIBRARY: &str = "QTEMP";

/// Check that the library exists on the system.
pub async fn validate_library(catalog: &dyn Catalog, library: &str) -> Result<()> {
    if library == SCRATCH_LIBRARY {
        return Ok(());
    }
    if !catalog.library_exists(library).await? {
        return Err(MigrateError::LibraryNotFound(library.to_string()));
    }
    Ok(())
}

/// Check that an eligible source physical file exists in the library.
///
/// On failure the error carries the library's eligible files as a
/// diagnostic, and they are logged; they are not used for control
/// flow.
pub async fn validate_source_file(
    catalog: &dyn Catalog,
    library: &str,
    file: &str,
) -> Result<()> {
    if catalog.source_file_exists(library, file).await? {
        return Ok(());
    }

    let available = catalog.list_source_files(library).await.unwrap_or_default();
    if available.is_empty() {
        warn!("Library {} has no eligible source files", library);
    } else {
        warn!(
            "Source files available in {}: {}",
            library,
            available.join(", ")
        );
    }

    Err(MigrateError::SourceFileNotFound {
        file: file.to_string(),
        library: library.to_string(),
        available,
    })
}

/// Check that every requested member exists in the file's member list.
///
/// `requested` must already be canonicalized to uppercase; catalog
/// names are uppercase, so the comparison is case-insensitive by
/// construction. A single missing name fails the whole request - no
/// silent subset migration.
pub fn validate_members(
    requested: &[String],
    existing: &[Member],
    library: &str,
    file: &str,
) -> Result<()> {
    let missing: Vec<String> = requested
        .iter()
        .filter(|name| !existing.iter().any(|m| m.name == **name))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(MigrateError::MembersNotFound {
            file: file.to_string(),
            library: library.to_string(),
            missing,
        });
    }

    Ok(())
}
