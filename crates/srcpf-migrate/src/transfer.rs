//! The per-member transfer contract.
//!
//! A transfer copies one source member to one stream file. The copy
//! itself is an opaque host operation with fixed conversion policy:
//! the stream file is written as UTF-8 (CCSID 1208) with LF line
//! endings, replacing any existing file. The core only depends on the
//! success/failure contract - a failed member never aborts its
//! siblings.

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Stream file CCSID: UTF-8.
pub const UTF8_CCSID: &str = "1208";

/// One fully resolved unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTarget {
    /// Library name (uppercase).
    pub library: String,
    /// Source physical file name (uppercase).
    pub source_file: String,
    /// Member name (uppercase).
    pub member: String,
    /// Source type tag; becomes the file extension.
    pub source_type: String,
    /// Destination stream file path.
    pub destination: PathBuf,
}

impl MigrationTarget {
    /// Qualified member path on the host,
    /// `/QSYS.lib/{LIB}.lib/{FILE}.file/{MBR}.mbr`.
    pub fn qualified_member(&self) -> String {
        format!(
            "/QSYS.lib/{}.lib/{}.file/{}.mbr",
            self.library, self.source_file, self.member
        )
    }

    /// `FILE/MEMBER.TYPE` label used in log lines.
    pub fn label(&self) -> String {
        format!(
            "{}/{}.{}",
            self.source_file, self.member, self.source_type
        )
    }
}

/// Outcome of a single member transfer.
///
/// Failures are data, not control flow: the executor converts every
/// internal error into `Failure` and the orchestrator counts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    Failure(String),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }
}

/// Executes member-to-stream-file copies.
#[async_trait]
pub trait Copier: Send + Sync {
    /// Copy one member to its destination path.
    ///
    /// Implementations must not return transfer failures as errors;
    /// a failed copy is reported through the outcome. The destination
    /// directory is guaranteed to exist before this is called.
    async fn copy(&self, target: &MigrationTarget) -> Result<TransferOutcome>;
}

/// Build the `CPYTOSTMF` CL command for a target.
///
/// The conversion policy is fixed: replace the destination, write
/// CCSID 1208 (UTF-8), normalize line endings to LF.
pub fn cpytostmf_command(target: &MigrationTarget) -> String {
    format!(
        "CPYTOSTMF FROMMBR('{}') TOSTMF('{}') \
         STMFOPT(*REPLACE) STMFCCSID({}) ENDLINFMT(*LF)",
        target.qualified_member(),
        target.destination.display(),
        UTF8_CCSID
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> MigrationTarget {
        MigrationTarget {
            library: "PRODLIB".into(),
            source_file: "QRPGSRC".into(),
            member: "PGM1".into(),
            source_type: "RPGLE".into(),
            destination: PathBuf::from("/home/u1/sources/PRODLIB/QRPGSRC/PGM1.RPGLE"),
        }
    }

    #[test]
    fn test_qualified_member_path() {
        assert_eq!(
            target().qualified_member(),
            "/QSYS.lib/PRODLIB.lib/QRPGSRC.file/PGM1.mbr"
        );
    }

    #[test]
    fn test_cpytostmf_command() {
        let cmd = cpytostmf_command(&target());
        assert_eq!(
            cmd,
            "CPYTOSTMF FROMMBR('/QSYS.lib/PRODLIB.lib/QRPGSRC.file/PGM1.mbr') \
             TOSTMF('/home/u1/sources/PRODLIB/QRPGSRC/PGM1.RPGLE') \
             STMFOPT(*REPLACE) STMFCCSID(1208) ENDLINFMT(*LF)"
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(target().label(), "QRPGSRC/PGM1.RPGLE");
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(TransferOutcome::Success.is_success());
        assert!(!TransferOutcome::Failure("CPF2817".into()).is_success());
    }
}
