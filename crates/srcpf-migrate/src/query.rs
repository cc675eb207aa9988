//! SQL construction for the Db2 for i member catalog.
//!
//! All metadata comes from `QSYS2.SYSPARTITIONSTAT`. Name columns are
//! cast to the invariant EBCDIC CCSID so they compare and sort
//! consistently regardless of the job CCSID. Eligibility is
//! `TRIM(SOURCE_TYPE) <> ''`: a physical file partition without a
//! source type is data, not source, and is never enumerated.

/// Invariant EBCDIC CCSID used for catalog name casts.
pub const INVARIANT_CCSID: &str = "37";

/// Escape a SQL string literal value by doubling single quotes.
pub fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Existence probe for a library: any partition row in the schema.
pub fn library_exists_query(library: &str) -> String {
    format!(
        "SELECT 1 FROM QSYS2.SYSPARTITIONSTAT \
         WHERE SYSTEM_TABLE_SCHEMA = '{}' LIMIT 1",
        escape_sql_string(library)
    )
}

/// Existence probe for an eligible source physical file.
pub fn source_file_exists_query(library: &str, file: &str) -> String {
    format!(
        "SELECT 1 FROM QSYS2.SYSPARTITIONSTAT \
         WHERE SYSTEM_TABLE_SCHEMA = '{}' \
         AND SYSTEM_TABLE_NAME = '{}' \
         AND TRIM(SOURCE_TYPE) <> '' LIMIT 1",
        escape_sql_string(library),
        escape_sql_string(file)
    )
}

/// List the eligible source physical files in a library.
pub fn source_files_query(library: &str) -> String {
    format!(
        "SELECT CAST(SYSTEM_TABLE_NAME AS VARCHAR(10) CCSID {ccsid}) AS SOURCE_FILE \
         FROM QSYS2.SYSPARTITIONSTAT \
         WHERE SYSTEM_TABLE_SCHEMA = '{lib}' \
         AND TRIM(SOURCE_TYPE) <> '' \
         GROUP BY SYSTEM_TABLE_NAME \
         ORDER BY SYSTEM_TABLE_NAME",
        ccsid = INVARIANT_CCSID,
        lib = escape_sql_string(library)
    )
}

/// Enumerate migratable members, optionally restricted to one source
/// physical file.
///
/// Results are ordered by file then member so enumeration is
/// deterministic. Explicit member lists are filtered by the caller
/// after validation, not in SQL.
pub fn members_query(library: &str, file: Option<&str>) -> String {
    let mut sql = format!(
        "SELECT CAST(SYSTEM_TABLE_NAME AS VARCHAR(10) CCSID {ccsid}) AS SOURCE_FILE, \
         CAST(SYSTEM_TABLE_MEMBER AS VARCHAR(10) CCSID {ccsid}) AS MEMBER, \
         CAST(SOURCE_TYPE AS VARCHAR(10) CCSID {ccsid}) AS SOURCE_TYPE \
         FROM QSYS2.SYSPARTITIONSTAT \
         WHERE SYSTEM_TABLE_SCHEMA = '{lib}'",
        ccsid = INVARIANT_CCSID,
        lib = escape_sql_string(library)
    );

    if let Some(file) = file {
        sql.push_str(&format!(
            " AND SYSTEM_TABLE_NAME = '{}'",
            escape_sql_string(file)
        ));
    }

    sql.push_str(
        " AND TRIM(SOURCE_TYPE) <> '' \
         ORDER BY SYSTEM_TABLE_NAME, SYSTEM_TABLE_MEMBER",
    );

    sql
}

/// CCSID the system reports for the catalog's name columns, read
/// from `QSYS2.SYSCOLUMNS`.
pub fn system_ccsid_query() -> String {
    "SELECT CCSID FROM QSYS2.SYSCOLUMNS \
     WHERE TABLE_SCHEMA = 'QSYS2' \
     AND TABLE_NAME = 'SYSPARTITIONSTAT' \
     AND COLUMN_NAME = 'SYSTEM_TABLE_NAME'"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_sql_string() {
        assert_eq!(escape_sql_string("PRODLIB"), "PRODLIB");
        assert_eq!(escape_sql_string("O'LIB"), "O''LIB");
        assert_eq!(escape_sql_string(""), "");
    }

    #[test]
    fn test_library_exists_query() {
        let sql = library_exists_query("PRODLIB");
        assert!(sql.contains("SYSTEM_TABLE_SCHEMA = 'PRODLIB'"));
        assert!(sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn test_source_file_exists_query_filters_eligibility() {
        let sql = source_file_exists_query("PRODLIB", "QRPGSRC");
        assert!(sql.contains("SYSTEM_TABLE_NAME = 'QRPGSRC'"));
        assert!(sql.contains("TRIM(SOURCE_TYPE) <> ''"));
    }

    #[test]
    fn test_source_files_query_is_grouped_and_ordered() {
        let sql = source_files_query("PRODLIB");
        assert!(sql.contains("GROUP BY SYSTEM_TABLE_NAME"));
        assert!(sql.contains("ORDER BY SYSTEM_TABLE_NAME"));
        assert!(sql.contains("CCSID 37"));
    }

    #[test]
    fn test_members_query_whole_library() {
        let sql = members_query("PRODLIB", None);
        assert!(sql.contains("SYSTEM_TABLE_SCHEMA = 'PRODLIB'"));
        assert!(!sql.contains("SYSTEM_TABLE_NAME = '"));
        assert!(sql.contains("ORDER BY SYSTEM_TABLE_NAME, SYSTEM_TABLE_MEMBER"));
    }

    #[test]
    fn test_members_query_single_file() {
        let sql = members_query("PRODLIB", Some("QRPGSRC"));
        assert!(sql.contains("AND SYSTEM_TABLE_NAME = 'QRPGSRC'"));
        assert!(sql.contains("TRIM(SOURCE_TYPE) <> ''"));
    }

    #[test]
    fn test_system_ccsid_query_probes_a_name_column() {
        let sql = system_ccsid_query();
        assert!(sql.contains("QSYS2.SYSCOLUMNS"));
        assert!(sql.contains("TABLE_NAME = 'SYSPARTITIONSTAT'"));
        assert!(sql.contains("COLUMN_NAME = 'SYSTEM_TABLE_NAME'"));
    }

    #[test]
    fn test_members_query_escapes_literals() {
        let sql = members_query("O'LIB", Some("Q'SRC"));
        assert!(sql.contains("'O''LIB'"));
        assert!(sql.contains("'Q''SRC'"));
    }
}
