//! Connection PRAGMAs shared by every SQLite handle the pipeline opens

use rusqlite::Connection;

/// Apply batch-oriented PRAGMAs (WAL, NORMAL, MEMORY, cache)
///
/// Must run before any statement touches the schema.
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // In-memory databases report "memory" and ignore WAL
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    log::debug!("SQLite journal_mode={}", mode);

    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", -64_000)?;

    Ok(())
}
