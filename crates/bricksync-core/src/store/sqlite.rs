//! Read-only access to the inventory application's SQLite database.

use std::path::Path;

use bricksync_types::{LocalRecord, PartColor, SetNum, SyncError};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, Row};
use tracing::debug;

use super::LocalStore;
use crate::error::CoreResult;

const OWNED_SETS_SQL: &str = "\
    SELECT s.set_number, COUNT(us.id) \
    FROM user_sets us JOIN sets s ON s.id = us.set_id \
    WHERE s.set_number IS NOT NULL AND s.set_number != '' \
    GROUP BY s.set_number ORDER BY s.set_number";

const MISSING_SET_PARTS_SQL: &str = "\
    SELECT p.part_num, CAST(p.color AS TEXT), c.id, \
           p.quantity - COALESCE(p.have_quantity, 0), s.set_number \
    FROM parts_in_set p \
    JOIN user_sets us ON us.id = p.user_set_id \
    JOIN sets s ON s.id = us.set_id \
    LEFT JOIN colors c ON c.name = p.color \
    WHERE p.quantity > COALESCE(p.have_quantity, 0) AND (?1 OR p.is_spare = 0) \
    ORDER BY p.id";

// Minifigure parts are not tied to a set inventory on the remote, so they
// carry no origin set.
const MISSING_MINIFIG_PARTS_SQL: &str = "\
    SELECT m.part_num, CAST(m.color AS TEXT), c.id, \
           m.quantity - COALESCE(m.have_quantity, 0), NULL \
    FROM user_minifigure_parts m \
    LEFT JOIN colors c ON c.name = m.color \
    WHERE m.quantity > COALESCE(m.have_quantity, 0) AND (?1 OR m.is_spare = 0) \
    ORDER BY m.id";

struct MissingRow {
    part_num: String,
    color: Option<String>,
    named_color_id: Option<i64>,
    missing: i64,
    set_number: Option<String>,
}

impl MissingRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            part_num: row.get(0)?,
            color: row.get(1)?,
            named_color_id: row.get(2)?,
            missing: row.get(3)?,
            set_number: row.get(4)?,
        })
    }

    /// The color column holds either a numeric color id or a color name.
    fn color_id(&self) -> Option<i64> {
        self.color.as_deref().and_then(|c| c.trim().parse::<i64>().ok()).or(self.named_color_id)
    }

    fn into_record(self) -> Option<LocalRecord<PartColor>> {
        let Some(color_id) = self.color_id() else {
            debug!(part_num = %self.part_num, color = ?self.color, "Skipping part with unknown color");
            return None;
        };
        let key = PartColor::new(self.part_num, color_id);
        Some(match self.set_number {
            Some(set_number) => LocalRecord::from_set(key, self.missing, SetNum(set_number)),
            None => LocalRecord::new(key, self.missing),
        })
    }
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open the database read-only.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    fn query_missing(
        conn: &Connection,
        sql: &str,
        include_spare: bool,
    ) -> rusqlite::Result<Vec<LocalRecord<PartColor>>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![include_spare], MissingRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            if let Some(record) = row?.into_record() {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn store_error(err: rusqlite::Error) -> SyncError {
    SyncError::LocalStore { message: err.to_string() }
}

impl LocalStore for SqliteStore {
    fn owned_sets(&self) -> Result<Vec<LocalRecord<SetNum>>, SyncError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(OWNED_SETS_SQL).map_err(store_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LocalRecord::new(SetNum(row.get::<_, String>(0)?), row.get::<_, i64>(1)?))
            })
            .map_err(store_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(store_error)
    }

    fn missing_parts(&self, include_spare: bool) -> Result<Vec<LocalRecord<PartColor>>, SyncError> {
        let conn = self.conn.lock();
        let mut records = Self::query_missing(&conn, MISSING_SET_PARTS_SQL, include_spare)
            .map_err(store_error)?;
        records.extend(
            Self::query_missing(&conn, MISSING_MINIFIG_PARTS_SQL, include_spare)
                .map_err(store_error)?,
        );
        debug!(records = records.len(), include_spare, "Loaded missing parts");
        Ok(records)
    }
}
