//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// A corrupt value surfaces as a storage error instead of a panic.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

// ============ SQL SELECT Constants ============

pub const LICENSE_CODE_COLS: &str = "code, type, created_at, used_by, used_at";

pub const LICENSE_COLS: &str = "user_id, code, type_label, activated_at, expires_at";

// ============ FromRow Implementations ============

impl FromRow for LicenseCode {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        // Legacy rows may carry free-form tags; they resolve through the fallback.
        let tag: String = row.get(1)?;
        Ok(LicenseCode {
            code: row.get(0)?,
            plan_type: PlanType::from_tag(&tag),
            created_at: row.get(2)?,
            used_by: row.get(3)?,
            used_at: row.get(4)?,
        })
    }
}

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            user_id: row.get(0)?,
            code: row.get(1)?,
            plan_label: parse_enum(row, 2, "type_label")?,
            activated_at: row.get(3)?,
            expires_at: row.get(4)?,
        })
    }
}
