use rusqlite::{Connection, TransactionBehavior, params};

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{LICENSE_CODE_COLS, LICENSE_COLS, query_one};

// ============ License Codes ============

/// Insert a freshly minted code.
///
/// Returns `Ok(false)` without touching the existing row when the code string
/// is already taken, so the caller can regenerate.
pub fn insert_license_code(conn: &Connection, code: &LicenseCode) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO license_codes (code, type, created_at, used_by, used_at)
         VALUES (?1, ?2, ?3, NULL, NULL)
         ON CONFLICT(code) DO NOTHING",
        params![&code.code, code.plan_type.tag(), code.created_at],
    )?;
    Ok(inserted == 1)
}

pub fn get_license_code(conn: &Connection, code: &str) -> Result<Option<LicenseCode>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM license_codes WHERE code = ?1",
            LICENSE_CODE_COLS
        ),
        &[&code],
    )
}

// ============ Licenses ============

pub fn get_license_by_user(conn: &Connection, user_id: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE user_id = ?1", LICENSE_COLS),
        &[&user_id],
    )
}

/// Insert or fully replace the license for `license.user_id`.
pub fn upsert_license(conn: &Connection, license: &License) -> Result<()> {
    conn.execute(
        "INSERT INTO licenses (user_id, code, type_label, activated_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
             code = excluded.code,
             type_label = excluded.type_label,
             activated_at = excluded.activated_at,
             expires_at = excluded.expires_at",
        params![
            &license.user_id,
            &license.code,
            license.plan_label.as_ref(),
            license.activated_at,
            license.expires_at
        ],
    )?;
    Ok(())
}

// ============ Redemption ============

/// Atomically redeem a code for `user_id`.
///
/// Runs in an IMMEDIATE transaction so the write lock is held from the first
/// read: two concurrent redemptions of the same code serialize, and the second
/// observes the code as used. The claim UPDATE is additionally conditional on
/// `used_by IS NULL`. The license upsert and the claim commit together or not
/// at all.
pub fn redeem_license_code_atomic(
    conn: &mut Connection,
    code: &str,
    user_id: &str,
    now: i64,
) -> Result<Redemption> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let license_code: LicenseCode = query_one(
        &tx,
        &format!(
            "SELECT {} FROM license_codes WHERE code = ?1",
            LICENSE_CODE_COLS
        ),
        &[&code],
    )?
    .ok_or(AppError::CodeNotFound)?;

    if license_code.is_used() {
        return Err(AppError::CodeAlreadyUsed);
    }

    let plan = license_code.plan_type;
    let expires_at = match plan.duration_days() {
        Some(days) => Some(
            days.checked_mul(SECONDS_PER_DAY)
                .and_then(|secs| now.checked_add(secs))
                .ok_or_else(|| AppError::BadRequest("activation time out of range".into()))?,
        ),
        None => None,
    };
    let license = License {
        user_id: user_id.to_string(),
        code: license_code.code.clone(),
        plan_label: plan.label(),
        activated_at: now,
        expires_at,
    };

    upsert_license(&tx, &license)?;

    let claimed = tx.execute(
        "UPDATE license_codes SET used_by = ?1, used_at = ?2 WHERE code = ?3 AND used_by IS NULL",
        params![user_id, now, &license_code.code],
    )?;

    if claimed == 0 {
        // Dropping the transaction rolls back the upsert.
        return Err(AppError::CodeAlreadyUsed);
    }

    tx.commit()?;

    Ok(Redemption {
        plan_label: license.plan_label,
        license,
    })
}
