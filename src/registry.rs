//! Code Registry: mints license codes and redeems them exactly once.

use rand::Rng;

use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};
use crate::models::{LicenseCode, PlanType, Redemption};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GROUP_LEN: usize = 5;
const GROUP_COUNT: usize = 3;

/// Regeneration budget when a minted code collides with a stored one.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Generate a code: `{prefix}-XXXXX-XXXXX-XXXXX-{TAG}`.
///
/// Each group is uniform over 36^5 uppercase alphanumerics.
pub fn generate_code(prefix: &str, plan: PlanType) -> String {
    let mut rng = rand::thread_rng();

    let mut group = || -> String {
        (0..GROUP_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    };

    let groups: Vec<String> = (0..GROUP_COUNT).map(|_| group()).collect();
    format!("{}-{}-{}", prefix, groups.join("-"), plan.tag())
}

/// Check that `code` has the shape `generate_code(prefix, _)` produces.
pub fn is_well_formed(code: &str, prefix: &str) -> bool {
    let Some(rest) = code
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
    else {
        return false;
    };

    let parts: Vec<&str> = rest.split('-').collect();
    if parts.len() != GROUP_COUNT + 1 {
        return false;
    }

    let groups_ok = parts[..GROUP_COUNT].iter().all(|g| {
        g.len() == GROUP_LEN
            && g.bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    });

    groups_ok && !parts[GROUP_COUNT].is_empty()
}

#[derive(Clone)]
pub struct CodeRegistry {
    db: DbPool,
    prefix: String,
}

impl CodeRegistry {
    pub fn new(db: DbPool, prefix: &str) -> Self {
        Self {
            db,
            prefix: prefix.to_string(),
        }
    }

    /// Mint and persist a new code for the requested plan tag.
    ///
    /// `is_admin` is the capability check already performed by the caller.
    /// Unrecognized tags mint a `OneShot` code.
    pub fn create_code(&self, plan_tag: &str, is_admin: bool, now: i64) -> Result<LicenseCode> {
        self.create_code_with(plan_tag, is_admin, now, |plan| {
            generate_code(&self.prefix, plan)
        })
    }

    fn create_code_with<F>(
        &self,
        plan_tag: &str,
        is_admin: bool,
        now: i64,
        mut generate: F,
    ) -> Result<LicenseCode>
    where
        F: FnMut(PlanType) -> String,
    {
        if !is_admin {
            return Err(AppError::Unauthorized);
        }

        let plan = PlanType::from_tag(plan_tag);
        let conn = self.db.get()?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = LicenseCode {
                code: generate(plan),
                plan_type: plan,
                created_at: now,
                used_by: None,
                used_at: None,
            };

            if queries::insert_license_code(&conn, &code)? {
                tracing::info!(plan = %plan, "Created license code");
                return Ok(code);
            }

            tracing::warn!(attempt, "Generated license code collided, regenerating");
        }

        Err(AppError::Internal(format!(
            "could not mint a unique license code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Redeem `code` for `user_id`, replacing any license the user held.
    ///
    /// A blank `user_id` is rejected before the code is touched.
    pub fn redeem(&self, code: &str, user_id: &str, now: i64) -> Result<Redemption> {
        if user_id.trim().is_empty() {
            return Err(AppError::BadRequest("user_id must not be empty".into()));
        }

        let code = code.trim();
        let mut conn = self.db.get()?;

        match queries::redeem_license_code_atomic(&mut conn, code, user_id, now) {
            Ok(redemption) => {
                tracing::info!(
                    user_id,
                    plan = %redemption.plan_label,
                    "Redeemed license code"
                );
                Ok(redemption)
            }
            Err(e) => {
                if e.is_user_facing() {
                    tracing::debug!(user_id, "Redemption rejected: {}", e);
                }
                Err(e)
            }
        }
    }

    pub fn get_code(&self, code: &str) -> Result<Option<LicenseCode>> {
        let conn = self.db.get()?;
        queries::get_license_code(&conn, code.trim())
    }
}
