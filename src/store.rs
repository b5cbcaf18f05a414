//! License Store: per-user license lookup and read-time status.

use crate::db::{DbPool, queries};
use crate::error::Result;
use crate::models::{License, LicenseStatus};

#[derive(Clone)]
pub struct LicenseStore {
    db: DbPool,
}

impl LicenseStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn get_license(&self, user_id: &str) -> Result<Option<License>> {
        let conn = self.db.get()?;
        queries::get_license_by_user(&conn, user_id)
    }

    /// Classify the user's license at `now`.
    ///
    /// A missing license is `NoLicense`, not an error; only storage faults fail.
    pub fn get_status(&self, user_id: &str, now: i64) -> Result<LicenseStatus> {
        let license = self.get_license(user_id)?;
        Ok(LicenseStatus::classify(license.as_ref(), now))
    }
}
