use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const SECONDS_PER_HOUR: i64 = 3_600;

/// Human-readable plan name stored on a license at redemption time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
pub enum PlanLabel {
    #[serde(rename = "7 days")]
    #[strum(serialize = "7 days")]
    SevenDays,
    #[serde(rename = "30 days")]
    #[strum(serialize = "30 days")]
    ThirtyDays,
    #[serde(rename = "Permanent")]
    #[strum(serialize = "Permanent")]
    Permanent,
    #[serde(rename = "One-time")]
    #[strum(serialize = "One-time")]
    OneTime,
}

/// The license currently held by a user. One row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub user_id: String,
    /// Code that activated this license
    pub code: String,
    pub plan_label: PlanLabel,
    pub activated_at: i64,
    /// None = permanent
    pub expires_at: Option<i64>,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, Serialize)]
pub struct Redemption {
    pub license: License,
    pub plan_label: PlanLabel,
}

/// Time left on an active license, in whole days plus whole leftover hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
}

impl Remaining {
    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            days: seconds / SECONDS_PER_DAY,
            hours: (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        }
    }
}

/// Read-time classification of a user's license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LicenseStatus {
    NoLicense,
    PermanentActive {
        activated_at: i64,
    },
    Expired {
        activated_at: i64,
        expires_at: i64,
    },
    Active {
        plan_label: PlanLabel,
        activated_at: i64,
        expires_at: i64,
        remaining: Remaining,
    },
}

impl LicenseStatus {
    /// Classify a stored license against `now`. Pure: the same inputs always
    /// produce the same status.
    pub fn classify(license: Option<&License>, now: i64) -> Self {
        let Some(license) = license else {
            return LicenseStatus::NoLicense;
        };

        if license.plan_label == PlanLabel::Permanent {
            return LicenseStatus::PermanentActive {
                activated_at: license.activated_at,
            };
        }

        match license.expires_at {
            // A timed plan without an expiry can only come from a hand-edited row.
            None => {
                tracing::warn!(
                    user_id = %license.user_id,
                    plan = %license.plan_label,
                    "license has no expiry, treating as permanent"
                );
                LicenseStatus::PermanentActive {
                    activated_at: license.activated_at,
                }
            }
            Some(expires_at) if now >= expires_at => LicenseStatus::Expired {
                activated_at: license.activated_at,
                expires_at,
            },
            Some(expires_at) => LicenseStatus::Active {
                plan_label: license.plan_label,
                activated_at: license.activated_at,
                expires_at,
                remaining: Remaining::from_seconds(expires_at.saturating_sub(now)),
            },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LicenseStatus::Active { .. } | LicenseStatus::PermanentActive { .. }
        )
    }
}
