use serde::{Deserialize, Serialize};

use super::PlanLabel;

/// Category of grant a license code carries.
///
/// The set is closed. Any tag that is not one of the known plans resolves to
/// `OneShot`, which grants a single day. Unknown input is never rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanType {
    #[serde(rename = "7D")]
    SevenDay,
    #[serde(rename = "30D")]
    ThirtyDay,
    #[serde(rename = "PERM")]
    Permanent,
    #[default]
    #[serde(rename = "ONCE")]
    OneShot,
}

impl PlanType {
    /// Canonical tag, used as the code suffix and the stored `type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            PlanType::SevenDay => "7D",
            PlanType::ThirtyDay => "30D",
            PlanType::Permanent => "PERM",
            PlanType::OneShot => "ONCE",
        }
    }

    /// Resolve a requested or stored tag. Case and surrounding whitespace are
    /// ignored; anything unrecognized falls back to `OneShot`.
    pub fn from_tag(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "7D" => PlanType::SevenDay,
            "30D" => PlanType::ThirtyDay,
            "PERM" => PlanType::Permanent,
            _ => PlanType::OneShot,
        }
    }

    /// Grant length in days (None = no expiry).
    pub fn duration_days(&self) -> Option<i64> {
        match self {
            PlanType::SevenDay => Some(7),
            PlanType::ThirtyDay => Some(30),
            PlanType::Permanent => None,
            PlanType::OneShot => Some(1),
        }
    }

    pub fn label(&self) -> PlanLabel {
        match self {
            PlanType::SevenDay => PlanLabel::SevenDays,
            PlanType::ThirtyDay => PlanLabel::ThirtyDays,
            PlanType::Permanent => PlanLabel::Permanent,
            PlanType::OneShot => PlanLabel::OneTime,
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseCode {
    pub code: String,
    pub plan_type: PlanType,
    pub created_at: i64,
    /// Identity that redeemed the code (None = unused)
    pub used_by: Option<String>,
    pub used_at: Option<i64>,
}

impl LicenseCode {
    pub fn is_used(&self) -> bool {
        self.used_by.is_some()
    }
}
