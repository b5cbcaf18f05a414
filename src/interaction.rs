//! Presentable replies for the chat interaction surface.
//!
//! The chat gateway owns buttons, modals and slash commands. When one fires it
//! calls the matching callback here and renders the returned [`Reply`] as an
//! ephemeral message or embed. Expected outcomes (unknown code, used code,
//! missing admin rights) become replies; only storage faults are errors.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::LicenseStatus;
use crate::registry::CodeRegistry;
use crate::store::LicenseStore;
use crate::util::format_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyColor {
    Green,
    Red,
    Gold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: ReplyColor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ReplyField>,
    /// Shown only to the requesting user
    pub ephemeral: bool,
}

impl Reply {
    fn new(title: impl Into<String>, color: ReplyColor) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            ephemeral: true,
        }
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(ReplyField {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Admin code-generation command.
pub fn on_create_code(
    registry: &CodeRegistry,
    plan_tag: &str,
    is_admin: bool,
    now: i64,
) -> Result<Reply> {
    match registry.create_code(plan_tag, is_admin, now) {
        Ok(code) => Ok(Reply::new("License code created", ReplyColor::Green)
            .description(code.code)
            .field("Type", code.plan_type.label().as_ref())),
        Err(AppError::Unauthorized) => Ok(Reply::new(
            "Only administrators can use this command.",
            ReplyColor::Red,
        )),
        Err(e) => Err(e),
    }
}

/// Registration modal submitted with a code.
pub fn on_register_submit(
    registry: &CodeRegistry,
    code: &str,
    user_id: &str,
    now: i64,
) -> Result<Reply> {
    match registry.redeem(code, user_id, now) {
        Ok(redemption) => Ok(Reply::new(
            format!("{} license registered!", redemption.plan_label),
            ReplyColor::Green,
        )),
        Err(AppError::CodeNotFound) => {
            Ok(Reply::new("This code does not exist.", ReplyColor::Red))
        }
        Err(AppError::CodeAlreadyUsed) => Ok(Reply::new(
            "This code has already been used.",
            ReplyColor::Red,
        )),
        Err(e) => Err(e),
    }
}

/// "My info" button.
pub fn on_status_request(store: &LicenseStore, user_id: &str, now: i64) -> Result<Reply> {
    Ok(status_reply(&store.get_status(user_id, now)?))
}

/// Render a status classification.
pub fn status_reply(status: &LicenseStatus) -> Reply {
    match status {
        LicenseStatus::NoLicense => Reply::new("No license", ReplyColor::Red)
            .description("You have no registered license."),
        LicenseStatus::PermanentActive { activated_at } => {
            Reply::new("License info", ReplyColor::Gold)
                .field("Type", "Permanent")
                .field("Activated", format_timestamp(*activated_at))
        }
        LicenseStatus::Expired {
            activated_at,
            expires_at,
        } => Reply::new("License expired", ReplyColor::Red)
            .field("Activated", format_timestamp(*activated_at))
            .field("Expires", format_timestamp(*expires_at)),
        LicenseStatus::Active {
            plan_label,
            activated_at,
            expires_at,
            remaining,
        } => Reply::new("License active", ReplyColor::Green)
            .field("Type", plan_label.as_ref())
            .field("Activated", format_timestamp(*activated_at))
            .field("Expires", format_timestamp(*expires_at))
            .field(
                "Remaining",
                format!("{} days {} hours", remaining.days, remaining.hours),
            ),
    }
}
