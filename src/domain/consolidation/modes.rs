// ============================================================
// OUTPUT POLICY ENUMS
// ============================================================
// Content and layout choices applied when expanding groups into rows

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::error::AppError;

/// Which merged contact data appears in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentMode {
    /// No explicit streamlining choice. Rows are shaped like `EmailAndPhone`
    /// but Email/Phone cells are only written if the caller declared them.
    #[default]
    None,

    /// Email column only; groups without a valid email are dropped
    Email,

    /// Phone column only; groups without a phone are dropped
    Phone,

    /// Both columns; groups are never dropped in aggregate layout
    #[serde(rename = "Email & Phone", alias = "EmailAndPhone")]
    EmailAndPhone,
}

impl ContentMode {
    pub fn includes_email(&self) -> bool {
        matches!(self, ContentMode::Email | ContentMode::EmailAndPhone)
    }

    pub fn includes_phone(&self) -> bool {
        matches!(self, ContentMode::Phone | ContentMode::EmailAndPhone)
    }

    /// Single-field modes skip groups whose relevant list is empty
    pub fn suppresses_empty(&self) -> bool {
        matches!(self, ContentMode::Email | ContentMode::Phone)
    }

    /// Human-readable label, as offered by the selection UI
    pub fn label(&self) -> &'static str {
        match self {
            ContentMode::None => "None",
            ContentMode::Email => "Email",
            ContentMode::Phone => "Phone",
            ContentMode::EmailAndPhone => "Email & Phone",
        }
    }
}

impl FromStr for ContentMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "None" | "none" => Ok(ContentMode::None),
            "Email" | "email" => Ok(ContentMode::Email),
            "Phone" | "phone" => Ok(ContentMode::Phone),
            "Email & Phone" | "EmailAndPhone" | "email_and_phone" => {
                Ok(ContentMode::EmailAndPhone)
            }
            other => Err(AppError::ValidationError(format!(
                "Unknown content mode: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ContentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How list values are laid out across output rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// One row per group, list values joined with ", "
    #[default]
    #[serde(alias = "Comma")]
    Aggregate,

    /// One row per list position, shorter list padded with blanks
    #[serde(alias = "Rows")]
    PerValue,
}

impl FromStr for LayoutMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Comma" | "comma" | "Aggregate" | "aggregate" => Ok(LayoutMode::Aggregate),
            "Rows" | "rows" | "PerValue" | "per_value" => Ok(LayoutMode::PerValue),
            other => Err(AppError::ValidationError(format!(
                "Unknown layout mode: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutMode::Aggregate => write!(f, "Comma"),
            LayoutMode::PerValue => write!(f, "Rows"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_mode_flags() {
        assert!(!ContentMode::None.includes_email());
        assert!(!ContentMode::None.includes_phone());
        assert!(ContentMode::EmailAndPhone.includes_email());
        assert!(ContentMode::EmailAndPhone.includes_phone());
        assert!(ContentMode::Email.suppresses_empty());
        assert!(!ContentMode::EmailAndPhone.suppresses_empty());
    }

    #[test]
    fn test_parse_ui_labels() {
        assert_eq!(
            "Email & Phone".parse::<ContentMode>().unwrap(),
            ContentMode::EmailAndPhone
        );
        assert_eq!("Rows".parse::<LayoutMode>().unwrap(), LayoutMode::PerValue);
        assert_eq!("Comma".parse::<LayoutMode>().unwrap(), LayoutMode::Aggregate);
        assert!("Both".parse::<ContentMode>().is_err());
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&ContentMode::EmailAndPhone).unwrap();
        assert_eq!(json, "\"Email & Phone\"");

        let mode: ContentMode = serde_json::from_str("\"EmailAndPhone\"").unwrap();
        assert_eq!(mode, ContentMode::EmailAndPhone);

        let layout: LayoutMode = serde_json::from_str("\"Rows\"").unwrap();
        assert_eq!(layout, LayoutMode::PerValue);
    }
}
