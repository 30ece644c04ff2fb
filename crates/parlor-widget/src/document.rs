// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The widget configuration document and its validation rules.
//!
//! The document is fully typed with a compiled-in default for every field:
//! the delivery layer never emits null for a rendering field, even for shops
//! that have never saved a configuration.

use std::sync::LazyLock;

use parlor_core::ParlorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 6-digit hex color, case-insensitive.
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("static regex"));

pub const DEFAULT_TITLE: &str = "Support Chat";
pub const DEFAULT_COLOR: &str = "#e63946";
pub const DEFAULT_GREETING: &str = "👋 Welcome! How can we help you?";
pub const DEFAULT_AGENT_NAME: &str = "Assistant";
pub const DEFAULT_AGENT_ROLE: &str = "Customer Support";
pub const DEFAULT_RESPONSE_LENGTH: &str = "medium";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TONE: &str = "friendly";
pub const DEFAULT_AVATAR: &str = "https://cdn.parlor.app/assets/default-avatar.png";
pub const DEFAULT_START_COLOR: &str = "#000000CF";
pub const DEFAULT_END_COLOR: &str = "#000000";
pub const DEFAULT_CHAT_BG_COLOR: &str = "#FFFFFF";
pub const DEFAULT_FONT_FAMILY: &str = "inter, sans-serif";
pub const DEFAULT_FONT_COLOR: &str = "#000000CF";
pub const DEFAULT_OPEN_BY_DEFAULT: &str = "1";

/// Which side of the viewport the launcher button docks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WidgetPosition {
    Left,
    Right,
}

/// The public, sanitized configuration document for one shop.
///
/// Serialized camelCase: this is the exact JSON the storefront widget and
/// the admin UI consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub is_active: bool,
    pub title: String,
    pub color: String,
    pub greeting: String,
    pub position: WidgetPosition,
    pub agent_name: String,
    pub agent_role: String,
    pub response_length: String,
    pub language: String,
    pub tone: String,
    pub avatar: String,
    pub start_color: String,
    pub end_color: String,
    pub chat_bg_color: String,
    pub font_family: String,
    pub font_color: String,
    pub open_by_default: String,
    pub is_pulsing: bool,
}

impl ConfigDocument {
    /// The document served for shops with no stored configuration: safe
    /// defaults with the widget switched off, so an un-configured storefront
    /// renders nothing.
    pub fn inactive_default() -> Self {
        Self {
            is_active: false,
            ..Self::active_default()
        }
    }

    /// Defaults with the widget switched on; persisted lazily by the embed
    /// path on first read.
    pub fn active_default() -> Self {
        Self {
            is_active: true,
            title: DEFAULT_TITLE.into(),
            color: DEFAULT_COLOR.into(),
            greeting: DEFAULT_GREETING.into(),
            position: WidgetPosition::Right,
            agent_name: DEFAULT_AGENT_NAME.into(),
            agent_role: DEFAULT_AGENT_ROLE.into(),
            response_length: DEFAULT_RESPONSE_LENGTH.into(),
            language: DEFAULT_LANGUAGE.into(),
            tone: DEFAULT_TONE.into(),
            avatar: DEFAULT_AVATAR.into(),
            start_color: DEFAULT_START_COLOR.into(),
            end_color: DEFAULT_END_COLOR.into(),
            chat_bg_color: DEFAULT_CHAT_BG_COLOR.into(),
            font_family: DEFAULT_FONT_FAMILY.into(),
            font_color: DEFAULT_FONT_COLOR.into(),
            open_by_default: DEFAULT_OPEN_BY_DEFAULT.into(),
            is_pulsing: false,
        }
    }
}

/// A merchant edit as it arrives over the wire.
///
/// Absent fields fall back to the compiled defaults (the save is a full-row
/// upsert, never a partial patch), and `position` stays a raw string until
/// [`ConfigInput::sanitize`] so a bad value rejects the write instead of
/// failing deserialization with an opaque error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInput {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    #[serde(default = "default_agent_role")]
    pub agent_role: String,
    #[serde(default = "default_response_length")]
    pub response_length: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default = "default_start_color")]
    pub start_color: String,
    #[serde(default = "default_end_color")]
    pub end_color: String,
    #[serde(default = "default_chat_bg_color")]
    pub chat_bg_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_open_by_default")]
    pub open_by_default: String,
    #[serde(default)]
    pub is_pulsing: bool,
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}
fn default_color() -> String {
    DEFAULT_COLOR.into()
}
fn default_greeting() -> String {
    DEFAULT_GREETING.into()
}
fn default_position() -> String {
    "right".into()
}
fn default_agent_name() -> String {
    DEFAULT_AGENT_NAME.into()
}
fn default_agent_role() -> String {
    DEFAULT_AGENT_ROLE.into()
}
fn default_response_length() -> String {
    DEFAULT_RESPONSE_LENGTH.into()
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.into()
}
fn default_tone() -> String {
    DEFAULT_TONE.into()
}
fn default_avatar() -> String {
    DEFAULT_AVATAR.into()
}
fn default_start_color() -> String {
    DEFAULT_START_COLOR.into()
}
fn default_end_color() -> String {
    DEFAULT_END_COLOR.into()
}
fn default_chat_bg_color() -> String {
    DEFAULT_CHAT_BG_COLOR.into()
}
fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.into()
}
fn default_font_color() -> String {
    DEFAULT_FONT_COLOR.into()
}
fn default_open_by_default() -> String {
    DEFAULT_OPEN_BY_DEFAULT.into()
}

impl ConfigInput {
    /// Validate and coerce the input into a storable document.
    ///
    /// A color that is not 6-digit hex is replaced with the default color;
    /// a position outside the enumerated set rejects the whole write.
    /// The asymmetry is inherited behavior, kept deliberately (see
    /// DESIGN.md).
    pub fn sanitize(self) -> Result<ConfigDocument, ParlorError> {
        let color = if HEX_COLOR.is_match(self.color.trim()) {
            self.color.trim().to_string()
        } else {
            tracing::debug!(rejected = %self.color, "invalid color, using default");
            DEFAULT_COLOR.to_string()
        };

        let position: WidgetPosition = self
            .position
            .parse()
            .map_err(|_| ParlorError::Validation("Invalid position value".into()))?;

        let non_empty = |value: String, fallback: &str| {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() { fallback.to_string() } else { trimmed }
        };

        Ok(ConfigDocument {
            is_active: self.is_active,
            title: non_empty(self.title, DEFAULT_TITLE),
            color,
            greeting: non_empty(self.greeting, DEFAULT_GREETING),
            position,
            agent_name: non_empty(self.agent_name, DEFAULT_AGENT_NAME),
            agent_role: non_empty(self.agent_role, DEFAULT_AGENT_ROLE),
            response_length: non_empty(self.response_length, DEFAULT_RESPONSE_LENGTH),
            language: non_empty(self.language, DEFAULT_LANGUAGE),
            tone: non_empty(self.tone, DEFAULT_TONE),
            avatar: non_empty(self.avatar, DEFAULT_AVATAR),
            start_color: non_empty(self.start_color, DEFAULT_START_COLOR),
            end_color: non_empty(self.end_color, DEFAULT_END_COLOR),
            chat_bg_color: non_empty(self.chat_bg_color, DEFAULT_CHAT_BG_COLOR),
            font_family: non_empty(self.font_family, DEFAULT_FONT_FAMILY),
            font_color: non_empty(self.font_color, DEFAULT_FONT_COLOR),
            open_by_default: non_empty(self.open_by_default, DEFAULT_OPEN_BY_DEFAULT),
            is_pulsing: self.is_pulsing,
        })
    }
}

impl From<ConfigDocument> for ConfigInput {
    fn from(doc: ConfigDocument) -> Self {
        Self {
            is_active: doc.is_active,
            title: doc.title,
            color: doc.color,
            greeting: doc.greeting,
            position: doc.position.to_string(),
            agent_name: doc.agent_name,
            agent_role: doc.agent_role,
            response_length: doc.response_length,
            language: doc.language,
            tone: doc.tone,
            avatar: doc.avatar,
            start_color: doc.start_color,
            end_color: doc.end_color,
            chat_bg_color: doc.chat_bg_color,
            font_family: doc.font_family,
            font_color: doc.font_color,
            open_by_default: doc.open_by_default,
            is_pulsing: doc.is_pulsing,
        }
    }
}
