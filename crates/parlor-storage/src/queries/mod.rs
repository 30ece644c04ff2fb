// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity family.

pub mod conversations;
pub mod documents;
pub mod jobs;
pub mod merchants;
pub mod messages;
pub mod plans;

/// Parse a TEXT column into a strum enum, mapping failures onto rusqlite's
/// conversion error so they surface as storage errors, not panics.
pub(crate) fn parse_enum<T: std::str::FromStr>(
    idx: usize,
    value: String,
) -> Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid enum value `{value}`").into(),
        )
    })
}
