//! Custom serde deserializers for flexible type handling
//!
//! MediaWiki marks boolean properties differently depending on the output
//! format version: the legacy format sends an empty string when the flag is
//! set and omits the key otherwise (`"missing": ""`), the newer one sends
//! JSON booleans. Numeric fields are occasionally sent as strings.

use serde::{Deserialize, Deserializer, de};

/// Deserialize a presence flag that can be:
/// - JSON boolean: `true`, `false`
/// - Any string, including `""` (true: the key being present is the signal)
/// - Integer: `0` (false), any non-zero integer (true)
/// - `null` (false)
///
/// Use together with `#[serde(default)]` so an absent key reads as false.
pub fn deserialize_presence_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        String(String),
    }

    let value: Option<Flag> = Option::deserialize(deserializer)?;

    Ok(match value {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::String(_)) => true,
    })
}

/// Deserialize an optional unsigned number sent either as a JSON number or
/// as a decimal string
pub fn deserialize_flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u64),
        String(String),
    }

    let value: Option<Number> = Option::deserialize(deserializer)?;

    match value {
        None => Ok(None),
        Some(Number::Int(n)) => Ok(Some(n)),
        Some(Number::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number string: {}", s))),
    }
}
