//! Decoding of raw chain argument values.
//!
//! The Substrate adapter turns SCALE values into JSON, and the same logical
//! type can arrive in several shapes depending on metadata version:
//!
//! - accounts/hashes: `"0x…"`, `{"Id": "0x…"}`, `["0x…"]`, `[b0, …, b31]`
//! - integers/balances: JSON numbers or decimal strings (`u128` does not fit
//!   a JSON number)
//! - enums: `"Variant"` or `{"Variant": …}`
//! - text: a UTF-8 string, `0x`-hex, or an array of bytes
//!
//! The `parse_*` functions return `None` on a shape mismatch; the
//! deserializer adapters below wrap them for `#[serde(deserialize_with)]` so
//! payload structs fail with a field-level error instead of defaulting.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

use super::AccountId;

// =============================================================================
// Account parsing
// =============================================================================

/// Parse an account ID from various JSON representations.
pub fn parse_account(value: &Value) -> Option<AccountId> {
    match value {
        Value::String(s) => {
            let hex_str = s.strip_prefix("0x").unwrap_or(s);
            let bytes = hex::decode(hex_str).ok()?;
            let arr: [u8; 32] = bytes.try_into().ok()?;
            Some(AccountId(arr))
        }
        // Wrapped object: { "Id": "0x..." }
        Value::Object(obj) => obj
            .get("Id")
            .or_else(|| obj.get("id"))
            .and_then(parse_account),
        // Array: either ["0x..."] or [b0, b1, ..., b31]
        Value::Array(arr) => {
            if arr.len() == 1 {
                return parse_account(&arr[0]);
            }
            parse_hash256(value).map(AccountId)
        }
        _ => None,
    }
}

// =============================================================================
// Numeric parsing
// =============================================================================

/// Parse an amount (u128) from JSON.
///
/// Handles both numeric and string representations, since JSON numbers are
/// limited to u64 but Substrate balances are u128.
pub fn parse_amount(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Parse a u64 from JSON.
pub fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.replace(',', "").parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Hash/bytes parsing
// =============================================================================

fn byte_of(value: &Value) -> Option<u8> {
    parse_u64(value).and_then(|v| u8::try_from(v).ok())
}

/// Parse a 32-byte hash from JSON (hex string or byte array).
pub fn parse_hash256(value: &Value) -> Option<[u8; 32]> {
    match value {
        Value::String(s) => {
            let hex_str = s.strip_prefix("0x").unwrap_or(s);
            let bytes = hex::decode(hex_str).ok()?;
            bytes.try_into().ok()
        }
        Value::Array(arr) => {
            if arr.len() != 32 {
                return None;
            }
            let mut bytes = [0u8; 32];
            for (i, v) in arr.iter().enumerate() {
                bytes[i] = byte_of(v)?;
            }
            Some(bytes)
        }
        _ => None,
    }
}

/// Parse arbitrary bytes from JSON (hex string or byte array).
pub fn parse_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::String(s) => {
            let hex_str = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(hex_str).ok()
        }
        Value::Array(arr) => arr.iter().map(byte_of).collect(),
        _ => None,
    }
}

// =============================================================================
// Text & enum parsing
// =============================================================================

/// Parse a text field stored on-chain as `Vec<u8>`.
///
/// A plain string is taken as-is unless it is `0x`-prefixed hex that decodes
/// to valid UTF-8.
pub fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            if let Some(hex_str) = s.strip_prefix("0x")
                && let Ok(bytes) = hex::decode(hex_str)
                && let Ok(text) = String::from_utf8(bytes)
            {
                return Some(text);
            }
            Some(s.clone())
        }
        Value::Array(_) => parse_bytes(value).and_then(|b| String::from_utf8(b).ok()),
        _ => None,
    }
}

/// Extract the variant label of an enum value.
///
/// `"Paid"` and `{"Paid": []}` both yield `"Paid"`.
pub fn variant_label(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) if obj.len() == 1 => obj.keys().next().map(String::as_str),
        _ => None,
    }
}

// =============================================================================
// serde adapters
// =============================================================================

fn with_parser<'de, D, T>(
    deserializer: D,
    parser: fn(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parser(&value).ok_or_else(|| de::Error::custom(format!("expected {expected}, got {value}")))
}

fn optional<'de, D, T>(
    deserializer: D,
    parser: fn(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => parser(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected {expected} or null, got {value}"))),
    }
}

pub fn account<'de, D: Deserializer<'de>>(d: D) -> Result<AccountId, D::Error> {
    with_parser(d, parse_account, "an account id")
}

pub fn opt_account<'de, D: Deserializer<'de>>(d: D) -> Result<Option<AccountId>, D::Error> {
    optional(d, parse_account, "an account id")
}

pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
    with_parser(d, parse_amount, "a balance")
}

pub fn uint<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    with_parser(d, parse_u64, "an unsigned integer")
}

pub fn opt_uint<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    optional(d, parse_u64, "an unsigned integer")
}

/// A 32-byte hash, normalized to a lowercase `0x`-prefixed hex string.
pub fn hash<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    with_parser(d, |v| parse_hash256(v).map(|h| format!("0x{}", hex::encode(h))), "a 32-byte hash")
}

pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    with_parser(d, parse_text, "text")
}

pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    optional(d, parse_text, "text")
}

/// Enum label as a plain string, for enums the relay only copies through.
pub fn label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    with_parser(d, |v| variant_label(v).map(str::to_string), "an enum variant")
}

pub fn opt_label<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    optional(d, |v| variant_label(v).map(str::to_string), "an enum variant")
}

/// Enum label parsed into a typed enum.
pub fn variant<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Value::deserialize(d)?;
    let label = variant_label(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an enum variant, got {value}")))?;
    label.parse().map_err(de::Error::custom)
}
