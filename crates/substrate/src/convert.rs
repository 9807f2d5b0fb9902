//! SCALE value to JSON conversion.
//!
//! Byte arrays of common widths become `0x`-hex strings, integers become
//! decimal strings, `Option` collapses to its content or `null`, and other
//! enum variants become `{ "Variant": content }`.

use serde_json::{Map, Value as Json};
use subxt::ext::scale_value::{Composite, Primitive, Value, ValueDef};

/// Convert event fields into positional arguments, in declaration order.
pub fn composite_to_args<T>(composite: &Composite<T>) -> Vec<Json> {
    match composite {
        Composite::Named(fields) => fields.iter().map(|(_, v)| value_to_json(v)).collect(),
        Composite::Unnamed(values) => values.iter().map(value_to_json).collect(),
    }
}

/// Convert a Composite to a JSON value.
pub fn composite_to_json<T>(composite: &Composite<T>) -> Json {
    match composite {
        Composite::Unnamed(values) => {
            // AccountId, Hash, ...
            if let Some(hex_str) = try_as_byte_array(values) {
                return Json::String(hex_str);
            }
            // Newtype wrappers
            if values.len() == 1 {
                return value_to_json(&values[0]);
            }
            Json::Array(values.iter().map(value_to_json).collect())
        }
        Composite::Named(fields) => {
            let obj: Map<String, Json> = fields
                .iter()
                .map(|(name, v)| (name.clone(), value_to_json(v)))
                .collect();
            Json::Object(obj)
        }
    }
}

/// Interpret an unnamed composite as a byte array, returning its hex form.
fn try_as_byte_array<T>(values: &[Value<T>]) -> Option<String> {
    let len = values.len();
    if len != 32 && len != 20 && len != 64 {
        return None;
    }

    let mut bytes = Vec::with_capacity(len);
    for value in values {
        match &value.value {
            ValueDef::Primitive(Primitive::U128(n)) if *n <= 255 => bytes.push(*n as u8),
            _ => return None,
        }
    }

    Some(format!("0x{}", hex::encode(bytes)))
}

/// Convert a Value to a JSON value.
pub fn value_to_json<T>(value: &Value<T>) -> Json {
    match &value.value {
        ValueDef::Composite(composite) => composite_to_json(composite),
        ValueDef::Variant(variant) => {
            let inner = composite_to_json(&variant.values);
            let single = matches!(&variant.values, Composite::Unnamed(values) if values.len() == 1);
            match variant.name.as_str() {
                "None" if is_unit(&variant.values) => Json::Null,
                "Some" if single => inner,
                // `MultiAddress::Id(account)`
                "Id" if single && is_address(&inner) => inner,
                name => {
                    let mut map = Map::new();
                    map.insert(name.to_string(), inner);
                    Json::Object(map)
                }
            }
        }
        ValueDef::Primitive(primitive) => primitive_to_json(primitive),
        ValueDef::BitSequence(bits) => Json::String(format!("{:?}", bits)),
    }
}

fn is_unit<T>(composite: &Composite<T>) -> bool {
    match composite {
        Composite::Named(fields) => fields.is_empty(),
        Composite::Unnamed(values) => values.is_empty(),
    }
}

/// Hex form of a 32-byte account or 20-byte key.
fn is_address(json: &Json) -> bool {
    json.as_str()
        .is_some_and(|s| s.starts_with("0x") && (s.len() == 66 || s.len() == 42))
}

/// Convert a Primitive to a JSON value.
fn primitive_to_json(primitive: &Primitive) -> Json {
    match primitive {
        Primitive::Bool(b) => Json::Bool(*b),
        Primitive::Char(c) => Json::String(c.to_string()),
        Primitive::String(s) => Json::String(s.clone()),
        Primitive::U128(n) => Json::String(n.to_string()),
        Primitive::I128(n) => Json::String(n.to_string()),
        Primitive::U256(n) => Json::String(format!("{:?}", n)),
        Primitive::I256(n) => Json::String(format!("{:?}", n)),
    }
}
