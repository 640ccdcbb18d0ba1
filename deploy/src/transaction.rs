use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};

use crate::address::Address;

const VERSION: &str = "0x3";
const DEFAULT_STEP_LIMIT: u64 = 0x7000_0000;

/// Unsigned v3 deploy transaction, ready for hashing and submission.
pub fn deploy_transaction(
    from: &Address,
    to: &str,
    nid: u64,
    content: &[u8],
    content_type: &str,
    params: &Value,
) -> Value {
    let mut data = Map::new();
    data.insert("contentType".into(), json!(content_type));
    data.insert("content".into(), json!(format!("0x{}", hex::encode(content))));
    match normalize_params(params) {
        Value::Null => {}
        Value::Object(map) if map.is_empty() => {}
        params => {
            data.insert("params".into(), params);
        }
    }

    json!({
        "version": VERSION,
        "from": from.as_str(),
        "to": to,
        "stepLimit": format!("{DEFAULT_STEP_LIMIT:#x}"),
        "nid": format!("{nid:#x}"),
        "nonce": "0x1",
        "timestamp": format!("{:#x}", timestamp_us()),
        "dataType": "deploy",
        "data": Value::Object(data),
    })
}

/// Digest that gets signed: SHA3-256 of the canonical serialization.
pub fn hash(tx: &Value) -> [u8; 32] {
    use sha3::{Digest, Sha3_256};
    Sha3_256::digest(serialize_for_hash(tx).as_bytes()).into()
}

/// Canonical transaction serialization for signing: `icx_sendTransaction.`
/// followed by the fields in key order. Nested objects render as `{k.v.k.v}`,
/// arrays as `[v.v]`, null as `\0`; `\ . { } [ ]` are backslash-escaped inside
/// strings. A `signature` field, if present, is excluded.
pub fn serialize_for_hash(tx: &Value) -> String {
    let mut out = String::from("icx_sendTransaction");
    if let Value::Object(fields) = tx {
        for (key, value) in fields {
            if key == "signature" {
                continue;
            }
            out.push('.');
            out.push_str(key);
            out.push('.');
            write_value(value, &mut out);
        }
    }
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("\\0"),
        Value::Bool(b) => out.push_str(if *b { "0x1" } else { "0x0" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        // serde_json maps are BTree-backed, so iteration is already key-sorted
        Value::Object(fields) => {
            out.push('{');
            for (i, (key, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                write_escaped(key, out);
                out.push('.');
                write_value(value, out);
            }
            out.push('}');
        }
    }
}

fn write_escaped(s: &str, out: &mut String) {
    for c in s.chars() {
        if matches!(c, '\\' | '.' | '{' | '}' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Integer and boolean parameter values become hex strings, the only scalar
/// form the node accepts.
fn normalize_params(params: &Value) -> Value {
    match params {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                json!(format!("{v:#x}"))
            } else if let Some(v) = n.as_i64() {
                json!(format!("-0x{:x}", v.unsigned_abs()))
            } else {
                params.clone()
            }
        }
        Value::Bool(b) => json!(if *b { "0x1" } else { "0x0" }),
        Value::Array(items) => Value::Array(items.iter().map(normalize_params).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), normalize_params(v)))
                .collect(),
        ),
        _ => params.clone(),
    }
}

fn timestamp_us() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros()
}
