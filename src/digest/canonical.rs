//! Canonical byte encoding of JSON values
//!
//! The encoding looks like pretty-printed JSON but is only ever fed to a
//! hash, so it skips the parts of JSON that don't matter for that:
//!
//! - strings are written raw between `"` delimiters (unless escaping is on)
//! - every sequence element and mapping entry is followed by `,`, including
//!   the last one
//! - mapping keys are visited in UTF-16 code-unit order, never insertion
//!   order
//!
//! A string containing `"` can produce the same bytes as a different
//! structure. The legacy address space depends on this exact stream, so the
//! escaping variant is opt-in (see [`DigestScheme::Escaped`]).
//!
//! [`DigestScheme::Escaped`]: super::DigestScheme::Escaped

use serde_json::{Number, Value};

/// Feed the canonical encoding of `value` into `sink`
pub(crate) fn encode<F>(value: &Value, escape_strings: bool, sink: &mut F)
where
    F: FnMut(&[u8]),
{
    match value {
        Value::Null => sink(b"null"),
        Value::Bool(true) => sink(b"true"),
        Value::Bool(false) => sink(b"false"),
        Value::Number(n) => sink(format_number(n).as_bytes()),
        Value::String(s) => encode_string(s, escape_strings, sink),
        Value::Array(items) => {
            sink(b"[");
            for item in items {
                encode(item, escape_strings, sink);
                sink(b",");
            }
            sink(b"]");
        }
        Value::Object(map) => {
            // UTF-16 order, not UTF-8: they disagree once a key holds a
            // character above U+FFFF
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.encode_utf16().cmp(b.0.encode_utf16()));

            sink(b"{");
            for (key, item) in entries {
                encode_string(key, escape_strings, sink);
                sink(b": ");
                encode(item, escape_strings, sink);
                sink(b",");
            }
            sink(b"}");
        }
    }
}

fn encode_string<F>(s: &str, escape: bool, sink: &mut F)
where
    F: FnMut(&[u8]),
{
    sink(b"\"");
    if escape {
        sink(escape_json(s).as_bytes());
    } else {
        sink(s.as_bytes());
    }
    sink(b"\"");
}

fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Textual form of a number, following ECMAScript `Number.prototype.toString`
/// for floats so configurations hash the same as they always have.
///
/// Integers are printed exactly, even past 2^53 where a double would round
/// them: `18446744073709551615` stays as is rather than becoming
/// `18446744073709552000`.
pub fn format_number(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    // Every other serde_json number is a finite f64
    format_float(n.as_f64().unwrap_or_default())
}

fn format_float(f: f64) -> String {
    if f == 0.0 {
        // covers -0.0
        return "0".to_string();
    }

    let magnitude = f.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{f:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{mantissa}e+{power}")
            }
            _ => exp,
        };
    }

    format!("{f}")
}
