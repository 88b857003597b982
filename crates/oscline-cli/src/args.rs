//! Command-line argument values
//!
//! `oscline send` takes its OSC arguments as plain strings. A type prefix
//! forces the type; bare values are inferred.
//!
//! | Input        | Value                        |
//! |--------------|------------------------------|
//! | `i:42`       | Int32                        |
//! | `h:42`       | Int64                        |
//! | `f:1.5`      | Float32                      |
//! | `d:1.5`      | Float64                      |
//! | `s:text`     | String (even if numeric)     |
//! | `c:x`        | Char                         |
//! | `T` `F`      | Bool                         |
//! | `N`          | Nil                          |
//! | `I`          | Infinitum                    |
//! | `42`         | Int32, Int64 if out of range |
//! | `1.5`        | Float32                      |
//! | `true`       | Bool                         |
//! | anything else| String                       |

use anyhow::{anyhow, bail, Context, Result};
use oscline_core::OscValue;
use serde_json::{json, Value as JsonValue};

pub fn parse_arg(input: &str) -> Result<OscValue> {
    match input {
        "T" => return Ok(OscValue::Bool(true)),
        "F" => return Ok(OscValue::Bool(false)),
        "N" => return Ok(OscValue::Nil),
        "I" => return Ok(OscValue::Infinitum),
        _ => {}
    }

    if let Some((prefix, rest)) = input.split_once(':') {
        let value = match prefix {
            "i" => OscValue::Int32(rest.parse().with_context(|| format!("invalid i32: {}", rest))?),
            "h" => OscValue::Int64(rest.parse().with_context(|| format!("invalid i64: {}", rest))?),
            "f" => OscValue::Float32(rest.parse().with_context(|| format!("invalid f32: {}", rest))?),
            "d" => OscValue::Float64(rest.parse().with_context(|| format!("invalid f64: {}", rest))?),
            "s" => OscValue::String(rest.to_string()),
            "c" => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => OscValue::Char(c),
                    _ => bail!("c: expects exactly one character, got {:?}", rest),
                }
            }
            _ => return Ok(infer(input)),
        };
        return Ok(value);
    }

    Ok(infer(input))
}

pub fn parse_args(inputs: &[String]) -> Result<Vec<OscValue>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, s)| parse_arg(s).map_err(|e| anyhow!("argument {}: {}", i + 1, e)))
        .collect()
}

fn infer(input: &str) -> OscValue {
    if let Ok(v) = input.parse::<i32>() {
        return OscValue::Int32(v);
    }
    if let Ok(v) = input.parse::<i64>() {
        return OscValue::Int64(v);
    }
    if let Ok(v) = input.parse::<f32>() {
        // "inf" and "nan" parse as floats but are meant as text
        if v.is_finite() {
            return OscValue::Float32(v);
        }
    }
    match input {
        "true" => OscValue::Bool(true),
        "false" => OscValue::Bool(false),
        _ => OscValue::String(input.to_string()),
    }
}

/// JSON form of a value for `listen --json`
pub fn value_to_json(value: &OscValue) -> JsonValue {
    match value {
        OscValue::Int32(v) => json!({ "i": v }),
        OscValue::Int64(v) => json!({ "h": v }),
        OscValue::Float32(v) => json!({ "f": v }),
        OscValue::Float64(v) => json!({ "d": v }),
        OscValue::String(v) => json!({ "s": v }),
        OscValue::Blob(v) => json!({ "b": v }),
        OscValue::Bool(v) => json!(v),
        OscValue::Nil => JsonValue::Null,
        OscValue::Infinitum => json!("Infinitum"),
        OscValue::TimeTag(v) => json!({ "t": v }),
        OscValue::Char(v) => json!({ "c": v.to_string() }),
        OscValue::Color(c) => json!({ "r": [c.r, c.g, c.b, c.a] }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oscline_core::OscColor;

    #[test]
    fn test_prefixed() {
        assert_eq!(parse_arg("i:42").unwrap(), OscValue::Int32(42));
        assert_eq!(parse_arg("h:42").unwrap(), OscValue::Int64(42));
        assert_eq!(parse_arg("f:0.5").unwrap(), OscValue::Float32(0.5));
        assert_eq!(parse_arg("d:0.25").unwrap(), OscValue::Float64(0.25));
        assert_eq!(parse_arg("s:123").unwrap(), OscValue::String("123".into()));
        assert_eq!(parse_arg("s:").unwrap(), OscValue::String(String::new()));
        assert_eq!(parse_arg("c:x").unwrap(), OscValue::Char('x'));
    }

    #[test]
    fn test_bare_tags() {
        assert_eq!(parse_arg("T").unwrap(), OscValue::Bool(true));
        assert_eq!(parse_arg("F").unwrap(), OscValue::Bool(false));
        assert_eq!(parse_arg("N").unwrap(), OscValue::Nil);
        assert_eq!(parse_arg("I").unwrap(), OscValue::Infinitum);
    }

    #[test]
    fn test_inference() {
        assert_eq!(parse_arg("7").unwrap(), OscValue::Int32(7));
        assert_eq!(parse_arg("-7").unwrap(), OscValue::Int32(-7));
        assert_eq!(parse_arg("5000000000").unwrap(), OscValue::Int64(5_000_000_000));
        assert_eq!(parse_arg("1.5").unwrap(), OscValue::Float32(1.5));
        assert_eq!(parse_arg("true").unwrap(), OscValue::Bool(true));
        assert_eq!(parse_arg("hello").unwrap(), OscValue::String("hello".into()));
        assert_eq!(parse_arg("inf").unwrap(), OscValue::String("inf".into()));
        // Unknown prefixes are plain text
        assert_eq!(
            parse_arg("http://host").unwrap(),
            OscValue::String("http://host".into())
        );
    }

    #[test]
    fn test_bad_prefixed_values() {
        assert!(parse_arg("i:abc").is_err());
        assert!(parse_arg("i:5000000000").is_err());
        assert!(parse_arg("c:").is_err());
        assert!(parse_arg("c:ab").is_err());

        let err = parse_args(&["1".to_string(), "f:x".to_string()]).unwrap_err();
        assert!(err.to_string().starts_with("argument 2"));
    }

    #[test]
    fn test_json() {
        assert_eq!(value_to_json(&OscValue::Int32(3)), json!({ "i": 3 }));
        assert_eq!(value_to_json(&OscValue::Nil), JsonValue::Null);
        assert_eq!(
            value_to_json(&OscValue::Color(OscColor::new(1, 2, 3, 4))),
            json!({ "r": [1, 2, 3, 4] })
        );
    }
}
