//! Text renderings of JSON values as the CLI prints them.
//!
//! Raw mode uses one-space indentation. Explain mode and inline echoes of a
//! response use a single line with `", "` and `": "` separators.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

use crate::error::ClientError;

/// Render with one-space indentation, keys in their original order.
pub fn to_raw_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ClientError> {
    write_with(value, PrettyFormatter::with_indent(b" "))
}

/// Render on one line with spaced separators, e.g. `{"amount": 100.0}`.
pub fn to_inline_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ClientError> {
    write_with(value, InlineFormatter)
}

/// Shortest round-trip form that always keeps a fractional part.
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn write_with<T, F>(value: &T, formatter: F) -> Result<String, ClientError>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ClientError::Serialization(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ClientError::Serialization(e.to_string()))
}

struct InlineFormatter;

impl Formatter for InlineFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_uses_one_space_indent_in_server_order() {
        let body: serde_json::Value =
            serde_json::from_str(r#"{"success":true,"new_contract":7835610}"#).unwrap();
        assert_eq!(
            to_raw_json(&body).unwrap(),
            "{\n \"success\": true,\n \"new_contract\": 7835610\n}"
        );
    }

    #[test]
    fn raw_nests_arrays() {
        let body = json!({"instances": [{"id": 1}]});
        assert_eq!(
            to_raw_json(&body).unwrap(),
            "{\n \"instances\": [\n  {\n   \"id\": 1\n  }\n ]\n}"
        );
    }

    #[test]
    fn empty_object_stays_compact() {
        assert_eq!(to_raw_json(&json!({})).unwrap(), "{}");
        assert_eq!(to_inline_json(&json!({})).unwrap(), "{}");
    }

    #[test]
    fn inline_uses_spaced_separators() {
        assert_eq!(to_inline_json(&json!({"amount": 100.0})).unwrap(), r#"{"amount": 100.0}"#);
        assert_eq!(to_inline_json(&json!([1, 2])).unwrap(), "[1, 2]");
    }

    #[test]
    fn floats_keep_fraction() {
        assert_eq!(format_float(100.0), "100.0");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(100.0 * round_to(0.25, 3)), "25.0");
    }

    #[test]
    fn rounding_to_three_places() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(2.0, 3), 2.0);
    }
}
