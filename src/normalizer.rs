use crate::types::{AttrValue, ReportRecord};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Number, Value};

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_\s]+(\w)").expect("valid regex"));

/// Convert an attribute name to camelCase.
///
/// Each run of separators (hyphen, underscore, whitespace) followed by a word
/// character collapses to the upper-cased character, and the leading
/// character is lower-cased. Anything after a surviving literal space is
/// discarded — stored keys are single words, so a trailing fragment is an
/// ingestion accident, not data.
pub fn camelize(name: &str) -> String {
    let collapsed = SEPARATOR_RUN.replace_all(name, |caps: &Captures| caps[1].to_uppercase());

    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars();
    if let Some(first) = chars.next() {
        if first.is_alphanumeric() || first == '_' {
            out.extend(first.to_lowercase());
        } else {
            out.push(first);
        }
    }
    out.extend(chars);

    out.split(' ').next().unwrap_or_default().to_string()
}

/// Collapse a tagged attribute value into a plain JSON value.
///
/// The wire wrappers disappear structurally: a `Str`/`Num` leaf becomes the
/// bare scalar (so a map that wrapped a scalar "is" that scalar), and a
/// `Map`'s fields land directly at the current nesting level under their
/// camelized names, with no wrapper key in between.
pub fn normalize_value(value: &AttrValue) -> Value {
    match value {
        AttrValue::Str(s) => Value::String(s.clone()),
        AttrValue::Num(n) => parse_number(n),
        AttrValue::Map(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, child)| (camelize(name), normalize_value(child)))
                .collect(),
        ),
        AttrValue::List(items) => Value::Array(items.iter().map(normalize_value).collect()),
    }
}

/// Flatten one record to `{"time": ..., <camelized attributes>...}`.
pub fn normalize_record(record: &ReportRecord) -> Value {
    let mut out = Map::new();
    out.insert("time".to_string(), Value::String(record.time.clone()));
    for (name, value) in &record.attributes {
        out.insert(camelize(name), normalize_value(value));
    }
    Value::Object(out)
}

/// Normalize a selected batch, preserving order.
pub fn normalize_records(records: &[ReportRecord]) -> Vec<Value> {
    records.iter().map(normalize_record).collect()
}

fn parse_number(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    match raw.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(num) => Value::Number(num),
        // Not actually numeric; hand the raw text through rather than drop it.
        None => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attr(wire: Value) -> AttrValue {
        serde_json::from_value(wire).unwrap()
    }

    #[test]
    fn camelize_collapses_separator_runs() {
        assert_eq!(camelize("first_contentful_paint"), "firstContentfulPaint");
        assert_eq!(camelize("largest-contentful-paint"), "largestContentfulPaint");
        assert_eq!(camelize("Speed Index"), "speedIndex");
        assert_eq!(camelize("total__blocking--time"), "totalBlockingTime");
    }

    #[test]
    fn camelize_lowercases_the_leading_character() {
        assert_eq!(camelize("Time"), "time");
        assert_eq!(camelize("TTFB"), "tTFB");
        assert_eq!(camelize("_leading"), "leading");
    }

    #[test]
    fn camelize_truncates_at_a_surviving_space() {
        assert_eq!(camelize("cls !note"), "cls");
        assert_eq!(camelize("score  "), "score");
    }

    #[test]
    fn scalar_wrappers_collapse_to_the_bare_value() {
        assert_eq!(normalize_value(&attr(json!({"S": "hello"}))), json!("hello"));
        assert_eq!(normalize_value(&attr(json!({"N": "3"}))), json!(3));
        assert_eq!(normalize_value(&attr(json!({"N": "0.02"}))), json!(0.02));
    }

    #[test]
    fn unparseable_numbers_pass_through_as_text() {
        assert_eq!(normalize_value(&attr(json!({"N": "12abc"}))), json!("12abc"));
    }

    #[test]
    fn map_contents_splice_into_the_parent_level() {
        let value = attr(json!({"M": {"cpu": {"N": "3"}}}));
        assert_eq!(normalize_value(&value), json!({"cpu": 3}));
    }

    #[test]
    fn simple_map_normalizes_field_by_field() {
        let value = attr(json!({"M": {"a": {"S": "x"}}}));
        assert_eq!(normalize_value(&value), json!({"a": "x"}));
    }

    #[test]
    fn nested_groups_flatten_with_camelized_keys() {
        let value = attr(json!({
            "M": {
                "first_contentful_paint": {"S": "1.2 s"},
                "performance-score": {"N": "98"},
                "audits": {"L": [{"S": "ok"}, {"N": "2"}]}
            }
        }));
        assert_eq!(
            normalize_value(&value),
            json!({
                "firstContentfulPaint": "1.2 s",
                "performanceScore": 98,
                "audits": ["ok", 2]
            })
        );
    }

    #[test]
    fn records_flatten_to_time_plus_groups() {
        let record: ReportRecord = serde_json::from_value(json!({
            "time": "2024-01-02T14:05:00",
            "reportTime": {"S": "2024-01-02T14:05:00"},
            "desktop": {"M": {"speed_index": {"S": "2.1 s"}}},
            "mobile": {"M": {"speed_index": {"S": "4.4 s"}}}
        }))
        .unwrap();

        assert_eq!(
            normalize_record(&record),
            json!({
                "time": "2024-01-02T14:05:00",
                "reportTime": "2024-01-02T14:05:00",
                "desktop": {"speedIndex": "2.1 s"},
                "mobile": {"speedIndex": "4.4 s"}
            })
        );
    }

    #[test]
    fn batch_normalization_preserves_order() {
        let records = vec![
            ReportRecord::new("2024-01-02T14:05:00"),
            ReportRecord::new("2024-01-01T14:10:00"),
        ];
        let normalized = normalize_records(&records);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0]["time"], json!("2024-01-02T14:05:00"));
        assert_eq!(normalized[1]["time"], json!("2024-01-01T14:10:00"));
    }
}
