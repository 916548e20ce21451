use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tagged attribute value as stored by the backing record format.
///
/// Values are externally tagged with the store's single-letter type keys, so
/// the JSON form is exactly what the store hands back: `{"S": "1.2 s"}`,
/// `{"M": {"cls": {"N": "0.02"}}}`, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// String scalar
    #[serde(rename = "S")]
    Str(String),
    /// Numeric scalar, carried as a decimal string on the wire
    #[serde(rename = "N")]
    Num(String),
    /// Nested attribute map
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttrValue>),
    /// Ordered list of values
    #[serde(rename = "L")]
    List(Vec<AttrValue>),
}

/// One timestamped performance report.
///
/// `time` is the report timestamp (`YYYY-MM-DDTHH:MM:SS...`, UTC); the
/// remaining attributes are the projected report fields (`reportTime` plus
/// one metric group per platform). Records are read-only once fetched —
/// selection and normalization always build new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub time: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl ReportRecord {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Split the timestamp into its UTC calendar day and hour-of-day.
    ///
    /// Returns `None` when the timestamp cannot be split into date and hour
    /// parts; callers treat that as a data-integrity problem and skip the
    /// record rather than misparse it.
    pub fn day_and_hour(&self) -> Option<(NaiveDate, u32)> {
        let (date_part, time_part) = self.time.split_once('T')?;
        let day = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
        let hour: u32 = time_part.get(..2)?.parse().ok()?;
        (hour < 24).then_some((day, hour))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn day_and_hour_splits_well_formed_timestamps() {
        let record = ReportRecord::new("2024-01-02T14:05:00");
        let (day, hour) = record.day_and_hour().unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(hour, 14);
    }

    #[test]
    fn day_and_hour_rejects_malformed_timestamps() {
        let malformed = [
            "",
            "2024-01-02",
            "2024-01-02TXX:00:00",
            "not a date",
            "2024-13-40T09:00:00",
            "2024-01-02T99:00:00",
        ];
        for time in malformed {
            let record = ReportRecord::new(time);
            assert_eq!(record.day_and_hour(), None, "expected None for {:?}", time);
        }
    }

    #[test]
    fn attr_value_round_trips_the_wire_format() {
        let wire = json!({
            "time": "2024-01-02T14:05:00",
            "reportTime": {"S": "2024-01-02T14:05:00"},
            "desktop": {"M": {"first_contentful_paint": {"S": "1.2 s"}}},
            "mobile": {"M": {"scores": {"L": [{"N": "98"}, {"N": "87"}]}}}
        });

        let record: ReportRecord = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(
            record.attributes.get("reportTime"),
            Some(&AttrValue::Str("2024-01-02T14:05:00".to_string()))
        );
        assert_eq!(serde_json::to_value(&record).unwrap(), wire);
    }
}
