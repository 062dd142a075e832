use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Split epoch timestamp as the remote represents instants on the wire.
///
/// `nanos` is the sub-second offset and is always below one second.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    /// Reassemble the two wire parts into an instant.
    ///
    /// Returns `None` for values outside the range chrono can represent.
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }
}

/// Quality flag attached to every ingested point.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    #[default]
    Good,
    Bad,
    Uncertain,
}

/// A single locally produced sample, submitted to the remote in batches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub value: f64,
    pub timestamp: Timestamp,
    pub quality: Quality,
}

impl DataPoint {
    pub fn new(value: f64, at: DateTime<Utc>) -> Self {
        Self {
            value,
            timestamp: at.into(),
            quality: Quality::Good,
        }
    }
}

/// Read-side projection of one sample returned by a history query.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_round_trips_to_microsecond_precision() {
        let original = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 34, 56)
            .unwrap()
            .checked_add_signed(chrono::TimeDelta::microseconds(123_456))
            .unwrap();

        let wire = Timestamp::from(original);
        let restored = wire.to_utc().unwrap();

        let drift = (restored - original).abs();
        assert!(drift <= chrono::TimeDelta::microseconds(1));
        assert_eq!(restored, original);
    }

    #[test]
    fn timestamp_rejects_out_of_range_seconds() {
        let wire = Timestamp {
            seconds: i64::MAX,
            nanos: 0,
        };
        assert!(wire.to_utc().is_none());
    }

    #[test]
    fn data_point_wire_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let point = DataPoint::new(2.0, at);

        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            serde_json::json!({
                "value": 2.0,
                "timestamp": { "seconds": 1_704_067_201i64, "nanos": 0 },
                "quality": "GOOD",
            })
        );
    }
}
