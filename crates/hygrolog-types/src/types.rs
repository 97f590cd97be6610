//! Core types for hygrolog sensor data.

use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};

use crate::error::ParseError;

// Civil (wall-clock, zone-free) formats used in the persisted JSON files.
time::serde::format_description!(
    civil_datetime,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);
time::serde::format_description!(civil_date, Date, "[year]-[month]-[day]");

/// A single temperature/humidity measurement.
///
/// Created once per successfully parsed sensor line and immutable after
/// creation. Values are rounded to 2 decimals at construction so that the
/// in-memory representation matches the persisted one exactly.
///
/// Serializes with a `"YYYY-MM-DD HH:MM:SS"` timestamp:
///
/// ```
/// use hygrolog_types::Reading;
/// use time::macros::datetime;
///
/// let reading = Reading::new(datetime!(2024-03-01 12:30:00), 21.5, 54.0);
/// let json = serde_json::to_string(&reading).unwrap();
/// assert!(json.contains("\"2024-03-01 12:30:00\""));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the reading was captured (local civil time).
    #[serde(with = "civil_datetime")]
    pub timestamp: PrimitiveDateTime,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage (0-100).
    pub humidity: f64,
}

impl Reading {
    /// Create a reading, rounding both values to 2 decimals.
    #[must_use]
    pub fn new(timestamp: PrimitiveDateTime, temperature: f64, humidity: f64) -> Self {
        Self {
            timestamp,
            temperature: round2(temperature),
            humidity: round2(humidity),
        }
    }

    /// Parse one raw sensor line into a reading.
    ///
    /// The wire format is two decimal fields separated by a single comma,
    /// e.g. `"21.5,54.0"`. Any other shape (empty line, wrong field count,
    /// non-numeric or non-finite text) fails without producing a partial
    /// reading.
    ///
    /// # Examples
    ///
    /// ```
    /// use hygrolog_types::Reading;
    /// use time::macros::datetime;
    ///
    /// let ts = datetime!(2024-03-01 12:30:00);
    /// let reading = Reading::parse_line("21.5,54.0", ts).unwrap();
    /// assert_eq!(reading.temperature, 21.5);
    /// assert_eq!(reading.humidity, 54.0);
    ///
    /// assert!(Reading::parse_line("bad-line", ts).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] describing the malformed line.
    #[must_use = "parsing returns a Result that should be handled"]
    pub fn parse_line(line: &str, timestamp: PrimitiveDateTime) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyLine);
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 2 {
            return Err(ParseError::FieldCount {
                actual: fields.len(),
                line: line.to_string(),
            });
        }

        let temperature = parse_field(fields[0], "temperature")?;
        let humidity = parse_field(fields[1], "humidity")?;

        Ok(Self::new(timestamp, temperature, humidity))
    }

    /// The calendar date this reading belongs to.
    #[must_use]
    pub fn date(&self) -> Date {
        self.timestamp.date()
    }
}

fn parse_field(text: &str, field: &'static str) -> Result<f64, ParseError> {
    let value: f64 = text.trim().parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: text.trim().to_string(),
    })?;

    // "NaN" and "inf" parse successfully but are never valid sensor output.
    if !value.is_finite() {
        return Err(ParseError::InvalidNumber {
            field,
            value: text.trim().to_string(),
        });
    }

    Ok(value)
}

/// Round to 2 decimal places, matching the precision of the persisted files.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Min/max/average statistics for one calendar day of readings.
///
/// Derived from exactly one day's history at the moment of rollover and
/// appended to the statistics log. Averages are rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// The day the statistics cover.
    #[serde(with = "civil_date")]
    pub date: Date,
    /// Lowest temperature of the day.
    pub temp_min: f64,
    /// Highest temperature of the day.
    pub temp_max: f64,
    /// Average temperature of the day.
    pub temp_avg: f64,
    /// Lowest humidity of the day.
    pub hum_min: f64,
    /// Highest humidity of the day.
    pub hum_max: f64,
    /// Average humidity of the day.
    pub hum_avg: f64,
}

impl DailyStats {
    /// Compute statistics over one day's readings.
    ///
    /// Returns `None` for an empty day; a day with no readings produces no
    /// statistics record.
    #[must_use]
    pub fn from_readings(date: Date, readings: &[Reading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let mut temp_min = f64::INFINITY;
        let mut temp_max = f64::NEG_INFINITY;
        let mut hum_min = f64::INFINITY;
        let mut hum_max = f64::NEG_INFINITY;
        let mut temp_sum = 0.0;
        let mut hum_sum = 0.0;

        for reading in readings {
            temp_min = temp_min.min(reading.temperature);
            temp_max = temp_max.max(reading.temperature);
            hum_min = hum_min.min(reading.humidity);
            hum_max = hum_max.max(reading.humidity);
            temp_sum += reading.temperature;
            hum_sum += reading.humidity;
        }

        let count = readings.len() as f64;

        Some(Self {
            date,
            temp_min,
            temp_max,
            temp_avg: round2(temp_sum / count),
            hum_min,
            hum_max,
            hum_avg: round2(hum_sum / count),
        })
    }
}
