//! Blood parameter models.

use serde::{Deserialize, Deserializer, Serialize};

/// A single named clinical measurement from one report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    /// Parameter name as extracted (e.g., "Hemoglobin")
    pub name: String,
    /// Measured value
    #[serde(deserialize_with = "numeric_value")]
    pub value: f64,
    /// Unit as extracted (e.g., "g/L")
    #[serde(default)]
    pub unit: String,
}

impl Parameter {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// Accepts `13.2`, `"13.2"` and `"13,2"`.
fn numeric_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Number(f64),
        Text(String),
    }

    match RawValue::deserialize(deserializer)? {
        RawValue::Number(n) => Ok(n),
        RawValue::Text(s) => parse_number(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("not a number: {s:?}"))),
    }
}

/// Parse a decimal number that may use a comma as separator.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Biological sex as recorded on a report.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Parse a gender label leniently. Anything unrecognized is `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "male" | "m" | "man" | "мужской" | "муж" | "м" => Gender::Male,
            "female" | "f" | "woman" | "женский" | "жен" | "ж" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawGender {
            Text(String),
            Other(serde::de::IgnoredAny),
        }

        // Non-string labels (numbers, booleans) read as `Unknown`.
        match RawGender::deserialize(deserializer)? {
            RawGender::Text(label) => Ok(Gender::parse(&label)),
            RawGender::Other(_) => Ok(Gender::Unknown),
        }
    }
}
