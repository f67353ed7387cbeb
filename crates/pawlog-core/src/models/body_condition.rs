//! Body condition scale

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Fixed body-condition categories, thinnest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyCondition {
    VeryThin,
    Underweight,
    Ideal,
    Overweight,
    Obese,
}

impl BodyCondition {
    /// Every category in scale order
    pub const ALL: [Self; 5] = [
        Self::VeryThin,
        Self::Underweight,
        Self::Ideal,
        Self::Overweight,
        Self::Obese,
    ];

    /// Stored and displayed value
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryThin => "Very Thin",
            Self::Underweight => "Underweight",
            Self::Ideal => "Ideal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }

    /// Position on the 1..=5 scale
    pub const fn score(self) -> u8 {
        match self {
            Self::VeryThin => 1,
            Self::Underweight => 2,
            Self::Ideal => 3,
            Self::Overweight => 4,
            Self::Obese => 5,
        }
    }

    pub fn from_score(score: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|condition| u64::from(condition.score()) == score)
    }
}

impl fmt::Display for BodyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BodyCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        if let Ok(score) = key.parse::<u64>() {
            return Self::from_score(score).ok_or_else(|| format!("unknown body condition '{s}'"));
        }
        Self::ALL
            .into_iter()
            .find(|condition| condition.label().replace(' ', "").to_ascii_lowercase() == key)
            .ok_or_else(|| format!("unknown body condition '{s}'"))
    }
}

impl Serialize for BodyCondition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCondition {
    Label(String),
    Score(u64),
}

impl<'de> Deserialize<'de> for BodyCondition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawCondition::deserialize(deserializer)? {
            RawCondition::Label(label) => label.parse().map_err(de::Error::custom),
            RawCondition::Score(score) => Self::from_score(score)
                .ok_or_else(|| de::Error::custom(format!("body condition score {score} out of range"))),
        }
    }
}

/// Body condition as stored on a log row.
///
/// Rows written by other clients may hold a label or score outside the
/// scale; those decode as `Unrecognized` with the raw value kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordedCondition {
    Known(BodyCondition),
    Unrecognized(String),
}

impl RecordedCondition {
    pub const fn known(&self) -> Option<BodyCondition> {
        match self {
            Self::Known(condition) => Some(*condition),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<BodyCondition> for RecordedCondition {
    fn from(condition: BodyCondition) -> Self {
        Self::Known(condition)
    }
}

impl fmt::Display for RecordedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(condition) => f.write_str(condition.label()),
            Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for RecordedCondition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Known(condition) => condition.serialize(serializer),
            Self::Unrecognized(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RecordedCondition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let recorded = match Value::deserialize(deserializer)? {
            Value::String(label) => label
                .parse()
                .map_or(Self::Unrecognized(label), Self::Known),
            Value::Number(number) => number
                .as_u64()
                .and_then(BodyCondition::from_score)
                .map_or_else(|| Self::Unrecognized(number.to_string()), Self::Known),
            Value::Null => Self::Unrecognized(String::new()),
            other => Self::Unrecognized(other.to_string()),
        };
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_loosely() {
        assert_eq!("Ideal".parse::<BodyCondition>(), Ok(BodyCondition::Ideal));
        assert_eq!("very-thin".parse::<BodyCondition>(), Ok(BodyCondition::VeryThin));
        assert_eq!("VERY THIN".parse::<BodyCondition>(), Ok(BodyCondition::VeryThin));
        assert_eq!("4".parse::<BodyCondition>(), Ok(BodyCondition::Overweight));
        assert!("chonky".parse::<BodyCondition>().is_err());
    }

    #[test]
    fn deserializes_label_or_score() {
        let from_label: BodyCondition = serde_json::from_str("\"Overweight\"").unwrap();
        let from_score: BodyCondition = serde_json::from_str("2").unwrap();
        assert_eq!(from_label, BodyCondition::Overweight);
        assert_eq!(from_score, BodyCondition::Underweight);
        assert!(serde_json::from_str::<BodyCondition>("9").is_err());
    }

    #[test]
    fn recorded_condition_keeps_off_scale_values() {
        let known: RecordedCondition = serde_json::from_str("\"Ideal\"").unwrap();
        let zero: RecordedCondition = serde_json::from_str("0").unwrap();
        let free_text: RecordedCondition = serde_json::from_str("\"Thin\"").unwrap();

        assert_eq!(known.known(), Some(BodyCondition::Ideal));
        assert_eq!(zero, RecordedCondition::Unrecognized("0".to_string()));
        assert_eq!(free_text.to_string(), "Thin");
        assert_eq!(serde_json::to_string(&free_text).unwrap(), "\"Thin\"");
    }

    #[test]
    fn serializes_as_label() {
        let raw = serde_json::to_string(&BodyCondition::VeryThin).unwrap();
        assert_eq!(raw, "\"Very Thin\"");
    }
}
