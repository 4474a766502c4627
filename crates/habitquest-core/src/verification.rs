//! Check-in verification payloads.
//!
//! A campaign picks one of six verification methods. Each check-in carries a
//! payload of the matching shape, and [`validate_for`] decides whether the
//! payload counts as a verified unit of progress.
//!
//! Validation is pure: it only looks at the payload and the campaign's
//! [`VerificationConfig`]. Soft limits never reject a payload; they come back
//! as [`Advisory`] notes for the caller to display.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const TIME_FORMAT: &str = "%H:%M";

/// How a check-in is substantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationType {
    /// Clock time of the habit (e.g. wake-up time)
    TimeRecord,
    /// Free text journal entry
    TextInput,
    /// Photo proof with optional caption
    PhotoUpload,
    /// Numeric amount with a unit (pages, glasses, km)
    CounterInput,
    /// Plain "done" tick
    SimpleCheck,
    /// Spending record with optional receipt image
    ReceiptRecord,
}

impl VerificationType {
    pub const ALL: [VerificationType; 6] = [
        VerificationType::TimeRecord,
        VerificationType::TextInput,
        VerificationType::PhotoUpload,
        VerificationType::CounterInput,
        VerificationType::SimpleCheck,
        VerificationType::ReceiptRecord,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationType::TimeRecord => "time_record",
            VerificationType::TextInput => "text_input",
            VerificationType::PhotoUpload => "photo_upload",
            VerificationType::CounterInput => "counter_input",
            VerificationType::SimpleCheck => "simple_check",
            VerificationType::ReceiptRecord => "receipt_record",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            VerificationType::TimeRecord => "Time record",
            VerificationType::TextInput => "Text entry",
            VerificationType::PhotoUpload => "Photo",
            VerificationType::CounterInput => "Counter",
            VerificationType::SimpleCheck => "Check",
            VerificationType::ReceiptRecord => "Receipt",
        }
    }
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "verification_type".into(),
                message: format!("unknown verification type '{s}'"),
            })
    }
}

/// How often a participant is expected to check in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cadence {
    /// One check-in per day of the campaign
    #[default]
    Daily,
    /// `weekly_target` check-ins per started week
    Weekly { weekly_target: u32 },
}

/// Per-campaign verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    #[serde(default)]
    pub cadence: Cadence,
    /// Input hint shown by the submission surface
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Hard lower bound for counter values
    #[serde(default)]
    pub min_value: Option<i64>,
    /// Soft upper bound (counter: advisory, receipt: budget)
    #[serde(default)]
    pub max_value: Option<i64>,
}

impl VerificationConfig {
    pub fn weekly(weekly_target: u32) -> Self {
        Self {
            cadence: Cadence::Weekly { weekly_target },
            ..Self::default()
        }
    }

    /// Check the config itself.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Cadence::Weekly { weekly_target } = self.cadence {
            // One check-in per date caps a week at seven.
            if !(1..=7).contains(&weekly_target) {
                return Err(ValidationError::InvalidValue {
                    field: "verification_config.cadence.weekly_target".into(),
                    message: format!("{weekly_target} is outside 1-7"),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(ValidationError::InvalidValue {
                    field: "verification_config.min_value".into(),
                    message: format!("minimum {min} exceeds maximum {max}"),
                });
            }
        }
        Ok(())
    }
}

/// Payload submitted with a check-in, one shape per [`VerificationType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationPayload {
    TimeRecord {
        /// Clock time as HH:MM
        time: String,
        /// Minutes since the previous time record of the same participation
        #[serde(default)]
        interval_minutes: Option<u32>,
    },
    TextInput {
        text: String,
    },
    PhotoUpload {
        /// URL or data blob reference
        image: String,
        #[serde(default)]
        caption: Option<String>,
    },
    CounterInput {
        value: i64,
        #[serde(default)]
        unit: String,
    },
    SimpleCheck {
        checked: bool,
    },
    ReceiptRecord {
        amount: i64,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        image: Option<String>,
    },
}

impl VerificationPayload {
    pub fn verification_type(&self) -> VerificationType {
        match self {
            VerificationPayload::TimeRecord { .. } => VerificationType::TimeRecord,
            VerificationPayload::TextInput { .. } => VerificationType::TextInput,
            VerificationPayload::PhotoUpload { .. } => VerificationType::PhotoUpload,
            VerificationPayload::CounterInput { .. } => VerificationType::CounterInput,
            VerificationPayload::SimpleCheck { .. } => VerificationType::SimpleCheck,
            VerificationPayload::ReceiptRecord { .. } => VerificationType::ReceiptRecord,
        }
    }

    /// One-line display text.
    pub fn summary(&self) -> String {
        match self {
            VerificationPayload::TimeRecord {
                time,
                interval_minutes: Some(interval),
            } => format!("{time} (+{interval}m)"),
            VerificationPayload::TimeRecord { time, .. } => time.clone(),
            VerificationPayload::TextInput { text } => {
                let text = text.trim();
                if text.chars().count() > 40 {
                    format!("{}...", text.chars().take(37).collect::<String>())
                } else {
                    text.to_string()
                }
            }
            VerificationPayload::PhotoUpload { caption, .. } => {
                caption.clone().unwrap_or_else(|| "photo".to_string())
            }
            VerificationPayload::CounterInput { value, unit } => {
                format!("{value} {unit}").trim_end().to_string()
            }
            VerificationPayload::SimpleCheck { .. } => "done".to_string(),
            VerificationPayload::ReceiptRecord {
                amount,
                description,
                ..
            } => match description {
                Some(d) => format!("{amount} ({d})"),
                None => amount.to_string(),
            },
        }
    }

    /// Parsed clock time of a time record.
    pub fn recorded_time(&self) -> Option<NaiveTime> {
        match self {
            VerificationPayload::TimeRecord { time, .. } => parse_time(time).ok(),
            _ => None,
        }
    }
}

/// Non-blocking note attached to an accepted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Counter value above the configured (display-only) maximum
    AboveMaximum { value: i64, max: i64 },
    /// Receipt amount above the configured budget
    OverBudget { amount: i64, limit: i64 },
}

/// An accepted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validated {
    pub verification_type: VerificationType,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl Validated {
    pub fn is_over_budget(&self) -> bool {
        self.advisories
            .iter()
            .any(|a| matches!(a, Advisory::OverBudget { .. }))
    }
}

/// Validate a payload against the campaign's verification config.
pub fn validate(
    payload: &VerificationPayload,
    config: &VerificationConfig,
) -> Result<Validated, ValidationError> {
    let mut advisories = Vec::new();

    match payload {
        VerificationPayload::TimeRecord { time, .. } => {
            parse_time(time)?;
        }
        VerificationPayload::TextInput { text } => {
            if text.trim().is_empty() {
                return Err(ValidationError::Empty("text"));
            }
        }
        VerificationPayload::PhotoUpload { image, .. } => {
            if image.trim().is_empty() {
                return Err(ValidationError::Empty("image"));
            }
        }
        VerificationPayload::CounterInput { value, .. } => {
            if *value < 0 {
                return Err(ValidationError::Negative {
                    field: "value",
                    value: *value,
                });
            }
            if let Some(min) = config.min_value {
                if *value < min {
                    return Err(ValidationError::BelowMinimum { value: *value, min });
                }
            }
            if let Some(max) = config.max_value {
                if *value > max {
                    advisories.push(Advisory::AboveMaximum { value: *value, max });
                }
            }
        }
        VerificationPayload::SimpleCheck { checked } => {
            if !checked {
                return Err(ValidationError::Unchecked);
            }
        }
        VerificationPayload::ReceiptRecord { amount, .. } => {
            if *amount < 0 {
                return Err(ValidationError::Negative {
                    field: "amount",
                    value: *amount,
                });
            }
            if *amount == 0 {
                return Err(ValidationError::NonPositiveAmount);
            }
            if let Some(limit) = config.max_value {
                if *amount > limit {
                    advisories.push(Advisory::OverBudget {
                        amount: *amount,
                        limit,
                    });
                }
            }
        }
    }

    Ok(Validated {
        verification_type: payload.verification_type(),
        advisories,
    })
}

/// Validate a payload for a campaign configured with `expected`.
pub fn validate_for(
    expected: VerificationType,
    payload: &VerificationPayload,
    config: &VerificationConfig,
) -> Result<Validated, ValidationError> {
    let actual = payload.verification_type();
    if actual != expected {
        return Err(ValidationError::TypeMismatch { expected, actual });
    }
    validate(payload, config)
}

/// Parse an HH:MM clock time.
pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTime(s.to_string()))
}

/// Unsigned minute difference between two clock times on the same day.
pub fn time_interval_minutes(previous: NaiveTime, current: NaiveTime) -> u32 {
    let minutes = |t: NaiveTime| t.hour() * 60 + t.minute();
    minutes(previous).abs_diff(minutes(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(value: i64) -> VerificationPayload {
        VerificationPayload::CounterInput {
            value,
            unit: "pages".into(),
        }
    }

    fn receipt(amount: i64) -> VerificationPayload {
        VerificationPayload::ReceiptRecord {
            amount,
            description: None,
            image: None,
        }
    }

    #[test]
    fn simple_check_rejects_unchecked() {
        let config = VerificationConfig::default();
        let err = validate(&VerificationPayload::SimpleCheck { checked: false }, &config)
            .unwrap_err();
        assert_eq!(err, ValidationError::Unchecked);
        assert!(validate(&VerificationPayload::SimpleCheck { checked: true }, &config).is_ok());
    }

    #[test]
    fn counter_below_minimum_is_rejected() {
        let config = VerificationConfig {
            min_value: Some(10),
            ..Default::default()
        };
        assert_eq!(
            validate(&counter(9), &config).unwrap_err(),
            ValidationError::BelowMinimum { value: 9, min: 10 }
        );
        assert!(validate(&counter(10), &config).is_ok());
    }

    #[test]
    fn counter_maximum_is_advisory_only() {
        let config = VerificationConfig {
            max_value: Some(20),
            ..Default::default()
        };
        let validated = validate(&counter(25), &config).unwrap();
        assert_eq!(
            validated.advisories,
            vec![Advisory::AboveMaximum { value: 25, max: 20 }]
        );
        assert!(!validated.is_over_budget());
    }

    #[test]
    fn counter_rejects_negative_values() {
        let config = VerificationConfig::default();
        assert!(matches!(
            validate(&counter(-1), &config),
            Err(ValidationError::Negative { field: "value", .. })
        ));
    }

    #[test]
    fn receipt_zero_amount_is_rejected() {
        let config = VerificationConfig::default();
        assert_eq!(
            validate(&receipt(0), &config).unwrap_err(),
            ValidationError::NonPositiveAmount
        );
    }

    #[test]
    fn receipt_over_budget_is_recorded_not_rejected() {
        let config = VerificationConfig {
            max_value: Some(10_000),
            ..Default::default()
        };
        let validated = validate(&receipt(12_500), &config).unwrap();
        assert!(validated.is_over_budget());
        assert!(!validate(&receipt(9_000), &config).unwrap().is_over_budget());
    }

    #[test]
    fn text_must_not_be_blank() {
        let config = VerificationConfig::default();
        let blank = VerificationPayload::TextInput { text: "  \n ".into() };
        assert_eq!(validate(&blank, &config).unwrap_err(), ValidationError::Empty("text"));
    }

    #[test]
    fn photo_requires_image_reference() {
        let config = VerificationConfig::default();
        let missing = VerificationPayload::PhotoUpload {
            image: String::new(),
            caption: Some("breakfast".into()),
        };
        assert_eq!(validate(&missing, &config).unwrap_err(), ValidationError::Empty("image"));
    }

    #[test]
    fn time_record_must_parse() {
        let config = VerificationConfig::default();
        let ok = VerificationPayload::TimeRecord {
            time: "06:30".into(),
            interval_minutes: None,
        };
        let bad = VerificationPayload::TimeRecord {
            time: "25:99".into(),
            interval_minutes: None,
        };
        assert!(validate(&ok, &config).is_ok());
        assert!(matches!(validate(&bad, &config), Err(ValidationError::InvalidTime(_))));
    }

    #[test]
    fn interval_is_unsigned_and_same_day() {
        let a = parse_time("06:30").unwrap();
        let b = parse_time("07:15").unwrap();
        assert_eq!(time_interval_minutes(a, b), 45);
        assert_eq!(time_interval_minutes(b, a), 45);
        let late = parse_time("23:50").unwrap();
        let early = parse_time("00:10").unwrap();
        assert_eq!(time_interval_minutes(late, early), 1420);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let config = VerificationConfig::default();
        let err = validate_for(
            VerificationType::PhotoUpload,
            &VerificationPayload::SimpleCheck { checked: true },
            &config,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                expected: VerificationType::PhotoUpload,
                actual: VerificationType::SimpleCheck,
            }
        );
    }

    #[test]
    fn payload_wire_format_is_tagged() {
        let json = r#"{"type":"counter_input","value":12,"unit":"pages"}"#;
        let payload: VerificationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload, counter(12));
        assert_eq!(payload.verification_type(), VerificationType::CounterInput);
    }

    #[test]
    fn weekly_config_requires_positive_target() {
        assert!(VerificationConfig::weekly(0).validate().is_err());
        assert!(VerificationConfig::weekly(3).validate().is_ok());
        assert!(VerificationConfig::weekly(7).validate().is_ok());
    }

    #[test]
    fn weekly_target_above_seven_is_rejected() {
        assert!(VerificationConfig::weekly(8).validate().is_err());
        assert!(matches!(
            VerificationConfig::weekly(u32::MAX).validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn verification_type_parses_from_wire_name() {
        for t in VerificationType::ALL {
            assert_eq!(t.as_str().parse::<VerificationType>().unwrap(), t);
        }
        assert!("selfie".parse::<VerificationType>().is_err());
    }
}
