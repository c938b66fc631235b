use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use regex::Regex;

use crate::tree::{ControlTree, FieldInput, FieldNode};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, PartialEq)]
pub enum ValidityIssue {
    ValueMissing,
    TypeMismatch,
    PatternMismatch,
    TooShort(usize),
    TooLong(usize),
    RangeUnderflow(String),
    RangeOverflow(String),
    StepMismatch(f64),
    BadInput,
    /// Message of a failed custom validation function.
    Custom(String),
}

impl fmt::Display for ValidityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityIssue::ValueMissing => write!(f, "Please fill out this field."),
            ValidityIssue::TypeMismatch => write!(f, "Please enter an email address."),
            ValidityIssue::PatternMismatch => write!(f, "Please match the requested format."),
            ValidityIssue::TooShort(min) => write!(f, "Please use at least {min} characters."),
            ValidityIssue::TooLong(max) => write!(f, "Please use at most {max} characters."),
            ValidityIssue::RangeUnderflow(min) => write!(f, "Value must be {min} or later/greater."),
            ValidityIssue::RangeOverflow(max) => write!(f, "Value must be {max} or earlier/less."),
            ValidityIssue::StepMismatch(step) => write!(f, "Value must be a multiple of {step}."),
            ValidityIssue::BadInput => write!(f, "Please enter a valid value."),
            ValidityIssue::Custom(message) => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub name: String,
    pub issue: ValidityIssue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidityReport {
    pub issues: Vec<FieldIssue>,
}

impl ValidityReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn push(&mut self, name: impl Into<String>, issue: ValidityIssue) {
        self.issues.push(FieldIssue {
            name: name.into(),
            issue,
        });
    }

    pub fn for_field(&self, name: &str) -> Option<&ValidityIssue> {
        self.issues.iter().find(|i| i.name == name).map(|i| &i.issue)
    }
}

/// Built-in constraint checks of every enabled field.
pub fn check_tree(tree: &ControlTree, radix_point: char) -> ValidityReport {
    let mut report = ValidityReport::default();
    for field in tree.fields() {
        if let Some(issue) = check_field(field, radix_point) {
            report.push(field.name.clone(), issue);
        }
    }
    report
}

/// First built-in constraint `field` violates. Disabled and readonly inputs
/// are never validated.
pub fn check_field(field: &FieldNode, radix_point: char) -> Option<ValidityIssue> {
    if field.disabled || field.readonly {
        return None;
    }
    let value = field.value.as_str();
    let empty = match &field.input {
        FieldInput::Checkbox { checked } => !checked,
        FieldInput::Choice { .. } => field.submitted_value().is_none_or(str::is_empty),
        _ => value.is_empty(),
    };
    if empty {
        return field.required.then_some(ValidityIssue::ValueMissing);
    }

    match &field.input {
        FieldInput::Text {
            email,
            pattern,
            min_length,
            max_length,
        } => {
            if *email && !EMAIL.is_match(value) {
                return Some(ValidityIssue::TypeMismatch);
            }
            if let Some(pattern) = pattern {
                if !matches_pattern(pattern, value) {
                    return Some(ValidityIssue::PatternMismatch);
                }
            }
            check_length(value, *min_length, *max_length)
        }
        FieldInput::TextArea {
            min_length, max_length, ..
        } => check_length(value, *min_length, *max_length),
        FieldInput::Number { min, max, step } => {
            let Ok(number) = value.trim().parse::<f64>() else {
                return Some(ValidityIssue::BadInput);
            };
            check_number(number, *min, *max, *step)
        }
        FieldInput::Money { .. } => {
            let normalized = value.replace(radix_point, ".");
            match normalized.trim().parse::<f64>() {
                Ok(_) => None,
                Err(_) => Some(ValidityIssue::BadInput),
            }
        }
        FieldInput::Date { datetime, min, max, .. } => {
            if !parses_as_date(value, *datetime) {
                return Some(ValidityIssue::BadInput);
            }
            // ISO dates order lexically
            if let Some(min) = min.as_deref().filter(|m| !m.is_empty() && value < *m) {
                return Some(ValidityIssue::RangeUnderflow(min.to_string()));
            }
            if let Some(max) = max.as_deref().filter(|m| !m.is_empty() && value > *m) {
                return Some(ValidityIssue::RangeOverflow(max.to_string()));
            }
            None
        }
        FieldInput::Choice { .. } | FieldInput::Checkbox { .. } | FieldInput::Hidden => None,
    }
}

fn matches_pattern(pattern: &str, value: &str) -> bool {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            warn!("Ignoring invalid pattern {:?}: {}", pattern, e);
            true
        }
    }
}

fn check_length(value: &str, min: Option<usize>, max: Option<usize>) -> Option<ValidityIssue> {
    let length = value.chars().count();
    if let Some(min) = min.filter(|min| length < *min) {
        return Some(ValidityIssue::TooShort(min));
    }
    if let Some(max) = max.filter(|max| length > *max) {
        return Some(ValidityIssue::TooLong(max));
    }
    None
}

fn check_number(number: f64, min: Option<f64>, max: Option<f64>, step: Option<f64>) -> Option<ValidityIssue> {
    if let Some(min) = min.filter(|min| number < *min) {
        return Some(ValidityIssue::RangeUnderflow(min.to_string()));
    }
    if let Some(max) = max.filter(|max| number > *max) {
        return Some(ValidityIssue::RangeOverflow(max.to_string()));
    }
    if let Some(step) = step.filter(|step| *step > 0.0) {
        let steps = (number - min.unwrap_or(0.0)) / step;
        if (steps - steps.round()).abs() > 1e-6 {
            return Some(ValidityIssue::StepMismatch(step));
        }
    }
    None
}

fn parses_as_date(value: &str, datetime: bool) -> bool {
    if datetime {
        DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
    }
}
