//! Form validation and sanitization.
//!
//! Each entity form is described by a [`FormSchema`]: an ordered list of
//! [`FieldRule`]s, each an ordered chain of steps (checks and the escape
//! sanitizer). Applying a schema to submitted [`FormFields`] yields the
//! sanitized values together with the field errors, in field order.

pub mod escape;

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

pub use escape::{decode, escape};

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:[T ][0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?(?:Z|[+-][0-9]{2}:?[0-9]{2})?)?$",
    )
    .expect("valid ISO-8601 pattern")
});

/// Parse an ISO-8601 date or date-time, keeping the calendar date. Only
/// ASCII digits are accepted.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()
}

/// Submitted form body, kept as ordered key/value pairs so that repeated keys
/// (checkbox groups) survive.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted under `name`: absent gives an empty list, a
    /// single value a one-element list.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

impl From<Vec<(String, String)>> for FormFields {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormFields {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// A field-level validation message, as shown next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: &str, msg: &str) -> Self {
        Self {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }
}

/// A single check applied to a trimmed value.
#[derive(Debug, Clone)]
pub enum Rule {
    Required(&'static str),
    MaxLength(usize, &'static str),
    Alphanumeric(&'static str),
    IsoDate(&'static str),
    OneOf(&'static [&'static str], &'static str),
    Identifier(&'static str),
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), &'static str> {
        let ok = match self {
            Rule::Required(_) => !value.is_empty(),
            Rule::MaxLength(max, _) => value.chars().count() <= *max,
            Rule::Alphanumeric(_) => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            Rule::IsoDate(_) => parse_iso_date(value).is_some(),
            Rule::OneOf(allowed, _) => allowed.contains(&value),
            Rule::Identifier(_) => Uuid::parse_str(value).is_ok(),
        };
        if ok {
            Ok(())
        } else {
            Err(self.message())
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Rule::Required(msg)
            | Rule::MaxLength(_, msg)
            | Rule::Alphanumeric(msg)
            | Rule::IsoDate(msg)
            | Rule::OneOf(_, msg)
            | Rule::Identifier(msg) => msg,
        }
    }
}

#[derive(Debug, Clone)]
enum Step {
    Check(Rule),
    Escape,
}

/// Ordered processing chain for one form field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: &'static str,
    multiple: bool,
    optional: bool,
    steps: Vec<Step>,
}

impl FieldRule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            multiple: false,
            optional: false,
            steps: Vec::new(),
        }
    }

    /// Multi-valued field; the chain runs on every submitted value.
    pub fn many(name: &'static str) -> Self {
        Self {
            multiple: true,
            ..Self::new(name)
        }
    }

    /// An empty value counts as "not provided": checks are skipped.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required(self, msg: &'static str) -> Self {
        self.check(Rule::Required(msg))
    }

    pub fn max_length(self, max: usize, msg: &'static str) -> Self {
        self.check(Rule::MaxLength(max, msg))
    }

    pub fn alphanumeric(self, msg: &'static str) -> Self {
        self.check(Rule::Alphanumeric(msg))
    }

    pub fn iso_date(self, msg: &'static str) -> Self {
        self.check(Rule::IsoDate(msg))
    }

    pub fn one_of(self, allowed: &'static [&'static str], msg: &'static str) -> Self {
        self.check(Rule::OneOf(allowed, msg))
    }

    pub fn identifier(self, msg: &'static str) -> Self {
        self.check(Rule::Identifier(msg))
    }

    pub fn escape(mut self) -> Self {
        self.steps.push(Step::Escape);
        self
    }

    fn check(mut self, rule: Rule) -> Self {
        self.steps.push(Step::Check(rule));
        self
    }

    /// Run the chain on one value. Sanitizing steps always run so that the
    /// returned value is in stored form even when a check failed; checks
    /// stop at the first failure.
    fn run(&self, raw: &str) -> (String, Option<&'static str>) {
        let mut value = raw.trim().to_string();
        let skip_checks = self.optional && value.is_empty();
        let mut failure = None;

        for step in &self.steps {
            match step {
                Step::Escape => value = escape(&value),
                Step::Check(rule) if failure.is_none() && !skip_checks => {
                    if let Err(msg) = rule.check(&value) {
                        failure = Some(msg);
                    }
                }
                Step::Check(_) => {}
            }
        }
        (value, failure)
    }
}

/// The full rule list of one entity form.
#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldRule>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    pub fn apply(&self, form: &FormFields) -> Sanitized {
        let mut sanitized = Sanitized::default();

        for field in &self.fields {
            if field.multiple {
                let mut values = Vec::new();
                let mut failure = None;
                for raw in form.get_all(field.name) {
                    let (value, error) = field.run(raw);
                    failure = failure.or(error);
                    values.push(value);
                }
                if let Some(msg) = failure {
                    sanitized.errors.push(FieldError::new(field.name, msg));
                }
                sanitized.lists.insert(field.name, values);
            } else {
                let (value, error) = field.run(form.get(field.name).unwrap_or_default());
                if let Some(msg) = error {
                    sanitized.errors.push(FieldError::new(field.name, msg));
                }
                sanitized.values.insert(field.name, value);
            }
        }
        sanitized
    }
}

/// Output of a schema: sanitized values plus the accumulated field errors.
#[derive(Debug, Clone, Default)]
pub struct Sanitized {
    values: HashMap<&'static str, String>,
    lists: HashMap<&'static str, Vec<String>>,
    errors: Vec<FieldError>,
}

impl Sanitized {
    pub fn value(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    pub fn list(&self, name: &str) -> Vec<String> {
        self.lists.get(name).cloned().unwrap_or_default()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Split into the candidate built by `build` and the outcome.
    pub fn into_outcome<T>(self, build: impl FnOnce(&Sanitized) -> T) -> Validated<T> {
        let form = build(&self);
        if self.errors.is_empty() {
            Ok(form)
        } else {
            Err(Rejected {
                form,
                errors: self.errors,
            })
        }
    }
}

/// A form that failed validation, kept for redisplay.
#[derive(Debug, Clone)]
pub struct Rejected<T> {
    pub form: T,
    pub errors: Vec<FieldError>,
}

pub type Validated<T> = Result<T, Rejected<T>>;
