//! Schema-driven input validation.
//!
//! Each operation declares a static [`Schema`]: a list of dotted field paths, each
//! with ordered checks and the error code a failing check produces. Inputs are
//! serialized to JSON and evaluated field by field. Within a field the first failing
//! check wins; across fields every failure is collected.

use serde::Serialize;
use serde_json::Value;
use time::{macros::format_description, Date};
use url::Url;

use crate::errors::{ErrorCode, ValidationFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields must be present.
    Create,
    /// Absent fields are skipped; present ones must still pass.
    Update,
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Present, not null, and not blank (strings) or empty (arrays).
    Required,
    Email,
    MinLength(usize),
    /// Absolute http(s) URL without fragment.
    HttpUrl,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    Phone,
    /// Every element of an array of strings satisfies the predicate.
    Each(fn(&str) -> bool),
}

#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub rule: Rule,
    pub code: ErrorCode,
}

#[derive(Debug)]
pub struct Field {
    pub path: &'static str,
    pub checks: &'static [Check],
}

#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [Field],
}

pub const fn check(rule: Rule, code: ErrorCode) -> Check {
    Check { rule, code }
}

impl Schema {
    /// Evaluates a serializable input; the returned failure is empty when valid.
    pub fn evaluate<T: Serialize>(&self, input: &T, mode: Mode) -> ValidationFailure {
        match serde_json::to_value(input) {
            Ok(value) => self.evaluate_value(&value, mode),
            Err(e) => {
                tracing::error!(error = ?e, "input is not serializable");
                let mut failure = ValidationFailure::new();
                for field in self.fields {
                    if let Some(first) = field.checks.first() {
                        failure.push(first.code);
                    }
                }
                failure
            }
        }
    }

    pub fn evaluate_value(&self, input: &Value, mode: Mode) -> ValidationFailure {
        let mut failure = ValidationFailure::new();
        for field in self.fields {
            if let Some(code) = field.evaluate(lookup(input, field.path), mode) {
                failure.push(code);
            }
        }
        failure
    }

    pub fn validate<T: Serialize>(&self, input: &T, mode: Mode) -> Result<(), ValidationFailure> {
        self.evaluate(input, mode).into_result()
    }
}

impl Field {
    fn evaluate(&self, value: Option<&Value>, mode: Mode) -> Option<ErrorCode> {
        let value = match value {
            Some(Value::Null) | None => {
                return match mode {
                    Mode::Create => self
                        .checks
                        .iter()
                        .find(|c| matches!(c.rule, Rule::Required))
                        .map(|c| c.code),
                    Mode::Update => None,
                };
            }
            Some(value) => value,
        };
        self.checks
            .iter()
            .find(|c| !c.rule.accepts(value))
            .map(|c| c.code)
    }
}

impl Rule {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            Rule::Required => match value {
                Value::String(s) => !s.trim().is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Null => false,
                _ => true,
            },
            Rule::Email => value.as_str().is_some_and(is_email),
            Rule::MinLength(min) => value.as_str().is_some_and(|s| s.chars().count() >= *min),
            Rule::HttpUrl => value.as_str().is_some_and(is_http_url),
            Rule::Date => value.as_str().is_some_and(is_date),
            Rule::Phone => value.as_str().is_some_and(is_phone),
            Rule::Each(predicate) => match value {
                Value::Array(items) => items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| predicate(s))),
                _ => false,
            },
        }
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn is_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https") && url.host().is_some() && url.fragment().is_none()
        }
        Err(_) => false,
    }
}

pub fn is_date(value: &str) -> bool {
    Date::parse(value, format_description!("[year]-[month]-[day]")).is_ok()
}

pub fn is_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
        && value
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.') || (c == '+' && i == 0))
}
