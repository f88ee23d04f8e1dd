//! Field-level validation shared by every create/update payload.
//!
//! Each input type implements [`Validate`], which either converts the raw
//! payload into its checked domain form or returns every violated rule in
//! field order.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldViolation {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|v| format!("{} {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationErrors>;
}

/// Accumulates violations; `finish` turns them into a result.
#[derive(Debug, Default)]
pub struct Rules {
    violations: Vec<FieldViolation>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violate(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.violate(field, "is required");
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.violate(field, format!("must be at least {} characters", min));
        }
        self
    }

    pub fn min_int(&mut self, field: &str, value: i32, min: i32) -> &mut Self {
        if value < min {
            self.violate(field, format!("must be at least {}", min));
        }
        self
    }

    pub fn min_float(&mut self, field: &str, value: f64, min: f64) -> &mut Self {
        // NaN fails the comparison too
        if !(value >= min) {
            self.violate(field, format!("must be at least {}", min));
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.violate(field, format!("must be one of [{}]", allowed.join(", ")));
        }
        self
    }

    pub fn non_empty<T>(&mut self, field: &str, list: &[T]) -> &mut Self {
        if list.is_empty() {
            self.violate(field, "must contain at least 1 item");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !is_email(value) {
            self.violate(field, "must be a valid email address");
        }
        self
    }

    /// Folds in the violations of a nested value under `prefix`.
    pub fn nested(&mut self, prefix: &str, errors: ValidationErrors) -> &mut Self {
        for v in errors.0 {
            self.violate(format!("{}.{}", prefix, v.field), v.message);
        }
        self
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.violations))
        }
    }
}

fn is_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
