use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Flattens nested validator output into `{field, message}` pairs sorted by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, None, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    out.push(FieldError {
                        field: name.clone(),
                        message: describe(err),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&name), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, Some(&format!("{}[{}]", name, index)), out);
                }
            }
        }
    }
}

fn describe(err: &ValidationError) -> String {
    match &err.message {
        Some(msg) => msg.to_string(),
        None => format!("failed '{}' check", err.code),
    }
}

pub fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Cross-field rule: when both bounds are present the minimum may not exceed the maximum.
/// The violation is reported on `salary_min`.
pub fn check_salary_range(
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    errors: &mut ValidationErrors,
) {
    if let (Some(min), Some(max)) = (salary_min, salary_max) {
        if min > max {
            errors.add(
                "salary_min",
                error_with_message(
                    "salary_range",
                    "salary_min must be less than or equal to salary_max",
                ),
            );
        }
    }
}

/// Runs derived field rules and then any extra checks, returning every violation at once.
pub fn validate_with<T, F>(val: &T, extra: F) -> Result<(), ValidationErrors>
where
    T: Validate,
    F: FnOnce(&mut ValidationErrors),
{
    let mut errors = match val.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    extra(&mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts a well-formed absolute http(s) URL or an empty string.
pub fn url_or_empty(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(error_with_message("url", "must be a valid URL")),
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error_with_message("required", "must not be empty"))
    } else {
        Ok(())
    }
}
