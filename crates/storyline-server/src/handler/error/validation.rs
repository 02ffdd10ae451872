//! Conversion of `validator` failures into `400 bad_request`.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::TRACING_TARGET_EXTRACT;
use crate::handler::{Error, ErrorKind};

type Params = HashMap<Cow<'static, str>, Value>;

/// Renders `min`/`max` bounds as "between a and b", "at least a" or "at most b".
fn format_bounds(params: &Params) -> Option<String> {
    let min = params.get("min").and_then(Value::as_f64);
    let max = params.get("max").and_then(Value::as_f64);

    match (min, max) {
        (Some(min), Some(max)) => Some(format!("between {min} and {max}")),
        (Some(min), None) => Some(format!("at least {min}")),
        (None, Some(max)) => Some(format!("at most {max}")),
        (None, None) => None,
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    match (error.code.as_ref(), format_bounds(&error.params)) {
        ("length", Some(bounds)) => format!("Field '{field}' must be {bounds} characters long"),
        ("range", Some(bounds)) => format!("Field '{field}' must be {bounds}"),
        ("required", _) => format!("Field '{field}' is required"),
        (code, _) => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        messages.sort();

        tracing::debug!(
            target: TRACING_TARGET_EXTRACT,
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            _ => messages.join(". "),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 10))]
        text: String,
        #[validate(range(min = 1, max = 100))]
        first: i64,
    }

    #[test]
    fn length_errors_name_the_bounds() {
        let sample = Sample {
            text: String::new(),
            first: 5,
        };

        let error = Error::from(sample.validate().unwrap_err());
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(
            error.message(),
            Some("Field 'text' must be between 1 and 10 characters long")
        );
    }

    #[test]
    fn every_failing_field_is_reported() {
        let sample = Sample {
            text: "x".repeat(11),
            first: 101,
        };

        let error = Error::from(sample.validate().unwrap_err());
        let message = error.message().unwrap_or_default();
        assert!(message.contains("'first' must be between 1 and 100"));
        assert!(message.contains("'text'"));
    }
}
