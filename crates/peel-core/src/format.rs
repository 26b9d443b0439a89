//! Human-readable rendering of backend errors.

use serde_json::Value;

use crate::payload::{ErrorPayload, FieldErrors};

/// Message shown when a payload carries nothing usable.
pub const FALLBACK_MESSAGE: &str = "An error occurred. Please try again.";

/// Labels for fields whose Title Case rendering reads poorly.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("email", "Email"),
    ("password", "Password"),
    ("old_password", "Current password"),
    ("new_password", "New password"),
    ("confirm_password", "Password confirmation"),
    ("first_name", "First name"),
    ("last_name", "Last name"),
    ("phone", "Phone number"),
    ("mobile", "Mobile number"),
    ("company_name", "Company name"),
    ("company_website", "Company website"),
    ("company_size", "Company size"),
    ("job_title", "Job title"),
    ("agree_to_terms", "Terms of service agreement"),
];

/// Format an arbitrary JSON error body as a single message.
///
/// - a bare string is returned unchanged
/// - `error`, then `detail`, win when present
/// - field errors become `"<Label>: <messages>"`, with `non_field_errors`
///   left unlabelled
/// - several messages are rendered as a bulleted list, one per line
///
/// ```
/// use peel_core::format_api_error;
/// use serde_json::json;
///
/// let message = format_api_error(&json!({"old_password": ["Incorrect"]}));
/// assert_eq!(message, "Current password: Incorrect");
/// ```
pub fn format_api_error(body: &Value) -> String {
    ErrorPayload::from_value(body).message()
}

/// Convert a field name to a user-facing label.
pub fn field_label(field: &str) -> String {
    if let Some((_, label)) = FIELD_LABELS.iter().find(|(name, _)| *name == field) {
        return (*label).to_string();
    }

    field
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn render(payload: &ErrorPayload) -> String {
    match payload {
        ErrorPayload::Message(message)
        | ErrorPayload::Error { error: message, .. }
        | ErrorPayload::Detail(message) => message.clone(),
        ErrorPayload::Fields(fields) => {
            let lines: Vec<String> = fields.iter().map(line).collect();
            match lines.as_slice() {
                [] => FALLBACK_MESSAGE.to_string(),
                [single] => single.clone(),
                many => many
                    .iter()
                    .map(|l| format!("• {}", l))
                    .collect::<Vec<_>>()
                    .join("\n"),
            }
        }
        ErrorPayload::Empty => FALLBACK_MESSAGE.to_string(),
    }
}

fn line(errors: &FieldErrors) -> String {
    let message = errors.messages.join(", ");
    if errors.is_non_field() {
        message
    } else {
        format!("{}: {}", field_label(&errors.field), message)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_string_is_unchanged() {
        assert_eq!(format_api_error(&json!("some message")), "some message");
    }

    #[test]
    fn error_and_detail_fields() {
        assert_eq!(format_api_error(&json!({"error": "Job is closed"})), "Job is closed");
        assert_eq!(
            format_api_error(&json!({"detail": "Given token not valid for any token type"})),
            "Given token not valid for any token type"
        );
    }

    #[test]
    fn single_field_error_uses_label_without_bullet() {
        assert_eq!(
            format_api_error(&json!({"old_password": ["Incorrect"]})),
            "Current password: Incorrect"
        );
    }

    #[test]
    fn field_messages_are_comma_joined() {
        assert_eq!(
            format_api_error(&json!({"password": ["Too short", "Too common"]})),
            "Password: Too short, Too common"
        );
    }

    #[test]
    fn single_non_field_error_is_bare() {
        assert_eq!(
            format_api_error(&json!({"non_field_errors": ["Invalid credentials"]})),
            "Invalid credentials"
        );
    }

    #[test]
    fn multiple_errors_are_bulleted() {
        let message = format_api_error(&json!({
            "email": ["Required"],
            "non_field_errors": ["Invalid credentials"]
        }));

        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"• Email: Required"));
        assert!(lines.contains(&"• Invalid credentials"));
        assert!(lines.iter().all(|l| l.starts_with("• ")));
    }

    #[test]
    fn one_line_per_field() {
        let message = format_api_error(&json!({
            "company_size": ["Select a valid choice."],
            "company_website": ["Enter a valid URL."],
            "years_of_experience": ["A valid integer is required."]
        }));

        assert_eq!(message.lines().count(), 3);
        assert!(message.contains("• Company size: Select a valid choice."));
        assert!(message.contains("• Company website: Enter a valid URL."));
        assert!(message.contains("• Years Of Experience: A valid integer is required."));
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        assert_eq!(format_api_error(&json!({})), FALLBACK_MESSAGE);
        assert_eq!(format_api_error(&json!(null)), FALLBACK_MESSAGE);
        assert_eq!(format_api_error(&json!(500)), FALLBACK_MESSAGE);
    }

    #[test]
    fn labels() {
        assert_eq!(field_label("email"), "Email");
        assert_eq!(field_label("agree_to_terms"), "Terms of service agreement");
        assert_eq!(field_label("current_salary"), "Current Salary");
        assert_eq!(field_label("resume"), "Resume");
    }
}
