use thiserror::Error;

/// Problems with form input caught before anything is written.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Please enter a {0}")]
    MissingField(&'static str),

    #[error("{field} must be a number, got \"{value}\"")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Please pick a project first")]
    NoProject,
}

/// Trimmed value of a required field.
pub fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Trimmed value of an optional field, `None` when blank.
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_input() {
        assert_eq!(required("project name", "   "), Err(FormError::MissingField("project name")));
        assert_eq!(required("project name", " Site ").unwrap(), "Site");
    }

    #[test]
    fn optional_drops_blank_input() {
        assert_eq!(optional(""), None);
        assert_eq!(optional(" note "), Some("note".to_string()));
    }

    #[test]
    fn messages_read_like_prompts() {
        assert_eq!(FormError::MissingField("project name").to_string(), "Please enter a project name");
    }
}
