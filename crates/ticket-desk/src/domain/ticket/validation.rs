//! Ticket field rules shared by creation and updates.
//!
//! # Validation Rules
//!
//! - Title: required once trimmed, at most [`TITLE_MAX`] characters.
//! - Priority: optional label, at most [`PRIORITY_MAX`] characters.
//! - Description: optional, at most [`DESCRIPTION_MAX`] characters.
//! - Status: one of `open`, `in_progress`, `closed`.
//!
//! Lengths count Unicode scalar values.

use std::fmt;

use serde_json::json;

use crate::domain::Error;

/// Maximum title length after trimming.
pub const TITLE_MAX: usize = 120;
/// Maximum priority label length.
pub const PRIORITY_MAX: usize = 40;
/// Maximum description length.
pub const DESCRIPTION_MAX: usize = 500;

/// Validation failures for ticket input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    /// Identifier was not a UUID.
    InvalidId(String),
    /// Title was blank.
    EmptyTitle,
    /// Title exceeded [`TITLE_MAX`].
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Status was not one of the supported values.
    InvalidStatus(String),
    /// Priority exceeded [`PRIORITY_MAX`].
    PriorityTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description exceeded [`DESCRIPTION_MAX`].
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl TicketValidationError {
    /// Name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::InvalidStatus(_) => "status",
            Self::PriorityTooLong { .. } => "priority",
            Self::DescriptionTooLong { .. } => "description",
        }
    }
}

impl fmt::Display for TicketValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "ticket id '{value}' is not a valid UUID"),
            Self::EmptyTitle => write!(f, "Title is required."),
            Self::TitleTooLong { max } => write!(f, "Title must be {max} characters or less."),
            Self::InvalidStatus(value) => write!(
                f,
                "Status must be open, in progress, or closed (got '{value}')."
            ),
            Self::PriorityTooLong { max } => {
                write!(f, "Priority label must not exceed {max} characters.")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "Description must not exceed {max} characters.")
            }
        }
    }
}

impl std::error::Error for TicketValidationError {}

impl From<TicketValidationError> for Error {
    fn from(value: TicketValidationError) -> Self {
        Self::invalid_request(value.to_string()).with_details(json!({ "field": value.field() }))
    }
}

/// Trim and bound-check a title.
pub(crate) fn normalize_title(title: &str) -> Result<String, TicketValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TicketValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > TITLE_MAX {
        return Err(TicketValidationError::TitleTooLong { max: TITLE_MAX });
    }
    Ok(trimmed.to_owned())
}

/// Trim a priority label; blank input clears it.
pub(crate) fn normalize_priority(
    priority: Option<&str>,
) -> Result<Option<String>, TicketValidationError> {
    let Some(trimmed) = priority.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > PRIORITY_MAX {
        return Err(TicketValidationError::PriorityTooLong { max: PRIORITY_MAX });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Keep a description verbatim unless it is blank.
pub(crate) fn normalize_description(
    description: Option<&str>,
) -> Result<Option<String>, TicketValidationError> {
    let Some(text) = description.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > DESCRIPTION_MAX {
        return Err(TicketValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        });
    }
    Ok(Some(text.to_owned()))
}

#[cfg(test)]
mod tests {
    //! Covers the ticket field rules at their boundaries.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Fix login", "Fix login")]
    #[case("  Fix login  ", "Fix login")]
    fn titles_are_trimmed(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_title(input).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_titles_are_rejected(#[case] input: &str) {
        assert_eq!(normalize_title(input), Err(TicketValidationError::EmptyTitle));
    }

    #[test]
    fn titles_at_the_limit_are_accepted() {
        let title = "a".repeat(TITLE_MAX);
        assert!(normalize_title(&title).is_ok());
    }

    #[test]
    fn titles_over_the_limit_are_rejected() {
        let title = "a".repeat(TITLE_MAX + 1);
        assert_eq!(
            normalize_title(&title),
            Err(TicketValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let title = "é".repeat(TITLE_MAX);
        assert!(normalize_title(&title).is_ok());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("  "), None)]
    #[case(Some(" high "), Some("high"))]
    fn priorities_are_normalised(#[case] input: Option<&str>, #[case] expected: Option<&str>) {
        let result = normalize_priority(input).expect("valid priority");
        assert_eq!(result.as_deref(), expected);
    }

    #[test]
    fn long_priorities_are_rejected() {
        let priority = "p".repeat(PRIORITY_MAX + 1);
        assert_eq!(
            normalize_priority(Some(&priority)),
            Err(TicketValidationError::PriorityTooLong { max: PRIORITY_MAX })
        );
    }

    #[test]
    fn descriptions_keep_their_whitespace() {
        let result = normalize_description(Some("  steps:\n1. open app\n")).expect("valid");
        assert_eq!(result.as_deref(), Some("  steps:\n1. open app\n"));
    }

    #[test]
    fn long_descriptions_are_rejected() {
        let description = "d".repeat(DESCRIPTION_MAX + 1);
        assert_eq!(
            normalize_description(Some(&description)),
            Err(TicketValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX
            })
        );
    }

    #[test]
    fn errors_carry_their_field() {
        let err: Error = TicketValidationError::EmptyTitle.into();
        assert_eq!(err.details(), Some(&json!({ "field": "title" })));
        assert_eq!(err.message(), "Title is required.");
    }
}
