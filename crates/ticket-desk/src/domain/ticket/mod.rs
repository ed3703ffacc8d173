//! Ticket data model.
//!
//! Tickets are stored as a flat JSON array. `Ticket` is the persisted record;
//! [`NewTicket`] and [`TicketPatch`] carry raw caller input that the ticket
//! store validates before anything is written.

mod stats;
mod validation;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::stats::{RECENT_LIMIT, TicketStats};
pub use self::validation::{DESCRIPTION_MAX, PRIORITY_MAX, TITLE_MAX, TicketValidationError};
use self::validation::{normalize_description, normalize_priority, normalize_title};

/// Stable ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Parse a ticket identifier from user input.
    ///
    /// # Errors
    ///
    /// Returns [`TicketValidationError::InvalidId`] when the input is not a
    /// UUID.
    pub fn parse(raw: &str) -> Result<Self, TicketValidationError> {
        let trimmed = raw.trim();
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| TicketValidationError::InvalidId(trimmed.to_owned()))
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Workflow state of a ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly raised, not yet picked up.
    #[default]
    Open,
    /// Someone is working on it.
    InProgress,
    /// Resolved.
    Closed,
}

impl TicketStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Closed];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| TicketValidationError::InvalidStatus(s.to_owned()))
    }
}

/// Listing filter over ticket status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every ticket.
    #[default]
    All,
    /// Only tickets in the given status.
    Only(TicketStatus),
}

impl StatusFilter {
    /// Whether `ticket` passes the filter.
    #[must_use]
    pub fn matches(self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => ticket.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Persisted ticket record.
///
/// ## Invariants
/// - `title` is trimmed, non-empty, and at most [`TITLE_MAX`] characters.
/// - `priority` and `description` are `None` rather than blank.
/// - `updated_at`, when present, is later than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Stable identifier.
    pub id: TicketId,
    /// Short summary.
    pub title: String,
    /// Workflow state.
    pub status: TicketStatus,
    /// Free-text priority label such as `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Longer free-text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last successful update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Most recent modification time.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Caller input for a new ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    /// Raw title; trimmed on validation.
    pub title: String,
    /// Initial status.
    pub status: TicketStatus,
    /// Optional priority label.
    pub priority: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

impl NewTicket {
    /// Start a ticket with the given title and default status.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the priority label.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn validate(self) -> Result<TicketFields, TicketValidationError> {
        Ok(TicketFields {
            title: normalize_title(&self.title)?,
            status: self.status,
            priority: normalize_priority(self.priority.as_deref())?,
            description: normalize_description(self.description.as_deref())?,
        })
    }
}

/// Partial update for an existing ticket.
///
/// `None` leaves a field unchanged. A blank priority or description clears
/// that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement status.
    pub status: Option<TicketStatus>,
    /// Replacement priority label.
    pub priority: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
}

impl TicketPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.description.is_none()
    }

    /// Merge the patch over `current` and validate the result.
    pub(crate) fn apply_to(&self, current: &Ticket) -> Result<TicketFields, TicketValidationError> {
        let title = self.title.as_deref().unwrap_or(current.title.as_str());
        let priority = self.priority.as_deref().or(current.priority.as_deref());
        let description = self
            .description
            .as_deref()
            .or(current.description.as_deref());
        Ok(TicketFields {
            title: normalize_title(title)?,
            status: self.status.unwrap_or(current.status),
            priority: normalize_priority(priority)?,
            description: normalize_description(description)?,
        })
    }
}

/// Validated, normalised ticket fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TicketFields {
    pub(crate) title: String,
    pub(crate) status: TicketStatus,
    pub(crate) priority: Option<String>,
    pub(crate) description: Option<String>,
}

impl TicketFields {
    pub(crate) fn into_ticket(self, id: TicketId, created_at: DateTime<Utc>) -> Ticket {
        Ticket {
            id,
            title: self.title,
            status: self.status,
            priority: self.priority,
            description: self.description,
            created_at,
            updated_at: None,
        }
    }

    pub(crate) fn write_into(self, ticket: &mut Ticket, updated_at: DateTime<Utc>) {
        ticket.title = self.title;
        ticket.status = self.status;
        ticket.priority = self.priority;
        ticket.description = self.description;
        ticket.updated_at = Some(updated_at);
    }
}

#[cfg(test)]
mod tests;
