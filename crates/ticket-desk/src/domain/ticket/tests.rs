//! Tests for the ticket model and its input types.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

const TICKET_ID: &str = "0b6f4c1e-8d2a-4f6b-9a3e-5c7d8e9f0a1b";

#[fixture]
fn stored() -> Ticket {
    Ticket {
        id: TicketId::parse(TICKET_ID).expect("valid id"),
        title: "Printer jams".to_owned(),
        status: TicketStatus::Open,
        priority: Some("high".to_owned()),
        description: Some("Tray two.".to_owned()),
        created_at: Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
        updated_at: None,
    }
}

#[rstest]
#[case("open", TicketStatus::Open)]
#[case("in_progress", TicketStatus::InProgress)]
#[case("In Progress", TicketStatus::InProgress)]
#[case("in-progress", TicketStatus::InProgress)]
#[case(" CLOSED ", TicketStatus::Closed)]
fn statuses_parse_leniently(#[case] input: &str, #[case] expected: TicketStatus) {
    assert_eq!(input.parse::<TicketStatus>(), Ok(expected));
}

#[test]
fn unknown_statuses_are_rejected() {
    let err = "pending".parse::<TicketStatus>().expect_err("unknown status");
    assert_eq!(err, TicketValidationError::InvalidStatus("pending".to_owned()));
    assert_eq!(err.field(), "status");
}

#[rstest]
#[case("all", StatusFilter::All)]
#[case("ALL", StatusFilter::All)]
#[case("closed", StatusFilter::Only(TicketStatus::Closed))]
fn filters_parse(#[case] input: &str, #[case] expected: StatusFilter) {
    assert_eq!(input.parse::<StatusFilter>(), Ok(expected));
}

#[rstest]
fn filters_match_by_status(stored: Ticket) {
    assert!(StatusFilter::All.matches(&stored));
    assert!(StatusFilter::Only(TicketStatus::Open).matches(&stored));
    assert!(!StatusFilter::Only(TicketStatus::Closed).matches(&stored));
}

#[test]
fn invalid_ticket_ids_are_rejected() {
    let err = TicketId::parse("ticket-1").expect_err("invalid id");
    assert_eq!(err.field(), "id");
}

#[rstest]
fn tickets_serialise_with_camel_case_fields(stored: Ticket) {
    let value = serde_json::to_value(&stored).expect("serialise ticket");
    assert_eq!(
        value,
        json!({
            "id": TICKET_ID,
            "title": "Printer jams",
            "status": "open",
            "priority": "high",
            "description": "Tray two.",
            "createdAt": "2024-03-01T09:30:00Z"
        })
    );
}

#[test]
fn optional_fields_may_be_absent() {
    let value = json!({
        "id": TICKET_ID,
        "title": "Printer jams",
        "status": "in_progress",
        "createdAt": "2024-03-01T09:30:00Z",
        "updatedAt": "2024-03-02T10:00:00Z"
    });
    let ticket: Ticket = serde_json::from_value(value.clone()).expect("parse ticket");
    assert_eq!(ticket.priority, None);
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ticket.last_modified(), ticket.updated_at.expect("updated"));
    assert_eq!(serde_json::to_value(&ticket).expect("serialise"), value);
}

#[test]
fn new_tickets_validate_and_normalise() {
    let fields = NewTicket::new("  Fix login ")
        .with_priority(" ")
        .with_description("")
        .validate()
        .expect("valid input");
    assert_eq!(fields.title, "Fix login");
    assert_eq!(fields.status, TicketStatus::Open);
    assert_eq!(fields.priority, None);
    assert_eq!(fields.description, None);
}

#[test]
fn new_tickets_require_a_title() {
    let err = NewTicket::new("   ").validate().expect_err("blank title");
    assert_eq!(err, TicketValidationError::EmptyTitle);
}

#[rstest]
fn empty_patches_keep_every_field(stored: Ticket) {
    let patch = TicketPatch::default();
    assert!(patch.is_empty());
    let fields = patch.apply_to(&stored).expect("valid merge");
    assert_eq!(fields.title, stored.title);
    assert_eq!(fields.priority, stored.priority);
    assert_eq!(fields.description, stored.description);
}

#[rstest]
fn blank_patch_values_clear_optional_fields(stored: Ticket) {
    let patch = TicketPatch {
        priority: Some(String::new()),
        description: Some("  ".to_owned()),
        ..TicketPatch::default()
    };
    let fields = patch.apply_to(&stored).expect("valid merge");
    assert_eq!(fields.priority, None);
    assert_eq!(fields.description, None);
}

#[rstest]
fn patches_validate_the_merged_result(stored: Ticket) {
    let patch = TicketPatch {
        description: Some("x".repeat(DESCRIPTION_MAX + 1)),
        ..TicketPatch::default()
    };
    let err = patch.apply_to(&stored).expect_err("too long");
    assert_eq!(err.field(), "description");
}

#[rstest]
fn applied_fields_stamp_the_update(mut stored: Ticket) {
    let later = stored.created_at + chrono::Duration::minutes(5);
    let fields = TicketPatch {
        status: Some(TicketStatus::Closed),
        ..TicketPatch::default()
    }
    .apply_to(&stored)
    .expect("valid merge");
    fields.write_into(&mut stored, later);
    assert_eq!(stored.status, TicketStatus::Closed);
    assert_eq!(stored.updated_at, Some(later));
}
