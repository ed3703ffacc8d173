//! Plain-text rendering of store results.

use std::io::{self, Write};

use crate::domain::{AuthSession, Ticket, TicketStats};

pub(super) fn session(out: &mut impl Write, session: &AuthSession) -> io::Result<()> {
    writeln!(out, "{} <{}>", session.user.name, session.user.email)
}

pub(super) fn ticket_line(out: &mut impl Write, ticket: &Ticket) -> io::Result<()> {
    write!(out, "{}  [{}]  {}", ticket.id, ticket.status.label(), ticket.title)?;
    if let Some(priority) = &ticket.priority {
        write!(out, "  ({priority})")?;
    }
    writeln!(out)
}

pub(super) fn ticket_details(out: &mut impl Write, ticket: &Ticket) -> io::Result<()> {
    writeln!(out, "ID:          {}", ticket.id)?;
    writeln!(out, "Title:       {}", ticket.title)?;
    writeln!(out, "Status:      {}", ticket.status.label())?;
    writeln!(
        out,
        "Priority:    {}",
        ticket.priority.as_deref().unwrap_or("-")
    )?;
    writeln!(out, "Created:     {}", ticket.created_at.to_rfc3339())?;
    if let Some(updated_at) = ticket.updated_at {
        writeln!(out, "Updated:     {}", updated_at.to_rfc3339())?;
    }
    if let Some(description) = &ticket.description {
        writeln!(out)?;
        writeln!(out, "{description}")?;
    }
    Ok(())
}

pub(super) fn stats(out: &mut impl Write, stats: &TicketStats) -> io::Result<()> {
    writeln!(out, "Total tickets:  {}", stats.total)?;
    writeln!(out, "Open:           {}", stats.open)?;
    writeln!(out, "In Progress:    {}", stats.in_progress)?;
    writeln!(out, "Closed:         {}", stats.closed)?;
    writeln!(out, "Completion:     {}%", stats.completion_rate)?;
    if stats.recent.is_empty() {
        return writeln!(out, "No tickets yet.");
    }
    writeln!(out)?;
    writeln!(out, "Recent tickets:")?;
    for ticket in &stats.recent {
        ticket_line(out, ticket)?;
    }
    Ok(())
}
