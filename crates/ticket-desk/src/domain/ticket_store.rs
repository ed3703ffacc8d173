//! Ticket store: the shared ticket collection.
//!
//! The whole collection is cached after [`TicketStore::hydrate`] and written
//! back in full after every mutation. Writes reach storage before memory is
//! updated, so a failed write leaves the cached collection untouched.
//!
//! Records that do not decode are hidden but written back unchanged. If the
//! medium could not be read, the store shows an empty collection and retries
//! the read before any mutation rather than overwriting what it never saw.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde_json::Value;
use tracing::{debug, info};

use super::Error;
use super::persistence::{Document, keys, read_records, write_records};
use super::ports::KeyValueStore;
use super::ticket::{NewTicket, StatusFilter, Ticket, TicketId, TicketPatch, TicketStats};

/// Ticket collection service over a [`KeyValueStore`].
pub struct TicketStore<S> {
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
    tickets: Vec<Ticket>,
    skipped: Vec<Value>,
    loaded: bool,
    hydrated: bool,
}

impl<S> TicketStore<S> {
    /// Create an unhydrated store.
    #[must_use]
    pub const fn new(storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            tickets: Vec::new(),
            skipped: Vec::new(),
            loaded: false,
            hydrated: false,
        }
    }

    /// Whether [`Self::hydrate`] has completed.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Cached tickets in stored order, newest first.
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Look up a cached ticket without touching storage.
    #[must_use]
    pub fn get_ticket_by_id(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| ticket.id == *id)
    }

    /// Tickets passing `filter`, newest `createdAt` first.
    #[must_use]
    pub fn list(&self, filter: StatusFilter) -> Vec<&Ticket> {
        let mut matching: Vec<&Ticket> = self
            .tickets
            .iter()
            .filter(|ticket| filter.matches(ticket))
            .collect();
        matching.sort_by_key(|ticket| Reverse(ticket.created_at));
        matching
    }

    /// Dashboard summary of the cached collection.
    #[must_use]
    pub fn stats(&self) -> TicketStats {
        TicketStats::from_tickets(&self.tickets)
    }

    fn update_stamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.utc();
        let floor = previous
            .checked_add_signed(TimeDelta::milliseconds(1))
            .unwrap_or(previous);
        now.max(floor)
    }
}

impl<S> TicketStore<S>
where
    S: KeyValueStore,
{
    /// Load the persisted collection. Subsequent calls are no-ops.
    ///
    /// An unreadable or corrupt collection is logged and treated as empty.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }
        if self.load().is_err() {
            debug!("ticket collection unreadable; starting empty");
        }
        self.hydrated = true;
        debug!(count = self.tickets.len(), "ticket store hydrated");
    }

    fn load(&mut self) -> Result<(), Error> {
        let document = read_records(self.storage.as_ref(), keys::TICKETS);
        self.loaded = !matches!(document, Document::Unreadable(_));
        let records = document.into_writable()?;
        self.tickets = records.valid;
        self.skipped = records.skipped;
        Ok(())
    }

    /// Hydrate, then make sure the cache reflects a successful read.
    fn prepare_write(&mut self) -> Result<(), Error> {
        self.hydrate();
        if self.loaded {
            return Ok(());
        }
        self.load()
    }

    /// Validate and prepend a new ticket.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when a field fails validation.
    /// - `storage_failure` when the collection cannot be read or written.
    pub fn add_ticket(&mut self, input: NewTicket) -> Result<Ticket, Error> {
        self.prepare_write()?;
        let fields = input.validate()?;
        let ticket = fields.into_ticket(TicketId::random(), self.clock.utc());

        let mut next = Vec::with_capacity(self.tickets.len().saturating_add(1));
        next.push(ticket.clone());
        next.extend(self.tickets.iter().cloned());
        self.commit(next)?;

        info!(ticket_id = %ticket.id, status = %ticket.status, "created ticket");
        Ok(ticket)
    }

    /// Merge `patch` into the ticket with `id`.
    ///
    /// Returns `Ok(None)` without writing when no ticket matches. The
    /// `updatedAt` stamp is always later than the ticket's previous
    /// timestamps, even if the clock has not advanced.
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the merged ticket fails validation.
    /// - `storage_failure` when the collection cannot be read or written.
    pub fn update_ticket(
        &mut self,
        id: &TicketId,
        patch: &TicketPatch,
    ) -> Result<Option<Ticket>, Error> {
        self.prepare_write()?;
        let Some(index) = self.tickets.iter().position(|ticket| ticket.id == *id) else {
            debug!(ticket_id = %id, "update skipped; no such ticket");
            return Ok(None);
        };

        let mut next = self.tickets.clone();
        let Some(target) = next.get_mut(index) else {
            return Ok(None);
        };
        let fields = patch.apply_to(target)?;
        let stamp = self.update_stamp(target.last_modified());
        fields.write_into(target, stamp);
        let updated = target.clone();
        self.commit(next)?;

        info!(ticket_id = %id, status = %updated.status, "updated ticket");
        Ok(Some(updated))
    }

    /// Remove the ticket with `id`.
    ///
    /// Returns whether a ticket was removed. Nothing is written when no
    /// ticket matches, so repeated calls are harmless.
    ///
    /// # Errors
    ///
    /// Returns `storage_failure` when the collection cannot be read or
    /// written.
    pub fn delete_ticket(&mut self, id: &TicketId) -> Result<bool, Error> {
        self.prepare_write()?;
        let next: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|ticket| ticket.id != *id)
            .cloned()
            .collect();
        if next.len() == self.tickets.len() {
            debug!(ticket_id = %id, "delete skipped; no such ticket");
            return Ok(false);
        }
        self.commit(next)?;

        info!(ticket_id = %id, "deleted ticket");
        Ok(true)
    }

    fn commit(&mut self, next: Vec<Ticket>) -> Result<(), Error> {
        write_records(self.storage.as_ref(), keys::TICKETS, &next, &self.skipped)?;
        self.tickets = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ticket_store_tests.rs"]
mod tests;
