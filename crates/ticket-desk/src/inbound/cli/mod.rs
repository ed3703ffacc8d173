//! Command-line adapter.
//!
//! Each invocation hydrates both stores, runs one command, and writes plain
//! text to the supplied output. Ticket commands and the dashboard require an
//! active session.

mod error;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use mockable::Clock;
use tracing::debug;

pub use self::error::CliError;
use crate::domain::ports::KeyValueStore;
use crate::domain::{
    AuthSession, AuthStore, Error, NewTicket, StatusFilter, TicketId, TicketPatch, TicketStatus,
    TicketStore,
};

const DEFAULT_PRIORITY: &str = "normal";
const NOTHING_TO_UPDATE: &str =
    "Nothing to update; pass --title, --status, --priority, or --description.";

/// `ticket-desk` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ticket-desk",
    about = "Track support tickets in a local storage directory",
    version
)]
pub struct Cli {
    /// Directory holding the persisted documents. Overrides
    /// `TICKET_DESK_STORAGE_DIR`.
    #[arg(long = "storage-dir", value_name = "path", global = true)]
    pub storage_dir: Option<PathBuf>,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account and sign in.
    Register {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Account email.
        #[arg(long)]
        email: String,
        /// Password, at least six characters.
        #[arg(long)]
        password: String,
    },
    /// Sign in to an existing account.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// End the active session.
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// Manage tickets.
    #[command(subcommand)]
    Tickets(TicketsCommand),
    /// Summarise the ticket collection.
    Dashboard,
}

/// Ticket subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TicketsCommand {
    /// Create a ticket.
    Add {
        /// Short summary.
        #[arg(long)]
        title: String,
        /// Initial status.
        #[arg(long, default_value_t = TicketStatus::Open)]
        status: TicketStatus,
        /// Priority label.
        #[arg(long, default_value = DEFAULT_PRIORITY)]
        priority: String,
        /// Longer description.
        #[arg(long)]
        description: Option<String>,
    },
    /// List tickets, newest first.
    List {
        /// `all`, `open`, `in_progress`, or `closed`.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one ticket.
    Show {
        /// Ticket identifier.
        id: TicketId,
    },
    /// Change fields of a ticket.
    Update {
        /// Ticket identifier.
        id: TicketId,
        /// Replacement fields.
        #[command(flatten)]
        fields: TicketFieldArgs,
    },
    /// Delete a ticket.
    Delete {
        /// Ticket identifier.
        id: TicketId,
    },
}

/// Optional replacement fields for `tickets update`.
#[derive(Debug, Clone, Default, Args)]
pub struct TicketFieldArgs {
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New status.
    #[arg(long)]
    pub status: Option<TicketStatus>,
    /// New priority label; an empty value clears it.
    #[arg(long)]
    pub priority: Option<String>,
    /// New description; an empty value clears it.
    #[arg(long)]
    pub description: Option<String>,
}

impl From<TicketFieldArgs> for TicketPatch {
    fn from(value: TicketFieldArgs) -> Self {
        Self {
            title: value.title,
            status: value.status,
            priority: value.priority,
            description: value.description,
        }
    }
}

/// Both stores over one storage medium.
pub struct Desk<S> {
    auth: AuthStore<S>,
    tickets: TicketStore<S>,
}

impl<S> Desk<S>
where
    S: KeyValueStore,
{
    /// Build and hydrate both stores.
    #[must_use]
    pub fn open(storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let mut auth = AuthStore::new(Arc::clone(&storage), Arc::clone(&clock));
        let mut tickets = TicketStore::new(storage, clock);
        auth.hydrate();
        tickets.hydrate();
        Self { auth, tickets }
    }

    /// Auth store, for inspection.
    #[must_use]
    pub const fn auth(&self) -> &AuthStore<S> {
        &self.auth
    }

    /// Ticket store, for inspection.
    #[must_use]
    pub const fn tickets(&self) -> &TicketStore<S> {
        &self.tickets
    }

    /// Run `command`, writing its report to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when the store rejects the command or output
    /// cannot be written.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<(), CliError> {
        match command {
            Command::Register {
                name,
                email,
                password,
            } => {
                self.auth.register(&name, &email, &password)?;
                let session = self.auth.ensure_authenticated()?;
                writeln!(
                    out,
                    "Welcome, {}! Your account is ready.",
                    session.user.name.first_name()
                )?;
            }
            Command::Login { email, password } => {
                self.auth.login(&email, &password)?;
                let session = self.auth.ensure_authenticated()?;
                writeln!(out, "Welcome back, {}!", session.user.name.first_name())?;
            }
            Command::Logout => {
                self.auth.logout()?;
                writeln!(out, "Signed out.")?;
            }
            Command::Whoami => match self.auth.get_session() {
                Some(session) => render::session(out, &session)?,
                None => writeln!(out, "Not signed in.")?,
            },
            Command::Tickets(tickets) => {
                let session = self.auth.ensure_authenticated()?;
                self.run_tickets(&session, tickets, out)?;
            }
            Command::Dashboard => {
                let session = self.auth.ensure_authenticated()?;
                writeln!(out, "Hello, {}.", session.user.name.first_name())?;
                render::stats(out, &self.tickets.stats())?;
            }
        }
        Ok(())
    }

    fn run_tickets(
        &mut self,
        session: &AuthSession,
        command: TicketsCommand,
        out: &mut impl Write,
    ) -> Result<(), CliError> {
        debug!(user_id = %session.user.id, "running ticket command");
        match command {
            TicketsCommand::Add {
                title,
                status,
                priority,
                description,
            } => {
                let input = NewTicket {
                    title,
                    status,
                    priority: Some(priority),
                    description,
                };
                let ticket = self.tickets.add_ticket(input)?;
                writeln!(out, "Created ticket {}.", ticket.id)?;
            }
            TicketsCommand::List { status } => {
                let tickets = self.tickets.list(status);
                if tickets.is_empty() {
                    writeln!(out, "No tickets found.")?;
                }
                for ticket in tickets {
                    render::ticket_line(out, ticket)?;
                }
            }
            TicketsCommand::Show { id } => {
                let ticket = self
                    .tickets
                    .get_ticket_by_id(&id)
                    .ok_or_else(|| ticket_not_found(&id))?;
                render::ticket_details(out, ticket)?;
            }
            TicketsCommand::Update { id, fields } => {
                let patch = TicketPatch::from(fields);
                if patch.is_empty() {
                    return Err(Error::invalid_request(NOTHING_TO_UPDATE).into());
                }
                let ticket = self
                    .tickets
                    .update_ticket(&id, &patch)?
                    .ok_or_else(|| ticket_not_found(&id))?;
                writeln!(out, "Updated ticket {}.", ticket.id)?;
            }
            TicketsCommand::Delete { id } => {
                if self.tickets.delete_ticket(&id)? {
                    writeln!(out, "Deleted ticket {id}.")?;
                } else {
                    writeln!(out, "No ticket {id}; nothing deleted.")?;
                }
            }
        }
        Ok(())
    }
}

fn ticket_not_found(id: &TicketId) -> Error {
    Error::not_found(format!("Ticket {id} not found."))
}
