//! `ticket-desk` entry point: loads settings, opens storage, runs one command.

use std::error::Error;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing_subscriber::{EnvFilter, fmt};

use ticket_desk::config::TicketDeskSettings;
use ticket_desk::inbound::cli::{Cli, CliError, Desk};
use ticket_desk::outbound::FileKeyValueStore;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&mut io::stderr().lock(), &format!("error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = TicketDeskSettings::load_from_iter([OsString::from("ticket-desk")])
        .map_err(|err| CliError::Settings {
            message: err.to_string(),
        })?;
    if let Err(err) = init_tracing(settings.json_logs) {
        report(&mut io::stderr().lock(), &format!("tracing init failed: {err}"));
    }

    let dir = cli.storage_dir.unwrap_or_else(|| settings.storage_dir());
    let root = Utf8PathBuf::from_path_buf(dir)
        .map_err(|path| CliError::NonUtf8StorageDir { path })?;
    let storage = Arc::new(FileKeyValueStore::open(&root)?);

    let mut desk = Desk::open(storage, Arc::new(DefaultClock));
    desk.execute(cli.command, &mut io::stdout().lock())
}

fn init_tracing(json: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

// A diagnostic that cannot be written has nowhere else to go.
fn report(out: &mut impl Write, line: &str) {
    if let Err(write_err) = writeln!(out, "{line}") {
        drop(write_err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_second_subscriber_install_is_reported() {
        drop(init_tracing(false));
        let err = init_tracing(true).expect_err("subscriber already installed");

        let mut out = Vec::new();
        report(&mut out, &format!("tracing init failed: {err}"));
        let text = String::from_utf8(out).expect("utf-8 output");
        assert!(text.starts_with("tracing init failed: "));
        assert!(text.ends_with('\n'));
    }
}
