//! Runtime settings loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Directory used when no storage location is configured.
pub const DEFAULT_STORAGE_DIR: &str = ".ticket-desk";

/// Settings read from `TICKET_DESK_*` environment variables and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TICKET_DESK")]
pub struct TicketDeskSettings {
    /// Directory holding the persisted documents.
    pub storage_dir: Option<PathBuf>,
    /// Emit logs as JSON lines instead of human-readable text.
    #[ortho_config(default = false)]
    pub json_logs: bool,
}

impl TicketDeskSettings {
    /// Return the configured storage directory, falling back to the default.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> TicketDeskSettings {
        TicketDeskSettings::load_from_iter([OsString::from("ticket-desk")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env([
            ("TICKET_DESK_STORAGE_DIR", None::<String>),
            ("TICKET_DESK_JSON_LOGS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.json_logs);
        assert_eq!(settings.storage_dir(), PathBuf::from(DEFAULT_STORAGE_DIR));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("TICKET_DESK_STORAGE_DIR", Some("/tmp/tickets".to_owned())),
            ("TICKET_DESK_JSON_LOGS", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.json_logs);
        assert_eq!(settings.storage_dir(), PathBuf::from("/tmp/tickets"));
    }
}
