use std::path::Path;

use crate::error::Error;
use crate::types::{FilterState, UnmatchedPolicy};

/// Project configuration loaded from `.refsift.toml`: the initial
/// filter flags and the policy for unclassifiable references.
#[derive(Default)]
pub struct Config {
    /// Filter flags a session starts with.
    pub filter: FilterState,
    /// What an `Unknown` classification counts as during filtering.
    pub unmatched: UnmatchedPolicy,
}

/// Raw TOML structure for `.refsift.toml`.
#[derive(serde::Deserialize)]
struct RefsiftTomlConfig {
    #[serde(default)]
    filter: FilterTomlConfig,
    #[serde(default)]
    unmatched: UnmatchedPolicy,
}

/// Raw `[filter]` table. Omitted flags default to on.
#[derive(serde::Deserialize)]
struct FilterTomlConfig {
    #[serde(default = "enabled")]
    read: bool,
    #[serde(default = "enabled")]
    text: bool,
    #[serde(default = "enabled")]
    write: bool,
}

impl Default for FilterTomlConfig {
    fn default() -> Self {
        return Self { read: true, text: true, write: true };
    }
}

fn enabled() -> bool {
    return true;
}

impl Config {
    /// Load config from `.refsift.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if
    /// the file exists but is malformed; never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".refsift.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: RefsiftTomlConfig = toml::from_str(&content)?;
        return Ok(Self {
            filter: FilterState {
                read: raw.filter.read,
                text: raw.filter.text,
                write: raw.filter.write,
            },
            unmatched: raw.unmatched,
        });
    }
}
