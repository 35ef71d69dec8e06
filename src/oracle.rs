//! Oracle-backed classification: translate authoritative document
//! highlights into the classification taxonomy.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::classify::Classify;
use crate::error::Error;
use crate::types::{Classification, Location, Position, Range};

/// One highlight reported by the oracle for a symbol occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// What kind of usage the oracle saw.
    pub kind: HighlightKind,
    /// The exact range the oracle attributes the usage to.
    pub range: Range,
}

/// The oracle's usage taxonomy, mapped 1:1 onto [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Read,
    Text,
    Write,
}

impl HighlightKind {
    fn classification(self) -> Classification {
        return match self {
            Self::Read => Classification::Read,
            Self::Text => Classification::Text,
            Self::Write => Classification::Write,
        };
    }
}

/// The external authoritative highlight service, as a black box.
///
/// Errors are the provider's concern to describe; the adapter below
/// guarantees they never escape as anything but `Unknown`.
pub trait HighlightProvider {
    /// Highlights for the symbol at `position` of `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OracleUnavailable` when the service cannot be
    /// reached or answers garbage.
    fn highlights(&mut self, path: &Path, position: Position) -> Result<Vec<Highlight>, Error>;
}

/// Classification strategy backed by a [`HighlightProvider`].
///
/// Selection order: the highlight whose range equals the location's
/// range exactly, else any highlight containing the start position
/// (the oracle and the reference lister may disagree slightly about
/// where a symbol begins), else `Unknown`. Transport failures are
/// logged and mapped to `Unknown`, never propagated.
pub struct OracleClassifier {
    provider: Box<dyn HighlightProvider>,
}

impl OracleClassifier {
    pub fn new(provider: Box<dyn HighlightProvider>) -> Self {
        return Self { provider };
    }
}

impl Classify for OracleClassifier {
    fn classify(&mut self, location: &Location) -> Classification {
        let position = location.range.start;
        let highlights = match self.provider.highlights(&location.path, position) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(path = %location.path.display(), "highlight request failed: {e}");
                return Classification::Unknown;
            },
        };

        if highlights.is_empty() {
            return Classification::Unknown;
        }

        let selected = highlights
            .iter()
            .find(|h| return h.range == location.range)
            .or_else(|| return highlights.iter().find(|h| return h.range.contains(position)));

        return selected.map_or(Classification::Unknown, |h| return h.kind.classification());
    }
}

/// A [`HighlightProvider`] that shells out to an external program:
/// `<program> <path> <line> <column>` (zero-based), expecting a JSON
/// array of highlights on stdout.
pub struct CommandHighlightProvider {
    program: String,
}

impl CommandHighlightProvider {
    pub fn new(program: impl Into<String>) -> Self {
        return Self { program: program.into() };
    }
}

impl HighlightProvider for CommandHighlightProvider {
    fn highlights(&mut self, path: &Path, position: Position) -> Result<Vec<Highlight>, Error> {
        let output = Command::new(&self.program)
            .arg(path)
            .arg(position.line.to_string())
            .arg(position.column.to_string())
            .output()
            .map_err(|e| {
                return Error::OracleUnavailable {
                    reason: format!("spawn {}: {e}", self.program),
                };
            })?;

        if !output.status.success() {
            return Err(Error::OracleUnavailable {
                reason: format!("{} exited with {}", self.program, output.status),
            });
        }

        return serde_json::from_slice(&output.stdout).map_err(|e| {
            return Error::OracleUnavailable {
                reason: format!("{} output: {e}", self.program),
            };
        });
    }
}
