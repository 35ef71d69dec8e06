//! Wire protocol for the `serve` sidecar: one JSON object per line,
//! tagged with `type`, plus the stdout-backed collaborator sinks.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::store::{Event, PreviewSink, ViewSink};
use crate::types::{
    Classification, FilterState, Location, Origin, Position, PreviewMode, Range, ScopePath,
    TreeNode,
};

/// Messages the host sends the sidecar. A closed union: unknown tags
/// or malformed fields fail parsing instead of being half-understood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    /// The filter checkboxes changed.
    FilterChanged {
        read: bool,
        text: bool,
        write: bool,
    },
    /// A reference leaf was selected. One-based, mirroring tree keys.
    ReferenceSelected {
        column: u32,
        line: u32,
        path: PathBuf,
    },
    /// A new find-references result. The entry point of a session.
    #[serde(rename_all = "camelCase")]
    ReferencesReplaced {
        locations: Vec<Location>,
        origin_path: PathBuf,
        origin_position: Position,
    },
    /// On-demand classification of one location.
    RequestClassification {
        location: Location,
    },
    /// A tree scope was selected; a missing or null path clears it.
    #[serde(rename_all = "camelCase")]
    ScopeSelected {
        #[serde(default)]
        is_directory: bool,
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// The host-side view hit an error worth surfacing.
    ShowError {
        text: String,
    },
    /// The view finished loading and wants the current state.
    ViewReady,
}

/// Messages the sidecar sends the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    /// Answer to `requestClassification`.
    ClassificationResult {
        classification: Classification,
        location: Location,
    },
    /// Close any open preview.
    ClosePreview,
    /// A user-visible error notification.
    Error {
        message: String,
    },
    /// Navigate the editor to a reference. One-based.
    Navigate {
        column: u32,
        line: u32,
        path: PathBuf,
    },
    /// Present the filtered locations anchored at the origin.
    #[serde(rename_all = "camelCase")]
    ShowPreview {
        locations: Vec<Location>,
        mode: PreviewMode,
        origin_path: PathBuf,
        origin_position: Position,
    },
    /// Replace the rendered reference tree.
    UpdateRefs {
        tree: Vec<TreeNode>,
    },
}

/// Translate a parsed message into a store event.
pub fn event_for(message: Inbound) -> Event {
    return match message {
        Inbound::FilterChanged { read, text, write } => {
            Event::FilterChanged(FilterState { read, text, write })
        },
        Inbound::ReferenceSelected { column, line, path } => {
            let position = Position {
                column: column.saturating_sub(1),
                line: line.saturating_sub(1),
            };
            Event::ReferenceSelected(Location {
                path,
                range: Range { end: position, start: position },
            })
        },
        Inbound::ReferencesReplaced { locations, origin_path, origin_position } => {
            Event::ReferencesReplaced {
                locations,
                origin: Origin { path: origin_path, position: origin_position },
            }
        },
        Inbound::RequestClassification { location } => Event::ClassificationRequested(location),
        Inbound::ScopeSelected { is_directory, path } => {
            Event::ScopeSelected(path.map(|path| return ScopePath { is_directory, path }))
        },
        Inbound::ShowError { text } => Event::ErrorRaised(text),
        Inbound::ViewReady => Event::ViewReady,
    };
}

/// Parse one inbound line.
///
/// # Errors
///
/// Returns `Error::InvalidMessage` for anything that isn't exactly one
/// well-formed message object.
pub fn parse_inbound(line: &str) -> Result<Inbound, Error> {
    return serde_json::from_str(line)
        .map_err(|e| return Error::InvalidMessage { reason: e.to_string() });
}

/// Both collaborator sinks at once: every outbound message becomes one
/// JSON line on stdout.
pub struct StdoutSink;

fn emit(message: &Outbound) {
    match serde_json::to_string(message) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!("encoding outbound message: {e}"),
    }
}

impl ViewSink for StdoutSink {
    fn classification_result(&mut self, location: &Location, classification: Classification) {
        emit(&Outbound::ClassificationResult { classification, location: location.clone() });
    }

    fn show_error(&mut self, message: &str) {
        emit(&Outbound::Error { message: message.to_string() });
    }

    fn update_tree(&mut self, tree: &[TreeNode]) {
        emit(&Outbound::UpdateRefs { tree: tree.to_vec() });
    }
}

impl PreviewSink for StdoutSink {
    fn close(&mut self) {
        emit(&Outbound::ClosePreview);
    }

    fn open(&mut self, location: &Location) {
        emit(&Outbound::Navigate {
            column: location.range.start.column.saturating_add(1),
            line: location.range.start.line.saturating_add(1),
            path: location.path.clone(),
        });
    }

    fn show(&mut self, origin: &Origin, locations: &[Location], mode: PreviewMode) {
        emit(&Outbound::ShowPreview {
            locations: locations.to_vec(),
            mode,
            origin_path: origin.path.clone(),
            origin_position: origin.position,
        });
    }
}
