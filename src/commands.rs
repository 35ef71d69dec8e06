//! Core CLI commands for refsift: classify, filter, serve, tree.

use std::io::BufRead as _;
use std::path::PathBuf;

use crossbeam_channel::Sender;

use crate::cache::ClassificationCache;
use crate::classify::{Classify, Fallback};
use crate::config::Config;
use crate::error::Error;
use crate::filter::filter_locations;
use crate::heuristic::HeuristicClassifier;
use crate::oracle::{CommandHighlightProvider, OracleClassifier};
use crate::protocol::{self, StdoutSink};
use crate::source::FsLineSource;
use crate::store::{Event, ReferenceStore, run};
use crate::tree;
use crate::types::{Classification, Location, ScopePath, TreeNode};

/// The classification strategy for a command invocation: heuristic,
/// or oracle-first with heuristic fallback when `--oracle` is given.
fn build_classifier(oracle: Option<&str>) -> Box<dyn Classify> {
    let heuristic: Box<dyn Classify> =
        Box::new(HeuristicClassifier::new(Box::new(FsLineSource::new())));
    let Some(program) = oracle else {
        return heuristic;
    };
    let adapter = OracleClassifier::new(Box::new(CommandHighlightProvider::new(program)));
    return Box::new(Fallback::new(Box::new(adapter), heuristic));
}

fn classification_label(classification: Classification) -> &'static str {
    return match classification {
        Classification::Read => "READ",
        Classification::Text => "TEXT",
        Classification::Unknown => "UNKNOWN",
        Classification::Write => "WRITE",
    };
}

/// Classify every reference in a JSON list and print one labeled line
/// per reference, in input order.
///
/// # Errors
///
/// Returns errors from reading or parsing the reference list.
pub fn classify(refs: &str, oracle: Option<&str>) -> Result<(), Error> {
    let locations = read_locations(refs)?;
    let mut classifier = build_classifier(oracle);

    for location in &locations {
        let label = classification_label(classifier.classify(location));
        println!("{label:<8} {}", position_display(location));
    }
    return Ok(());
}

/// Print the references that survive the current filter flags and an
/// optional scope. Flags start from `.refsift.toml` (default all on)
/// and the `no_*` arguments switch individual classes off.
///
/// # Errors
///
/// Returns errors from config loading or reference list parsing.
pub fn filter(
    refs: &str,
    no_read: bool,
    no_text: bool,
    no_write: bool,
    scope: Option<&str>,
    dir: bool,
    oracle: Option<&str>,
) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;

    let mut state = config.filter;
    state.read = state.read && !no_read;
    state.text = state.text && !no_text;
    state.write = state.write && !no_write;

    let scope = scope.map(|path| {
        return ScopePath { is_directory: dir, path: PathBuf::from(path) };
    });

    let locations = read_locations(refs)?;
    let mut classifier = build_classifier(oracle);
    let mut cache = ClassificationCache::new();
    let kept = filter_locations(
        &locations,
        state,
        scope.as_ref(),
        classifier.as_mut(),
        &mut cache,
        config.unmatched,
    );

    for location in &kept {
        println!("{}", position_display(location));
    }
    eprintln!("{} of {} references kept", kept.len(), locations.len());
    return Ok(());
}

/// `path:line:column`, one-based.
fn position_display(location: &Location) -> String {
    return format!(
        "{}:{}:{}",
        location.path.display(),
        location.range.start.line.saturating_add(1),
        location.range.start.column.saturating_add(1),
    );
}

fn print_nodes(nodes: &[TreeNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            TreeNode::Directory { children, label, .. } => {
                println!("{indent}{label}");
                print_nodes(children, depth + 1);
            },
            TreeNode::File { label, reference_lines, .. } => {
                println!("{indent}{label}");
                for reference in reference_lines {
                    println!("{indent}  {}:{}", reference.line, reference.column);
                }
            },
        }
    }
}

/// Print the compressed reference tree for a JSON list.
///
/// # Errors
///
/// Returns errors from reference list parsing or tree building.
pub fn print_tree(refs: &str) -> Result<(), Error> {
    let locations = read_locations(refs)?;
    let nodes = tree::build(&locations)?;
    print_nodes(&nodes, 0);
    return Ok(());
}

/// Read a JSON reference list (an array of locations).
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read or `Error::Json` if
/// it isn't a location array.
fn read_locations(path: &str) -> Result<Vec<Location>, Error> {
    let content = std::fs::read_to_string(path)?;
    return Ok(serde_json::from_str(&content)?);
}

/// Forward stdin lines to the store as events. Malformed lines are
/// logged and dropped; the loop ends on EOF or when the store is gone.
fn read_stdin_events(events: &Sender<Event>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            return;
        };
        if line.trim().is_empty() {
            continue;
        }
        match protocol::parse_inbound(&line) {
            Ok(message) => {
                if events.send(protocol::event_for(message)).is_err() {
                    return;
                }
            },
            Err(e) => tracing::warn!("dropping inbound line: {e}"),
        }
    }
}

/// Speak the JSON-lines protocol over stdin/stdout until EOF.
///
/// A reader thread parses inbound messages onto a channel; the store
/// consumes them one at a time, so only one recompute is ever in
/// flight.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn serve(oracle: Option<&str>) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;

    let mut store = ReferenceStore::new(
        build_classifier(oracle),
        config.filter,
        config.unmatched,
        Box::new(StdoutSink),
        Box::new(StdoutSink),
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || return read_stdin_events(&tx));
    run(&mut store, &rx);
    return Ok(());
}
