//! Reference store: owns the current reference set and filter state,
//! and sequences refiltering and rebuilding on every event.
//!
//! Events are handled one at a time to completion (`handle` takes
//! `&mut self` and the pump below drains a single channel), so a slow
//! oracle can delay a recomputation but a stale result can never
//! overwrite a newer tree.

use crossbeam_channel::Receiver;

use crate::cache::ClassificationCache;
use crate::classify::{Classify, classify_cached};
use crate::error::Error;
use crate::filter::filter_locations;
use crate::tree;
use crate::types::{
    Classification, FilterState, Location, Origin, PreviewMode, ScopePath, TreeNode,
    UnmatchedPolicy,
};

/// Everything the host can tell the store, as a closed union.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// On-demand classification of a single location.
    ClassificationRequested(Location),
    /// The UI collaborator raised an error to surface to the user.
    ErrorRaised(String),
    /// The filter checkboxes changed.
    FilterChanged(FilterState),
    /// A reference leaf was chosen: navigate directly, no refiltering.
    ReferenceSelected(Location),
    /// A new find-references result arrived, replacing the current set.
    ReferencesReplaced {
        /// The pre-resolved occurrence list.
        locations: Vec<Location>,
        /// Where the find-references request was made.
        origin: Origin,
    },
    /// A tree node was selected as preview scope; `None` clears it.
    ScopeSelected(Option<ScopePath>),
    /// The view (re)connected and wants the current state again.
    ViewReady,
}

/// The UI collaborator, as seen from the store.
pub trait ViewSink {
    /// Answer an on-demand classification lookup.
    fn classification_result(&mut self, location: &Location, classification: Classification);
    /// Surface a user-visible error notification.
    fn show_error(&mut self, message: &str);
    /// Replace the rendered reference tree.
    fn update_tree(&mut self, tree: &[TreeNode]);
}

/// The preview/navigation collaborator, as seen from the store.
pub trait PreviewSink {
    /// Close any open preview.
    fn close(&mut self);
    /// Navigate straight to one location.
    fn open(&mut self, location: &Location);
    /// Present the filtered locations anchored at the origin.
    fn show(&mut self, origin: &Origin, locations: &[Location], mode: PreviewMode);
}

/// Owner of all mutable session state. One instance per view.
pub struct ReferenceStore {
    cache: ClassificationCache,
    classifier: Box<dyn Classify>,
    filter_state: FilterState,
    locations: Vec<Location>,
    origin: Option<Origin>,
    policy: UnmatchedPolicy,
    preview: Box<dyn PreviewSink>,
    scope: Option<ScopePath>,
    view: Box<dyn ViewSink>,
}

impl ReferenceStore {
    pub fn new(
        classifier: Box<dyn Classify>,
        filter_state: FilterState,
        policy: UnmatchedPolicy,
        view: Box<dyn ViewSink>,
        preview: Box<dyn PreviewSink>,
    ) -> Self {
        return Self {
            cache: ClassificationCache::new(),
            classifier,
            filter_state,
            locations: Vec::new(),
            origin: None,
            policy,
            preview,
            scope: None,
            view,
        };
    }

    /// Single ingestion point. Processes the event to completion;
    /// failures degrade (cleared view, logged warning) and never escape.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::ClassificationRequested(location) => {
                let classification =
                    classify_cached(&location, self.classifier.as_mut(), &mut self.cache);
                self.view.classification_result(&location, classification);
            },
            Event::ErrorRaised(message) => self.view.show_error(&message),
            Event::FilterChanged(state) => {
                if state == self.filter_state {
                    tracing::debug!("filter state unchanged, skipping recompute");
                    return;
                }
                self.filter_state = state;
                self.refresh();
            },
            Event::ReferenceSelected(location) => {
                self.preview.close();
                self.preview.open(&location);
            },
            Event::ReferencesReplaced { locations, origin } => {
                self.locations = locations;
                self.origin = Some(origin);
                // Classification depends on file content, which may have
                // changed along with the new reference set.
                self.cache.clear();
                self.classifier.reset();
                self.refresh();
            },
            Event::ScopeSelected(scope) => {
                self.scope = scope;
                self.refresh();
            },
            Event::ViewReady => {
                if !self.locations.is_empty() {
                    self.refresh();
                }
            },
        }
    }

    /// Hand the filtered subset to the preview collaborator. An empty
    /// subset closes the preview instead of showing nothing.
    fn emit_preview(&mut self, locations: &[Location]) {
        if locations.is_empty() {
            self.preview.close();
            return;
        }
        let Some(origin) = &self.origin else {
            tracing::warn!("{}", Error::MissingOrigin);
            return;
        };
        self.preview.show(origin, locations, PreviewMode::Peek);
    }

    /// Refilter, rebuild, and emit tree and preview. The tree is never
    /// scoped (it must stay navigable so a different scope can be
    /// selected) while the preview honors the current scope.
    fn recompute(&mut self) -> Result<(), Error> {
        let visible = filter_locations(
            &self.locations,
            self.filter_state,
            None,
            self.classifier.as_mut(),
            &mut self.cache,
            self.policy,
        );
        let nodes = tree::build(&visible)?;
        self.view.update_tree(&nodes);

        let previewed = match &self.scope {
            None => visible,
            Some(scope) => filter_locations(
                &self.locations,
                self.filter_state,
                Some(scope),
                self.classifier.as_mut(),
                &mut self.cache,
                self.policy,
            ),
        };
        self.emit_preview(&previewed);
        return Ok(());
    }

    fn refresh(&mut self) {
        if let Err(e) = self.recompute() {
            tracing::error!("recompute failed: {e}");
            self.view.show_error(&format!("failed to build reference tree: {e}"));
            // Clear rather than leave a stale tree or preview behind.
            self.view.update_tree(&[]);
            self.preview.close();
        }
    }
}

/// Drain events until every sender is gone. The single consumer is
/// what serializes recomputation.
pub fn run(store: &mut ReferenceStore, events: &Receiver<Event>) {
    while let Ok(event) = events.recv() {
        store.handle(event);
    }
}
