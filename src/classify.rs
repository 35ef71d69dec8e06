//! Classification strategy interface and composition.

use crate::cache::ClassificationCache;
use crate::types::{Classification, Location};

/// A classification strategy. Implementations are line-local
/// (heuristic) or backed by an external service (oracle); both degrade
/// to `Unknown` instead of failing, so callers never branch on errors.
pub trait Classify {
    /// Classify one reference occurrence.
    fn classify(&mut self, location: &Location) -> Classification;

    /// Drop any per-document state. Called when the reference set is
    /// replaced, since the underlying files may have changed.
    fn reset(&mut self) {}
}

/// Oracle-with-heuristic composition: ask `primary` first and fall back
/// to `secondary` whenever it answers `Unknown`.
pub struct Fallback {
    primary: Box<dyn Classify>,
    secondary: Box<dyn Classify>,
}

impl Fallback {
    pub fn new(primary: Box<dyn Classify>, secondary: Box<dyn Classify>) -> Self {
        return Self { primary, secondary };
    }
}

impl Classify for Fallback {
    fn classify(&mut self, location: &Location) -> Classification {
        let first = self.primary.classify(location);
        if first != Classification::Unknown {
            return first;
        }
        return self.secondary.classify(location);
    }

    fn reset(&mut self) {
        self.primary.reset();
        self.secondary.reset();
    }
}

/// Cache-checked classification: consult the cache, classify on a miss,
/// store the result.
pub fn classify_cached(
    location: &Location,
    classifier: &mut dyn Classify,
    cache: &mut ClassificationCache,
) -> Classification {
    if let Some(hit) = cache.get(location) {
        return hit;
    }
    let classification = classifier.classify(location);
    cache.insert(location, classification);
    return classification;
}
