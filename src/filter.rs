//! Filter engine: classification flags plus optional scope narrowing.

use crate::cache::ClassificationCache;
use crate::classify::{Classify, classify_cached};
use crate::types::{FilterState, Location, ScopePath, UnmatchedPolicy};

/// Narrow `locations` to those matching the scope (if any) whose
/// classification passes the filter flags. Preserves input order.
///
/// With every flag off the answer is empty by definition, so no
/// classification work happens at all.
pub fn filter_locations(
    locations: &[Location],
    state: FilterState,
    scope: Option<&ScopePath>,
    classifier: &mut dyn Classify,
    cache: &mut ClassificationCache,
    policy: UnmatchedPolicy,
) -> Vec<Location> {
    if state.is_empty() {
        return Vec::new();
    }

    let mut kept = Vec::new();
    for location in locations {
        if let Some(scope) = scope
            && !scope_matches(scope, location)
        {
            continue;
        }

        let classification = policy.apply(classify_cached(location, classifier, cache));
        if state.allows(classification) {
            kept.push(location.clone());
        }
    }
    return kept;
}

/// Directory scopes match at a `/` boundary, so `/a/foo` does not
/// capture `/a/foobar`. File scopes require the exact path.
fn scope_matches(scope: &ScopePath, location: &Location) -> bool {
    if !scope.is_directory {
        return location.path == scope.path;
    }

    let dir = scope.path.to_string_lossy();
    let path = location.path.to_string_lossy();
    if let Some(rest) = path.strip_prefix(dir.as_ref()) {
        return dir.ends_with('/') || rest.starts_with('/');
    }
    return false;
}
