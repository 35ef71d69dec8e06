//! Per-session memoization of classification results.

use std::collections::HashMap;

use crate::types::{Classification, Location};

/// Memoizes classification by location key so a reference is classified
/// at most once per reference set. Cleared wholesale when the set is
/// replaced, never on filter or scope changes, since classification
/// doesn't depend on those.
#[derive(Default)]
pub struct ClassificationCache {
    entries: HashMap<String, Classification>,
}

/// Cache key for a location: `path#startLine,startColumn`.
/// Unique per occurrence because the find-references facility never
/// reports two references starting at the same position.
pub fn location_key(location: &Location) -> String {
    return format!(
        "{}#{},{}",
        location.path.display(),
        location.range.start.line,
        location.range.start.column,
    );
}

impl ClassificationCache {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up a previously stored classification.
    pub fn get(&self, location: &Location) -> Option<Classification> {
        return self.entries.get(&location_key(location)).copied();
    }

    /// Store a classification for a location.
    pub fn insert(&mut self, location: &Location, classification: Classification) {
        self.entries.insert(location_key(location), classification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, Range};

    fn location(path: &str, line: u32, column: u32) -> Location {
        return Location {
            path: path.into(),
            range: Range {
                end: Position { column: column + 1, line },
                start: Position { column, line },
            },
        };
    }

    #[test]
    fn key_encodes_path_and_start_position() {
        let loc = location("/a/main.go", 7, 3);
        assert_eq!(location_key(&loc), "/a/main.go#7,3");
    }

    #[test]
    fn second_write_does_not_change_first_result() {
        let mut cache = ClassificationCache::new();
        let loc = location("/a/main.go", 1, 0);
        cache.insert(&loc, Classification::Write);
        cache.insert(&loc, Classification::Write);
        assert_eq!(cache.get(&loc), Some(Classification::Write));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut cache = ClassificationCache::new();
        let loc = location("/a/main.go", 1, 0);
        cache.insert(&loc, Classification::Read);
        cache.clear();
        assert_eq!(cache.get(&loc), None);
    }

    #[test]
    fn distinct_columns_are_distinct_entries() {
        let mut cache = ClassificationCache::new();
        cache.insert(&location("/a/main.go", 4, 1), Classification::Write);
        cache.insert(&location("/a/main.go", 4, 9), Classification::Read);
        assert_eq!(cache.get(&location("/a/main.go", 4, 1)), Some(Classification::Write));
        assert_eq!(cache.get(&location("/a/main.go", 4, 9)), Some(Classification::Read));
    }
}
