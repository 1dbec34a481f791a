use std::collections::HashMap;

/// Mapping from segment id to the known-correct transcript for that
/// window. Supplied whole at session start; segments past the last entry
/// simply look up empty and stay unmeasured.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    entries: HashMap<u64, String>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment_id: u64, reference_text: impl Into<String>) {
        self.entries.insert(segment_id, reference_text.into());
    }

    /// Reference text for a segment, empty when absent.
    pub fn lookup(&self, segment_id: u64) -> &str {
        self.entries
            .get(&segment_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u64, String)> for ReferenceMap {
    fn from_iter<T: IntoIterator<Item = (u64, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_present() {
        let mut map = ReferenceMap::new();
        map.insert(1, "the quick brown fox");
        assert_eq!(map.lookup(1), "the quick brown fox");
    }

    #[test]
    fn test_lookup_absent_is_empty() {
        let map = ReferenceMap::new();
        assert_eq!(map.lookup(42), "");
    }

    #[test]
    fn test_from_iterator() {
        let map: ReferenceMap = vec![(1, "a".to_string()), (2, "b".to_string())]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup(2), "b");
    }
}
