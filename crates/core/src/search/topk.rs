//! Bounded sorted-insert structure used to cap ingestion.

/// Keeps at most `capacity` items, ordered by key descending.
///
/// Items with a key equal to an existing one are placed after it, so earlier
/// arrivals win ties.
#[derive(Debug)]
pub struct TopK<T> {
    capacity: usize,
    entries: Vec<(u32, T)>,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Offer an item. Returns `true` if it was admitted.
    ///
    /// Admission may push the current lowest entry out.
    pub fn offer(&mut self, key: u32, item: T) -> bool {
        if self.capacity == 0 {
            return false;
        }

        match self.entries.iter().position(|(k, _)| *k < key) {
            Some(index) => {
                self.entries.insert(index, (key, item));
                self.entries.truncate(self.capacity);
                true
            }
            None if self.entries.len() < self.capacity => {
                self.entries.push((key, item));
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Items in descending key order.
    pub fn into_vec(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_until_full() {
        let mut top = TopK::new(2);
        assert!(top.offer(5, "a"));
        assert!(top.offer(1, "b"));
        assert!(!top.offer(1, "c"));
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_higher_key_evicts_lowest() {
        let mut top = TopK::new(2);
        top.offer(5, "a");
        top.offer(3, "b");
        assert!(top.offer(10, "c"));
        assert_eq!(top.into_vec(), vec!["c", "a"]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut top = TopK::new(3);
        top.offer(4, "first");
        top.offer(4, "second");
        top.offer(9, "top");
        assert_eq!(top.into_vec(), vec!["top", "first", "second"]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut top = TopK::new(0);
        assert!(!top.offer(100, ()));
        assert!(top.is_empty());
    }
}
