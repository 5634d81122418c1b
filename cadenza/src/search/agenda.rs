use crate::search::ScoredCandidate;

/// A binary max-heap of scored candidates with explicit sift-up/sift-down,
/// index removal and in-place full sorting.
///
/// Candidates compare by cumulative score only; the order of equally scored
/// candidates is unspecified and callers must not depend on it. The heap is
/// tuned for small, frequently rebuilt collections: the backing vector is
/// reused across rounds via [`Agenda::clear()`].
#[derive(Debug, Default)]
pub struct Agenda {
    items: Vec<ScoredCandidate>,
}

impl Agenda {
    /// Creates an empty agenda.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of held candidates.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the agenda holds no candidate.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops all candidates, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the backing slice, in heap order.
    #[inline]
    pub fn items(&self) -> &[ScoredCandidate] {
        &self.items
    }

    /// Returns the best candidate without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&ScoredCandidate> {
        self.items.first()
    }

    /// Inserts a candidate. O(log n).
    pub fn push(&mut self, candidate: ScoredCandidate) {
        self.items.push(candidate);
        self.sift_up(self.items.len() - 1);
    }

    /// Removes and returns the best candidate. O(log n).
    pub fn pop(&mut self) -> Option<ScoredCandidate> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.remove(0))
    }

    /// Removes and returns the candidate at heap index `i`. O(log n).
    ///
    /// # Panics
    ///
    /// Panics when `i` is out of bounds.
    pub fn remove(&mut self, i: usize) -> ScoredCandidate {
        let last = self.items.len() - 1;
        self.items.swap(i, last);
        let removed = self.items.pop().unwrap();
        if i < self.items.len() {
            // The swapped-in element may violate the property in either
            // direction.
            self.sift_down(i);
            self.sift_up(i);
        }
        removed
    }

    /// Inserts a candidate under a capacity bound: while fewer than `cap`
    /// candidates are held the push always succeeds; at capacity the new
    /// candidate replaces the current worst only if it scores strictly
    /// higher. Returns whether the candidate was admitted.
    ///
    /// The worst candidate is always at a leaf, so the floor scan touches
    /// only the second half of the backing vector.
    pub fn insert_bounded(&mut self, candidate: ScoredCandidate, cap: usize) -> bool {
        debug_assert!(cap > 0);
        if self.items.len() < cap {
            self.push(candidate);
            return true;
        }
        let first_leaf = self.items.len() / 2;
        let (floor_idx, floor) = self.items[first_leaf..]
            .iter()
            .enumerate()
            .map(|(i, c)| (first_leaf + i, c.score()))
            .min_by_key(|&(_, s)| s)
            .unwrap();
        if candidate.score() <= floor {
            return false;
        }
        self.remove(floor_idx);
        self.push(candidate);
        true
    }

    /// Sorts the backing vector in place into descending score order
    /// (heapsort, no reallocation). The heap property does not hold
    /// afterwards; the agenda must be drained or cleared before further
    /// heap operations.
    pub fn sort(&mut self) {
        for end in (1..self.items.len()).rev() {
            self.items.swap(0, end);
            self.sift_down_bounded(0, end);
        }
        self.items.reverse();
    }

    /// Takes the backing vector, leaving the agenda empty. Used after
    /// [`Agenda::sort()`] to hand the ordered candidates to the caller
    /// without copying.
    pub fn take_items(&mut self) -> Vec<ScoredCandidate> {
        std::mem::take(&mut self.items)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.items[i].score() <= self.items[parent].score() {
                break;
            }
            self.items.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, i: usize) {
        let len = self.items.len();
        self.sift_down_bounded(i, len);
    }

    fn sift_down_bounded(&mut self, mut i: usize, len: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut largest = i;
            if left < len && self.items[left].score() > self.items[largest].score() {
                largest = left;
            }
            if right < len && self.items[right].score() > self.items[largest].score() {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.items.swap(i, largest);
            i = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(score: i64) -> ScoredCandidate {
        ScoredCandidate::unexpanded(score, 0, 0)
    }

    fn assert_heap_property(agenda: &Agenda) {
        let items = agenda.items();
        for i in 0..items.len() {
            for child in [2 * i + 1, 2 * i + 2] {
                if child < items.len() {
                    assert!(
                        items[i].score() >= items[child].score(),
                        "heap property violated at {i} -> {child}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_heap_property_under_push_pop() {
        let mut agenda = Agenda::new();
        for s in [5, 1, 9, 3, 9, -2, 7, 0, 4, 12, -8] {
            agenda.push(candidate(s));
            assert_heap_property(&agenda);
        }
        assert_eq!(agenda.peek().unwrap().score(), 12);

        let mut last = i64::MAX;
        while let Some(c) = agenda.pop() {
            assert!(c.score() <= last);
            last = c.score();
            assert_heap_property(&agenda);
        }
    }

    #[test]
    fn test_remove_at_index() {
        let mut agenda = Agenda::new();
        for s in [4, 8, 2, 6, 1] {
            agenda.push(candidate(s));
        }
        let len = agenda.len();
        let removed = agenda.remove(len / 2);
        assert_eq!(agenda.len(), len - 1);
        assert_heap_property(&agenda);
        // All remaining scores plus the removed one are intact.
        let mut scores: Vec<i64> = agenda.items().iter().map(|c| c.score()).collect();
        scores.push(removed.score());
        scores.sort_unstable();
        assert_eq!(scores, vec![1, 2, 4, 6, 8]);
    }

    #[test]
    fn test_sort_descending_in_place() {
        let mut agenda = Agenda::new();
        for s in [3, -1, 10, 7, 7, 0] {
            agenda.push(candidate(s));
        }
        agenda.sort();
        let scores: Vec<i64> = agenda.take_items().iter().map(|c| c.score()).collect();
        assert_eq!(scores, vec![10, 7, 7, 3, 0, -1]);
        assert!(agenda.is_empty());
    }

    #[test]
    fn test_insert_bounded_keeps_top_k() {
        let mut agenda = Agenda::new();
        for s in 0..10 {
            agenda.insert_bounded(candidate(s), 4);
            assert!(agenda.len() <= 4);
            assert_heap_property(&agenda);
        }
        // A candidate at the floor is rejected.
        assert!(!agenda.insert_bounded(candidate(6), 4));
        assert!(agenda.insert_bounded(candidate(100), 4));

        agenda.sort();
        let scores: Vec<i64> = agenda.take_items().iter().map(|c| c.score()).collect();
        assert_eq!(scores, vec![100, 9, 8, 7]);
    }

    #[test]
    fn test_empty_agenda_probes() {
        let mut agenda = Agenda::new();
        assert!(agenda.peek().is_none());
        assert!(agenda.pop().is_none());
        assert!(agenda.is_empty());
    }
}
