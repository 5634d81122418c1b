//! Labeled dependency arcs and arc sets.

/// An immutable labeled dependency arc.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Arc {
    /// Node index of the head.
    pub head: usize,

    /// Relation label code.
    pub relation: u32,

    /// Node index of the modifier.
    pub modifier: usize,
}

impl Arc {
    /// Creates a new arc.
    #[inline]
    pub const fn new(head: usize, relation: u32, modifier: usize) -> Self {
        Self {
            head,
            relation,
            modifier,
        }
    }
}

/// A set of arcs supporting point queries by any combination of
/// head, relation, and modifier (`None` = wildcard).
///
/// Sets are sentence-sized, so queries are linear scans.
#[derive(Clone, Debug, Default)]
pub struct ArcSet {
    arcs: Vec<Arc>,
}

impl ArcSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arc to the set.
    #[inline]
    pub fn push(&mut self, arc: Arc) {
        self.arcs.push(arc);
    }

    /// Returns the number of arcs.
    #[inline]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Checks if the set has no arcs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Returns a slice of all arcs in insertion order.
    #[inline]
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Iterates over arcs matching the given point query.
    pub fn matching(
        &self,
        head: Option<usize>,
        relation: Option<u32>,
        modifier: Option<usize>,
    ) -> impl Iterator<Item = &Arc> {
        self.arcs.iter().filter(move |a| {
            head.map_or(true, |h| a.head == h)
                && relation.map_or(true, |r| a.relation == r)
                && modifier.map_or(true, |m| a.modifier == m)
        })
    }

    /// Returns the arc whose modifier is `modifier`, if any.
    #[inline]
    pub fn head_of(&self, modifier: usize) -> Option<&Arc> {
        self.matching(None, None, Some(modifier)).next()
    }

    /// Iterates over the arcs headed by `head`.
    pub fn dependents(&self, head: usize) -> impl Iterator<Item = &Arc> {
        self.matching(Some(head), None, None)
    }

    /// Checks if the set contains exactly the same arcs as `other`,
    /// regardless of insertion order.
    pub fn same_arcs(&self, other: &ArcSet) -> bool {
        self.len() == other.len()
            && self
                .arcs
                .iter()
                .all(|a| other.matching(Some(a.head), Some(a.relation), Some(a.modifier)).next().is_some())
    }
}

/// A gold dependency graph: a node count plus a labeled arc set.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    num_nodes: usize,
    arcs: ArcSet,
}

impl DependencyGraph {
    /// Creates a graph over `num_nodes` nodes (including the synthetic root
    /// at index 0) with the given arcs.
    pub fn new(num_nodes: usize, arcs: ArcSet) -> Self {
        Self { num_nodes, arcs }
    }

    /// Returns the number of nodes, including the synthetic root.
    #[inline]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the arc set.
    #[inline]
    pub const fn arcs(&self) -> &ArcSet {
        &self.arcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_queries() {
        let mut set = ArcSet::new();
        set.push(Arc::new(2, 0, 1));
        set.push(Arc::new(0, 1, 2));
        set.push(Arc::new(2, 2, 3));

        assert_eq!(set.head_of(1), Some(&Arc::new(2, 0, 1)));
        assert_eq!(set.head_of(4), None);
        assert_eq!(set.dependents(2).count(), 2);
        assert_eq!(set.matching(Some(2), Some(2), None).count(), 1);
        assert_eq!(set.matching(None, None, None).count(), 3);
    }

    #[test]
    fn test_same_arcs_ignores_order() {
        let mut a = ArcSet::new();
        a.push(Arc::new(2, 0, 1));
        a.push(Arc::new(0, 1, 2));
        let mut b = ArcSet::new();
        b.push(Arc::new(0, 1, 2));
        b.push(Arc::new(2, 0, 1));
        assert!(a.same_arcs(&b));

        b.push(Arc::new(2, 0, 3));
        assert!(!a.same_arcs(&b));
    }
}
