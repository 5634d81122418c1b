use std::collections::VecDeque;

use crate::common::{ROOT_CODE, ROOT_NODE, UNKNOWN_CODE};
use crate::errors::{CadenzaError, Result};
use crate::graph::{Arc, ArcSet};
use crate::numberer::Numberer;
use crate::sentence::Sentence;

/// Per-node cache of head and modifier information, kept current with the
/// arc set for O(1) feature lookups.
#[derive(Clone, Debug)]
pub struct NodeInfo {
    form: u32,
    pos: u32,
    head: Option<(usize, u32)>,
    deps: Vec<usize>,
}

impl NodeInfo {
    /// Returns the form code.
    #[inline]
    pub const fn form(&self) -> u32 {
        self.form
    }

    /// Returns the part-of-speech code.
    #[inline]
    pub const fn pos(&self) -> u32 {
        self.pos
    }

    /// Returns the head and relation assigned to this node, if any.
    #[inline]
    pub const fn head(&self) -> Option<(usize, u32)> {
        self.head
    }

    /// Returns the modifiers attached to this node, in attachment order.
    #[inline]
    pub fn deps(&self) -> &[usize] {
        &self.deps
    }
}

/// The parser state at one point of a derivation.
///
/// A configuration owns its stack, queue, arc set and node table, and is
/// never mutated once shared: transitions clone the predecessor and apply
/// the edit to the clone. The transition codes applied since `init` are kept
/// in `history`, which makes derivation reconstruction a slice read and
/// derivation equality a slice comparison.
#[derive(Clone, Debug)]
pub struct Configuration {
    stack: Vec<usize>,
    queue: VecDeque<usize>,
    arcs: ArcSet,
    nodes: Vec<NodeInfo>,
    history: Vec<u32>,
}

impl Configuration {
    /// Creates the initial configuration of a sentence: empty stack and arc
    /// set, and a queue holding the node indices in order. Node 0 is the
    /// synthetic root; it enters the queue only when `root_in_queue` is set
    /// (arc-standard), otherwise the queue starts at node 1 (arc-eager).
    ///
    /// Forms and tags are resolved through the given tables; unseen values
    /// on frozen tables map to the reserved unknown code.
    pub fn init(
        sentence: &Sentence,
        forms: &Numberer<String>,
        pos_tags: &Numberer<String>,
        root_in_queue: bool,
    ) -> Self {
        let mut nodes = Vec::with_capacity(sentence.len() + 1);
        nodes.push(NodeInfo {
            form: ROOT_CODE,
            pos: ROOT_CODE,
            head: None,
            deps: vec![],
        });
        for word in sentence.words() {
            nodes.push(NodeInfo {
                form: forms
                    .lookup(&word.form().to_string())
                    .unwrap_or(UNKNOWN_CODE),
                pos: pos_tags
                    .lookup(&word.pos().to_string())
                    .unwrap_or(UNKNOWN_CODE),
                head: None,
                deps: vec![],
            });
        }

        let first = if root_in_queue { ROOT_NODE } else { ROOT_NODE + 1 };
        let queue = (first..nodes.len()).collect();

        Self {
            stack: vec![],
            queue,
            arcs: ArcSet::new(),
            nodes,
            history: vec![],
        }
    }

    /// Returns the number of nodes, including the synthetic root.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node table entry of `index`.
    #[inline]
    pub fn node(&self, index: usize) -> Option<&NodeInfo> {
        self.nodes.get(index)
    }

    /// Returns the stack top, if any.
    #[inline]
    pub fn stack_top(&self) -> Option<usize> {
        self.stack.last().copied()
    }

    /// Returns the `k`-th stack element counted from the top.
    #[inline]
    pub fn stack_item(&self, k: usize) -> Option<usize> {
        self.stack.iter().rev().nth(k).copied()
    }

    /// Returns the queue front, if any.
    #[inline]
    pub fn queue_front(&self) -> Option<usize> {
        self.queue.front().copied()
    }

    /// Returns the `k`-th queue element counted from the front.
    #[inline]
    pub fn queue_item(&self, k: usize) -> Option<usize> {
        self.queue.get(k).copied()
    }

    /// Returns the stack size.
    #[inline]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Returns the queue size.
    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns the arcs built so far.
    #[inline]
    pub const fn arcs(&self) -> &ArcSet {
        &self.arcs
    }

    /// Returns the head and relation of `node`, if already assigned.
    #[inline]
    pub fn head_of(&self, node: usize) -> Option<(usize, u32)> {
        self.nodes.get(node).and_then(|n| n.head)
    }

    /// Checks if `node` has been assigned a head.
    #[inline]
    pub fn has_head(&self, node: usize) -> bool {
        self.head_of(node).is_some()
    }

    /// Returns the transition codes applied since `init`.
    #[inline]
    pub fn history(&self) -> &[u32] {
        &self.history
    }

    /// Returns the transition that produced this configuration, if any.
    #[inline]
    pub fn last_transition(&self) -> Option<u32> {
        self.history.last().copied()
    }

    pub(crate) fn push_stack(&mut self, node: usize) {
        debug_assert!(node < self.nodes.len());
        self.stack.push(node);
    }

    pub(crate) fn pop_stack(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    pub(crate) fn pop_queue(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    pub(crate) fn push_queue_front(&mut self, node: usize) {
        debug_assert!(node < self.nodes.len());
        self.queue.push_front(node);
    }

    pub(crate) fn record(&mut self, transition: u32) {
        self.history.push(transition);
    }

    /// Adds the arc (head, relation, modifier) and updates the node table.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the modifier already has a head or
    /// either index is outside the node table; a head, once assigned, is
    /// never reassigned.
    pub(crate) fn attach(
        &mut self,
        head: usize,
        relation: u32,
        modifier: usize,
    ) -> Result<()> {
        if head >= self.nodes.len() || modifier >= self.nodes.len() {
            return Err(CadenzaError::invalid_derivation(
                "attach",
                format!(
                    "arc ({head}, {relation}, {modifier}) references a node outside the table of {}",
                    self.nodes.len()
                ),
            ));
        }
        if self.nodes[modifier].head.is_some() {
            return Err(CadenzaError::invalid_derivation(
                "attach",
                format!("node {modifier} already has a head"),
            ));
        }
        self.nodes[modifier].head = Some((head, relation));
        self.nodes[head].deps.push(modifier);
        self.arcs.push(Arc::new(head, relation, modifier));
        Ok(())
    }
}
