//src/suffix_tree.rs

use std::fmt;

/// Stable handle into the node arena.
pub type NodeId = usize;

/// Sentinel edge end for leaf edges that grow with the text during
/// construction. Resolved to the real text end by `finalize`.
const OPEN_END: usize = usize::MAX;

/// Terminator appended to every indexed text so each suffix ends at a leaf.
pub const TERMINATOR: u8 = b'$';

/// One suffix tree node. The edge label leading into the node from its
/// parent is `text[edge_start..=edge_end]`; the root carries an empty label.
/// `leaf_count`, `is_left_diverse` and `ignore` are annotation fields owned
/// by the analytics passes and are all zero/false on a freshly built tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub edge_start: usize,
    pub edge_end: usize,
    /// Child ids in insertion order; looked up by the first edge byte.
    pub children: Vec<NodeId>,
    /// Non-owning link to the node for this node's suffix; internal nodes only.
    pub suffix_link: Option<NodeId>,
    /// Starting index of the suffix this leaf represents.
    pub suffix_start: Option<usize>,
    /// Byte preceding one occurrence of this node's substring, 0 when the
    /// occurrence starts the text.
    pub left_char: u8,
    pub leaf_count: u64,
    pub is_left_diverse: bool,
    pub ignore: bool,
}

impl Node {
    pub fn new(edge_start: usize, edge_end: usize) -> Self {
        Self {
            edge_start,
            edge_end,
            children: Vec::new(),
            suffix_link: None,
            suffix_start: None,
            left_char: 0,
            leaf_count: 0,
            is_left_diverse: false,
            ignore: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Suffix tree over one byte text, built with Ukkonen's algorithm.
/// Nodes live in an arena (`nodes`) addressed by `NodeId`, so suffix links
/// are plain indices rather than aliased pointers.
#[derive(Clone)]
pub struct SuffixTree {
    /// Indexed text with the terminator appended.
    pub text: Vec<u8>,
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

impl fmt::Debug for SuffixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuffixTree")
            .field("text_len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl SuffixTree {
    /// Builds the suffix tree for `sequence` plus a terminator.
    /// Amortized linear in the sequence length.
    pub fn build(sequence: &[u8]) -> Self {
        let mut text = sequence.to_vec();
        text.push(TERMINATOR);

        let mut tree = Self {
            text,
            nodes: vec![Node::new(0, 0)],
            root: 0,
        };
        tree.construct();
        tree.finalize();
        tree
    }

    /// Ukkonen's algorithm with an active point and pending suffix links.
    fn construct(&mut self) {
        let n = self.text.len();
        let root = self.root;

        let mut active_node = root;
        let mut active_edge = 0usize;
        let mut active_length = 0usize;
        let mut remaining = 0usize;

        for pos in 0..n {
            remaining += 1;
            let mut last_new_node: Option<NodeId> = None;

            while remaining > 0 {
                if active_length == 0 {
                    active_edge = pos;
                }
                match self.child_starting_with(active_node, self.text[active_edge]) {
                    None => {
                        let leaf = self.push_node(Node::new(pos, OPEN_END));
                        self.nodes[active_node].children.push(leaf);
                        if let Some(pending) = last_new_node.take() {
                            self.nodes[pending].suffix_link = Some(active_node);
                        }
                    }
                    Some(next) => {
                        // Skip/count walk-down when the active length spans the edge.
                        let edge_len = self.edge_len_during(next, pos);
                        if active_length >= edge_len {
                            active_edge += edge_len;
                            active_length -= edge_len;
                            active_node = next;
                            continue;
                        }
                        if self.text[self.nodes[next].edge_start + active_length]
                            == self.text[pos]
                        {
                            // The suffix is already present; end this phase.
                            if active_node != root {
                                if let Some(pending) = last_new_node.take() {
                                    self.nodes[pending].suffix_link = Some(active_node);
                                }
                            }
                            active_length += 1;
                            break;
                        }
                        // Split the edge and hang a new leaf off the split node.
                        let split_start = self.nodes[next].edge_start;
                        let mut split_node =
                            Node::new(split_start, split_start + active_length - 1);
                        split_node.suffix_link = Some(root);
                        let split = self.push_node(split_node);
                        self.replace_child(active_node, next, split);
                        self.nodes[next].edge_start += active_length;
                        self.nodes[split].children.push(next);

                        let leaf = self.push_node(Node::new(pos, OPEN_END));
                        self.nodes[split].children.push(leaf);

                        if let Some(pending) = last_new_node.take() {
                            self.nodes[pending].suffix_link = Some(split);
                        }
                        last_new_node = Some(split);
                    }
                }

                remaining -= 1;
                if active_node == root && active_length > 0 {
                    active_length -= 1;
                    active_edge = pos - remaining + 1;
                } else if active_node != root {
                    active_node = self.nodes[active_node].suffix_link.unwrap_or(root);
                }
            }
        }
    }

    /// Resolves open leaf edges, assigns leaf suffix starts, and fills in
    /// `left_char` (leaves take the byte before their suffix, internal nodes
    /// inherit their first child's occurrence).
    fn finalize(&mut self) {
        let n = self.text.len();
        let last = n - 1;
        for node in &mut self.nodes {
            if node.edge_end == OPEN_END {
                node.edge_end = last;
            }
        }

        // Pre-order walk carrying string depth; leaves get their suffix start.
        let order = self.preorder();
        let mut depths = vec![0u64; self.nodes.len()];
        for &id in &order {
            let depth = depths[id];
            for &child in &self.nodes[id].children {
                depths[child] = depth + self.edge_len(child) as u64;
            }
            if id != self.root && self.nodes[id].is_leaf() {
                let suffix_start = n - depth as usize;
                self.nodes[id].suffix_start = Some(suffix_start);
                self.nodes[id].left_char = if suffix_start > 0 {
                    self.text[suffix_start - 1]
                } else {
                    0
                };
            }
        }
        // Reverse pre-order visits children before parents.
        for &id in order.iter().rev() {
            if !self.nodes[id].is_leaf() {
                let first = self.nodes[id].children[0];
                self.nodes[id].left_char = self.nodes[first].left_char;
            }
        }
    }

    /// Exact substring lookup. Returns the starting offset of one occurrence,
    /// or `None` when the pattern does not occur. The empty pattern matches
    /// at offset 0.
    pub fn find_substring(&self, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() {
            return Some(0);
        }
        let mut node = self.root;
        let mut matched = 0usize;
        loop {
            let child = self.child_starting_with(node, pattern[matched])?;
            let start = self.nodes[child].edge_start;
            let end = self.nodes[child].edge_end;
            let mut t = start;
            while t <= end && matched < pattern.len() {
                if self.text[t] != pattern[matched] {
                    return None;
                }
                t += 1;
                matched += 1;
            }
            if matched == pattern.len() {
                return Some(t - pattern.len());
            }
            node = child;
        }
    }

    /// Total number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the edge label leading into `id`; 0 for the root.
    pub fn edge_len(&self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        let node = &self.nodes[id];
        node.edge_end - node.edge_start + 1
    }

    /// Pre-order node ids, explicit stack so the call stack stays flat.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            result.push(id);
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Resets the analytics annotations so a tree can host another run.
    pub fn reset_annotations(&mut self) {
        for node in &mut self.nodes {
            node.leaf_count = 0;
            node.is_left_diverse = false;
            node.ignore = false;
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    fn child_starting_with(&self, id: NodeId, byte: u8) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.text[self.nodes[child].edge_start] == byte)
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        for child in &mut self.nodes[parent].children {
            if *child == old {
                *child = new;
                return;
            }
        }
    }

    /// Edge length while the tree is still growing: an open leaf edge extends
    /// to the current phase position.
    fn edge_len_during(&self, id: NodeId, pos: usize) -> usize {
        let node = &self.nodes[id];
        let end = if node.edge_end == OPEN_END {
            pos
        } else {
            node.edge_end
        };
        end - node.edge_start + 1
    }
}
