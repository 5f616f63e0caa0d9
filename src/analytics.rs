//src/analytics.rs

use crate::error::Error;
use crate::suffix_tree::{NodeId, SuffixTree};

/// Rollover unit for the substring accumulator; overflow past this moves
/// one count into the millions column.
const SUBSTRING_ROLLOVER: u64 = 1_000_000;

/// Which passes to run over each window's tree and how to bucket the counts.
///
/// `depth_range` bounds counting to nodes whose string depth falls in
/// `min..=max`; `interval_size` splits that range into consecutive chunks,
/// each counted with freshly zeroed accumulators.
#[derive(Debug, Clone, Default)]
pub struct CountsConfig {
    pub generate_dawg: bool,
    pub detect_left_diverse: bool,
    pub depth_range: Option<(u64, u64)>,
    pub interval_size: Option<u64>,
}

impl CountsConfig {
    /// Rejects contradictory parameters before any tree is built.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some((min, max)) = self.depth_range {
            if max < min {
                return Err(Error::ReversedDepthRange { min, max });
            }
        }
        match self.interval_size {
            Some(0) => return Err(Error::ZeroIntervalSize),
            Some(_) if self.depth_range.is_none() => return Err(Error::IntervalWithoutRange),
            _ => {}
        }
        Ok(())
    }

    /// Number of `(nodes, substrings)` pairs each report row carries.
    /// Fixed for a given configuration, computed before any window runs.
    pub fn pairs_len(&self) -> usize {
        match (self.depth_range, self.interval_size) {
            (Some((min, max)), Some(size)) => (((max - min) + size - 1) / size) as usize,
            _ => 1,
        }
    }

    /// Header comment naming exactly the columns the report rows emit.
    pub fn header_line(&self) -> String {
        let mut header = String::from("# LineNo LineOffset SeqOffset");
        match (self.depth_range, self.interval_size) {
            (Some((min, max)), Some(size)) => {
                let mut start = min;
                while start < max {
                    let end = (start + size - 1).min(max);
                    header.push_str(&format!(
                        " Nodes({start},{end}) SubstringMillions({start},{end})"
                    ));
                    start += size;
                }
            }
            _ => header.push_str(" Nodes Substrings"),
        }
        header
    }
}

/// Children-first pass filling `leaf_count`: leaves count one, internal
/// nodes sum their children. Required before DAWG reduction, whose
/// equivalence test is defined on occurrence counts.
pub fn generate_leaf_counts(tree: &mut SuffixTree) {
    let order = tree.preorder();
    for &id in order.iter().rev() {
        let count = if tree.nodes[id].is_leaf() {
            1
        } else {
            tree.nodes[id]
                .children
                .iter()
                .map(|&child| tree.nodes[child].leaf_count)
                .sum()
        };
        tree.nodes[id].leaf_count = count;
    }
}

/// Root-first pass marking nodes synonymous with their suffix-linked
/// counterpart. Equal leaf counts under a suffix link mean the node's
/// occurrence set adds nothing over the linked node, so the node (and its
/// whole subtree) is folded out of the counting.
pub fn generate_dawg_nodes(tree: &mut SuffixTree) {
    let mut stack = vec![tree.root];
    while let Some(id) = stack.pop() {
        let folded = tree.nodes[id]
            .suffix_link
            .is_some_and(|link| tree.nodes[id].leaf_count == tree.nodes[link].leaf_count);
        if folded {
            tree.nodes[id].ignore = true;
        } else {
            stack.extend(tree.nodes[id].children.iter().copied());
        }
    }
}

/// Children-first pass classifying left-diversity. A leaf is trivially
/// left-diverse; an internal node is left-diverse unless all children share
/// one identical left character or any child is itself not left-diverse.
/// A left character of 0 marks the occurrence starting the text, which
/// counts as its own context. Nodes that fail are excluded from counting.
pub fn generate_left_diverse_nodes(tree: &mut SuffixTree) {
    let order = tree.preorder();
    for &id in order.iter().rev() {
        let diverse = if tree.nodes[id].is_leaf() {
            true
        } else {
            let first = tree.nodes[tree.nodes[id].children[0]].left_char;
            let mut contexts_differ = false;
            let mut children_diverse = true;
            for &child in &tree.nodes[id].children {
                let child = &tree.nodes[child];
                if child.left_char != first {
                    contexts_differ = true;
                }
                if !child.is_left_diverse {
                    children_diverse = false;
                }
            }
            contexts_differ && children_diverse
        };
        tree.nodes[id].is_left_diverse = diverse;
        if !diverse {
            tree.nodes[id].ignore = true;
        }
    }
}

/// Root-first counting pass. An `ignore`d node stops the traversal cold, so
/// its whole subtree contributes nothing. A node in depth range adds one to
/// `node_count` and its edge length to `substring_count`; the rollover moves
/// a single million at a time into `substring_millions_count`.
pub fn generate_node_counts(
    tree: &SuffixTree,
    depth_range: Option<(u64, u64)>,
    substring_millions_count: &mut u64,
) -> (u64, u64) {
    let mut node_count = 0u64;
    let mut substring_count = 0u64;
    let mut stack: Vec<(NodeId, u64)> = vec![(tree.root, 0)];

    while let Some((id, parent_depth)) = stack.pop() {
        if tree.nodes[id].ignore {
            continue;
        }
        let edge_len = tree.edge_len(id) as u64;
        let string_depth = parent_depth + edge_len;
        let in_range = match depth_range {
            None => true,
            Some((min, max)) => string_depth >= min && string_depth <= max,
        };
        if in_range {
            node_count += 1;
            substring_count += edge_len;
            if substring_count > SUBSTRING_ROLLOVER {
                *substring_millions_count += 1;
                substring_count -= SUBSTRING_ROLLOVER;
            }
        }
        for &child in &tree.nodes[id].children {
            stack.push((child, string_depth));
        }
    }
    (node_count, substring_count)
}

/// Runs the configured passes over one window's tree and returns the report
/// values (the pairs after the three location columns).
///
/// The chunked path emits `(node_count, substring_millions_count)` per
/// interval with the millions column carried across intervals; the
/// non-chunked path emits `(node_count, substring_count)`. Both shapes are
/// kept as the original tools printed them.
pub fn generate_counts(tree: &mut SuffixTree, config: &CountsConfig) -> Vec<u64> {
    tree.reset_annotations();

    if config.generate_dawg {
        generate_leaf_counts(tree);
        generate_dawg_nodes(tree);
    }
    if config.detect_left_diverse {
        generate_left_diverse_nodes(tree);
    }

    let mut values = Vec::with_capacity(config.pairs_len() * 2);
    let mut substring_millions_count = 0u64;
    match (config.depth_range, config.interval_size) {
        (Some((min, max)), Some(size)) => {
            let mut start = min;
            while start < max {
                let end = (start + size - 1).min(max);
                let (node_count, _) =
                    generate_node_counts(tree, Some((start, end)), &mut substring_millions_count);
                values.push(node_count);
                values.push(substring_millions_count);
                start += size;
            }
        }
        _ => {
            let (node_count, substring_count) =
                generate_node_counts(tree, config.depth_range, &mut substring_millions_count);
            values.push(node_count);
            values.push(substring_count);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suffix_tree::Node;

    /// Distinct substrings of "AC$": A, AC, AC$, C, C$, $.
    #[test]
    fn counts_all_distinct_substrings() {
        let mut tree = SuffixTree::build(b"AC");
        let values = generate_counts(&mut tree, &CountsConfig::default());
        assert_eq!(values, vec![4, 6]);
    }

    /// Distinct substrings of "AAC$" number 9; the tree has a root, one
    /// internal node for "A" and four leaves.
    #[test]
    fn counts_share_common_prefixes() {
        let mut tree = SuffixTree::build(b"AAC");
        let values = generate_counts(&mut tree, &CountsConfig::default());
        assert_eq!(values, vec![6, 9]);
    }

    #[test]
    fn depth_range_limits_counting() {
        let mut tree = SuffixTree::build(b"AC");
        // Only the "$" leaf sits at depth 1.
        let config = CountsConfig {
            depth_range: Some((1, 1)),
            ..Default::default()
        };
        assert_eq!(generate_counts(&mut tree, &config), vec![1, 1]);
        // Depth 0 holds the root alone, with an empty edge.
        let config = CountsConfig {
            depth_range: Some((0, 0)),
            ..Default::default()
        };
        assert_eq!(generate_counts(&mut tree, &config), vec![1, 0]);
    }

    #[test]
    fn node_count_never_exceeds_tree_size() {
        for sequence in [&b"ACGTACGT"[..], b"AAAAAA", b"GATTACA"] {
            let mut tree = SuffixTree::build(sequence);
            let values = generate_counts(&mut tree, &CountsConfig::default());
            assert!(values[0] <= tree.node_count() as u64);
        }
    }

    #[test]
    fn leaf_counts_sum_up_the_tree() {
        let mut tree = SuffixTree::build(b"ACACAC");
        generate_leaf_counts(&mut tree);
        let leaves = tree.nodes.iter().filter(|n| n.is_leaf()).count() as u64;
        assert_eq!(tree.nodes[tree.root].leaf_count, leaves);
        for node in &tree.nodes {
            if !node.is_leaf() {
                let sum: u64 = node
                    .children
                    .iter()
                    .map(|&c| tree.nodes[c].leaf_count)
                    .sum();
                assert_eq!(node.leaf_count, sum);
            }
        }
    }

    /// Ignored subtrees contribute exactly nothing: the ignore-respecting
    /// traversal matches a count over the manually pruned node set.
    #[test]
    fn dawg_reduction_prunes_whole_subtrees() {
        let mut tree = SuffixTree::build(b"ACACACAC");
        generate_leaf_counts(&mut tree);
        generate_dawg_nodes(&mut tree);
        assert!(tree.nodes.iter().any(|n| n.ignore), "expected folded nodes");

        let mut millions = 0;
        let (node_count, _) = generate_node_counts(&tree, None, &mut millions);

        // Count reachable nodes without stepping into ignored subtrees.
        let mut reachable = 0u64;
        let mut stack = vec![tree.root];
        while let Some(id) = stack.pop() {
            if tree.nodes[id].ignore {
                continue;
            }
            reachable += 1;
            stack.extend(tree.nodes[id].children.iter().copied());
        }
        assert_eq!(node_count, reachable);
    }

    fn synthetic_node(left_char: u8) -> Node {
        let mut node = Node::new(0, 0);
        node.left_char = left_char;
        node
    }

    /// Hand-built depth-2 trees covering the single/two-child truth table.
    #[test]
    fn left_diversity_truth_table() {
        // Two children with distinct left chars: diverse.
        let mut tree = SuffixTree::build(b"AC");
        tree.nodes = vec![synthetic_node(0), synthetic_node(b'A'), synthetic_node(b'C')];
        tree.nodes[0].children = vec![1, 2];
        generate_left_diverse_nodes(&mut tree);
        assert!(tree.nodes[0].is_left_diverse);
        assert!(!tree.nodes[0].ignore);

        // Two children sharing one left char: not diverse, excluded.
        let mut tree = SuffixTree::build(b"AC");
        tree.nodes = vec![synthetic_node(0), synthetic_node(b'A'), synthetic_node(b'A')];
        tree.nodes[0].children = vec![1, 2];
        generate_left_diverse_nodes(&mut tree);
        assert!(!tree.nodes[0].is_left_diverse);
        assert!(tree.nodes[0].ignore);

        // A single child can never witness divergence on its own.
        let mut tree = SuffixTree::build(b"AC");
        tree.nodes = vec![synthetic_node(0), synthetic_node(b'G')];
        tree.nodes[0].children = vec![1];
        generate_left_diverse_nodes(&mut tree);
        assert!(!tree.nodes[0].is_left_diverse);
        assert!(tree.nodes[1].is_left_diverse, "leaves are trivially diverse");
    }

    #[test]
    fn left_diverse_repeats_survive_the_filter() {
        // Every repeat in "ACCA" is preceded by two distinct contexts:
        // "A" occurs at 0 (text start) and 3 (after 'C'), "C" at 1 (after
        // 'A') and 2 (after 'C'). Nothing is pruned.
        let mut tree = SuffixTree::build(b"ACCA");
        let unfiltered = generate_counts(&mut tree, &CountsConfig::default());
        let config = CountsConfig {
            detect_left_diverse: true,
            ..Default::default()
        };
        assert_eq!(generate_counts(&mut tree, &config), unfiltered);
        assert!(tree.nodes.iter().all(|n| n.is_left_diverse));
    }

    #[test]
    fn non_maximal_repeat_marks_its_node() {
        // In "CACAG" the substring "A" occurs at 1 and 3, both preceded by
        // 'C', so its node fails the filter; "CA" occurs at 0 and 2, where
        // the occurrence at the start has no left context and counts as
        // divergent, so it stays diverse.
        let mut tree = SuffixTree::build(b"CACAG");
        let unfiltered = generate_counts(&mut tree, &CountsConfig::default());
        assert_eq!(unfiltered, vec![9, 18]);

        generate_left_diverse_nodes(&mut tree);
        let non_diverse: Vec<_> = (0..tree.nodes.len())
            .filter(|&id| !tree.nodes[id].is_left_diverse)
            .collect();
        // The "A" node fails, and the failure propagates to the root.
        assert!(non_diverse.contains(&tree.root));
        assert_eq!(non_diverse.len(), 2);

        // An ignored root excludes the entire tree from counting.
        let config = CountsConfig {
            detect_left_diverse: true,
            ..Default::default()
        };
        let filtered = generate_counts(&mut tree, &config);
        assert_eq!(filtered, vec![0, 0]);
    }

    #[test]
    fn interval_chunking_has_fixed_shape() {
        let config = CountsConfig {
            depth_range: Some((0, 10)),
            interval_size: Some(5),
            ..Default::default()
        };
        assert_eq!(config.pairs_len(), 2);
        let mut tree = SuffixTree::build(b"ACGTACGTACGT");
        let values = generate_counts(&mut tree, &config);
        assert_eq!(values.len(), config.pairs_len() * 2);
        // The two chunks cover depths 0-4 and 5-9 exactly.
        let full = generate_counts(
            &mut tree,
            &CountsConfig {
                depth_range: Some((0, 9)),
                ..Default::default()
            },
        );
        assert_eq!(values[0] + values[2], full[0]);
    }

    #[test]
    fn header_matches_emitted_columns() {
        let config = CountsConfig {
            depth_range: Some((0, 10)),
            interval_size: Some(5),
            ..Default::default()
        };
        let header = config.header_line();
        assert_eq!(
            header,
            "# LineNo LineOffset SeqOffset Nodes(0,4) SubstringMillions(0,4) \
             Nodes(5,9) SubstringMillions(5,9)"
        );
        assert_eq!(
            CountsConfig::default().header_line(),
            "# LineNo LineOffset SeqOffset Nodes Substrings"
        );
    }

    #[test]
    fn validation_rejects_contradictions() {
        let reversed = CountsConfig {
            depth_range: Some((5, 2)),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());
        let orphan_interval = CountsConfig {
            interval_size: Some(4),
            ..Default::default()
        };
        assert!(orphan_interval.validate().is_err());
        let zero_interval = CountsConfig {
            depth_range: Some((0, 10)),
            interval_size: Some(0),
            ..Default::default()
        };
        assert!(zero_interval.validate().is_err());
        assert!(CountsConfig::default().validate().is_ok());
    }
}
