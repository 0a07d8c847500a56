use std::collections::HashSet;

use super::model::{EdgeKey, EdgeKind, GraphModel, NodeIdx};
use super::palette::Cluster;

/// Emphasised nodes and edges. Always rebuilt from scratch, never patched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlight {
	pub nodes: HashSet<NodeIdx>,
	pub edges: HashSet<EdgeKey>,
}

impl Highlight {
	pub fn is_active(&self) -> bool {
		!self.nodes.is_empty()
	}

	pub fn has_node(&self, idx: NodeIdx) -> bool {
		self.nodes.contains(&idx)
	}

	pub fn has_edge(&self, key: EdgeKey) -> bool {
		self.edges.contains(&key)
	}

	/// Ancestors, descendants and direct referral links of `idx`.
	pub fn tree(model: &GraphModel, idx: NodeIdx) -> Self {
		let mut out = Self::default();
		if idx >= model.nodes.len() {
			return out;
		}
		let lineage = model.ancestors(idx);
		for &n in &lineage {
			out.nodes.insert(n);
			if let Some(parent) = model.nodes[n].parent.filter(|p| lineage.contains(p)) {
				out.edges.insert(EdgeKey::new(parent, n));
			}
		}
		for kid in model.descendants(idx) {
			out.nodes.insert(kid);
			if let Some(parent) = model.nodes[kid].parent {
				out.edges.insert(EdgeKey::new(parent, kid));
			}
		}
		for edge in &model.edges {
			if edge.kind == EdgeKind::Conn && (edge.key.source == idx || edge.key.target == idx) {
				out.edges.insert(edge.key);
				out.nodes.insert(edge.key.source);
				out.nodes.insert(edge.key.target);
			}
		}
		out
	}

	/// A node group plus every edge with both ends inside it.
	pub fn group(model: &GraphModel, members: impl IntoIterator<Item = NodeIdx>) -> Self {
		let nodes: HashSet<NodeIdx> = members.into_iter().collect();
		let edges = model
			.edges
			.iter()
			.filter(|e| nodes.contains(&e.key.source) && nodes.contains(&e.key.target))
			.map(|e| e.key)
			.collect();
		Self { nodes, edges }
	}

	/// Every node of `cluster` and every edge leaving one of them.
	pub fn cluster(model: &GraphModel, cluster: Cluster) -> Self {
		let nodes: HashSet<NodeIdx> = model.cluster_members(cluster).collect();
		let edges = model
			.edges
			.iter()
			.filter(|e| nodes.contains(&e.key.source))
			.map(|e| e.key)
			.collect();
		Self { nodes, edges }
	}
}

/// Pairs of same-trait nodes that live in different clusters.
pub fn cross_cluster_pairs(model: &GraphModel, members: &[NodeIdx]) -> Vec<(NodeIdx, NodeIdx)> {
	let mut out = Vec::new();
	for (i, &a) in members.iter().enumerate() {
		for &b in &members[i + 1..] {
			if model.nodes[a].cluster != model.nodes[b].cluster {
				out.push((a, b));
			}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{build, svc};
	use super::*;

	#[test]
	fn tree_covers_lineage_and_referrals() {
		let model = build(vec![
			svc("R", None, &[]),
			svc("C1", Some("R"), &["X"]),
			svc("C2", Some("R"), &[]),
			svc("G", Some("C1"), &[]),
			svc("X", None, &[]),
		]);
		let id = |s: &str| model.node_by_id(s).expect("node");
		let hl = Highlight::tree(&model, id("C1"));
		let expected: HashSet<_> = ["R", "C1", "G", "X"].into_iter().map(id).collect();
		assert_eq!(hl.nodes, expected);
		assert!(hl.has_edge(EdgeKey::new(id("R"), id("C1"))));
		assert!(hl.has_edge(EdgeKey::new(id("C1"), id("G"))));
		assert!(hl.has_edge(EdgeKey::new(id("C1"), id("X"))));
		assert!(!hl.has_edge(EdgeKey::new(id("R"), id("C2"))));
		assert_eq!(hl.edges.len(), 3);
	}

	#[test]
	fn tree_of_missing_node_is_empty() {
		let model = build(vec![svc("a", None, &[])]);
		assert!(!Highlight::tree(&model, 42).is_active());
	}

	#[test]
	fn group_only_keeps_internal_edges() {
		let model = build(vec![
			svc("a", None, &["b", "c"]),
			svc("b", None, &[]),
			svc("c", None, &[]),
		]);
		let hl = Highlight::group(&model, [0, 1]);
		assert_eq!(hl.edges.len(), 1);
		assert!(hl.has_edge(EdgeKey::new(0, 1)));
	}

	#[test]
	fn cross_cluster_pairs_skip_same_cluster() {
		let mut a = svc("a", None, &[]);
		a.entry_point = Some("911".into());
		let b = svc("b", None, &[]);
		let c = svc("c", None, &[]);
		let model = build(vec![a, b, c]);
		// b and c both fall back to community
		assert_eq!(cross_cluster_pairs(&model, &[0, 1, 2]), vec![(0, 1), (0, 2)]);
	}
}
