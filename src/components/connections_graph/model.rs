//! Turns raw service records into the node/edge graph the view draws.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::NaiveDateTime;
use log::{debug, warn};

use super::config::{HUB_MIN_DOWNSTREAM, MAX_WALK};
use super::geom::{Bounds, Point};
use super::palette::{Badge, Cluster, NodeShape};
use super::traits::Trait;
use crate::services::{Accessibility, Category, HoursKind, Service, ServiceSource, hours};

pub type NodeIdx = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
	Tree,
	Conn,
}

/// Directed edge identity, as stored (`source` is the parent for tree edges).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	pub source: NodeIdx,
	pub target: NodeIdx,
}

impl EdgeKey {
	pub fn new(source: NodeIdx, target: NodeIdx) -> Self {
		Self { source, target }
	}

	fn unordered(self) -> (NodeIdx, NodeIdx) {
		(self.source.min(self.target), self.source.max(self.target))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	pub key: EdgeKey,
	pub kind: EdgeKind,
}

/// Visual importance rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
	Hub,
	Operational,
	Leaf,
}

#[derive(Clone, Debug)]
pub struct Node {
	pub id: String,
	pub label: String,
	pub cluster: Cluster,
	pub status: Accessibility,
	pub hours: String,
	pub around_the_clock: bool,
	pub open_now: bool,
	pub pilot_note: Option<String>,
	pub parent: Option<NodeIdx>,
	pub downstream: usize,
	pub depth: usize,
	pub tier: Tier,
	pub shape: NodeShape,
	/// World position; `None` until layout has run.
	pub pos: Option<Point>,
	pub service: Service,
}

impl Node {
	/// World-space radius by tier.
	pub fn radius(&self) -> f64 {
		let dc = self.downstream as f64;
		match self.tier {
			Tier::Hub => 44.0 + dc.min(10.0) * 4.0,
			Tier::Operational => 22.0 + dc.min(4.0) * 3.0,
			Tier::Leaf => 12.0 + dc * 2.0,
		}
	}

	pub fn badges(&self) -> Vec<Badge> {
		[
			(self.around_the_clock, Badge::AroundTheClock),
			(self.service.transport, Badge::Transport),
			(self.service.referral_required, Badge::Referral),
			(self.service.pilot_program, Badge::Pilot),
		]
		.into_iter()
		.filter_map(|(on, badge)| on.then_some(badge))
		.collect()
	}
}

/// The built graph. Node indices are stable for the life of a session.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub children: Vec<Vec<NodeIdx>>,
	pub index: HashMap<String, NodeIdx>,
	pub traits: BTreeMap<Trait, Vec<NodeIdx>>,
	pub centroids: BTreeMap<Cluster, Point>,
	pub bounds: Option<Bounds>,
}

impl GraphModel {
	pub fn build(source: &dyn ServiceSource, now: NaiveDateTime) -> Self {
		let services = source.all_services();
		let mut model = GraphModel::default();

		for service in services {
			if model.index.contains_key(&service.id) {
				warn!("duplicate service id {}, keeping the first", service.id);
				continue;
			}
			model.index.insert(service.id.clone(), model.nodes.len());
			model.nodes.push(Node {
				id: service.id.clone(),
				label: service.label().to_string(),
				cluster: resolve_cluster(service, source),
				status: service.accessibility,
				hours: source.format_hours(service),
				around_the_clock: service.hours.kind == HoursKind::AroundTheClock,
				open_now: source.is_open(service, now),
				pilot_note: hours::pilot_note(service),
				parent: None,
				downstream: 0,
				depth: 0,
				tier: Tier::Leaf,
				shape: node_shape(service),
				pos: None,
				service: service.clone(),
			});
		}

		model.link_edges();
		model.compute_depths();
		model.compute_downstream();
		for node in &mut model.nodes {
			node.tier = tier_for(node.downstream, &node.service);
		}
		model.traits = Trait::ALL
			.into_iter()
			.map(|t| {
				let members = (0..model.nodes.len())
					.filter(|&i| t.matches(&model.nodes[i]))
					.collect();
				(t, members)
			})
			.collect();

		debug!(
			"graph built: {} nodes, {} edges",
			model.nodes.len(),
			model.edges.len()
		);
		model
	}

	fn link_edges(&mut self) {
		let n = self.nodes.len();
		self.children = vec![Vec::new(); n];
		let mut seen: HashSet<(NodeIdx, NodeIdx)> = HashSet::new();

		for child in 0..n {
			let Some(parent_id) = self.nodes[child].service.parent_service.clone() else {
				continue;
			};
			let Some(&parent) = self.index.get(&parent_id) else {
				warn!("{} references missing parent {parent_id}", self.nodes[child].id);
				continue;
			};
			let key = EdgeKey::new(parent, child);
			if parent == child || !seen.insert(key.unordered()) {
				warn!("{} has a degenerate parent link, treating as root", self.nodes[child].id);
				continue;
			}
			self.nodes[child].parent = Some(parent);
			self.children[parent].push(child);
			self.edges.push(Edge {
				key,
				kind: EdgeKind::Tree,
			});
		}

		for from in 0..n {
			for target_id in &self.nodes[from].service.connections {
				let Some(&to) = self.index.get(target_id) else {
					warn!("{} references missing connection {target_id}", self.nodes[from].id);
					continue;
				};
				let key = EdgeKey::new(from, to);
				if from == to || !seen.insert(key.unordered()) {
					continue;
				}
				self.edges.push(Edge {
					key,
					kind: EdgeKind::Conn,
				});
			}
		}
	}

	fn compute_depths(&mut self) {
		let mut visited = vec![false; self.nodes.len()];
		let mut queue: VecDeque<NodeIdx> = (0..self.nodes.len())
			.filter(|&i| self.nodes[i].parent.is_none())
			.collect();
		for &root in &queue {
			visited[root] = true;
			self.nodes[root].depth = 0;
		}
		while let Some(idx) = queue.pop_front() {
			let depth = self.nodes[idx].depth + 1;
			for &kid in &self.children[idx] {
				if !visited[kid] {
					visited[kid] = true;
					self.nodes[kid].depth = depth;
					queue.push_back(kid);
				}
			}
		}
		for (i, seen) in visited.iter().enumerate() {
			if !seen {
				warn!("{} sits on a parent cycle, placing as a root", self.nodes[i].id);
			}
		}
	}

	fn compute_downstream(&mut self) {
		for idx in 0..self.nodes.len() {
			self.nodes[idx].downstream = self.descendants(idx).len();
		}
	}

	/// Strict descendants of `idx` in the parent/child tree.
	pub fn descendants(&self, idx: NodeIdx) -> Vec<NodeIdx> {
		let mut out = Vec::new();
		let mut visited = HashSet::from([idx]);
		let mut stack = self.children.get(idx).cloned().unwrap_or_default();
		while let Some(kid) = stack.pop() {
			if out.len() >= MAX_WALK || !visited.insert(kid) {
				continue;
			}
			out.push(kid);
			stack.extend(self.children[kid].iter().copied());
		}
		out
	}

	/// `idx` and its parent chain, root last.
	pub fn ancestors(&self, idx: NodeIdx) -> Vec<NodeIdx> {
		let mut out = vec![idx];
		let mut cur = idx;
		while let Some(parent) = self.nodes[cur].parent {
			if out.contains(&parent) || out.len() >= MAX_WALK {
				break;
			}
			out.push(parent);
			cur = parent;
		}
		out
	}

	pub fn node_by_id(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	pub fn trait_members(&self, t: Trait) -> &[NodeIdx] {
		self.traits.get(&t).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn traits_of(&self, idx: NodeIdx) -> Vec<Trait> {
		self.traits
			.iter()
			.filter(|(_, members)| members.contains(&idx))
			.map(|(t, _)| *t)
			.collect()
	}

	pub fn cluster_members(&self, cluster: Cluster) -> impl Iterator<Item = NodeIdx> + '_ {
		(0..self.nodes.len()).filter(move |&i| self.nodes[i].cluster == cluster)
	}

	/// Clusters that have at least one member, in palette order.
	pub fn used_clusters(&self) -> Vec<Cluster> {
		Cluster::ALL
			.into_iter()
			.filter(|&c| self.nodes.iter().any(|n| n.cluster == c))
			.collect()
	}

	pub fn position(&self, idx: NodeIdx) -> Option<Point> {
		self.nodes.get(idx).and_then(|n| n.pos)
	}

	/// Mean of the laid-out positions, `None` when none are placed.
	pub fn centroid_of(&self, members: impl IntoIterator<Item = NodeIdx>) -> Option<Point> {
		let (sum, count) = members
			.into_iter()
			.filter_map(|i| self.position(i))
			.fold((Point::default(), 0usize), |(s, c), p| (s + p, c + 1));
		(count > 0).then(|| sum * (1.0 / count as f64))
	}

	/// Recompute cached cluster centroids and the overall bounding box.
	pub fn finish_layout(&mut self) {
		self.centroids = Cluster::ALL
			.into_iter()
			.filter_map(|c| self.centroid_of(self.cluster_members(c)).map(|p| (c, p)))
			.collect();
		self.bounds = Bounds::around(self.nodes.iter().filter_map(|n| n.pos));
	}

	/// Re-derive the time-sensitive fields after the host's clock changes.
	pub fn refresh_hours(&mut self, source: &dyn ServiceSource, now: NaiveDateTime) {
		for node in &mut self.nodes {
			let service = source.service_by_id(&node.id).unwrap_or(&node.service);
			node.hours = source.format_hours(service);
			node.around_the_clock = service.hours.kind == HoursKind::AroundTheClock;
			node.open_now = source.is_open(service, now);
		}
	}
}

fn resolve_cluster(service: &Service, source: &dyn ServiceSource) -> Cluster {
	if let Some(c) = service.named_entry_point().and_then(Cluster::from_key) {
		return c;
	}

	let mut visited: HashSet<&str> = HashSet::new();
	let mut cur = service;
	while cur.is_direct() && visited.len() < MAX_WALK && visited.insert(cur.id.as_str()) {
		let Some(parent) = cur
			.parent_service
			.as_deref()
			.and_then(|id| source.service_by_id(id))
		else {
			break;
		};
		if let Some(c) = parent.named_entry_point().and_then(Cluster::from_key) {
			return c;
		}
		cur = parent;
	}

	if service.id == "211" {
		return Cluster::Crisis211;
	}
	match service.category {
		Category::Shelter => Cluster::Shelters,
		Category::CrisisLine => Cluster::CrisisLines,
		Category::MentalHealth if service.address.is_none() && !service.is_drop_off => {
			Cluster::CrisisLines
		}
		_ => Cluster::Community,
	}
}

fn tier_for(downstream: usize, service: &Service) -> Tier {
	if downstream >= HUB_MIN_DOWNSTREAM || service.category == Category::EntryPoint {
		Tier::Hub
	} else if service.is_drop_off || downstream >= 1 {
		Tier::Operational
	} else {
		Tier::Leaf
	}
}

fn node_shape(service: &Service) -> NodeShape {
	let phone_only = !service.is_drop_off
		&& !service.is_mobile
		&& service.address.is_none()
		&& service.phone.is_some();
	if service.category == Category::EntryPoint {
		NodeShape::Hexagon
	} else if service.is_drop_off && service.address.is_some() {
		NodeShape::Square
	} else if service.category == Category::CrisisLine || phone_only {
		NodeShape::Diamond
	} else {
		NodeShape::Circle
	}
}

#[cfg(test)]
pub(super) mod tests {
	use super::*;
	use crate::services::ServiceDirectory;
	use chrono::NaiveDate;

	pub fn svc(id: &str, parent: Option<&str>, connections: &[&str]) -> Service {
		Service {
			id: id.into(),
			name: format!("Service {id}"),
			parent_service: parent.map(Into::into),
			connections: connections.iter().map(|c| c.to_string()).collect(),
			entry_point: Some("direct".into()),
			..Default::default()
		}
	}

	pub fn noon() -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2025, 6, 2)
			.and_then(|d| d.and_hms_opt(12, 0, 0))
			.expect("valid date")
	}

	pub fn build(services: Vec<Service>) -> GraphModel {
		GraphModel::build(&ServiceDirectory::new(services), noon())
	}

	fn idx(model: &GraphModel, id: &str) -> NodeIdx {
		model.node_by_id(id).expect("node exists")
	}

	#[test]
	fn depths_and_downstream_counts() {
		let model = build(vec![
			svc("R", None, &[]),
			svc("C1", Some("R"), &[]),
			svc("C2", Some("R"), &[]),
			svc("G", Some("C1"), &[]),
		]);
		let node = |id| &model.nodes[idx(&model, id)];
		assert_eq!(node("R").depth, 0);
		assert_eq!(node("C1").depth, 1);
		assert_eq!(node("C2").depth, 1);
		assert_eq!(node("G").depth, 2);
		assert_eq!(node("R").downstream, 3);
		assert_eq!(node("C1").downstream, 1);
		assert_eq!(node("C2").downstream, 0);
		assert_eq!(node("G").downstream, 0);
		assert_eq!(node("R").tier, Tier::Hub);
		assert_eq!(node("C1").tier, Tier::Operational);
		assert_eq!(node("G").tier, Tier::Leaf);
	}

	#[test]
	fn exactly_one_tree_edge_per_child() {
		let model = build(vec![
			svc("R", None, &[]),
			svc("A", Some("R"), &["R"]),
			svc("B", Some("A"), &[]),
		]);
		for child in ["A", "B"] {
			let c = idx(&model, child);
			let inbound: Vec<_> = model
				.edges
				.iter()
				.filter(|e| e.kind == EdgeKind::Tree && e.key.target == c)
				.collect();
			assert_eq!(inbound.len(), 1);
			let parent = inbound[0].key.source;
			assert_eq!(model.nodes[c].depth, model.nodes[parent].depth + 1);
		}
		// the A -> R connection duplicates the tree edge and is dropped
		assert_eq!(model.edges.len(), 2);
	}

	#[test]
	fn mutual_connections_yield_one_edge() {
		let model = build(vec![svc("A", None, &["B"]), svc("B", None, &["A"])]);
		assert_eq!(model.edges.len(), 1);
		assert_eq!(model.edges[0].kind, EdgeKind::Conn);
		assert_eq!(model.edges[0].key, EdgeKey::new(idx(&model, "A"), idx(&model, "B")));
	}

	#[test]
	fn no_duplicate_unordered_pairs() {
		let model = build(vec![
			svc("A", None, &["B", "C", "B"]),
			svc("B", Some("A"), &["A", "C"]),
			svc("C", None, &["A", "B"]),
		]);
		let mut pairs = HashSet::new();
		for e in &model.edges {
			assert!(pairs.insert(e.key.unordered()), "duplicate edge {:?}", e.key);
		}
		assert_eq!(pairs.len(), 3);
	}

	#[test]
	fn dangling_references_are_skipped() {
		let model = build(vec![svc("A", Some("ghost"), &["nobody"])]);
		assert!(model.edges.is_empty());
		assert_eq!(model.nodes[0].parent, None);
		assert_eq!(model.nodes[0].depth, 0);
	}

	#[test]
	fn parent_cycles_terminate() {
		let mut a = svc("A", Some("C"), &[]);
		let b = svc("B", Some("A"), &[]);
		let c = svc("C", Some("B"), &[]);
		a.category = Category::Shelter;
		let model = build(vec![a, b, c]);
		assert_eq!(model.nodes.len(), 3);
		// walk falls through to the category fallback
		assert_eq!(model.nodes[0].cluster, Cluster::Shelters);
		assert_eq!(model.nodes[1].cluster, Cluster::Community);
		for i in 0..3 {
			assert!(model.descendants(i).len() <= 2);
			assert!(model.ancestors(i).len() <= 3);
		}
	}

	#[test]
	fn cluster_inherits_from_named_ancestor() {
		let mut root = svc("ahs", None, &[]);
		root.entry_point = Some("AHS".into());
		let mid = svc("mid", Some("ahs"), &[]);
		let leaf = svc("leaf", Some("mid"), &[]);
		let mut line = svc("line", None, &[]);
		line.category = Category::MentalHealth;
		let mut lone = svc("211", None, &[]);
		lone.category = Category::EntryPoint;
		let model = build(vec![root, mid, leaf, line, lone]);
		assert_eq!(model.nodes[idx(&model, "leaf")].cluster, Cluster::AlbertaHealth);
		assert_eq!(model.nodes[idx(&model, "mid")].cluster, Cluster::AlbertaHealth);
		assert_eq!(model.nodes[idx(&model, "line")].cluster, Cluster::CrisisLines);
		assert_eq!(model.nodes[idx(&model, "211")].cluster, Cluster::Crisis211);
		assert_eq!(model.nodes[idx(&model, "211")].shape, NodeShape::Hexagon);
	}

	#[test]
	fn traits_follow_node_attributes() {
		let mut a = svc("A", None, &[]);
		a.hours.kind = HoursKind::AroundTheClock;
		a.description = Some("Harm Reduction supplies".into());
		a.accessibility = Accessibility::Public;
		let mut b = svc("B", None, &[]);
		b.pilot_program = true;
		b.phone = Some("780-555-0100".into());
		b.description = Some("Mobile crisis team".into());
		let model = build(vec![a, b]);
		assert_eq!(model.trait_members(Trait::AroundTheClock), &[0]);
		assert_eq!(model.trait_members(Trait::HarmReduction), &[0]);
		assert_eq!(model.trait_members(Trait::PublicAccess), &[0]);
		assert_eq!(model.trait_members(Trait::FundingAtRisk), &[1]);
		assert_eq!(model.trait_members(Trait::HasPhone), &[1]);
		assert_eq!(model.trait_members(Trait::MentalHealth), &[1]);
		assert_eq!(model.nodes[1].shape, NodeShape::Diamond);
		assert_eq!(model.nodes[0].badges(), vec![Badge::AroundTheClock]);
	}
}
