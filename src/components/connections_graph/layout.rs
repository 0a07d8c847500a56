//! Radial cluster placement followed by a bounded overlap-removal pass.

use std::collections::{BTreeMap, HashSet};
use std::f64::consts::{PI, TAU};

use log::debug;
use rand::Rng;

use super::config::LayoutConfig;
use super::geom::Point;
use super::model::{GraphModel, NodeIdx};

/// Place every node, push overlapping nodes apart, then cache centroids and
/// bounds. Returns the number of relaxation passes used.
pub fn run(model: &mut GraphModel, config: &LayoutConfig, rng: &mut impl Rng) -> usize {
	place(model, config);
	let passes = resolve_collisions(model, config, rng);
	model.finish_layout();
	debug!("layout settled after {passes} collision passes");
	passes
}

/// Initial radial placement: clusters on a big circle, roots in rings around
/// each cluster centre, descendants fanned outward from their root.
pub fn place(model: &mut GraphModel, config: &LayoutConfig) {
	let center = Point::new(config.center.0, config.center.1);

	let mut cluster_roots: BTreeMap<_, Vec<NodeIdx>> = BTreeMap::new();
	for (i, node) in model.nodes.iter().enumerate() {
		if node.depth == 0 {
			cluster_roots.entry(node.cluster).or_default().push(i);
		}
	}
	let roots: HashSet<NodeIdx> = cluster_roots.values().flatten().copied().collect();
	let mut placed = roots.clone();
	let slots = cluster_roots.len().max(1) as f64;

	for (slot, members) in cluster_roots.values_mut().enumerate() {
		let angle = -PI / 2.0 + slot as f64 * (TAU / slots);
		let cluster_center = Point::polar(center, angle, config.cluster_radius);

		members.sort_by(|&a, &b| model.nodes[b].downstream.cmp(&model.nodes[a].downstream));
		let spacing = (config.ring_spacing_max
			- members.len() as f64 * config.ring_spacing_per_root)
			.max(config.ring_spacing_min);
		for (&idx, pos) in members.iter().zip(ring_positions(members.len(), cluster_center, spacing)) {
			model.nodes[idx].pos = Some(pos);
		}

		for &root in members.iter() {
			let Some(origin) = model.nodes[root].pos else {
				continue;
			};
			let outward = (origin.y - center.y).atan2(origin.x - center.x);
			let radius = if model.nodes[root].downstream > config.large_fan_threshold {
				config.child_radius_large
			} else {
				config.child_radius_small
			};
			fan_children(model, config, &roots, &mut placed, root, outward, radius);
		}
	}
}

/// Concentric ring packing: one slot at the centre, then rings whose
/// capacity grows with circumference.
pub fn ring_positions(count: usize, center: Point, spacing: f64) -> Vec<Point> {
	let mut out = Vec::with_capacity(count);
	let mut ring = 0usize;
	while out.len() < count {
		if ring == 0 {
			out.push(center);
		} else {
			let radius = ring as f64 * spacing;
			let capacity = ((TAU * radius / (spacing * 0.9)).floor() as usize).max(1);
			let n = capacity.min(count - out.len());
			for j in 0..n {
				let angle = -PI / 2.0 + TAU * j as f64 / n as f64;
				out.push(Point::polar(center, angle, radius));
			}
		}
		ring += 1;
	}
	out
}

fn fan_children(
	model: &mut GraphModel,
	config: &LayoutConfig,
	roots: &HashSet<NodeIdx>,
	placed: &mut HashSet<NodeIdx>,
	root: NodeIdx,
	outward: f64,
	radius: f64,
) {
	let mut stack = vec![(root, outward, radius, 0usize)];
	while let Some((parent, base, radius, depth)) = stack.pop() {
		if depth >= config.max_depth {
			continue;
		}
		let Some(origin) = model.nodes[parent].pos else {
			continue;
		};
		let kids: Vec<NodeIdx> = model.children[parent]
			.iter()
			.copied()
			.filter(|k| !roots.contains(k) && placed.insert(*k))
			.collect();
		if kids.is_empty() {
			continue;
		}
		let spread = if kids.len() <= 2 {
			config.narrow_cone
		} else {
			config.wide_cone
		};
		let step = spread / kids.len() as f64;
		for (i, &kid) in kids.iter().enumerate() {
			let angle = base - spread / 2.0 + step * (i as f64 + 0.5);
			model.nodes[kid].pos = Some(Point::polar(origin, angle, radius));
			stack.push((kid, angle, radius * config.child_radius_decay, depth + 1));
		}
	}
}

/// Pairwise relaxation. Each overlapping pair is pushed apart along the line
/// between them, roots moving less than everything else. Bounded by
/// `config.collision_passes`; stops early on a pass with no movement.
pub fn resolve_collisions(model: &mut GraphModel, config: &LayoutConfig, rng: &mut impl Rng) -> usize {
	let n = model.nodes.len();
	let reach: Vec<f64> = model
		.nodes
		.iter()
		.map(|node| {
			node.radius()
				+ node.label.chars().count() as f64 * config.label_char_padding
				+ config.label_base_padding
		})
		.collect();
	let weight: Vec<f64> = model
		.nodes
		.iter()
		.map(|node| if node.depth == 0 { config.root_weight } else { 1.0 })
		.collect();
	let mut pos: Vec<Option<Point>> = model.nodes.iter().map(|node| node.pos).collect();

	let mut passes = 0;
	while passes < config.collision_passes {
		passes += 1;
		let mut moved = false;
		for i in 0..n {
			for j in (i + 1)..n {
				let (Some(a), Some(b)) = (pos[i], pos[j]) else {
					continue;
				};
				let min_dist = reach[i] + reach[j];
				let mut delta = a - b;
				let mut dist = delta.length();
				if dist >= min_dist {
					continue;
				}
				if dist < 1e-6 {
					let theta = rng.gen_range(0.0..TAU);
					delta = Point::new(theta.cos(), theta.sin());
					dist = 1.0;
				}
				let overlap = (min_dist - dist) * config.collision_damping;
				let push = delta * (overlap / dist);
				let total = weight[i] + weight[j];
				pos[i] = Some(a + push * (weight[i] / total));
				pos[j] = Some(b - push * (weight[j] / total));
				moved = true;
			}
		}
		if !moved {
			break;
		}
	}

	for (node, p) in model.nodes.iter_mut().zip(pos) {
		node.pos = p;
	}
	passes
}
