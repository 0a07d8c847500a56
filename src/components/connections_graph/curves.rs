//! Edge bezier control points and the ambient flow particles riding them.

use rand::Rng;

use super::geom::{Point, bezier_point, stable_hash};
use super::model::{Edge, EdgeKind, GraphModel};

const TREE_CURVATURE: f64 = 0.12;
const CONN_CURVATURE: f64 = 0.25;
const TREE_PARTICLES: usize = 3;
const CONN_PARTICLES: usize = 1;
const MIN_SPEED: f64 = 0.0012;
const SPEED_RANGE: f64 = 0.0025;

/// Control point for a quadratic curve from `start` to `end`, bowed
/// perpendicular to the chord. `key` decides which side, so the bow is
/// identical on every frame and every session.
pub fn control_point(start: Point, end: Point, kind: EdgeKind, key: &str) -> Point {
	let mid = start.midpoint(end);
	let d = end - start;
	let len = d.length();
	if len < f64::EPSILON {
		return mid;
	}
	let sign = if stable_hash(key) % 2 == 0 { 1.0 } else { -1.0 };
	let curvature = match kind {
		EdgeKind::Tree => TREE_CURVATURE,
		EdgeKind::Conn => CONN_CURVATURE,
	};
	let offset = len * curvature * sign;
	Point::new(mid.x - d.y / len * offset, mid.y + d.x / len * offset)
}

pub fn edge_label(model: &GraphModel, edge: &Edge) -> String {
	format!(
		"{}>{}",
		model.nodes[edge.key.source].id, model.nodes[edge.key.target].id
	)
}

/// Control points indexed like `model.edges`; `None` where an endpoint has no position.
pub fn compute_curves(model: &GraphModel) -> Vec<Option<Point>> {
	model
		.edges
		.iter()
		.map(|edge| {
			let start = model.position(edge.key.source)?;
			let end = model.position(edge.key.target)?;
			Some(control_point(start, end, edge.kind, &edge_label(model, edge)))
		})
		.collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
	pub edge: usize,
	/// Position along the curve in `[0, 1)`.
	pub phase: f64,
	/// Phase advanced per 60 Hz frame.
	pub speed: f64,
}

impl Particle {
	pub fn advance(&mut self, dt: f64) {
		self.phase += self.speed * dt * 60.0;
		if self.phase >= 1.0 {
			self.phase = self.phase.fract();
		}
	}
}

pub fn seed_particles(model: &GraphModel, curves: &[Option<Point>], rng: &mut impl Rng) -> Vec<Particle> {
	let mut out = Vec::new();
	for (i, edge) in model.edges.iter().enumerate() {
		if curves.get(i).copied().flatten().is_none() {
			continue;
		}
		let count = match edge.kind {
			EdgeKind::Tree => TREE_PARTICLES,
			EdgeKind::Conn => CONN_PARTICLES,
		};
		for _ in 0..count {
			out.push(Particle {
				edge: i,
				phase: rng.r#gen::<f64>(),
				speed: MIN_SPEED + rng.r#gen::<f64>() * SPEED_RANGE,
			});
		}
	}
	out
}

/// World position of a particle on its edge's curve.
pub fn particle_position(model: &GraphModel, curves: &[Option<Point>], particle: &Particle) -> Option<Point> {
	let edge = model.edges.get(particle.edge)?;
	let control = curves.get(particle.edge).copied().flatten()?;
	let start = model.position(edge.key.source)?;
	let end = model.position(edge.key.target)?;
	Some(bezier_point(start, control, end, particle.phase))
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::super::model::tests::{build, svc};
	use super::*;

	#[test]
	fn control_point_is_perpendicular_and_scaled() {
		let (s, e) = (Point::new(0.0, 0.0), Point::new(100.0, 0.0));
		let tree = control_point(s, e, EdgeKind::Tree, "a>b");
		let conn = control_point(s, e, EdgeKind::Conn, "a>b");
		assert_eq!(tree.x, 50.0);
		assert!((tree.y.abs() - 12.0).abs() < 1e-9);
		assert!((conn.y.abs() - 25.0).abs() < 1e-9);
		assert_eq!(tree.y.signum(), conn.y.signum());
		assert_eq!(control_point(s, e, EdgeKind::Conn, "a>b"), conn);
	}

	#[test]
	fn zero_length_edge_uses_midpoint() {
		let p = Point::new(3.0, 4.0);
		assert_eq!(control_point(p, p, EdgeKind::Conn, "x>y"), p);
	}

	#[test]
	fn particles_per_edge_kind_and_wrap() {
		let mut model = build(vec![
			svc("a", None, &["c"]),
			svc("b", Some("a"), &[]),
			svc("c", None, &[]),
		]);
		for (i, node) in model.nodes.iter_mut().enumerate() {
			node.pos = Some(Point::new(i as f64 * 100.0, 0.0));
		}
		let curves = compute_curves(&model);
		let mut rng = SmallRng::seed_from_u64(11);
		let mut particles = seed_particles(&model, &curves, &mut rng);
		assert_eq!(particles.len(), 3 + 1);

		for p in &mut particles {
			assert!((0.0..1.0).contains(&p.phase));
			for _ in 0..2000 {
				p.advance(1.0 / 60.0);
			}
			assert!((0.0..1.0).contains(&p.phase));
			assert!(particle_position(&model, &curves, p).is_some());
		}
	}

	#[test]
	fn unplaced_edges_get_no_particles() {
		let model = build(vec![svc("a", None, &[]), svc("b", Some("a"), &[])]);
		let curves = compute_curves(&model);
		assert_eq!(curves, vec![None]);
		let mut rng = SmallRng::seed_from_u64(0);
		assert!(seed_particles(&model, &curves, &mut rng).is_empty());
	}
}
