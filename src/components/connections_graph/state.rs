use chrono::NaiveDateTime;
use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::camera::{Camera, Viewport};
use super::config::LayoutConfig;
use super::curves::{self, Particle};
use super::geom::Point;
use super::highlight::Highlight;
use super::interaction::Interaction;
use super::layout;
use super::model::{GraphModel, NodeIdx};
use crate::services::ServiceSource;

/// Everything one mounted graph owns. Nothing here is shared between
/// sessions; dropping it is the whole teardown of the model side.
pub struct GraphSession {
	pub model: GraphModel,
	/// Bezier control points, indexed like `model.edges`.
	pub curves: Vec<Option<Point>>,
	pub particles: Vec<Particle>,
	pub camera: Camera,
	pub interaction: Interaction,
	pub highlight: Highlight,
	/// Dashed connectors between same-trait nodes in different clusters.
	pub trait_lines: Vec<(NodeIdx, NodeIdx)>,
	/// Seconds since the session started.
	pub elapsed: f64,
}

impl GraphSession {
	pub fn new(source: &dyn ServiceSource, config: &LayoutConfig, now: NaiveDateTime, seed: u64) -> Self {
		let mut rng = SmallRng::seed_from_u64(seed);
		let mut model = GraphModel::build(source, now);
		layout::run(&mut model, config, &mut rng);
		let curves = curves::compute_curves(&model);
		let particles = curves::seed_particles(&model, &curves, &mut rng);
		let home = model
			.bounds
			.map(|b| b.center())
			.unwrap_or(Point::new(config.center.0, config.center.1));

		info!(
			"connections graph ready: {} nodes, {} edges, {} clusters, {} particles",
			model.nodes.len(),
			model.edges.len(),
			model.centroids.len(),
			particles.len()
		);

		Self {
			model,
			curves,
			particles,
			camera: Camera::intro(home),
			interaction: Interaction::default(),
			highlight: Highlight::default(),
			trait_lines: Vec::new(),
			elapsed: 0.0,
		}
	}

	/// Advance animation state by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let dt = dt.clamp(0.0, 0.25);
		self.elapsed += dt;
		if self.camera.viewport.is_drawable() {
			self.camera.auto_fit(self.model.bounds);
		}
		self.camera.step(dt);
		for particle in &mut self.particles {
			particle.advance(dt);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.viewport = Viewport {
			width: width.max(0.0),
			height: height.max(0.0),
		};
	}

	/// Re-derive hours and open/closed flags; layout is untouched.
	pub fn refresh_hours(&mut self, source: &dyn ServiceSource, now: NaiveDateTime) {
		self.model.refresh_hours(source, now);
	}

	pub fn is_empty(&self) -> bool {
		self.model.nodes.is_empty()
	}
}

#[cfg(test)]
pub(super) mod tests {
	use super::super::model::tests::{noon, svc};
	use super::*;
	use crate::services::{HoursKind, ServiceDirectory};

	pub fn session(directory: &ServiceDirectory) -> GraphSession {
		let mut s = GraphSession::new(directory, &LayoutConfig::default(), noon(), 42);
		s.resize(1200.0, 800.0);
		s.camera.current = s.camera.target;
		s
	}

	#[test]
	fn tick_settles_camera_and_fits_once() {
		let dir = ServiceDirectory::new(vec![
			svc("R", None, &[]),
			svc("C1", Some("R"), &[]),
			svc("C2", Some("R"), &["X"]),
			svc("X", None, &[]),
		]);
		let mut s = GraphSession::new(&dir, &LayoutConfig::default(), noon(), 1);
		s.tick(1.0 / 60.0);
		assert!(!s.camera.has_fitted());

		s.resize(1000.0, 700.0);
		for _ in 0..600 {
			s.tick(1.0 / 60.0);
		}
		assert!(s.camera.has_fitted());
		assert!((s.camera.current.zoom - s.camera.target.zoom).abs() < 1e-6);
		assert!((s.elapsed - 601.0 / 60.0).abs() < 1e-6);
		assert!(s.particles.iter().all(|p| (0.0..1.0).contains(&p.phase)));
	}

	#[test]
	fn empty_dataset_builds_an_inert_session() {
		let dir = ServiceDirectory::default();
		let mut s = session(&dir);
		assert!(s.is_empty());
		s.tick(0.016);
		assert!(s.particles.is_empty());
		assert!(!s.camera.has_fitted());
	}

	#[test]
	fn refresh_hours_keeps_layout() {
		let mut a = svc("a", None, &[]);
		a.hours.kind = HoursKind::AroundTheClock;
		let dir = ServiceDirectory::new(vec![a]);
		let mut s = session(&dir);
		let before = s.model.nodes[0].pos;

		let mut changed = svc("a", None, &[]);
		changed.hours.kind = HoursKind::Scheduled;
		let updated = ServiceDirectory::new(vec![changed]);
		s.refresh_hours(&updated, noon());
		assert_eq!(s.model.nodes[0].hours, "Hours not available");
		assert!(!s.model.nodes[0].around_the_clock);
		assert!(!s.model.nodes[0].open_now);
		assert_eq!(s.model.nodes[0].pos, before);
	}
}
