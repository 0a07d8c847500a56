use super::config::{
	CAMERA_SMOOTHING, DEFAULT_ZOOM, FIT_MAX_ZOOM, FIT_MIN_ZOOM, FIT_PADDING, INTRO_Y_OFFSET,
	INTRO_ZOOM, MAX_ZOOM, MIN_ZOOM,
};
use super::geom::{Bounds, Point};

/// World point at the centre of the screen plus a scale factor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct View {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
}

/// Canvas size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn is_drawable(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}
}

/// Current view eases toward the target view; input only ever moves the target.
#[derive(Clone, Debug, Default)]
pub struct Camera {
	pub current: View,
	pub target: View,
	pub viewport: Viewport,
	/// Graph centre used by reset.
	pub home: Point,
	fitted: bool,
}

pub fn clamp_zoom(zoom: f64) -> f64 {
	zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl Camera {
	/// Start slightly above and zoomed in on `home`, easing out to the default view.
	pub fn intro(home: Point) -> Self {
		Self {
			current: View {
				x: home.x,
				y: home.y - INTRO_Y_OFFSET,
				zoom: INTRO_ZOOM,
			},
			target: View {
				x: home.x,
				y: home.y,
				zoom: DEFAULT_ZOOM,
			},
			viewport: Viewport::default(),
			home,
			fitted: false,
		}
	}

	pub fn zoom(&self) -> f64 {
		self.current.zoom
	}

	pub fn world_to_screen(&self, p: Point) -> Point {
		let v = &self.current;
		Point::new(
			(p.x - v.x) * v.zoom + self.viewport.width / 2.0,
			(p.y - v.y) * v.zoom + self.viewport.height / 2.0,
		)
	}

	pub fn screen_to_world(&self, p: Point) -> Point {
		let v = &self.current;
		Point::new(
			(p.x - self.viewport.width / 2.0) / v.zoom + v.x,
			(p.y - self.viewport.height / 2.0) / v.zoom + v.y,
		)
	}

	/// Exponential smoothing toward the target. `dt` is in seconds; a 60 Hz
	/// frame covers `CAMERA_SMOOTHING` of the remaining distance.
	pub fn step(&mut self, dt: f64) {
		let frames = dt.max(0.0) * 60.0;
		let alpha = 1.0 - (1.0 - CAMERA_SMOOTHING).powf(frames);
		let (c, t) = (&mut self.current, &self.target);
		c.x += (t.x - c.x) * alpha;
		c.y += (t.y - c.y) * alpha;
		c.zoom += (t.zoom - c.zoom) * alpha;
	}

	/// Fit `bounds` into the viewport once per session. Returns true if this
	/// call performed the fit.
	pub fn auto_fit(&mut self, bounds: Option<Bounds>) -> bool {
		if self.fitted || !self.viewport.is_drawable() {
			return false;
		}
		let Some(bounds) = bounds else {
			return false;
		};
		self.fitted = true;
		let (bw, bh) = (bounds.width(), bounds.height());
		if bw <= 0.0 || bh <= 0.0 {
			return false;
		}
		let zx = (self.viewport.width - FIT_PADDING * 2.0) / bw;
		let zy = (self.viewport.height - FIT_PADDING * 2.0) / bh;
		self.target = View {
			x: self.home.x,
			y: self.home.y,
			zoom: zx.min(zy).clamp(FIT_MIN_ZOOM, FIT_MAX_ZOOM),
		};
		true
	}

	pub fn has_fitted(&self) -> bool {
		self.fitted
	}

	/// Multiply the target zoom by `factor`, keeping the world point under
	/// `anchor` (screen space) fixed.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
		let world = self.screen_to_world(anchor);
		let zoom = clamp_zoom(self.target.zoom * factor);
		self.target.zoom = zoom;
		self.target.x = world.x - (anchor.x - self.viewport.width / 2.0) / zoom;
		self.target.y = world.y - (anchor.y - self.viewport.height / 2.0) / zoom;
	}

	/// Shift the target by a screen-space delta at the current zoom.
	pub fn pan_by(&mut self, screen_delta: Point) {
		self.target.x -= screen_delta.x / self.current.zoom;
		self.target.y -= screen_delta.y / self.current.zoom;
	}

	pub fn look_at(&mut self, world: Point, zoom: f64) {
		self.target = View {
			x: world.x,
			y: world.y,
			zoom: clamp_zoom(zoom),
		};
	}

	pub fn reset(&mut self) {
		self.look_at(self.home, DEFAULT_ZOOM);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn camera() -> Camera {
		let mut cam = Camera::intro(Point::new(500.0, 300.0));
		cam.viewport = Viewport {
			width: 800.0,
			height: 600.0,
		};
		cam
	}

	fn close(a: Point, b: Point) -> bool {
		a.distance(b) < 1e-6
	}

	#[test]
	fn screen_world_round_trip() {
		let mut cam = camera();
		for &(x, y, zoom) in &[(0.0, 0.0, 1.0), (123.4, -56.0, 0.12), (-900.0, 4000.0, 2.5)] {
			cam.current = View { x, y, zoom };
			for p in [Point::new(0.0, 0.0), Point::new(812.5, -33.0), Point::new(-1e4, 7e3)] {
				assert!(close(cam.screen_to_world(cam.world_to_screen(p)), p));
			}
		}
	}

	#[test]
	fn zoom_stays_in_bounds() {
		let mut cam = camera();
		for _ in 0..200 {
			cam.zoom_at(Point::new(10.0, 10.0), 1.1);
			assert!(cam.target.zoom <= MAX_ZOOM);
		}
		assert_eq!(cam.target.zoom, MAX_ZOOM);
		for _ in 0..200 {
			cam.zoom_at(Point::new(700.0, 20.0), 0.9);
			assert!(cam.target.zoom >= MIN_ZOOM);
		}
		assert_eq!(cam.target.zoom, MIN_ZOOM);
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut cam = camera();
		cam.current = cam.target;
		let anchor = Point::new(640.0, 120.0);
		let before = cam.screen_to_world(anchor);
		cam.zoom_at(anchor, 1.1);
		cam.current = cam.target;
		assert!(close(cam.screen_to_world(anchor), before));
	}

	#[test]
	fn smoothing_is_frame_rate_tolerant() {
		let mut a = camera();
		let mut b = camera();
		a.step(1.0 / 30.0);
		b.step(1.0 / 60.0);
		b.step(1.0 / 60.0);
		assert!((a.current.zoom - b.current.zoom).abs() < 1e-12);
		assert!((a.current.y - b.current.y).abs() < 1e-9);

		let mut c = camera();
		let start = c.current.zoom;
		c.step(1.0 / 60.0);
		let expected = start + (c.target.zoom - start) * CAMERA_SMOOTHING;
		assert!((c.current.zoom - expected).abs() < 1e-12);
	}

	#[test]
	fn auto_fit_runs_once_and_needs_a_viewport() {
		let bounds = Some(Bounds {
			min: Point::new(0.0, 0.0),
			max: Point::new(1000.0, 600.0),
		});
		let mut cam = Camera::intro(Point::new(500.0, 300.0));
		assert!(!cam.auto_fit(bounds));
		cam.viewport = Viewport {
			width: 800.0,
			height: 600.0,
		};
		assert!(cam.auto_fit(bounds));
		// (800 - 240) / 1000 = 0.56 vs (600 - 240) / 600 = 0.6
		assert!((cam.target.zoom - 0.56).abs() < 1e-12);
		cam.target.zoom = 2.0;
		assert!(!cam.auto_fit(bounds));
		assert_eq!(cam.target.zoom, 2.0);
	}

	#[test]
	fn pan_moves_target_only() {
		let mut cam = camera();
		let current = cam.current;
		let before = cam.target;
		cam.pan_by(Point::new(30.0, -15.0));
		assert_eq!(cam.current, current);
		assert!((cam.target.x - (before.x - 30.0 / current.zoom)).abs() < 1e-9);
		assert!((cam.target.y - (before.y + 15.0 / current.zoom)).abs() < 1e-9);
	}
}
