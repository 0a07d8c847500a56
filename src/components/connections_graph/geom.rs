use std::ops::{Add, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length(self) -> f64 {
		self.x.hypot(self.y)
	}

	pub fn distance(self, other: Point) -> f64 {
		(self - other).length()
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	pub fn polar(center: Point, angle: f64, radius: f64) -> Point {
		Point::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
	}
}

impl Add for Point {
	type Output = Point;
	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;
	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;
	fn mul(self, rhs: f64) -> Point {
		Point::new(self.x * rhs, self.y * rhs)
	}
}

/// Axis-aligned world-space box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	pub fn around(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
		points.into_iter().fold(None, |acc, p| {
			Some(match acc {
				None => Bounds { min: p, max: p },
				Some(b) => Bounds {
					min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
					max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
				},
			})
		})
	}

	pub fn center(&self) -> Point {
		self.min.midpoint(self.max)
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}
}

/// Point on the quadratic bezier `start -> control -> end` at `t` in `[0, 1]`.
pub fn bezier_point(start: Point, control: Point, end: Point, t: f64) -> Point {
	let u = 1.0 - t;
	start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

/// Java-style string hash, folded to non-negative. Stable across runs so
/// anything derived from it (curve sides, pulse phases) never jitters.
pub fn stable_hash(s: &str) -> u32 {
	let h = s
		.encode_utf16()
		.fold(0i32, |h, c| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c as i32));
	h.unsigned_abs()
}
