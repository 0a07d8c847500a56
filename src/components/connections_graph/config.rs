//! Tuning constants. These were chosen by eye against the production dataset,
//! so they are grouped here rather than scattered through the algorithms.

pub const MIN_ZOOM: f64 = 0.12;
pub const MAX_ZOOM: f64 = 2.5;
/// Fraction of the remaining distance the camera covers per 60 Hz frame.
pub const CAMERA_SMOOTHING: f64 = 0.06;
pub const DEFAULT_ZOOM: f64 = 0.4;
pub const INTRO_ZOOM: f64 = 0.15;
pub const INTRO_Y_OFFSET: f64 = 100.0;
pub const FOCUS_ZOOM: f64 = 0.5;
pub const CLUSTER_ZOOM: f64 = 0.5;
/// Screen pixels the focused node is shifted left to leave room for the detail panel.
pub const FOCUS_PANEL_OFFSET: f64 = 150.0;
pub const FIT_PADDING: f64 = 120.0;
pub const FIT_MIN_ZOOM: f64 = 0.15;
pub const FIT_MAX_ZOOM: f64 = 0.8;

pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
pub const CLICK_SLOP: f64 = 5.0;
pub const HIT_MARGIN: f64 = 14.0;
pub const MIN_SEARCH_LEN: usize = 2;
pub const MAX_CENTERED_HITS: usize = 8;

pub const GRID_MIN_ZOOM: f64 = 0.15;
pub const GRID_SPACING: f64 = 200.0;

/// Screen-space slack before something counts as off-screen.
pub const PANEL_CULL: f64 = 50.0;
pub const WATERMARK_CULL: f64 = 300.0;
pub const EDGE_CULL: f64 = 200.0;
pub const PARTICLE_CULL: f64 = 40.0;
pub const NODE_CULL: f64 = 120.0;
/// World padding around a cluster's nodes for its background panel.
pub const PANEL_PADDING: f64 = 100.0;

/// Radial layout and overlap-removal parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub center: (f64, f64),
	pub cluster_radius: f64,
	pub ring_spacing_max: f64,
	pub ring_spacing_min: f64,
	pub ring_spacing_per_root: f64,
	pub child_radius_large: f64,
	pub child_radius_small: f64,
	/// Downstream count above which a root gets the large child radius.
	pub large_fan_threshold: usize,
	pub child_radius_decay: f64,
	pub narrow_cone: f64,
	pub wide_cone: f64,
	pub max_depth: usize,
	pub collision_passes: usize,
	pub collision_damping: f64,
	pub label_char_padding: f64,
	pub label_base_padding: f64,
	pub root_weight: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			center: (2400.0, 1500.0),
			cluster_radius: 900.0,
			ring_spacing_max: 240.0,
			ring_spacing_min: 180.0,
			ring_spacing_per_root: 5.0,
			child_radius_large: 280.0,
			child_radius_small: 210.0,
			large_fan_threshold: 3,
			child_radius_decay: 0.65,
			narrow_cone: std::f64::consts::PI * 0.6,
			wide_cone: std::f64::consts::PI * 0.9,
			max_depth: 64,
			collision_passes: 120,
			collision_damping: 0.55,
			label_char_padding: 6.0,
			label_base_padding: 50.0,
			root_weight: 0.2,
		}
	}
}

/// Node size and hierarchy thresholds.
pub const HUB_MIN_DOWNSTREAM: usize = 2;
/// Hard cap on any walk over the untrusted parent hierarchy.
pub const MAX_WALK: usize = 10_000;
