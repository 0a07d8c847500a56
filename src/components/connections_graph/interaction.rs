//! Pointer, touch, wheel and control input as one explicit state machine.
//!
//! The DOM layer translates browser events into [`InputEvent`]s (in canvas
//! pixel coordinates) and applies the returned [`Effect`]s. Everything in
//! between is plain data, so transitions are tested without a browser.

use log::debug;

use super::camera::{View, clamp_zoom};
use super::config::{
	CLICK_SLOP, CLUSTER_ZOOM, FOCUS_PANEL_OFFSET, FOCUS_ZOOM, HIT_MARGIN, MAX_CENTERED_HITS,
	MIN_SEARCH_LEN, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use super::geom::Point;
use super::highlight::{Highlight, cross_cluster_pairs};
use super::model::NodeIdx;
use super::palette::Cluster;
use super::state::GraphSession;
use super::traits::Trait;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
	Trait(Trait),
	Cluster(Cluster),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanGesture {
	start: Point,
	origin: View,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pinch {
	distance: f64,
	center: Point,
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
	pub selected: Option<NodeIdx>,
	pub hovered: Option<NodeIdx>,
	pub filter: Option<Filter>,
	pan: Option<PanGesture>,
	pinch: Option<Pinch>,
	/// Where the last press landed, to tell clicks from drag ends.
	press: Option<Point>,
}

/// Derived view of [`Interaction`]: what the user is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Idle,
	Hovering(NodeIdx),
	Panning,
	Selected(NodeIdx),
	Filtered(Filter),
}

impl Interaction {
	pub fn mode(&self) -> Mode {
		if self.pan.is_some() || self.pinch.is_some() {
			Mode::Panning
		} else if let Some(idx) = self.selected {
			Mode::Selected(idx)
		} else if let Some(filter) = self.filter {
			Mode::Filtered(filter)
		} else if let Some(idx) = self.hovered {
			Mode::Hovering(idx)
		} else {
			Mode::Idle
		}
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
	PointerDown(Point),
	PointerMove(Point),
	PointerUp,
	PointerLeave,
	Click(Point),
	Wheel { at: Point, delta_y: f64 },
	TouchStart(Point, Point),
	TouchMove(Point, Point),
	TouchEnd,
	Search(String),
	ToggleTrait(Trait),
	ToggleCluster(Cluster),
	SelectById(String),
	Clear,
	Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
	Default,
	Pointer,
	Grabbing,
}

/// Side effects for the DOM layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
	ShowDetail(NodeIdx),
	HideDetail,
	SetCursor(Cursor),
	ClearSearch,
	/// Filter / nav button states need re-syncing.
	SyncControls,
}

impl GraphSession {
	pub fn dispatch(&mut self, event: InputEvent) -> Vec<Effect> {
		let mut fx = Vec::new();
		match event {
			InputEvent::PointerDown(at) => {
				self.interaction.press = Some(at);
				self.interaction.pan = Some(PanGesture {
					start: at,
					origin: self.camera.target,
				});
				fx.push(Effect::SetCursor(Cursor::Grabbing));
			}
			InputEvent::PointerMove(at) => {
				if let Some(pan) = self.interaction.pan {
					let zoom = self.camera.zoom();
					self.camera.target.x = pan.origin.x - (at.x - pan.start.x) / zoom;
					self.camera.target.y = pan.origin.y - (at.y - pan.start.y) / zoom;
				} else {
					let hit = self.node_at(at);
					self.set_hover(hit, &mut fx);
				}
			}
			InputEvent::PointerUp => {
				self.interaction.pan = None;
				fx.push(Effect::SetCursor(self.hover_cursor()));
			}
			InputEvent::PointerLeave => {
				if self.interaction.pan.is_none() {
					self.set_hover(None, &mut fx);
				}
			}
			InputEvent::Click(at) => self.click(at, &mut fx),
			InputEvent::Wheel { at, delta_y } => {
				let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
				self.camera.zoom_at(at, factor);
			}
			InputEvent::TouchStart(a, b) => {
				let center = a.midpoint(b);
				self.interaction.pan = None;
				self.interaction.press = Some(center);
				self.interaction.pinch = Some(Pinch {
					distance: a.distance(b),
					center,
				});
			}
			InputEvent::TouchMove(a, b) => self.pinch(a, b),
			InputEvent::TouchEnd => self.interaction.pinch = None,
			InputEvent::Search(query) => self.search(&query, &mut fx),
			InputEvent::ToggleTrait(t) => self.toggle_trait(t, &mut fx),
			InputEvent::ToggleCluster(c) => self.toggle_cluster(c, &mut fx),
			InputEvent::SelectById(id) => {
				if let Some(idx) = self.model.node_by_id(&id) {
					self.select(idx, FocusZoom::AtLeast, &mut fx);
				}
			}
			InputEvent::Clear => self.clear_all(&mut fx),
			InputEvent::Reset => {
				self.clear_all(&mut fx);
				self.camera.reset();
				fx.push(Effect::ClearSearch);
			}
		}
		fx
	}

	/// Nearest node whose on-screen disc (plus a touch margin) contains `at`.
	pub fn node_at(&self, at: Point) -> Option<NodeIdx> {
		let zoom = self.camera.zoom();
		self.model
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(i, node)| {
				let screen = self.camera.world_to_screen(node.pos?);
				let d = screen.distance(at);
				(d < node.radius() * zoom + HIT_MARGIN).then_some((i, d))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	fn hover_cursor(&self) -> Cursor {
		if self.interaction.hovered.is_some() {
			Cursor::Pointer
		} else {
			Cursor::Default
		}
	}

	fn set_hover(&mut self, hit: Option<NodeIdx>, fx: &mut Vec<Effect>) {
		if hit == self.interaction.hovered {
			return;
		}
		self.interaction.hovered = hit;
		fx.push(Effect::SetCursor(self.hover_cursor()));
		if self.interaction.selected.is_none() && self.interaction.filter.is_none() {
			self.highlight = match hit {
				Some(idx) => Highlight::tree(&self.model, idx),
				None => Highlight::default(),
			};
		}
	}

	fn click(&mut self, at: Point, fx: &mut Vec<Effect>) {
		if let Some(press) = self.interaction.press {
			if (at.x - press.x).abs() > CLICK_SLOP || (at.y - press.y).abs() > CLICK_SLOP {
				return;
			}
		}
		match self.node_at(at) {
			Some(idx) if self.interaction.selected == Some(idx) => self.clear_all(fx),
			Some(idx) => self.select(idx, FocusZoom::AtLeast, fx),
			None => self.clear_all(fx),
		}
	}

	fn pinch(&mut self, a: Point, b: Point) {
		let Some(last) = self.interaction.pinch else {
			return;
		};
		let distance = a.distance(b);
		let center = a.midpoint(b);
		if last.distance > 0.0 && distance > 0.0 {
			self.camera.zoom_at(center, distance / last.distance);
		}
		self.camera.pan_by(center - last.center);
		self.interaction.pinch = Some(Pinch { distance, center });
	}

	fn select(&mut self, idx: NodeIdx, zoom: FocusZoom, fx: &mut Vec<Effect>) {
		let Some(pos) = self.model.position(idx) else {
			return;
		};
		self.interaction.filter = None;
		self.trait_lines.clear();
		self.interaction.selected = Some(idx);
		self.highlight = Highlight::tree(&self.model, idx);

		let current = self.camera.zoom();
		self.camera.target = View {
			x: pos.x - FOCUS_PANEL_OFFSET / current,
			y: pos.y,
			zoom: clamp_zoom(match zoom {
				FocusZoom::AtLeast => current.max(FOCUS_ZOOM),
				FocusZoom::Exactly => FOCUS_ZOOM,
			}),
		};
		debug!("selected {}", self.model.nodes[idx].id);
		fx.push(Effect::ShowDetail(idx));
		fx.push(Effect::SyncControls);
	}

	fn clear_all(&mut self, fx: &mut Vec<Effect>) {
		self.interaction.selected = None;
		self.interaction.filter = None;
		self.highlight = Highlight::default();
		self.trait_lines.clear();
		fx.push(Effect::HideDetail);
		fx.push(Effect::SyncControls);
	}

	fn search(&mut self, query: &str, fx: &mut Vec<Effect>) {
		if query.is_empty() {
			self.clear_all(fx);
			return;
		}
		if query.chars().count() < MIN_SEARCH_LEN || self.is_empty() {
			return;
		}
		self.clear_all(fx);

		let needle = query.to_lowercase();
		let hits: Vec<NodeIdx> = self
			.model
			.nodes
			.iter()
			.enumerate()
			.filter(|(_, node)| {
				node.service.name.to_lowercase().contains(&needle)
					|| node.label.to_lowercase().contains(&needle)
					|| node
						.service
						.description
						.as_deref()
						.is_some_and(|d| d.to_lowercase().contains(&needle))
			})
			.map(|(i, _)| i)
			.collect();
		debug!("search {query:?}: {} hits", hits.len());

		match hits.len() {
			0 => {}
			1 => self.select(hits[0], FocusZoom::Exactly, fx),
			n => {
				self.highlight = Highlight {
					nodes: hits.iter().copied().collect(),
					edges: Default::default(),
				};
				if n <= MAX_CENTERED_HITS {
					if let Some(c) = self.model.centroid_of(hits.iter().copied()) {
						self.camera.target.x = c.x;
						self.camera.target.y = c.y;
					}
				}
			}
		}
	}

	fn toggle_trait(&mut self, t: Trait, fx: &mut Vec<Effect>) {
		if self.is_empty() {
			return;
		}
		let was_active = self.interaction.filter == Some(Filter::Trait(t));
		self.clear_all(fx);
		if was_active {
			return;
		}
		let members = self.model.trait_members(t).to_vec();
		self.interaction.filter = Some(Filter::Trait(t));
		self.highlight = Highlight::group(&self.model, members.iter().copied());
		self.trait_lines = cross_cluster_pairs(&self.model, &members);
		debug!(
			"trait filter {}: {} nodes, {} cross-cluster lines",
			t.label(),
			members.len(),
			self.trait_lines.len()
		);
	}

	fn toggle_cluster(&mut self, cluster: Cluster, fx: &mut Vec<Effect>) {
		if self.is_empty() {
			return;
		}
		let was_active = self.interaction.filter == Some(Filter::Cluster(cluster));
		self.clear_all(fx);
		if was_active {
			return;
		}
		self.interaction.filter = Some(Filter::Cluster(cluster));
		self.highlight = Highlight::cluster(&self.model, cluster);
		if let Some(&c) = self.model.centroids.get(&cluster) {
			self.camera.look_at(c, CLUSTER_ZOOM);
		}
	}
}

#[derive(Clone, Copy)]
enum FocusZoom {
	AtLeast,
	Exactly,
}
