use std::collections::BTreeMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::camera::Viewport;
use super::config::{
	EDGE_CULL, GRID_MIN_ZOOM, GRID_SPACING, NODE_CULL, PANEL_CULL, PANEL_PADDING, PARTICLE_CULL,
	WATERMARK_CULL,
};
use super::curves::particle_position;
use super::geom::{Point, stable_hash};
use super::interaction::Filter;
use super::model::{EdgeKind, Node, Tier};
use super::palette::{Badge, Cluster, NodeShape, access_color, access_dash, access_label};
use super::state::GraphSession;

const BACKGROUND: &str = "#f7f4f0";
const INK: &str = "rgba(0,30,80,0.06)";
const FONT: &str = "Inter, -apple-system, BlinkMacSystemFont, \"Segoe UI\", sans-serif";
const TOOLTIP_HEIGHT: f64 = 72.0;
const TOOLTIP_MARGIN: f64 = 8.0;

pub fn render(s: &GraphSession, ctx: &CanvasRenderingContext2d) {
	let vp = s.camera.viewport;
	if !vp.is_drawable() {
		return;
	}
	ctx.clear_rect(0.0, 0.0, vp.width, vp.height);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, vp.width, vp.height);

	draw_grid(s, ctx, vp);
	draw_clusters(s, ctx, vp);
	draw_trait_lines(s, ctx);
	draw_edges(s, ctx, vp);
	draw_particles(s, ctx, vp);
	draw_nodes(s, ctx, vp);
	draw_tooltip(s, ctx, vp);
}

fn on_screen(p: Point, margin: f64, vp: Viewport) -> bool {
	p.x >= -margin && p.x <= vp.width + margin && p.y >= -margin && p.y <= vp.height + margin
}

/// True when both points are past the same edge of the expanded viewport.
fn both_off_screen(a: Point, b: Point, margin: f64, vp: Viewport) -> bool {
	(a.x < -margin && b.x < -margin)
		|| (a.y < -margin && b.y < -margin)
		|| (a.x > vp.width + margin && b.x > vp.width + margin)
		|| (a.y > vp.height + margin && b.y > vp.height + margin)
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) {
	let pattern: js_sys::Array = segments.iter().map(|&v| JsValue::from_f64(v)).collect();
	let _ = ctx.set_line_dash(&pattern);
}

fn round_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + r, r);
	ctx.line_to(x + w, y + h - r);
	let _ = ctx.arc_to(x + w, y + h, x + w - r, y + h, r);
	ctx.line_to(x + r, y + h);
	let _ = ctx.arc_to(x, y + h, x, y + h - r, r);
	ctx.line_to(x, y + r);
	let _ = ctx.arc_to(x, y, x + r, y, r);
}

fn trace_shape(ctx: &CanvasRenderingContext2d, c: Point, r: f64, shape: NodeShape) {
	match shape {
		NodeShape::Square => {
			let side = r * 1.6;
			round_rect(ctx, c.x - side / 2.0, c.y - side / 2.0, side, side, r * 0.22);
		}
		NodeShape::Diamond => {
			ctx.move_to(c.x, c.y - r * 1.15);
			ctx.line_to(c.x + r * 0.9, c.y);
			ctx.line_to(c.x, c.y + r * 1.15);
			ctx.line_to(c.x - r * 0.9, c.y);
			ctx.close_path();
		}
		NodeShape::Hexagon => {
			for i in 0..6 {
				let p = Point::polar(c, -PI / 2.0 + i as f64 * PI / 3.0, r);
				if i == 0 {
					ctx.move_to(p.x, p.y);
				} else {
					ctx.line_to(p.x, p.y);
				}
			}
			ctx.close_path();
		}
		NodeShape::Circle => {
			let _ = ctx.arc(c.x, c.y, r, 0.0, 2.0 * PI);
		}
	}
}

fn draw_grid(s: &GraphSession, ctx: &CanvasRenderingContext2d, vp: Viewport) {
	let cam = s.camera.current;
	if cam.zoom <= GRID_MIN_ZOOM {
		return;
	}
	let step = GRID_SPACING * cam.zoom;
	ctx.set_stroke_style_str("rgba(0,30,80,0.04)");
	ctx.set_line_width(1.0);
	let mut x = (-cam.x * cam.zoom + vp.width / 2.0) % step;
	while x < vp.width {
		ctx.begin_path();
		ctx.move_to(x, 0.0);
		ctx.line_to(x, vp.height);
		ctx.stroke();
		x += step;
	}
	let mut y = (-cam.y * cam.zoom + vp.height / 2.0) % step;
	while y < vp.height {
		ctx.begin_path();
		ctx.move_to(0.0, y);
		ctx.line_to(vp.width, y);
		ctx.stroke();
		y += step;
	}
}

/// World-space extent of each cluster's node discs.
fn cluster_extents(s: &GraphSession) -> BTreeMap<Cluster, (Point, Point)> {
	let mut out: BTreeMap<Cluster, (Point, Point)> = BTreeMap::new();
	for node in &s.model.nodes {
		let Some(p) = node.pos else { continue };
		let r = node.radius();
		let (lo, hi) = (Point::new(p.x - r, p.y - r), Point::new(p.x + r, p.y + r));
		out.entry(node.cluster)
			.and_modify(|(min, max)| {
				*min = Point::new(min.x.min(lo.x), min.y.min(lo.y));
				*max = Point::new(max.x.max(hi.x), max.y.max(hi.y));
			})
			.or_insert((lo, hi));
	}
	out
}

fn draw_clusters(s: &GraphSession, ctx: &CanvasRenderingContext2d, vp: Viewport) {
	let zoom = s.camera.zoom();
	let active = match s.interaction.filter {
		Some(Filter::Cluster(c)) => Some(c),
		_ => None,
	};

	for (cluster, (min, max)) in cluster_extents(s) {
		let pad = Point::new(PANEL_PADDING, PANEL_PADDING);
		let p1 = s.camera.world_to_screen(min - pad);
		let p2 = s.camera.world_to_screen(max + pad);
		if p1.x > vp.width + PANEL_CULL || p2.x < -PANEL_CULL || p1.y > vp.height + PANEL_CULL || p2.y < -PANEL_CULL {
			continue;
		}
		let color = cluster.color();
		let on = active == Some(cluster);
		ctx.set_fill_style_str(&color.rgba(if on { 0.1 } else { 0.05 }));
		ctx.begin_path();
		round_rect(ctx, p1.x, p1.y, p2.x - p1.x, p2.y - p1.y, 20.0 * zoom);
		ctx.fill();
		ctx.set_stroke_style_str(&color.rgba(if on { 0.3 } else { 0.15 }));
		ctx.set_line_width(1.5);
		ctx.begin_path();
		round_rect(ctx, p1.x, p1.y, p2.x - p1.x, p2.y - p1.y, 20.0 * zoom);
		ctx.stroke();
	}

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_font(&format!("800 {}px {FONT}", (90.0 * zoom).max(32.0)));
	for (&cluster, &centroid) in &s.model.centroids {
		let sp = s.camera.world_to_screen(centroid);
		if !on_screen(sp, WATERMARK_CULL, vp) {
			continue;
		}
		let on = active == Some(cluster);
		ctx.set_fill_style_str(&cluster.color().rgba(if on { 0.18 } else { 0.09 }));
		let _ = ctx.fill_text(&cluster.label().to_uppercase(), sp.x, sp.y);
	}

	let radius = 500.0 * zoom;
	for (&cluster, &centroid) in &s.model.centroids {
		let sp = s.camera.world_to_screen(centroid);
		if !on_screen(sp, radius, vp) {
			continue;
		}
		let Ok(glow) = ctx.create_radial_gradient(sp.x, sp.y, 0.0, sp.x, sp.y, radius) else {
			continue;
		};
		let color = cluster.color();
		let _ = glow.add_color_stop(0.0, &color.rgba(if active == Some(cluster) { 0.06 } else { 0.02 }));
		let _ = glow.add_color_stop(1.0, &color.rgba(0.0));
		ctx.begin_path();
		let _ = ctx.arc(sp.x, sp.y, radius, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		ctx.set_fill_style(&glow);
		ctx.fill();
	}
}

fn draw_trait_lines(s: &GraphSession, ctx: &CanvasRenderingContext2d) {
	if s.trait_lines.is_empty() {
		return;
	}
	let zoom = s.camera.zoom();
	ctx.set_stroke_style_str("rgba(0,30,80,0.08)");
	ctx.set_line_width(0.8 * zoom);
	set_dash(ctx, &[4.0 * zoom, 6.0 * zoom]);
	for &(a, b) in &s.trait_lines {
		let (Some(pa), Some(pb)) = (s.model.position(a), s.model.position(b)) else {
			continue;
		};
		let (p1, p2) = (s.camera.world_to_screen(pa), s.camera.world_to_screen(pb));
		ctx.begin_path();
		ctx.move_to(p1.x, p1.y);
		ctx.line_to(p2.x, p2.y);
		ctx.stroke();
	}
	set_dash(ctx, &[]);
}

fn draw_edges(s: &GraphSession, ctx: &CanvasRenderingContext2d, vp: Viewport) {
	let zoom = s.camera.zoom();
	let any = s.highlight.is_active();

	for (i, edge) in s.model.edges.iter().enumerate() {
		let (Some(a), Some(b)) = (s.model.position(edge.key.source), s.model.position(edge.key.target)) else {
			continue;
		};
		let (p1, p2) = (s.camera.world_to_screen(a), s.camera.world_to_screen(b));
		if both_off_screen(p1, p2, EDGE_CULL, vp) {
			continue;
		}

		let control = s.curves[i]
			.map(|c| s.camera.world_to_screen(c))
			.unwrap_or_else(|| p1.midpoint(p2));
		let trace = || {
			ctx.begin_path();
			ctx.move_to(p1.x, p1.y);
			ctx.quadratic_curve_to(control.x, control.y, p2.x, p2.y);
		};
		let color = s.model.nodes[edge.key.source].cluster.color();
		let conn = edge.kind == EdgeKind::Conn;
		if conn {
			set_dash(ctx, &[4.0 * zoom, 4.0 * zoom]);
		}

		trace();
		if !any {
			ctx.set_stroke_style_str(&color.rgba(if conn { 0.35 } else { 0.55 }));
			ctx.set_line_width((if conn { 1.5 } else { 2.5 }) * zoom);
			ctx.stroke();
		} else if s.highlight.has_edge(edge.key) {
			ctx.set_stroke_style_str(&color.rgba(0.15));
			ctx.set_line_width(8.0 * zoom);
			ctx.stroke();
			trace();
			ctx.set_stroke_style_str(&color.rgba(0.8));
			ctx.set_line_width(2.5 * zoom);
			ctx.stroke();
		} else {
			ctx.set_stroke_style_str(INK);
			ctx.set_line_width(0.8 * zoom);
			ctx.stroke();
		}

		if conn {
			set_dash(ctx, &[]);
		}
	}
}

fn draw_particles(s: &GraphSession, ctx: &CanvasRenderingContext2d, vp: Viewport) {
	let zoom = s.camera.zoom();
	let any = s.highlight.is_active();

	for particle in &s.particles {
		let Some(world) = particle_position(&s.model, &s.curves, particle) else {
			continue;
		};
		let sp = s.camera.world_to_screen(world);
		if !on_screen(sp, PARTICLE_CULL, vp) {
			continue;
		}
		let edge = s.model.edges[particle.edge];
		let color = s.model.nodes[edge.key.source].cluster.color();
		let lit = any && s.highlight.has_edge(edge.key);
		let (alpha, size) = match (any, lit) {
			(false, _) => (0.4, 1.5),
			(true, true) => (0.9, 3.0),
			(true, false) => (0.05, 0.8),
		};
		ctx.begin_path();
		let _ = ctx.arc(sp.x, sp.y, size * zoom, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&color.rgba(alpha));
		ctx.fill();
		if lit {
			ctx.begin_path();
			let _ = ctx.arc(sp.x, sp.y, 6.0 * zoom, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&color.rgba(0.12));
			ctx.fill();
		}
	}
}

/// Breathing scale for round-the-clock services; each node gets its own phase.
pub fn pulse_scale(node: &Node, elapsed: f64, dim: bool) -> f64 {
	if !node.around_the_clock || dim {
		return 1.0;
	}
	1.0 + 0.03 * (elapsed * 2.0 + stable_hash(&node.id) as f64 * 0.1).sin()
}

/// Label opacity by tier and zoom; emphasised nodes are always fully labelled.
pub fn label_alpha(tier: Tier, zoom: f64, emphasized: bool) -> f64 {
	if emphasized {
		return 1.0;
	}
	match tier {
		Tier::Hub if zoom > 0.12 => 1.0,
		Tier::Hub => 0.7,
		Tier::Operational if zoom > 0.32 => 0.9,
		Tier::Operational if zoom > 0.22 => 0.4,
		Tier::Leaf if zoom > 0.45 => 0.8,
		Tier::Leaf if zoom > 0.32 => 0.3,
		_ => 0.0,
	}
}

pub fn label_font_size(tier: Tier, zoom: f64) -> f64 {
	match tier {
		Tier::Hub => (26.0 * zoom).max(15.0),
		Tier::Operational => (18.0 * zoom).max(12.0),
		Tier::Leaf => (14.0 * zoom).max(10.0),
	}
}

pub fn sub_label(node: &Node, zoom: f64, emphasized: bool) -> Option<String> {
	let visible = emphasized || (node.tier == Tier::Hub && zoom > 0.3) || zoom > 0.5;
	if !visible {
		None
	} else if node.around_the_clock {
		Some("24/7".into())
	} else if node.downstream > 0 {
		Some(format!("{} downstream", node.downstream))
	} else {
		None
	}
}

/// Badge radius and centres for `count` badges above a node of screen radius `pr`.
pub fn badge_slots(center: Point, pr: f64, zoom: f64, count: usize) -> (f64, Vec<Point>) {
	let r = (pr * 0.18).clamp(4.0, 7.0);
	let gap = r * 2.8;
	let x0 = center.x - (count.saturating_sub(1)) as f64 * gap / 2.0;
	let y = center.y - pr - r - 3.0 * zoom;
	(r, (0..count).map(|i| Point::new(x0 + i as f64 * gap, y)).collect())
}

fn draw_badge_icon(ctx: &CanvasRenderingContext2d, c: Point, r: f64, badge: Badge) {
	ctx.set_stroke_style_str("#fff");
	ctx.set_fill_style_str("#fff");
	ctx.set_line_width((r * 0.4).max(1.0));
	ctx.set_line_cap("round");
	match badge {
		Badge::AroundTheClock => {
			ctx.begin_path();
			let _ = ctx.arc(c.x, c.y, r * 0.85, 0.0, 2.0 * PI);
			ctx.stroke();
			ctx.begin_path();
			ctx.move_to(c.x, c.y);
			ctx.line_to(c.x, c.y - r * 0.6);
			ctx.move_to(c.x, c.y);
			ctx.line_to(c.x + r * 0.45, c.y + r * 0.1);
			ctx.stroke();
		}
		Badge::Transport => {
			ctx.begin_path();
			ctx.move_to(c.x, c.y - r);
			ctx.line_to(c.x, c.y + r * 0.6);
			ctx.move_to(c.x - r * 0.5, c.y - r * 0.2);
			ctx.line_to(c.x, c.y - r);
			ctx.line_to(c.x + r * 0.5, c.y - r * 0.2);
			ctx.stroke();
		}
		Badge::Referral => {
			ctx.begin_path();
			let _ = ctx.arc(c.x, c.y - r * 0.3, r * 0.45, PI, 0.0);
			ctx.stroke();
			ctx.begin_path();
			ctx.rect(c.x - r * 0.55, c.y - r * 0.05, r * 1.1, r * 0.9);
			ctx.fill();
		}
		Badge::Pilot => {
			ctx.begin_path();
			ctx.move_to(c.x, c.y - r * 0.8);
			ctx.line_to(c.x, c.y + r * 0.15);
			ctx.stroke();
			ctx.begin_path();
			let _ = ctx.arc(c.x, c.y + r * 0.6, r * 0.22, 0.0, 2.0 * PI);
			ctx.fill();
		}
	}
	ctx.set_line_cap("butt");
}

fn draw_nodes(s: &GraphSession, ctx: &CanvasRenderingContext2d, vp: Viewport) {
	let zoom = s.camera.zoom();
	let any = s.highlight.is_active();

	for (idx, node) in s.model.nodes.iter().enumerate() {
		let Some(pos) = node.pos else { continue };
		let sp = s.camera.world_to_screen(pos);
		if !on_screen(sp, NODE_CULL, vp) {
			continue;
		}
		let lit = s.highlight.has_node(idx);
		let dim = any && !lit;
		let hovered = s.interaction.hovered == Some(idx);
		let selected = s.interaction.selected == Some(idx);
		let color = node.cluster.color();
		let pr = node.radius() * zoom * pulse_scale(node, s.elapsed, dim);

		if !dim {
			let shadow_r = pr * 1.6;
			let cy = sp.y + pr * 0.15;
			let alpha = if lit {
				0.12
			} else if node.tier == Tier::Hub {
				0.08
			} else {
				0.04
			};
			if let Ok(grd) = ctx.create_radial_gradient(sp.x, cy, pr * 0.3, sp.x, cy, shadow_r) {
				let _ = grd.add_color_stop(0.0, &color.rgba(alpha));
				let _ = grd.add_color_stop(1.0, &color.rgba(0.0));
				ctx.begin_path();
				let _ = ctx.arc(sp.x, cy, shadow_r, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&grd);
				ctx.fill();
			}

			ctx.begin_path();
			trace_shape(ctx, sp, pr + 1.5 * zoom, node.shape);
			ctx.set_fill_style_str("#fff");
			ctx.fill();
		}

		let fill_alpha = if dim {
			0.2
		} else if lit || hovered {
			1.0
		} else {
			0.88
		};
		ctx.begin_path();
		trace_shape(ctx, sp, pr, node.shape);
		ctx.set_fill_style_str(&color.rgba(fill_alpha));
		ctx.fill();

		if !dim && pr > 3.0 {
			if let Some([on, off]) = access_dash(node.status) {
				set_dash(ctx, &[on * zoom, off * zoom]);
			}
			ctx.begin_path();
			trace_shape(ctx, sp, pr, node.shape);
			ctx.set_stroke_style_str(&access_color(node.status).rgba(if lit { 0.95 } else { 0.75 }));
			ctx.set_line_width((if node.tier == Tier::Hub { 3.5 } else { 2.5 }) * zoom);
			ctx.stroke();
			set_dash(ctx, &[]);
		}

		if !dim && node.tier == Tier::Hub && pr > 5.0 {
			ctx.begin_path();
			trace_shape(ctx, sp, pr + 4.0 * zoom, node.shape);
			ctx.set_stroke_style_str(&color.rgba(if lit { 0.4 } else { 0.2 }));
			ctx.set_line_width(1.5 * zoom);
			ctx.stroke();
		}

		if selected {
			let pulse = 0.5 + 0.5 * (s.elapsed * 4.0).sin();
			ctx.begin_path();
			trace_shape(ctx, sp, pr + 6.0 * zoom + pulse * 4.0 * zoom, node.shape);
			ctx.set_stroke_style_str(&color.rgba(0.4 - pulse * 0.3));
			ctx.set_line_width(2.0 * zoom);
			ctx.stroke();
		} else if hovered {
			ctx.begin_path();
			trace_shape(ctx, sp, pr + 3.0 * zoom, node.shape);
			ctx.set_stroke_style_str("rgba(0,30,80,0.3)");
			ctx.set_line_width(1.5 * zoom);
			ctx.stroke();
		}

		if dim {
			continue;
		}

		let badges = node.badges();
		if pr > 8.0 && !badges.is_empty() {
			let (br, slots) = badge_slots(sp, pr, zoom, badges.len());
			for (&badge, c) in badges.iter().zip(slots) {
				ctx.begin_path();
				let _ = ctx.arc(c.x, c.y, br + 1.5, 0.0, 2.0 * PI);
				ctx.set_fill_style_str("#fff");
				ctx.fill();
				ctx.begin_path();
				let _ = ctx.arc(c.x, c.y, br, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(&badge.color().css());
				ctx.fill();
				draw_badge_icon(ctx, c, br * 0.5, badge);
			}
		}

		draw_label(ctx, node, sp, pr, zoom, lit || hovered || selected);
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, node: &Node, sp: Point, pr: f64, zoom: f64, emphasized: bool) {
	let la = label_alpha(node.tier, zoom, emphasized);
	if la <= 0.0 {
		return;
	}
	let fs = label_font_size(node.tier, zoom);
	let weight = if node.tier == Tier::Hub { 700 } else { 500 };
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	ctx.set_font(&format!("{weight} {fs}px {FONT}"));

	let y = sp.y + pr + 6.0 * zoom;
	let width = ctx.measure_text(&node.label).map(|m| m.width()).unwrap_or(0.0);
	if la > 0.2 && width > 0.0 {
		let (px, py) = (8.0, 3.0);
		let (x0, w, h) = (sp.x - width / 2.0 - px, width + px * 2.0, fs + py * 2.0);
		ctx.set_fill_style_str(&format!("rgba(255,255,255,{})", la * 0.88));
		ctx.begin_path();
		round_rect(ctx, x0, y - py, w, h, 5.0);
		ctx.fill();
		ctx.set_stroke_style_str(&format!("rgba(0,30,80,{})", la * 0.1));
		ctx.set_line_width(0.5);
		ctx.begin_path();
		round_rect(ctx, x0, y - py, w, h, 5.0);
		ctx.stroke();
	}
	ctx.set_fill_style_str(&format!("rgba(20,25,50,{la})"));
	let _ = ctx.fill_text(&node.label, sp.x, y);

	if let Some(sub) = sub_label(node, zoom, emphasized) {
		ctx.set_font(&format!("500 {}px monospace", (12.0 * zoom).max(9.0)));
		ctx.set_fill_style_str(&format!("rgba(80,90,120,{})", la * 0.6));
		let _ = ctx.fill_text(&sub, sp.x, y + fs + 4.0);
	}
}

/// Name, hours and access/phone lines of the hover card.
pub fn tooltip_lines(node: &Node) -> [String; 3] {
	let mut hours = node.hours.clone();
	if !node.around_the_clock && node.service.hours.schedule.is_some() {
		hours.push_str(if node.open_now { " \u{b7} Open now" } else { " \u{b7} Closed now" });
	}
	let mut access = access_label(node.status).to_string();
	if let Some(phone) = &node.service.phone {
		access.push_str("  \u{b7}  ");
		access.push_str(phone);
	}
	[node.service.name.clone(), hours, access]
}

/// Top-left corner of a `width` x `height` card over a node, kept inside the viewport.
pub fn tooltip_origin(anchor: Point, node_r: f64, width: f64, height: f64, vp: Viewport) -> Point {
	let mut x = anchor.x - width / 2.0;
	let mut y = anchor.y - node_r - height - 12.0;
	if x < TOOLTIP_MARGIN {
		x = TOOLTIP_MARGIN;
	}
	if x + width > vp.width - TOOLTIP_MARGIN {
		x = vp.width - TOOLTIP_MARGIN - width;
	}
	if y < TOOLTIP_MARGIN {
		y = anchor.y + node_r + 12.0;
	}
	Point::new(x, y)
}

fn draw_tooltip(s: &GraphSession, ctx: &CanvasRenderingContext2d, vp: Viewport) {
	if s.interaction.selected.is_some() {
		return;
	}
	let Some(idx) = s.interaction.hovered else {
		return;
	};
	let node = &s.model.nodes[idx];
	let Some(pos) = node.pos else { return };
	let sp = s.camera.world_to_screen(pos);
	let r = node.radius() * s.camera.zoom();
	let color = node.cluster.color();
	let [name, hours, access] = tooltip_lines(node);

	let bold = format!("700 15px {FONT}");
	let regular = format!("400 13px {FONT}");
	let measure = |text: &str| ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
	ctx.set_font(&bold);
	let name_w = measure(&name);
	ctx.set_font(&regular);
	let width = name_w.max(measure(&hours)).max(measure(&access)) + 32.0;
	let o = tooltip_origin(sp, r, width, TOOLTIP_HEIGHT, vp);

	ctx.set_shadow_color("rgba(0,20,60,0.12)");
	ctx.set_shadow_blur(16.0);
	ctx.set_shadow_offset_y(4.0);
	ctx.set_fill_style_str("rgba(255,255,255,0.97)");
	ctx.begin_path();
	round_rect(ctx, o.x, o.y, width, TOOLTIP_HEIGHT, 10.0);
	ctx.fill();
	ctx.set_shadow_blur(0.0);
	ctx.set_shadow_offset_y(0.0);

	ctx.set_fill_style_str(&color.css());
	ctx.begin_path();
	round_rect(ctx, o.x, o.y, 4.0, TOOLTIP_HEIGHT, 2.0);
	ctx.fill();
	ctx.set_stroke_style_str("rgba(0,30,80,0.1)");
	ctx.set_line_width(1.0);
	ctx.begin_path();
	round_rect(ctx, o.x, o.y, width, TOOLTIP_HEIGHT, 10.0);
	ctx.stroke();

	let tx = o.x + 18.0;
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	ctx.set_font(&bold);
	ctx.set_fill_style_str("#1a1e32");
	let _ = ctx.fill_text(&name, tx, o.y + 12.0);
	ctx.set_font(&regular);
	ctx.set_fill_style_str("rgba(40,50,80,0.6)");
	let _ = ctx.fill_text(&hours, tx, o.y + 32.0);
	ctx.set_fill_style_str(&color.rgba(0.85));
	let _ = ctx.fill_text(&access, tx, o.y + 50.0);
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{build, svc};
	use super::*;
	use crate::services::{HoursKind, Slot};

	#[test]
	fn labels_fade_in_by_tier() {
		assert_eq!(label_alpha(Tier::Hub, 0.1, false), 0.7);
		assert_eq!(label_alpha(Tier::Hub, 0.2, false), 1.0);
		assert_eq!(label_alpha(Tier::Operational, 0.2, false), 0.0);
		assert_eq!(label_alpha(Tier::Operational, 0.25, false), 0.4);
		assert_eq!(label_alpha(Tier::Operational, 0.4, false), 0.9);
		assert_eq!(label_alpha(Tier::Leaf, 0.4, false), 0.3);
		assert_eq!(label_alpha(Tier::Leaf, 0.3, false), 0.0);
		assert_eq!(label_alpha(Tier::Leaf, 0.12, true), 1.0);
		assert_eq!(label_font_size(Tier::Hub, 0.2), 15.0);
		assert_eq!(label_font_size(Tier::Leaf, 1.0), 14.0);
	}

	#[test]
	fn sub_labels_need_zoom_or_emphasis() {
		let model = build(vec![svc("R", None, &[]), svc("C", Some("R"), &[])]);
		let root = &model.nodes[0];
		assert_eq!(sub_label(root, 0.2, false), None);
		assert_eq!(sub_label(root, 0.2, true).as_deref(), Some("1 downstream"));
		assert_eq!(sub_label(&model.nodes[1], 0.9, false), None);
	}

	#[test]
	fn badges_sit_centred_above_the_node() {
		let (r, slots) = badge_slots(Point::new(100.0, 100.0), 50.0, 1.0, 3);
		assert_eq!(r, 7.0);
		assert_eq!(slots.len(), 3);
		assert_eq!(slots[1].x, 100.0);
		assert!((slots[2].x - slots[1].x - 7.0 * 2.8).abs() < 1e-9);
		assert_eq!(slots[0].y, 100.0 - 50.0 - 7.0 - 3.0);
		let (small, _) = badge_slots(Point::default(), 10.0, 1.0, 1);
		assert_eq!(small, 4.0);
	}

	#[test]
	fn edges_cull_only_when_both_ends_leave_one_side() {
		let vp = Viewport {
			width: 800.0,
			height: 600.0,
		};
		let far_left = Point::new(-500.0, 100.0);
		assert!(both_off_screen(far_left, Point::new(-300.0, 900.0), EDGE_CULL, vp));
		assert!(!both_off_screen(far_left, Point::new(400.0, 300.0), EDGE_CULL, vp));
		// spans the whole viewport
		assert!(!both_off_screen(far_left, Point::new(1500.0, 100.0), EDGE_CULL, vp));
	}

	#[test]
	fn tooltip_stays_inside_viewport() {
		let vp = Viewport {
			width: 400.0,
			height: 300.0,
		};
		let o = tooltip_origin(Point::new(5.0, 20.0), 10.0, 200.0, TOOLTIP_HEIGHT, vp);
		assert_eq!(o.x, TOOLTIP_MARGIN);
		assert_eq!(o.y, 20.0 + 10.0 + 12.0);
		let o = tooltip_origin(Point::new(395.0, 200.0), 10.0, 200.0, TOOLTIP_HEIGHT, vp);
		assert_eq!(o.x, 400.0 - TOOLTIP_MARGIN - 200.0);
		assert_eq!(o.y, 200.0 - 10.0 - TOOLTIP_HEIGHT - 12.0);
	}

	#[test]
	fn tooltip_reports_open_state_for_scheduled_services() {
		let mut a = svc("a", None, &[]);
		a.name = "Drop-in Centre".into();
		a.phone = Some("780-555-0101".into());
		a.hours.schedule = Some(vec![Slot {
			days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
				.map(String::from)
				.to_vec(),
			open: 900,
			close: 1700,
		}]);
		let mut b = svc("b", None, &[]);
		b.hours.kind = HoursKind::AroundTheClock;
		let model = build(vec![a, b]);

		let [name, hours, access] = tooltip_lines(&model.nodes[0]);
		assert_eq!(name, "Drop-in Centre");
		assert_eq!(hours, "Mon\u{2013}Fri 9am\u{2013}5pm \u{b7} Open now");
		assert!(access.ends_with("780-555-0101"));
		assert_eq!(tooltip_lines(&model.nodes[1])[1], "Open 24/7");
	}

	#[test]
	fn pulse_only_for_lit_round_the_clock_nodes() {
		let mut a = svc("a", None, &[]);
		a.hours.kind = HoursKind::AroundTheClock;
		let model = build(vec![a, svc("b", None, &[])]);
		assert_eq!(pulse_scale(&model.nodes[1], 3.0, false), 1.0);
		assert_eq!(pulse_scale(&model.nodes[0], 3.0, true), 1.0);
		for t in [0.0, 0.7, 12.5] {
			let s = pulse_scale(&model.nodes[0], t, false);
			assert!((0.97..=1.03).contains(&s));
		}
	}
}
