//! Overlay chrome around the canvas: detail panel, filter buttons, cluster
//! nav, search box and legend. Built with plain DOM calls; every clickable
//! control carries a `data-*` attribute that [`control_event`] turns back
//! into an [`InputEvent`].

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement};

use super::detail::{DetailView, Fact, FactIcon, ServiceRow};
use super::interaction::{Filter, InputEvent, Interaction};
use super::model::GraphModel;
use super::palette::{Badge, Cluster, access_color, access_label};
use super::traits::Trait;
use crate::error::GraphError;
use crate::services::Accessibility;

/// Attributes checked, innermost match wins.
pub const CONTROL_SELECTOR: &str = "[data-id],[data-trait],[data-cluster],[data-action]";

fn el(document: &Document, tag: &str, class: &str) -> Result<Element, GraphError> {
	let e = document.create_element(tag)?;
	if !class.is_empty() {
		e.set_class_name(class);
	}
	Ok(e)
}

fn text(document: &Document, tag: &str, class: &str, content: &str) -> Result<Element, GraphError> {
	let e = el(document, tag, class)?;
	e.set_text_content(Some(content));
	Ok(e)
}

/// Map a control's `data-*` attribute to the event it triggers.
pub fn control_event(attr: &str, value: &str) -> Option<InputEvent> {
	match attr {
		"data-id" => Some(InputEvent::SelectById(value.to_string())),
		"data-trait" => Trait::from_label(value).map(InputEvent::ToggleTrait),
		"data-cluster" => Cluster::from_key(value).map(InputEvent::ToggleCluster),
		"data-action" => match value {
			"reset" => Some(InputEvent::Reset),
			"close" => Some(InputEvent::Clear),
			_ => None,
		},
		_ => None,
	}
}

/// Resolve a click target to a control event by walking up to the nearest control.
pub fn event_for_target(target: &Element) -> Option<InputEvent> {
	let control = target.closest(CONTROL_SELECTOR).ok().flatten()?;
	["data-id", "data-trait", "data-cluster", "data-action"]
		.into_iter()
		.find_map(|attr| control.get_attribute(attr).and_then(|v| control_event(attr, &v)))
}

pub struct Overlay {
	document: Document,
	pub detail: Element,
	content: Element,
	pub filters: Element,
	pub nav: Element,
	pub search: HtmlInputElement,
	legend: Element,
	trait_buttons: Vec<(Trait, Element)>,
	cluster_buttons: Vec<(Cluster, Element)>,
}

impl Overlay {
	pub fn build(document: &Document, root: &Element, model: &GraphModel) -> Result<Self, GraphError> {
		let detail = el(document, "div", "cg-detail")?;
		let panel = el(document, "div", "dp")?;
		let close = text(document, "button", "dp-close", "\u{2715}")?;
		close.set_attribute("aria-label", "Close")?;
		close.set_attribute("data-action", "close")?;
		let content = el(document, "div", "dp-content")?;
		panel.append_child(&close)?;
		panel.append_child(&content)?;
		detail.append_child(&panel)?;
		root.append_child(&detail)?;

		let filters = el(document, "div", "cg-filters")?;
		let mut trait_buttons = Vec::new();
		for t in Trait::ALL {
			let btn = text(document, "button", "fb", t.label())?;
			btn.set_attribute("data-trait", t.label())?;
			let count = text(document, "span", "fc", &model.trait_members(t).len().to_string())?;
			btn.append_child(&count)?;
			filters.append_child(&btn)?;
			trait_buttons.push((t, btn));
		}
		root.append_child(&filters)?;

		let legend = build_legend(document)?;
		root.append_child(&legend)?;

		let search_box = el(document, "div", "cg-search")?;
		let search: HtmlInputElement = document
			.create_element("input")?
			.dyn_into()
			.map_err(|_| GraphError::Dom("search box is not an input".into()))?;
		search.set_type("text");
		search.set_placeholder("Search services\u{2026}");
		search_box.append_child(&search)?;
		root.append_child(&search_box)?;

		let nav = el(document, "nav", "cg-nav")?;
		let mut cluster_buttons = Vec::new();
		for cluster in model.used_clusters() {
			let btn = el(document, "button", "nb")?;
			btn.set_attribute("data-cluster", cluster.key())?;
			btn.set_attribute("style", &format!("--c:{}", cluster.color().css()))?;
			btn.append_child(&el(document, "span", "d")?.into())?;
			btn.append_child(&document.create_text_node(cluster.label()))?;
			nav.append_child(&btn)?;
			cluster_buttons.push((cluster, btn));
		}
		nav.append_child(&el(document, "div", "sep")?.into())?;
		let reset = text(document, "button", "nr", "\u{27f3} Reset")?;
		reset.set_attribute("data-action", "reset")?;
		nav.append_child(&reset)?;
		root.append_child(&nav)?;

		Ok(Self {
			document: document.clone(),
			detail,
			content,
			filters,
			nav,
			search,
			legend,
			trait_buttons,
			cluster_buttons,
		})
	}

	/// Reflect the active filter on the trait and cluster buttons.
	pub fn sync_controls(&self, interaction: &Interaction) {
		for (t, btn) in &self.trait_buttons {
			let _ = btn
				.class_list()
				.toggle_with_force("on", interaction.filter == Some(Filter::Trait(*t)));
		}
		for (c, btn) in &self.cluster_buttons {
			let _ = btn
				.class_list()
				.toggle_with_force("on", interaction.filter == Some(Filter::Cluster(*c)));
		}
	}

	pub fn clear_search(&self) {
		self.search.set_value("");
	}

	pub fn hide_detail(&self) {
		let _ = self.detail.class_list().remove_1("show");
		let _ = self.legend.class_list().remove_1("pushed");
	}

	pub fn show_detail(&self, view: &DetailView) -> Result<(), GraphError> {
		let d = &self.document;
		self.content.set_text_content(None);
		let color = view.cluster.color();

		let head = el(d, "div", "dp-head")?;
		let bar = el(d, "div", "dp-bar")?;
		bar.set_attribute("style", &format!("background:{}", color.css()))?;
		let titles = el(d, "div", "")?;
		titles.append_child(&text(d, "div", "dp-name", &view.name)?.into())?;
		titles.append_child(&text(d, "div", "dp-via", &view.via)?.into())?;
		head.append_child(&bar)?;
		head.append_child(&titles)?;
		self.content.append_child(&head)?;

		let badges = el(d, "div", "dp-badges")?;
		badges.append_child(&tinted(d, "span", "bdg", access_label(view.access), access_color(view.access).css())?.into())?;
		if view.downstream > 0 {
			badges.append_child(&tinted(d, "span", "bdg", &format!("{} downstream", view.downstream), color.css())?.into())?;
		}
		self.content.append_child(&badges)?;

		if let Some(desc) = &view.description {
			self.content.append_child(&text(d, "div", "dp-desc", desc)?.into())?;
		}

		if !view.facts.is_empty() {
			let list = el(d, "div", "dp-facts")?;
			for fact in &view.facts {
				list.append_child(&fact_row(d, fact)?.into())?;
			}
			self.content.append_child(&section(d, "Key Facts", &list)?.into())?;
		}

		if !view.traits.is_empty() {
			let list = el(d, "div", "")?;
			for summary in &view.traits {
				let mut line = format!("{} services", summary.total);
				if summary.cross_cluster > 0 {
					line.push_str(&format!(" \u{b7} {} cross-cluster", summary.cross_cluster));
				}
				let row = el(d, "div", "dp-trait")?;
				row.set_attribute("data-trait", summary.kind.label())?;
				row.append_child(&text(d, "b", "", summary.kind.label())?.into())?;
				row.append_child(&d.create_text_node(&format!(" \u{2014} {line} \u{2192}")))?;
				list.append_child(&row)?;
			}
			self.content.append_child(&section(d, "Shared Traits", &list)?.into())?;
		}

		let path = el(d, "div", "dp-path")?;
		for (i, chip) in view.path.iter().enumerate() {
			if i > 0 {
				path.append_child(&text(d, "span", "parr", "\u{2192}")?.into())?;
			}
			let class = if chip.current { "pchip cur" } else { "pchip" };
			let span = text(d, "span", class, &chip.label)?;
			span.set_attribute("data-id", &chip.id)?;
			if chip.current {
				span.set_attribute("style", &format!("--c:{}", color.css()))?;
			}
			path.append_child(&span)?;
		}
		self.content.append_child(&section(d, "Path from Entry", &path)?.into())?;

		for (title, rows) in [("Downstream Services", &view.children), ("Sibling Services", &view.siblings)] {
			if rows.is_empty() {
				continue;
			}
			let list = el(d, "div", "dp-kids")?;
			for row in rows {
				list.append_child(&service_row(d, row)?.into())?;
			}
			self.content.append_child(&section(d, &format!("{title} ({})", rows.len()), &list)?.into())?;
		}

		let _ = self.detail.class_list().add_1("show");
		let _ = self.legend.class_list().add_1("pushed");
		Ok(())
	}
}

fn tinted(d: &Document, tag: &str, class: &str, content: &str, css: String) -> Result<Element, GraphError> {
	let e = text(d, tag, class, content)?;
	e.set_attribute("style", &format!("--c:{css}"))?;
	Ok(e)
}

fn section(d: &Document, title: &str, body: &Element) -> Result<Element, GraphError> {
	let s = el(d, "div", "dp-section")?;
	s.append_child(&text(d, "div", "dp-stitle", title)?.into())?;
	s.append_child(body)?;
	Ok(s)
}

fn icon_class(icon: FactIcon) -> &'static str {
	match icon {
		FactIcon::Clock => "fi fi-clock",
		FactIcon::Phone => "fi fi-phone",
		FactIcon::Truck => "fi fi-truck",
		FactIcon::NoTransport => "fi fi-none",
		FactIcon::Warning => "fi fi-warn",
		FactIcon::Pin => "fi fi-pin",
	}
}

fn fact_row(d: &Document, fact: &Fact) -> Result<Element, GraphError> {
	let row = el(d, "div", "fa")?;
	row.append_child(&el(d, "div", icon_class(fact.icon))?.into())?;
	let body = el(d, "div", "ft")?;
	match fact.title {
		Some(title) => {
			body.append_child(&text(d, "b", "", &format!("{title}:"))?.into())?;
			body.append_child(&d.create_text_node(" "))?;
			match &fact.href {
				Some(href) => {
					let link = text(d, "a", "", &fact.text)?;
					link.set_attribute("href", href)?;
					body.append_child(&link)?;
				}
				None => {
					body.append_child(&d.create_text_node(&fact.text))?;
				}
			}
		}
		None => {
			body.append_child(&text(d, "b", "", &fact.text)?.into())?;
		}
	}
	row.append_child(&body)?;
	Ok(row)
}

fn service_row(d: &Document, row: &ServiceRow) -> Result<Element, GraphError> {
	let e = el(d, "div", "kid-row")?;
	e.set_attribute("data-id", &row.id)?;
	let dot = el(d, "div", "kid-dot")?;
	dot.set_attribute("style", &format!("background:{}", access_color(row.access).css()))?;
	let info = el(d, "div", "kid-info")?;
	info.append_child(&text(d, "div", "kid-name", &row.label)?.into())?;
	info.append_child(&text(d, "div", "kid-sub", &row.sub)?.into())?;
	e.append_child(&dot)?;
	e.append_child(&info)?;
	e.append_child(&text(d, "div", "kid-arrow", "\u{2192}")?.into())?;
	Ok(e)
}

fn legend_row(d: &Document, swatch_class: &str, style: &str, label: &str) -> Result<Element, GraphError> {
	let row = el(d, "div", "lr")?;
	let swatch = el(d, "div", swatch_class)?;
	if !style.is_empty() {
		swatch.set_attribute("style", style)?;
	}
	row.append_child(&swatch)?;
	row.append_child(&d.create_text_node(label))?;
	Ok(row)
}

fn build_legend(d: &Document) -> Result<Element, GraphError> {
	let legend = el(d, "div", "cg-legend")?;
	legend.append_child(&text(d, "div", "lt", "Border = Access Level")?.into())?;
	for access in [
		Accessibility::Public,
		Accessibility::PublicCriteria,
		Accessibility::Restricted,
		Accessibility::Unknown,
		Accessibility::System,
	] {
		let css = access_color(access).css();
		let (class, style) = match access {
			Accessibility::Restricted => ("lp lp-dash", format!("border-color:{css}")),
			Accessibility::Unknown => ("lp lp-dot", format!("border-color:{css}")),
			_ => ("lp", format!("background:{css}")),
		};
		legend.append_child(&legend_row(d, class, &style, access_label(access))?.into())?;
	}

	legend.append_child(&text(d, "div", "lt lt2", "Badges = Properties")?.into())?;
	for badge in [Badge::AroundTheClock, Badge::Transport, Badge::Referral, Badge::Pilot] {
		let style = format!("background:{}", badge.color().css());
		legend.append_child(&legend_row(d, "lb", &style, badge.label())?.into())?;
	}

	legend.append_child(&text(d, "div", "lt lt2", "Shape = Type")?.into())?;
	for (class, label) in [
		("ls ls-circle", "Mobile / Transport"),
		("ls ls-square", "Physical Location"),
		("ls ls-diamond", "Crisis Line"),
		("ls ls-hex", "Entry Point"),
	] {
		legend.append_child(&legend_row(d, class, "", label)?.into())?;
	}
	Ok(legend)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn controls_map_to_events() {
		assert_eq!(
			control_event("data-id", "shelter-1"),
			Some(InputEvent::SelectById("shelter-1".into()))
		);
		assert_eq!(
			control_event("data-trait", "24/7"),
			Some(InputEvent::ToggleTrait(Trait::AroundTheClock))
		);
		assert_eq!(
			control_event("data-cluster", "211+3"),
			Some(InputEvent::ToggleCluster(Cluster::Crisis211))
		);
		assert_eq!(control_event("data-action", "reset"), Some(InputEvent::Reset));
		assert_eq!(control_event("data-action", "close"), Some(InputEvent::Clear));
		assert_eq!(control_event("data-trait", "Bogus"), None);
		assert_eq!(control_event("data-cluster", "direct"), None);
		assert_eq!(control_event("href", "x"), None);
	}
}
