//! Content of the side panel for a selected node, as plain data.

use super::model::{GraphModel, NodeIdx};
use super::palette::{Cluster, access_label};
use super::traits::Trait;
use crate::services::{Accessibility, hours};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactIcon {
	Clock,
	Phone,
	Truck,
	NoTransport,
	Warning,
	Pin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fact {
	pub icon: FactIcon,
	/// Bold prefix such as "Hours"; the pilot note has none.
	pub title: Option<&'static str>,
	pub text: String,
	pub href: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitSummary {
	pub kind: Trait,
	pub total: usize,
	/// Members other than this node that sit in another cluster.
	pub cross_cluster: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathChip {
	pub id: String,
	pub label: String,
	pub current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceRow {
	pub id: String,
	pub label: String,
	pub sub: String,
	pub access: Accessibility,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
	pub name: String,
	pub via: String,
	pub cluster: Cluster,
	pub access: Accessibility,
	pub downstream: usize,
	pub description: Option<String>,
	pub facts: Vec<Fact>,
	pub traits: Vec<TraitSummary>,
	/// Entry point first, this node last.
	pub path: Vec<PathChip>,
	pub children: Vec<ServiceRow>,
	pub siblings: Vec<ServiceRow>,
}

impl DetailView {
	pub fn build(model: &GraphModel, idx: NodeIdx) -> Option<Self> {
		let node = model.nodes.get(idx)?;
		let via = match node.parent {
			Some(p) => format!("\u{21b3} via {}", model.nodes[p].label),
			None => format!("{} entry point", node.cluster.label()),
		};

		let traits = model
			.traits_of(idx)
			.into_iter()
			.map(|kind| {
				let members = model.trait_members(kind);
				TraitSummary {
					kind,
					total: members.len(),
					cross_cluster: members
						.iter()
						.filter(|&&m| m != idx && model.nodes[m].cluster != node.cluster)
						.count(),
				}
			})
			.collect();

		let mut lineage = model.ancestors(idx);
		lineage.reverse();
		let path = lineage
			.into_iter()
			.map(|n| PathChip {
				id: model.nodes[n].id.clone(),
				label: model.nodes[n].label.clone(),
				current: n == idx,
			})
			.collect();

		let children = model.children[idx].iter().map(|&k| row(model, k)).collect();
		let siblings = node
			.parent
			.map(|p| {
				model.children[p]
					.iter()
					.filter(|&&s| s != idx)
					.map(|&s| row(model, s))
					.collect()
			})
			.unwrap_or_default();

		Some(Self {
			name: node.service.name.clone(),
			via,
			cluster: node.cluster,
			access: node.status,
			downstream: node.downstream,
			description: node.service.description.clone(),
			facts: facts(model, idx),
			traits,
			path,
			children,
			siblings,
		})
	}
}

fn row(model: &GraphModel, idx: NodeIdx) -> ServiceRow {
	let node = &model.nodes[idx];
	let sub = if node.around_the_clock {
		"24/7".to_string()
	} else {
		node.service
			.description
			.clone()
			.unwrap_or_else(|| access_label(node.status).to_string())
	};
	ServiceRow {
		id: node.id.clone(),
		label: node.label.clone(),
		sub,
		access: node.status,
	}
}

fn facts(model: &GraphModel, idx: NodeIdx) -> Vec<Fact> {
	let node = &model.nodes[idx];
	let svc = &node.service;
	let mut out = vec![Fact {
		icon: FactIcon::Clock,
		title: Some("Hours"),
		text: node.hours.clone(),
		href: None,
	}];
	if let Some(phone) = &svc.phone {
		out.push(Fact {
			icon: FactIcon::Phone,
			title: Some("Phone"),
			text: phone.clone(),
			href: Some(format!("tel:{}", hours::phone_tel(phone))),
		});
	}
	if svc.transport || svc.is_mobile {
		out.push(Fact {
			icon: if svc.transport { FactIcon::Truck } else { FactIcon::NoTransport },
			title: Some("Transport"),
			text: if svc.transport { "Yes" } else { "No" }.to_string(),
			href: None,
		});
	}
	if let Some(vans) = &svc.transport_notes {
		out.push(Fact {
			icon: FactIcon::Truck,
			title: Some("Vans"),
			text: vans.clone(),
			href: None,
		});
	}
	if let Some(note) = &node.pilot_note {
		out.push(Fact {
			icon: FactIcon::Warning,
			title: None,
			text: note.clone(),
			href: None,
		});
	}
	if let Some(address) = &svc.address {
		out.push(Fact {
			icon: FactIcon::Pin,
			title: Some("Address"),
			text: address.clone(),
			href: None,
		});
	}
	out
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{build, svc};
	use super::*;
	use crate::services::HoursKind;

	#[test]
	fn panel_for_nested_service() {
		let mut root = svc("R", None, &[]);
		root.entry_point = Some("311".into());
		root.short_name = Some("311".into());
		let mut a = svc("A", Some("R"), &[]);
		a.phone = Some("780-555-0100".into());
		a.transport = true;
		a.transport_notes = Some("Two vans".into());
		a.pilot_program = true;
		a.address = Some("10 Main St".into());
		a.hours.kind = HoursKind::AroundTheClock;
		let b = svc("B", Some("R"), &[]);
		let kid = svc("K", Some("A"), &[]);
		let mut far = svc("F", None, &[]);
		far.hours.kind = HoursKind::AroundTheClock;
		let model = build(vec![root, a, b, kid, far]);

		let view = DetailView::build(&model, 1).expect("view");
		assert_eq!(view.name, "Service A");
		assert_eq!(view.via, "\u{21b3} via 311");
		assert_eq!(view.cluster, Cluster::CityServices);
		assert_eq!(view.downstream, 1);

		let titles: Vec<_> = view.facts.iter().map(|f| f.title).collect();
		assert_eq!(
			titles,
			vec![Some("Hours"), Some("Phone"), Some("Transport"), Some("Vans"), None, Some("Address")]
		);
		assert_eq!(view.facts[0].text, "Open 24/7");
		assert_eq!(view.facts[1].href.as_deref(), Some("tel:7805550100"));
		assert_eq!(view.facts[4].text, "Pilot program \u{2013} end date TBD");

		let path: Vec<_> = view.path.iter().map(|c| (c.id.as_str(), c.current)).collect();
		assert_eq!(path, vec![("R", false), ("A", true)]);
		assert_eq!(view.children.len(), 1);
		assert_eq!(view.children[0].id, "K");
		assert_eq!(view.siblings.len(), 1);
		assert_eq!(view.siblings[0].id, "B");

		let nonstop = view
			.traits
			.iter()
			.find(|t| t.kind == Trait::AroundTheClock)
			.expect("24/7 trait");
		assert_eq!(nonstop.total, 2);
		assert_eq!(nonstop.cross_cluster, 1);
	}

	#[test]
	fn root_panel_names_its_cluster() {
		let mut root = svc("R", None, &[]);
		root.entry_point = Some("911".into());
		let model = build(vec![root]);
		let view = DetailView::build(&model, 0).expect("view");
		assert_eq!(view.via, "911 Emergency entry point");
		assert!(view.siblings.is_empty());
		assert_eq!(view.path.len(), 1);
		assert!(DetailView::build(&model, 9).is_none());
	}
}
