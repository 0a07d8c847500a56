use crate::services::Accessibility;

use super::model::Node;

/// Named node groups used by the filter buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trait {
	PublicAccess,
	Restricted,
	AroundTheClock,
	Transport,
	HasPhone,
	MentalHealth,
	HarmReduction,
	FundingAtRisk,
}

impl Trait {
	pub const ALL: [Trait; 8] = [
		Trait::PublicAccess,
		Trait::Restricted,
		Trait::AroundTheClock,
		Trait::Transport,
		Trait::HasPhone,
		Trait::MentalHealth,
		Trait::HarmReduction,
		Trait::FundingAtRisk,
	];

	pub fn label(self) -> &'static str {
		match self {
			Trait::PublicAccess => "Public Access",
			Trait::Restricted => "Restricted",
			Trait::AroundTheClock => "24/7",
			Trait::Transport => "Transport",
			Trait::HasPhone => "Has Phone",
			Trait::MentalHealth => "Mental Health",
			Trait::HarmReduction => "Harm Reduction",
			Trait::FundingAtRisk => "Funding at Risk",
		}
	}

	pub fn from_label(label: &str) -> Option<Trait> {
		Self::ALL.into_iter().find(|t| t.label() == label)
	}

	pub fn matches(self, node: &Node) -> bool {
		match self {
			Trait::PublicAccess => matches!(
				node.status,
				Accessibility::Public | Accessibility::PublicCriteria
			),
			Trait::Restricted => node.status == Accessibility::Restricted,
			Trait::AroundTheClock => node.around_the_clock,
			Trait::Transport => node.service.transport,
			Trait::HasPhone => node.service.phone.is_some(),
			Trait::MentalHealth => {
				description_mentions(node, &["mental health", "crisis", "therapist"])
			}
			Trait::HarmReduction => {
				description_mentions(node, &["harm reduction", "needle", "addiction"])
			}
			Trait::FundingAtRisk => node.pilot_note.is_some(),
		}
	}
}

fn description_mentions(node: &Node, needles: &[&str]) -> bool {
	let desc = node
		.service
		.description
		.as_deref()
		.unwrap_or_default()
		.to_lowercase();
	needles.iter().any(|n| desc.contains(n))
}
