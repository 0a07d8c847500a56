use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::hours;
use super::record::Service;
use crate::error::GraphError;

/// Read-only access to the service dataset.
///
/// The graph only ever reads through this trait: once to build, again by id
/// when resolving relationships, and for hours whenever the host announces a
/// time change.
pub trait ServiceSource {
	/// Every service, in dataset order.
	fn all_services(&self) -> &[Service];

	/// Resolve a service by id.
	fn service_by_id(&self, id: &str) -> Option<&Service>;

	/// Display hours for a service.
	fn format_hours(&self, service: &Service) -> String {
		hours::format_hours(&service.hours)
	}

	/// Whether a service is open at `now`.
	fn is_open(&self, service: &Service, now: NaiveDateTime) -> bool {
		hours::is_open(&service.hours, now)
	}
}

/// In-memory directory loaded from the `services.json` document.
#[derive(Clone, Debug, Default)]
pub struct ServiceDirectory {
	services: Vec<Service>,
	by_id: HashMap<String, usize>,
}

impl ServiceDirectory {
	/// Index a list of services. Later duplicates of an id shadow earlier ones.
	pub fn new(services: Vec<Service>) -> Self {
		let by_id = services
			.iter()
			.enumerate()
			.map(|(i, s)| (s.id.clone(), i))
			.collect();
		Self { services, by_id }
	}

	/// Parse a JSON array of service records.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		let services: Vec<Service> = serde_json::from_str(json)?;
		Ok(Self::new(services))
	}

	/// Number of services.
	pub fn len(&self) -> usize {
		self.services.len()
	}

	/// True when the directory holds no services.
	pub fn is_empty(&self) -> bool {
		self.services.is_empty()
	}
}

impl ServiceSource for ServiceDirectory {
	fn all_services(&self) -> &[Service] {
		&self.services
	}

	fn service_by_id(&self, id: &str) -> Option<&Service> {
		self.by_id.get(id).and_then(|&i| self.services.get(i))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::services::record::{Accessibility, Category, HoursKind};

	#[test]
	fn parses_camel_case_records() {
		let json = r#"[
			{
				"id": "211",
				"name": "211 Alberta",
				"shortName": "211",
				"category": "entry-point",
				"accessibility": "public",
				"hours": { "type": "24/7" },
				"entryPoint": "211+3",
				"connections": ["cott"]
			},
			{
				"id": "cott",
				"name": "Crisis Outreach",
				"parentService": "211",
				"category": "something-new",
				"accessibility": "mystery",
				"hours": { "type": "scheduled", "schedule": [
					{ "days": ["Monday"], "open": 600, "close": 200 }
				] },
				"isMobile": true,
				"transport": true
			}
		]"#;
		let dir = ServiceDirectory::from_json(json).expect("valid json");
		assert_eq!(dir.len(), 2);

		let root = dir.service_by_id("211").expect("root present");
		assert_eq!(root.category, Category::EntryPoint);
		assert_eq!(root.hours.kind, HoursKind::AroundTheClock);
		assert_eq!(root.label(), "211");
		assert_eq!(root.named_entry_point(), Some("211+3"));

		let team = dir.service_by_id("cott").expect("child present");
		assert_eq!(team.parent_service.as_deref(), Some("211"));
		assert_eq!(team.category, Category::Other);
		assert_eq!(team.accessibility, Accessibility::System);
		assert!(team.is_mobile && team.transport);
		assert_eq!(dir.format_hours(team), "Mon 6am\u{2013}2am");
	}

	#[test]
	fn rejects_malformed_documents() {
		assert!(matches!(
			ServiceDirectory::from_json("{ not json"),
			Err(GraphError::Parse(_))
		));
	}

	#[test]
	fn unknown_ids_resolve_to_none() {
		let dir = ServiceDirectory::default();
		assert!(dir.is_empty());
		assert!(dir.service_by_id("nope").is_none());
	}
}
