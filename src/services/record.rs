use serde::Deserialize;

/// Who can walk in (or call in) to a service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
	/// Public, few criteria.
	Public,
	/// Public, but with specific criteria.
	PublicCriteria,
	/// Not publicly accessible.
	Restricted,
	/// Unsure if still active.
	Unknown,
	/// Entry points and system-level services.
	#[default]
	#[serde(other)]
	System,
}

/// Broad service category as tagged in the dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
	/// Phone numbers and intake systems (911, 311, 211).
	EntryPoint,
	/// Overnight or emergency shelter.
	Shelter,
	/// Phone-based crisis line.
	CrisisLine,
	/// Mental-health services.
	MentalHealth,
	/// Outreach and mobile teams.
	Outreach,
	/// Transport-only services.
	Transport,
	/// Anything else.
	#[default]
	#[serde(other)]
	Other,
}

/// Kind of opening hours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum HoursKind {
	/// Always open.
	#[serde(rename = "24/7")]
	AroundTheClock,
	/// Winter-dependent schedule.
	#[serde(rename = "seasonal")]
	Seasonal,
	/// Fixed weekly schedule.
	#[default]
	#[serde(other)]
	Scheduled,
}

/// One opening window. `open`/`close` are 24h clock times written as `HHMM`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Slot {
	/// Full English day names, e.g. `"Monday"`.
	pub days: Vec<String>,
	/// Opening time, `HHMM`.
	pub open: u32,
	/// Closing time, `HHMM`. May be earlier than `open` for overnight windows.
	pub close: u32,
}

/// Winter override for seasonal services.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WinterSchedule {
	/// Kind of winter hours.
	#[serde(rename = "type", default)]
	pub kind: HoursKind,
}

/// Opening-hours descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hours {
	/// Kind of hours.
	#[serde(rename = "type", default)]
	pub kind: HoursKind,
	/// Weekly slots, if known.
	#[serde(default)]
	pub schedule: Option<Vec<Slot>>,
	/// Winter override for seasonal services.
	#[serde(default)]
	pub winter_schedule: Option<WinterSchedule>,
}

/// A single service record as loaded from `services.json`. Read-only.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
	/// Unique id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Optional short label.
	#[serde(default)]
	pub short_name: Option<String>,
	/// Parent service id; forms the referral tree.
	#[serde(default)]
	pub parent_service: Option<String>,
	/// Additional referral links (one-directional in the data).
	#[serde(default)]
	pub connections: Vec<String>,
	/// Umbrella the service is reached through, or `"direct"`.
	#[serde(default)]
	pub entry_point: Option<String>,
	/// Category.
	#[serde(default)]
	pub category: Category,
	/// Accessibility level.
	#[serde(default)]
	pub accessibility: Accessibility,
	/// Opening hours.
	#[serde(default)]
	pub hours: Hours,
	/// Display phone, e.g. `"211 (press 3)"`.
	#[serde(default)]
	pub phone: Option<String>,
	/// Street address for drop-in locations.
	#[serde(default)]
	pub address: Option<String>,
	/// Accepts drop-offs.
	#[serde(default)]
	pub is_drop_off: bool,
	/// Mobile team.
	#[serde(default)]
	pub is_mobile: bool,
	/// Provides transport.
	#[serde(default)]
	pub transport: bool,
	/// Free-text notes about vans / vehicles.
	#[serde(default)]
	pub transport_notes: Option<String>,
	/// Requires a referral.
	#[serde(default)]
	pub referral_required: bool,
	/// Pilot-funded program.
	#[serde(default)]
	pub pilot_program: bool,
	/// Pilot funding end date, ISO `YYYY-MM-DD`.
	#[serde(default)]
	pub pilot_end_date: Option<String>,
	/// Free-text description.
	#[serde(default)]
	pub description: Option<String>,
}

impl Service {
	/// Short label if present, else the full name.
	pub fn label(&self) -> &str {
		self.short_name.as_deref().unwrap_or(&self.name)
	}

	/// `entry_point` unless it is missing or `"direct"`.
	pub fn named_entry_point(&self) -> Option<&str> {
		self.entry_point.as_deref().filter(|ep| *ep != "direct")
	}

	/// True when the service is reached directly rather than through an umbrella.
	pub fn is_direct(&self) -> bool {
		self.entry_point.as_deref() == Some("direct")
	}
}
