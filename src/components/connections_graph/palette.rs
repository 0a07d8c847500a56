use crate::services::Accessibility;

/// Parsed `#rrggbb` colour, used to build `rgba()` strings at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
	pub const fn hex(hex: u32) -> Self {
		Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
	}

	pub fn rgba(self, alpha: f64) -> String {
		format!("rgba({},{},{},{})", self.0, self.1, self.2, alpha)
	}

	pub fn css(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
	}
}

/// Fixed cluster palette. Declaration order is the order clusters are laid out
/// around the global circle and listed in the nav bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cluster {
	Emergency,
	CityServices,
	Crisis211,
	AlbertaHealth,
	Dats,
	Bia,
	Shelters,
	CrisisLines,
	Community,
}

impl Cluster {
	pub const ALL: [Cluster; 9] = [
		Cluster::Emergency,
		Cluster::CityServices,
		Cluster::Crisis211,
		Cluster::AlbertaHealth,
		Cluster::Dats,
		Cluster::Bia,
		Cluster::Shelters,
		Cluster::CrisisLines,
		Cluster::Community,
	];

	/// Look up a palette entry by its dataset key (`"911"`, `"211+3"`, ...).
	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|c| c.key() == key)
	}

	pub fn key(self) -> &'static str {
		match self {
			Cluster::Emergency => "911",
			Cluster::CityServices => "311",
			Cluster::Crisis211 => "211+3",
			Cluster::AlbertaHealth => "AHS",
			Cluster::Dats => "DATS",
			Cluster::Bia => "BIA",
			Cluster::Shelters => "shelters",
			Cluster::CrisisLines => "crisis-lines",
			Cluster::Community => "community",
		}
	}

	pub fn color(self) -> Rgb {
		match self {
			Cluster::Emergency => Rgb::hex(0x4ea4ff),
			Cluster::CityServices => Rgb::hex(0x34d9c0),
			Cluster::Crisis211 => Rgb::hex(0xf5c542),
			Cluster::AlbertaHealth => Rgb::hex(0xa78bfa),
			Cluster::Dats => Rgb::hex(0xf09848),
			Cluster::Bia => Rgb::hex(0xf06888),
			Cluster::Shelters => Rgb::hex(0x4ecdc4),
			Cluster::CrisisLines => Rgb::hex(0xe879a8),
			Cluster::Community => Rgb::hex(0x6b82aa),
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Cluster::Emergency => "911 Emergency",
			Cluster::CityServices => "311 City Services",
			Cluster::Crisis211 => "211+3 Crisis",
			Cluster::AlbertaHealth => "Alberta Health",
			Cluster::Dats => "DATS Transit",
			Cluster::Bia => "BIA Teams",
			Cluster::Shelters => "Shelters",
			Cluster::CrisisLines => "Crisis Lines",
			Cluster::Community => "Community Services",
		}
	}
}

pub fn access_color(access: Accessibility) -> Rgb {
	match access {
		Accessibility::Public => Rgb::hex(0x34d9c0),
		Accessibility::PublicCriteria => Rgb::hex(0xf5c542),
		Accessibility::Restricted => Rgb::hex(0xf09848),
		Accessibility::Unknown => Rgb::hex(0xf06888),
		Accessibility::System => Rgb::hex(0x6b82aa),
	}
}

pub fn access_label(access: Accessibility) -> &'static str {
	match access {
		Accessibility::Public => "Public \u{2013} few criteria",
		Accessibility::PublicCriteria => "Public \u{2013} specific criteria",
		Accessibility::Restricted => "Not publicly accessible",
		Accessibility::Unknown => "Unsure if active",
		Accessibility::System => "System / entry point",
	}
}

/// Border dash pattern (world units, scaled by zoom at draw time).
pub fn access_dash(access: Accessibility) -> Option<[f64; 2]> {
	match access {
		Accessibility::Restricted => Some([6.0, 4.0]),
		Accessibility::Unknown => Some([3.0, 3.0]),
		Accessibility::Public | Accessibility::PublicCriteria | Accessibility::System => None,
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	Hexagon,
	Square,
	Diamond,
	Circle,
}

/// Small property markers drawn above a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Badge {
	AroundTheClock,
	Transport,
	Referral,
	Pilot,
}

impl Badge {
	pub fn color(self) -> Rgb {
		match self {
			Badge::AroundTheClock => Rgb::hex(0x16a34a),
			Badge::Transport => Rgb::hex(0x2563eb),
			Badge::Referral => Rgb::hex(0xea580c),
			Badge::Pilot => Rgb::hex(0xdc2626),
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Badge::AroundTheClock => "24/7 Service",
			Badge::Transport => "Has Transport",
			Badge::Referral => "Referral Required",
			Badge::Pilot => "Pilot / At Risk",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cluster_keys_round_trip() {
		for cluster in Cluster::ALL {
			assert_eq!(Cluster::from_key(cluster.key()), Some(cluster));
		}
		assert_eq!(Cluster::from_key("direct"), None);
	}

	#[test]
	fn rgb_formats() {
		let c = Rgb::hex(0xf5c542);
		assert_eq!(c, Rgb(0xf5, 0xc5, 0x42));
		assert_eq!(c.css(), "#f5c542");
		assert_eq!(c.rgba(0.5), "rgba(245,197,66,0.5)");
	}
}
