//! Human-readable hours and the "open right now" predicate.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use super::record::{Hours, HoursKind, Service, Slot};

const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
const WEEKEND: [&str; 2] = ["Saturday", "Sunday"];

fn day_name(day: Weekday) -> &'static str {
	match day {
		Weekday::Mon => "Monday",
		Weekday::Tue => "Tuesday",
		Weekday::Wed => "Wednesday",
		Weekday::Thu => "Thursday",
		Weekday::Fri => "Friday",
		Weekday::Sat => "Saturday",
		Weekday::Sun => "Sunday",
	}
}

fn day_abbr(day: &str) -> &str {
	match day {
		"Monday" => "Mon",
		"Tuesday" => "Tue",
		"Wednesday" => "Wed",
		"Thursday" => "Thu",
		"Friday" => "Fri",
		"Saturday" => "Sat",
		"Sunday" => "Sun",
		other => other,
	}
}

/// `HHMM` to `"9am"` / `"5:30pm"`. `2400` reads as midnight.
pub fn format_time(hhmm: u32) -> String {
	let hours = match hhmm / 100 {
		24 => 0,
		h => h,
	};
	let minutes = hhmm % 100;
	let period = if hours >= 12 { "pm" } else { "am" };
	let display = match hours % 12 {
		0 => 12,
		h => h,
	};
	if minutes == 0 {
		format!("{display}{period}")
	} else {
		format!("{display}:{minutes:02}{period}")
	}
}

/// Collapse a day list into `Daily`, `Mon–Fri`, `Sat–Sun` or a comma list.
pub fn format_days(days: &[String]) -> String {
	let has = |d: &str| days.iter().any(|x| x == d);
	if days.len() == 7 {
		return "Daily".into();
	}
	if days.len() == 5 && WEEKDAYS.iter().all(|d| has(d)) {
		return "Mon\u{2013}Fri".into();
	}
	if days.len() == 2 && WEEKEND.iter().all(|d| has(d)) {
		return "Sat\u{2013}Sun".into();
	}
	days.iter().map(|d| day_abbr(d)).collect::<Vec<_>>().join(", ")
}

fn format_slots(slots: &[Slot]) -> String {
	slots
		.iter()
		.map(|slot| {
			format!(
				"{} {}\u{2013}{}",
				format_days(&slot.days),
				format_time(slot.open),
				format_time(slot.close)
			)
		})
		.collect::<Vec<_>>()
		.join(", ")
}

/// Hours descriptor as a single display line.
pub fn format_hours(hours: &Hours) -> String {
	match hours.kind {
		HoursKind::AroundTheClock => "Open 24/7".into(),
		HoursKind::Seasonal => {
			let mut parts = Vec::new();
			if hours.winter_schedule.is_some() {
				parts.push("Winter: 24/7".to_string());
			}
			if let Some(slots) = &hours.schedule {
				parts.push(format!("Normal: {}", format_slots(slots)));
			}
			if parts.is_empty() {
				"Seasonal hours".into()
			} else {
				parts.join(" \u{b7} ")
			}
		}
		HoursKind::Scheduled => match &hours.schedule {
			Some(slots) => format_slots(slots),
			None => "Hours not available".into(),
		},
	}
}

fn is_winter(month: u32) -> bool {
	month >= 11 || month <= 3
}

fn slot_contains(slot: &Slot, day: &str, minutes: u32) -> bool {
	if !slot.days.iter().any(|d| d == day) {
		return false;
	}
	let open = (slot.open / 100) * 60 + slot.open % 100;
	let close = (slot.close / 100) * 60 + slot.close % 100;
	if close < open {
		// overnight window
		minutes >= open || minutes <= close
	} else {
		minutes >= open && minutes <= close
	}
}

/// Whether a service with these hours is open at `at` (local time).
pub fn is_open(hours: &Hours, at: NaiveDateTime) -> bool {
	match hours.kind {
		HoursKind::AroundTheClock => return true,
		HoursKind::Seasonal => {
			let winter_always = hours
				.winter_schedule
				.as_ref()
				.is_some_and(|w| w.kind == HoursKind::AroundTheClock);
			if is_winter(at.month()) && winter_always {
				return true;
			}
		}
		HoursKind::Scheduled => {}
	}

	let Some(slots) = &hours.schedule else {
		return false;
	};
	let day = day_name(at.weekday());
	let minutes = at.hour() * 60 + at.minute();
	slots.iter().any(|slot| slot_contains(slot, day, minutes))
}

/// Funding note for pilot programs, `None` for regular services.
pub fn pilot_note(service: &Service) -> Option<String> {
	if !service.pilot_program {
		return None;
	}
	let end = service
		.pilot_end_date
		.as_deref()
		.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
	Some(match end {
		Some(date) => format!("Funded until {}", date.format("%b %Y")),
		None => "Pilot program \u{2013} end date TBD".into(),
	})
}

/// Strip a display phone down to something dialable: `"211 (press 3)"` -> `"211"`.
pub fn phone_tel(phone: &str) -> String {
	let main = phone.split('(').next().unwrap_or_default().trim();
	main.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::services::record::WinterSchedule;

	fn slot(days: &[&str], open: u32, close: u32) -> Slot {
		Slot {
			days: days.iter().map(|d| d.to_string()).collect(),
			open,
			close,
		}
	}

	fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(y, m, d)
			.and_then(|date| date.and_hms_opt(h, min, 0))
			.expect("valid test date")
	}

	#[test]
	fn formats_times() {
		assert_eq!(format_time(900), "9am");
		assert_eq!(format_time(1730), "5:30pm");
		assert_eq!(format_time(0), "12am");
		assert_eq!(format_time(2400), "12am");
		assert_eq!(format_time(1200), "12pm");
	}

	#[test]
	fn formats_day_ranges() {
		let weekdays: Vec<String> = WEEKDAYS.iter().map(|d| d.to_string()).collect();
		assert_eq!(format_days(&weekdays), "Mon\u{2013}Fri");
		let weekend: Vec<String> = WEEKEND.iter().map(|d| d.to_string()).collect();
		assert_eq!(format_days(&weekend), "Sat\u{2013}Sun");
		assert_eq!(
			format_days(&["Monday".into(), "Thursday".into()]),
			"Mon, Thu"
		);
	}

	#[test]
	fn formats_hours_variants() {
		let always = Hours {
			kind: HoursKind::AroundTheClock,
			..Default::default()
		};
		assert_eq!(format_hours(&always), "Open 24/7");

		let none = Hours::default();
		assert_eq!(format_hours(&none), "Hours not available");

		let seasonal = Hours {
			kind: HoursKind::Seasonal,
			schedule: Some(vec![slot(&WEEKDAYS, 1130, 1930)]),
			winter_schedule: Some(WinterSchedule {
				kind: HoursKind::AroundTheClock,
			}),
		};
		assert_eq!(
			format_hours(&seasonal),
			"Winter: 24/7 \u{b7} Normal: Mon\u{2013}Fri 11:30am\u{2013}7:30pm"
		);
	}

	#[test]
	fn overnight_slot_wraps_midnight() {
		let hours = Hours {
			kind: HoursKind::Scheduled,
			schedule: Some(vec![slot(&["Wednesday"], 600, 200)]),
			winter_schedule: None,
		};
		// 2025-01-01 is a Wednesday
		assert!(is_open(&hours, at(2025, 1, 1, 23, 0)));
		assert!(is_open(&hours, at(2025, 1, 1, 1, 30)));
		assert!(!is_open(&hours, at(2025, 1, 1, 4, 0)));
		assert!(!is_open(&hours, at(2025, 1, 2, 23, 0)));
	}

	#[test]
	fn seasonal_is_always_open_in_winter() {
		let hours = Hours {
			kind: HoursKind::Seasonal,
			schedule: Some(vec![slot(&WEEKDAYS, 1130, 1930)]),
			winter_schedule: Some(WinterSchedule {
				kind: HoursKind::AroundTheClock,
			}),
		};
		// Sunday night in January
		assert!(is_open(&hours, at(2025, 1, 5, 3, 0)));
		// Sunday night in July falls back to the weekday schedule
		assert!(!is_open(&hours, at(2025, 7, 6, 3, 0)));
	}

	#[test]
	fn pilot_note_uses_end_date() {
		let mut service = Service {
			pilot_program: true,
			pilot_end_date: Some("2026-03-31".into()),
			..Default::default()
		};
		assert_eq!(pilot_note(&service).as_deref(), Some("Funded until Mar 2026"));
		service.pilot_end_date = None;
		assert_eq!(
			pilot_note(&service).as_deref(),
			Some("Pilot program \u{2013} end date TBD")
		);
		service.pilot_program = false;
		assert_eq!(pilot_note(&service), None);
	}

	#[test]
	fn phone_tel_strips_annotations() {
		assert_eq!(phone_tel("211 (press 3)"), "211");
		assert_eq!(phone_tel("780-429-3470"), "7804293470");
	}
}
