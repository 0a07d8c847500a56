//! Service records and the read-only accessors the graph consumes.

mod directory;
pub mod hours;
mod record;

pub use directory::{ServiceDirectory, ServiceSource};
pub use record::{Accessibility, Category, Hours, HoursKind, Service, Slot, WinterSchedule};
