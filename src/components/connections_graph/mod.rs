//! Canvas view of how crisis and social services connect.
//!
//! [`GraphSession`] holds everything that does not touch the DOM: the model
//! built from a [`ServiceSource`](crate::services::ServiceSource), the layout,
//! camera and interaction state. [`ConnectionsGraph`] mounts a session into a
//! page and drives it from browser events.

mod camera;
mod component;
pub mod config;
mod curves;
mod detail;
mod dom;
pub mod geom;
mod highlight;
mod interaction;
mod layout;
mod model;
pub mod palette;
mod render;
mod state;
pub mod traits;

pub use camera::{Camera, View, Viewport};
pub use component::{ConnectionsGraph, ConnectionsGraphView, parse_event_time};
pub use config::LayoutConfig;
pub use detail::{DetailView, Fact, FactIcon, PathChip, ServiceRow, TraitSummary};
pub use interaction::{Cursor, Effect, Filter, InputEvent, Interaction, Mode};
pub use model::{Edge, EdgeKind, GraphModel, Node, NodeIdx, Tier};
pub use render::render;
pub use state::GraphSession;
