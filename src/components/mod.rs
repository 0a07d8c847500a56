//! Reusable view components.

pub mod connections_graph;
