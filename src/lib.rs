//! Cloud architecture diagrams: a node/edge table rendered to a static PNG and
//! an interactive HTML page.

pub mod generate;
pub mod layout;
pub mod model;
pub mod render;
pub mod spec;

pub type Result<T> = anyhow::Result<T>;
