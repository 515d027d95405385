//! Spec layer: diagram file schema + validated in-memory structures.
//!
//! Kept apart from graph building and rendering. It owns:
//! - the JSON diagram schema and the built-in tables
//! - validation into `Diagram`
//! - `DiagramError`, the validation failure kinds

pub mod diagram;
pub mod error;

pub use diagram::{Category, Diagram, DiagramSpec, Edge, Node, Position, RawNode};
pub use error::{DiagramError, Endpoint};
