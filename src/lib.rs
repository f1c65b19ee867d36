#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod context;
pub mod document;
pub mod editor;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod history;
pub mod input;
pub mod intersections;
pub mod path_converter;
pub mod selection;
pub mod shape;
pub mod tools;

pub use config::EditorConfig;
pub use context::{EditorContext, FigureContext, ToolContext};
pub use document::{Document, Fragment};
pub use editor::{Editor, PointerEvent};
pub use error::{EditorError, EditorResult};
pub use geometry::hit_testing::{HitTest, HitTestSettings};
pub use history::History;
pub use input::{HeadlessInput, InputService};
pub use path_converter::{GeometryPathConverter, PathConverter};
pub use selection::SelectionState;
pub use shape::{FillRule, Shape, ShapeId, ShapeKind, ShapeStyle, StyleId};
pub use tools::{SelectionCommand, Tool, ToolOutcome, ToolType};
