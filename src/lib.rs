#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod decode;
pub mod element;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod panels;
pub mod session;
pub mod stroke;
pub mod surface;
pub mod text;
pub mod tools;
pub mod transform;

pub use app::PaintApp;
pub use config::{CancelPolicy, CanvasConfig};
pub use decode::{InlineDecoder, PendingRestore, SnapshotDecoder, ThreadDecoder};
pub use element::{InsertedImage, Object, ObjectId, ObjectLayer, TextBox, TextCommit};
pub use error::{CanvasError, CanvasResult};
pub use geometry::CoordinateMapper;
pub use history::{HistoryEntry, HistoryList};
pub use input::{InputEvent, InputHandler, PointerSample};
pub use session::Session;
pub use stroke::{StrokeEngine, StrokeStyle};
pub use surface::{Placement, Surface};
pub use tools::{ToolMode, ToolSettings};
pub use transform::TransformController;
