pub mod context;
pub mod error;
pub mod id;
pub mod math;
pub mod model;
pub mod prototype;
pub mod query;
pub mod tree;

pub use context::DocumentContext;
pub use error::DocumentError;
pub use id::{IdGenerator, NodeId, SequentialIds, UuidIds};
pub use math::{CubicSegment, Rect, Transform, Vector2};
pub use model::*;
pub use prototype::NodePrototype;
pub use query::DocumentQuery;
