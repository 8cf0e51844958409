//! 2D geometry kernel: vectors, affine transforms, rectangles, and
//! cubic Bézier math. Pure functions, no document knowledge.

pub mod arc;
pub mod bezier;
pub mod rect;
pub mod transform;
pub mod vector;

pub use arc::a2c;
pub use bezier::CubicSegment;
pub use rect::Rect;
pub use transform::Transform;
pub use vector::Vector2;
