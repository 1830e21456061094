//! The operator interpreter (§4.1): graphics-state stack, operator vocabulary,
//! packed path-data decoding, the collinear-join segment merger, and the driver
//! function that turns one page's operators into raw primitives.

pub mod gstate;
pub mod interpreter;
pub mod merge;
pub mod operator;
pub mod path_data;

pub use gstate::{GraphicsState, GraphicsStateStack};
pub use interpreter::interpret_page;
pub use operator::{Operator, PaintOp, PathSegmentOp};
