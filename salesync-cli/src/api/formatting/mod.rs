//! Report styling: batch operations and the plan that orders them

pub mod operation;
pub mod plan;

pub use operation::{FormattingOp, RgbColor};
pub use plan::{FormattingPlan, Palette, SheetTarget};
