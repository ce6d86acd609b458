pub mod stage0_parse;
pub mod stage1_normalize;
pub mod stage2_reconcile;
pub mod stage3_render;

pub use stage0_parse::*;
pub use stage1_normalize::*;
pub use stage2_reconcile::*;
pub use stage3_render::*;
