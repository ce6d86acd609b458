pub mod corpus;
pub mod free_text;
pub mod transcript;

pub use corpus::*;
pub use free_text::*;
pub use transcript::*;
