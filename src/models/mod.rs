pub mod corpus;
pub mod party;
pub mod speech;

pub use corpus::*;
pub use party::*;
pub use speech::*;
