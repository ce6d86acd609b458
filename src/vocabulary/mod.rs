pub mod officeholders;
pub mod party;

pub use officeholders::*;
pub use party::*;
