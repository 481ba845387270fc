pub mod chat;
pub mod generation;
pub mod pipeline;

pub use chat::*;
pub use generation::*;
pub use pipeline::*;
