//! On-chain implementations of the engine's collaborators.

pub mod stream;
pub mod treasury;

pub use stream::*;
pub use treasury::*;
