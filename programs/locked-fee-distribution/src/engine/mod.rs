//! Host-independent distribution engine.
//!
//! Everything here is a deterministic function of policy, progress, escrow,
//! page input and collaborator responses. Instruction handlers wrap it.

pub mod allocation;
pub mod collaborators;
pub mod crank;
pub mod sweep;

pub use allocation::*;
pub use collaborators::*;
pub use crank::*;
pub use sweep::*;
