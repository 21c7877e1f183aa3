//! Layout engine for sequence diagrams
//!
//! This module takes a parsed [`Sequence`](crate::sequence::Sequence) and
//! computes the positions of every agent, message, note and block,
//! producing a [`Drawing`] ready for serialization.

pub mod engine;
pub mod env;
pub mod error;
pub mod types;

pub use engine::{compute, debug_guides};
pub use env::{ActivePattern, AgentId, AgentInfo, AgentTable, ComponentState, Env, Spacing};
pub use error::LayoutError;
pub use types::*;
