//! Inbound chat request types
//!
//! A [`ChatRequest`] is the only thing a client sends: an ordered list of
//! role-tagged messages. It is validated once on arrival and never mutated.

pub mod types;

pub use types::{ChatRequest, Message, Role};
