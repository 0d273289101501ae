//! Request handlers, grouped by resource.

pub mod auth;
pub mod friend;
pub mod generation;
pub mod group;
pub mod message;
pub mod poem_set;
