//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod collaborator;
pub mod event;
pub mod friendship;
pub mod group;
pub mod message;
pub mod poem_set;
pub mod session;
pub mod user;
