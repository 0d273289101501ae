//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod collaborator_repo;
pub mod event_repo;
pub mod friendship_repo;
pub mod group_repo;
pub mod message_repo;
pub mod poem_set_repo;
pub mod session_repo;
pub mod user_repo;

pub use collaborator_repo::CollaboratorRepo;
pub use event_repo::EventRepo;
pub use friendship_repo::FriendshipRepo;
pub use group_repo::GroupRepo;
pub use message_repo::MessageRepo;
pub use poem_set_repo::PoemSetRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
