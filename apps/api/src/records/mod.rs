//! Persistence for signed-in users and their recent interview results.

pub mod feedback;
pub mod handlers;
pub mod users;
