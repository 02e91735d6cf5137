pub mod janitor_actor;

pub use janitor_actor::{JanitorHandle, JanitorMessage};
