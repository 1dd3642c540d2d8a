//! Data contracts shared with the roster store and simulation loop.

pub mod event;
pub mod evidence;
pub mod news;
pub mod player;
pub mod traits;
