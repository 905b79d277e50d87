//! HTTP handlers for all web routes.

pub mod events;
pub mod executive;
pub mod feed;
pub mod hunting;
pub mod integrations;
pub mod layout;
pub mod soc;
pub mod system;
pub mod threat;
pub mod vulnerability;
