//! Persistence for Biots: genome pools and saved game states.
//!
//! Files are JSON; any path ending in `.gz` is gzip-compressed.

pub mod error;
pub mod game_state;
pub mod pool;
pub mod serialization;

pub use error::{IoError, Result};
pub use game_state::GameState;
pub use pool::{load_pool, parse_pool, save_pool, LoadReport, LoadedPool};
