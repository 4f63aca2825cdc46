//! In-memory records produced by a search run: games, their files and assets,
//! and named collections of games.

mod assets;
mod collection;
mod game;

pub use assets::*;
pub use collection::*;
pub use game::*;
