pub mod audio;
pub mod blend;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod hand;
pub mod session;
pub mod shape;
pub mod signal;
pub mod snapshot;
pub mod spectrum;

pub use audio::*;
pub use blend::*;
pub use color::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use hand::*;
pub use session::*;
pub use shape::*;
pub use signal::*;
pub use snapshot::*;
pub use spectrum::*;
