pub mod carrier;
pub mod error;
pub mod ids;
pub mod propagation;
pub mod state;
pub mod tags;
pub mod time;

pub use error::{Result, StitchError};
