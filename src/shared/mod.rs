//! State shared across threads

pub mod state;

pub use state::PadState;
