pub mod chem;
pub mod ecs;
pub mod error;
pub mod harvest;
pub mod map;
pub mod render;
pub mod rules;
pub mod scripted_input;
pub mod session;
pub mod words;

pub use error::{Result, SketchError};
