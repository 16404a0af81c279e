//! Sink implementations

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleSink, ConsoleTarget, SharedWriter};
pub use rotating_file::{RotatingFile, RotatingFileSink, RotationPolicy, RotationStrategy};

pub use crate::core::Sink;
