//! Utilities for views

pub mod colors;

pub use colors::{ColorRamp, Rgb};
