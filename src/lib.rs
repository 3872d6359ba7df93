pub mod app;
pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod geometry;
pub mod math;
pub mod outline;
pub mod panel;
pub mod picking;
pub mod render;
pub mod scale;
pub mod scene;
pub mod transition;

pub use error::{ExtrumapError, Result};
