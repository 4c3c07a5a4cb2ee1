//! Admin console templates.

mod engine;

pub use engine::ThemeEngine;
