pub mod blend;
pub mod brush;
pub mod color;
pub mod composite;
pub mod document;
pub mod engine;
pub mod fill;
pub mod history;
pub mod id;
pub mod layer;
pub mod noise;
pub mod raster;
pub mod schedule;
pub mod stroke;
pub mod util;

pub use color::Color;
pub use engine::{Engine, EngineConfig};
pub use id::Id;
