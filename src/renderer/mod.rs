//! Rendering
//!
//! `scene` builds draw batches from a snapshot (pure, testable natively);
//! `pipeline` owns the WebGPU objects and draws them.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use scene::{DrawBatch, Label, Scene, SceneInput, build_scene};
pub use vertex::SpriteVertex;
