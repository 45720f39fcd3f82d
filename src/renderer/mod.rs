pub mod camera;
pub mod controller;
pub mod geometry;
pub mod gpu;
pub mod interaction;
pub mod program;
pub mod scene;

pub use controller::TransformController;
pub use gpu::GpuState;
pub use scene::Scene;
