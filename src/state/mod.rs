pub mod camera;
pub mod particles;

pub use camera::Camera;
pub use particles::Particle;
