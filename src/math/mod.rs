pub mod bounds;
pub mod color;
pub mod ray;

pub use bounds::Aabb;
pub use color::Color;
pub use ray::Ray;
