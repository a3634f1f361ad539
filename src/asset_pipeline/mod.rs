pub mod generate_tangents;
pub mod materials;
pub mod texture_image;
