pub mod movement;
pub mod orbit;

pub use movement::MovementState;
pub use orbit::OrbitControls;
