//! Common utilities and types for the tank controller
pub mod geometry;

/// Common types used across the codebase
pub mod types {
    /// A position in the arena
    pub type Point2D = nalgebra::Point2<f64>;

    /// A displacement, velocity or force in the arena
    pub type Vector2D = nalgebra::Vector2<f64>;
}
