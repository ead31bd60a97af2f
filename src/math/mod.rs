//! Mathematical utilities and data structures

pub mod aabb;
pub mod polygon;
pub mod rng;

pub use aabb::Aabb;
pub use polygon::Polygon;
pub use rng::{fnv1a, Rng, Seed};
