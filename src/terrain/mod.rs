//! Procedural ground: noise, height function and chunk streaming

pub mod chunk;
pub mod generator;
pub mod noise;

pub use chunk::{ChunkManager, ChunkParams, TerrainChunk};
pub use generator::{TerrainGenerator, TerrainParams};
pub use noise::{gradient_1d, octave_noise, Permutation};
