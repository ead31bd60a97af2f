//! Procedural vegetation
//!
//! Skeleton growth, shell extraction and canopy placement, combined into
//! trees, weeds and flower bushes by the plant pipeline.

pub mod canopy;
pub mod plant;
pub mod shell;
pub mod skeleton;
pub mod sway;

pub use canopy::{place_canopy, Blob, Canopy, CanopyParams, LeafCluster};
pub use plant::{Plant, PlantGenerator, PlantKind, PlantParams, PlantSpec};
pub use shell::{extract_shells, junction_key, JunctionNormals, Shell, JUNCTION_EPSILON};
pub use skeleton::{clamp_upward, BranchPath, CenterlinePoint, Skeleton, SkeletonBuilder, SkeletonParams};
pub use sway::{Sway, SwayAnimator, SwayParams};
