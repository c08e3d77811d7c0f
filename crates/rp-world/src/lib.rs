//! World spatial model: the toroidal terrain grid, spatial partitioning
//! (patches), the collision bitmap the pathfinder consumes, and the on-disk
//! map file formats.

pub use rp_core as core;

pub mod collision;
pub mod error;
pub mod geometry;
pub mod heightfield;
pub mod mapdesc;
pub mod patch;
pub mod terrain;

pub use collision::CollisionBitmap;
pub use geometry::direction_to;
pub use patch::{Patch, PatchManager};
pub use terrain::Terrain;
