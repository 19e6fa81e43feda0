// spherical-regions: boolean geometry of sky regions on the unit sphere
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

pub mod cap;
pub mod config;
pub mod convex;
pub mod dict;
pub mod error;
pub mod geom;
pub mod great_circle;
pub mod index;
pub mod mesh;
pub mod octahedron;
pub mod polygon;
pub mod priorityq;
pub mod region;
pub mod sweep;
pub mod tess;
pub mod vector;

pub use cap::SphericalCap;
pub use config::IndexConfig;
pub use convex::SphericalConvexPolygon;
pub use error::{RegionError, TessError};
pub use index::{RegionObject, SphericalIndex, MAX_INDEX_LEVEL};
pub use octahedron::{EdgeVertex, OctahedronPolygon, SubContour};
pub use polygon::SphericalPolygon;
pub use region::{RegionType, SphericalPoint, SphericalRegion, SphericalRegionP};
pub use tess::{TessVertex, Tessellator, WindingRule};
pub use vector::Vec3d;
