// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

use thiserror::Error;

/// Rejected input to the planar tessellator.
#[derive(Debug, Error)]
pub enum TessError {
    #[error("contour vertex {0:?} is not finite or exceeds the supported range")]
    InvalidCoordinate([f64; 3]),
}

/// Failure to load or decode a region.
///
/// Geometric degeneracies never end up here: they are absorbed where they
/// occur. Every variant names the offending input so the source file can be
/// fixed.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("invalid ra/dec pair: {0}")]
    InvalidRaDec(String),

    #[error("invalid cap aperture: {0}")]
    InvalidAperture(String),

    #[error("invalid CAP description: {0}")]
    InvalidCap(String),

    #[error("invalid PATH description: {0}")]
    InvalidPath(String),

    #[error("small circle angle {0} deg exceeds one full turn")]
    InvalidSmallCircleAngle(f64),

    #[error("contour has {0} vertices, at least 3 are required")]
    ContourTooShort(usize),

    #[error("region map has no worldCoords entry")]
    MissingContours,

    #[error("textureCoords has {textures} contours but worldCoords has {contours}")]
    TextureCountMismatch { contours: usize, textures: usize },

    #[error("contour {index} has {vertices} vertices but {textures} texture coordinates")]
    TextureVertexMismatch {
        index: usize,
        vertices: usize,
        textures: usize,
    },

    #[error("invalid texture coordinate: {0}")]
    InvalidTextureCoord(String),

    #[error("invalid region description: {0}")]
    InvalidRegion(String),

    #[error("unknown region type tag {0}")]
    UnknownRegionType(String),

    #[error("{what} holds {count} entries, expected {expected}")]
    MalformedStream {
        what: &'static str,
        count: usize,
        expected: &'static str,
    },

    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegionError>;
