//! Flattened `(geometry, attribute, frame)` addressing.
//!
//! Layout nodes and keyframe nodes share one index space so that both can live
//! in the same dependency graph:
//!
//! ```text
//! index(geo, attr, frame) = geo * (num_attrs * num_frames) + attr * num_frames + frame
//! ```

use core::fmt;

use crate::attr::Attr;
use crate::error::GraphError;
use crate::template::GeoId;

/// Position of one value in the flat evaluated array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlatIndex(pub(crate) u32);

impl FlatIndex {
    /// Returns the raw index.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FlatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Extent of one template's index space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphDims {
    geometries: usize,
    frames: usize,
}

impl GraphDims {
    /// Creates dimensions for `geometries` geometries over `frames` keyframes.
    pub const fn new(geometries: usize, frames: usize) -> Self {
        Self { geometries, frames }
    }

    /// Number of geometries.
    #[inline]
    pub fn geometries(&self) -> usize {
        self.geometries
    }

    /// Number of keyframes (`max_keyframe`).
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Total number of flattened indices, `N`. Saturates instead of overflowing so
    /// that an absurd template fails the capacity check rather than wrapping.
    pub fn node_count(&self) -> usize {
        self.geometries
            .saturating_mul(Attr::COUNT)
            .saturating_mul(self.frames)
    }

    /// Flattens a coordinate.
    pub fn index(&self, geo: GeoId, attr: Attr, frame: usize) -> Result<FlatIndex, GraphError> {
        if geo >= self.geometries || frame >= self.frames {
            return Err(GraphError::OutOfRange {
                geo,
                attr,
                frame,
                geometries: self.geometries,
                frames: self.frames,
            });
        }
        let raw = geo * (Attr::COUNT * self.frames) + attr.index() * self.frames + frame;
        u32::try_from(raw)
            .map(FlatIndex)
            .map_err(|_| GraphError::CapacityExceeded {
                what: "index",
                needed: raw + 1,
                capacity: u32::MAX as usize,
            })
    }

    /// Splits an index back into `(geo, attr, frame)`.
    pub fn coords(&self, index: FlatIndex) -> (GeoId, Attr, usize) {
        let raw = index.get();
        let per_geo = Attr::COUNT * self.frames;
        let geo = raw / per_geo;
        let rest = raw % per_geo;
        let attr = Attr::ALL[rest / self.frames];
        (geo, attr, rest % self.frames)
    }

    /// Returns the attribute encoded in `index`.
    pub fn attr_of(&self, index: FlatIndex) -> Attr {
        self.coords(index).1
    }
}
