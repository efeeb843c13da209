//! Geometry kernel trait definitions
//!
//! These traits define the interface every boolean-CSG backend must
//! implement. Solids are opaque handles; the construction engine never
//! looks inside them beyond bounds and edge positions.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an edge within a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    /// ID of the solid this edge belongs to
    pub solid_id: Uuid,
    /// Index of the edge within the solid
    pub index: u32,
}

impl EdgeId {
    /// Create a new edge ID
    pub fn new(solid_id: Uuid, index: u32) -> Self {
        Self { solid_id, index }
    }
}

/// Information about a straight edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Start point of the edge
    pub start: DVec3,
    /// End point of the edge
    pub end: DVec3,
    /// Midpoint of the edge
    pub midpoint: DVec3,
    /// Length of the edge
    pub length: f64,
}

impl EdgeInfo {
    /// Create a new edge info
    pub fn new(id: EdgeId, start: DVec3, end: DVec3) -> Self {
        let midpoint = (start + end) * 0.5;
        let length = (end - start).length();
        Self {
            id,
            start,
            end,
            midpoint,
            length,
        }
    }

    /// Unit direction from start to end (zero for degenerate edges)
    pub fn direction(&self) -> DVec3 {
        (self.end - self.start).normalize_or_zero()
    }
}

/// Axis-aligned bounding box in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Aabb {
    /// Create a box from two corners (in any order)
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// Extent along each world axis
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap of both boxes, `None` when disjoint
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmple(max).all() {
            Some(Aabb { min, max })
        } else {
            None
        }
    }

    /// Extent of the box projected onto a unit direction
    pub fn extent_along(&self, direction: DVec3) -> f64 {
        let half = self.size() * 0.5;
        2.0 * (half.x * direction.x.abs() + half.y * direction.y.abs() + half.z * direction.z.abs())
    }
}

/// Error type for geometry kernel operations
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Solid not found: {0}")]
    SolidNotFound(Uuid),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Edge treatment failed: {0}")]
    EdgeTreatmentFailed(String),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// A 3D solid body handle
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Solid {
    /// Unique identifier
    pub id: Uuid,
    /// Internal marker for kernel data (actual data stored in kernel)
    #[serde(skip)]
    has_kernel_data: bool,
}

impl Clone for Solid {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            has_kernel_data: self.has_kernel_data,
        }
    }
}

impl Solid {
    /// Create a new solid with the given ID
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            has_kernel_data: false,
        }
    }

    /// Mark that this solid has kernel data
    pub fn with_kernel_data(mut self) -> Self {
        self.has_kernel_data = true;
        self
    }

    /// Check if this solid has kernel data
    pub fn has_kernel_data(&self) -> bool {
        self.has_kernel_data
    }
}

/// Axis definition for cylinders and prisms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis3D {
    /// Origin point of the axis (base center of the shape)
    pub origin: DVec3,
    /// Direction of the axis (normalized)
    pub direction: DVec3,
}

impl Axis3D {
    /// Create an axis from origin and direction
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Z axis at origin
    pub fn z() -> Self {
        Self::new(DVec3::ZERO, DVec3::Z)
    }
}

/// Oriented placement of a box: a corner and three edge directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Corner the box grows from
    pub origin: DVec3,
    /// Direction of the first size component
    pub x_axis: DVec3,
    /// Direction of the second size component
    pub y_axis: DVec3,
    /// Direction of the third size component
    pub z_axis: DVec3,
}

impl Placement {
    /// World-aligned placement at a corner
    pub fn at(origin: DVec3) -> Self {
        Self {
            origin,
            x_axis: DVec3::X,
            y_axis: DVec3::Y,
            z_axis: DVec3::Z,
        }
    }

    /// The eight corners of a box of `size` at this placement
    pub fn corners(&self, size: DVec3) -> [DVec3; 8] {
        let x = self.x_axis * size.x;
        let y = self.y_axis * size.y;
        let z = self.z_axis * size.z;
        let o = self.origin;
        [
            o,
            o + x,
            o + y,
            o + x + y,
            o + z,
            o + x + z,
            o + y + z,
            o + x + y + z,
        ]
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (add)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// The boolean-CSG kernel contract
///
/// Implementations own the actual solid representation. A kernel is passed
/// explicitly to every construction call, so independent builds can run on
/// separate kernel instances.
pub trait GeometryKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Create a box spanning `[0, size]` along the placement axes
    fn make_box(&self, placement: &Placement, size: DVec3) -> KernelResult<Solid>;

    /// Create a cylinder whose base disc is centered on `axis.origin`
    ///
    /// # Arguments
    /// * `axis` - Base center and extrusion direction
    /// * `radius` - Cylinder radius
    /// * `height` - Length along `axis.direction`
    fn make_cylinder(&self, axis: &Axis3D, radius: f64, height: f64) -> KernelResult<Solid>;

    /// Create a regular polygonal prism (used for hex nut pockets)
    ///
    /// # Arguments
    /// * `axis` - Base center and extrusion direction
    /// * `vertex_count` - Number of polygon vertices
    /// * `circumradius` - Distance from center to each vertex
    /// * `height` - Length along `axis.direction`
    /// * `reference_direction` - Direction of the first vertex from the center
    fn make_polygon_prism(
        &self,
        axis: &Axis3D,
        vertex_count: u32,
        circumradius: f64,
        height: f64,
        reference_direction: DVec3,
    ) -> KernelResult<Solid>;

    /// Perform a boolean operation on two solids
    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> KernelResult<Solid>;

    /// Union of many solids
    ///
    /// The default folds pairwise; kernels with a native multi-fuse should
    /// override it.
    fn fuse(&self, solids: &[Solid]) -> KernelResult<Solid> {
        let (first, rest) = solids
            .split_first()
            .ok_or_else(|| KernelError::EmptyInput("fuse needs at least one solid".into()))?;
        rest.iter().try_fold(first.clone(), |acc, solid| {
            self.boolean(&acc, solid, BooleanType::Union)
        })
    }

    /// Axis-aligned bounds of a solid
    fn bounding_box(&self, solid: &Solid) -> KernelResult<Aabb>;

    /// Get all straight edges of a solid with their positions
    fn get_edges(&self, solid: &Solid) -> KernelResult<Vec<EdgeInfo>>;

    /// Apply fillet (rounded edge) to selected edges
    fn fillet(&self, solid: &Solid, edges: &[EdgeId], radius: f64) -> KernelResult<Solid>;

    /// Apply chamfer (beveled edge) to selected edges
    fn chamfer(&self, solid: &Solid, edges: &[EdgeId], distance: f64) -> KernelResult<Solid>;
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> KernelResult<T> {
        Err(KernelError::KernelNotAvailable(
            "No geometry kernel available".into(),
        ))
    }
}

impl GeometryKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn make_box(&self, _placement: &Placement, _size: DVec3) -> KernelResult<Solid> {
        Self::unavailable()
    }

    fn make_cylinder(&self, _axis: &Axis3D, _radius: f64, _height: f64) -> KernelResult<Solid> {
        Self::unavailable()
    }

    fn make_polygon_prism(
        &self,
        _axis: &Axis3D,
        _vertex_count: u32,
        _circumradius: f64,
        _height: f64,
        _reference_direction: DVec3,
    ) -> KernelResult<Solid> {
        Self::unavailable()
    }

    fn boolean(&self, _a: &Solid, _b: &Solid, _op: BooleanType) -> KernelResult<Solid> {
        Self::unavailable()
    }

    fn bounding_box(&self, _solid: &Solid) -> KernelResult<Aabb> {
        Self::unavailable()
    }

    fn get_edges(&self, _solid: &Solid) -> KernelResult<Vec<EdgeInfo>> {
        Self::unavailable()
    }

    fn fillet(&self, _solid: &Solid, _edges: &[EdgeId], _radius: f64) -> KernelResult<Solid> {
        Self::unavailable()
    }

    fn chamfer(&self, _solid: &Solid, _edges: &[EdgeId], _distance: f64) -> KernelResult<Solid> {
        Self::unavailable()
    }
}
