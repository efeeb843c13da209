//! Geometry kernel abstraction
//!
//! - [`GeometryKernel`]: the boolean-CSG backend contract
//! - [`NullKernel`]: placeholder that rejects every call
//! - [`CsgTreeKernel`]: in-memory reference backend that records construction trees

mod csg_tree;
mod traits;

pub use csg_tree::{CsgNode, CsgTreeKernel, KernelStats, TreatmentKind};
pub use traits::{
    Aabb, Axis3D, BooleanType, EdgeId, EdgeInfo, GeometryKernel, KernelError, KernelResult,
    NullKernel, Placement, Solid,
};
