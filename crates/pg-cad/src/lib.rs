//! Axis-Referenced Solid Construction
//!
//! This crate provides:
//! - Geometry kernel trait plus a CSG-tree reference kernel
//! - Orthonormal depth/width/height frames and per-axis reference tables
//! - Oriented primitives (box, cylinder, stadium slot, bolt shape)
//! - Bolt circles, bolt pairs, rails and captured nut pockets
//! - A part assembler that unions bodies, cuts holes in one pass and
//!   applies fillets or chamfers to edges picked by reference codes
//! - Metric screw and NEMA motor tables

pub mod assembler;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod frame;
pub mod holes;
pub mod kernel;
pub mod metric;
pub mod primitive;
pub mod reference;

// Re-exports for convenience
pub use assembler::{
    Adjustment, AppliedTreatment, AssemblyState, Diagnostics, EdgeSelector, EdgeTreatment, Part,
    PartAssembler, ReferencePoint, raise_to_minimum,
};
pub use config::{BuildConfig, ConfigError};
pub use context::DocumentContext;
pub use error::{BuildError, BuildResult};
pub use frame::AxisFrame;
pub use holes::{Attachment, HolePatternGenerator, NutDepth};
pub use kernel::{
    Aabb, Axis3D, BooleanType, CsgTreeKernel, EdgeId, EdgeInfo, GeometryKernel, KernelError,
    KernelResult, KernelStats, NullKernel, Placement, Solid,
};
pub use metric::{MetricBolt, NemaMotor, metric_bolt, nema_motor};
pub use primitive::{
    BoltAnchor, BoltSpec, BoxAnchor, CylinderAnchor, NutPocket, Primitive, PrimitiveBuilder,
    PrimitiveShape, StadiumCaps, StadiumReference, StadiumSpec,
};
pub use reference::{Axis, AxisKind, ReferenceTable};
