//! Global constants for pg-cad

/// Maximum |dot| accepted between two normalized frame axes
pub const ORTHOGONALITY_TOLERANCE: f64 = 1e-6;

/// Lengths below this are treated as zero (degenerate vectors, coincident offsets)
pub const LENGTH_EPSILON: f64 = 1e-9;

/// Extra length added at both ends of cutting shapes so boolean subtraction
/// never leaves coincident faces behind (mm)
pub const CUT_EXTENSION: f64 = 1.0;

/// Printing clearance added to hole diameters (mm)
pub const TOL: f64 = 0.4;

/// Number of sides of a hex nut pocket
pub const HEX_SIDES: u32 = 6;

/// Default color for parts (gray, RGBA)
pub const DEFAULT_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Distance within which an edge midpoint matches a selector's reference point
pub const EDGE_MATCH_TOLERANCE: f64 = 1e-6;
