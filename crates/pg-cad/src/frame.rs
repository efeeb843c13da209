//! Axis Frame
//!
//! The local orthonormal depth/width/height triad every part is built in.
//! Frames are validated once, centrally: a non-orthogonal frame is rejected,
//! never silently corrected.

use glam::DVec3;
use serde::Serialize;

use crate::constants::{LENGTH_EPSILON, ORTHOGONALITY_TOLERANCE};
use crate::error::{BuildError, BuildResult};
use crate::reference::Axis;

/// Orthonormal depth/width/height frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisFrame {
    axis_d: DVec3,
    axis_w: DVec3,
    axis_h: DVec3,
}

impl Default for AxisFrame {
    fn default() -> Self {
        Self::standard()
    }
}

fn unit(name: &str, v: DVec3) -> BuildResult<DVec3> {
    if !v.is_finite() {
        return Err(BuildError::Orthogonality(format!("{name} is not finite")));
    }
    if v.length() <= LENGTH_EPSILON {
        return Err(BuildError::Orthogonality(format!("{name} has zero length")));
    }
    Ok(v.normalize())
}

fn check_pair(names: (&str, &str), a: DVec3, b: DVec3, tolerance: f64) -> BuildResult<()> {
    let dot = a.dot(b);
    if dot.abs() > tolerance {
        return Err(BuildError::Orthogonality(format!(
            "{} · {} = {dot:.3e} exceeds tolerance {tolerance:e}",
            names.0, names.1
        )));
    }
    Ok(())
}

impl AxisFrame {
    /// Build a frame from caller vectors with the default tolerance
    ///
    /// All vectors are normalized before the orthogonality check. When
    /// `axis_w` is `None` (or zero) it is derived as `axis_h × axis_d`,
    /// which makes the frame right-handed. A non-finite `axis_w` is an error.
    pub fn new(axis_d: DVec3, axis_w: Option<DVec3>, axis_h: DVec3) -> BuildResult<Self> {
        Self::with_tolerance(axis_d, axis_w, axis_h, ORTHOGONALITY_TOLERANCE)
    }

    /// Build a frame checking pairwise `|dot| <= tolerance`
    pub fn with_tolerance(
        axis_d: DVec3,
        axis_w: Option<DVec3>,
        axis_h: DVec3,
        tolerance: f64,
    ) -> BuildResult<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(BuildError::InvalidDimension(format!(
                "orthogonality tolerance must be positive, got {tolerance}"
            )));
        }
        let d = unit("axis_d", axis_d)?;
        let h = unit("axis_h", axis_h)?;
        check_pair(("axis_d", "axis_h"), d, h, tolerance)?;

        let w = match axis_w {
            Some(w) if !w.is_finite() || w.length() > LENGTH_EPSILON => unit("axis_w", w)?,
            _ => h.cross(d).normalize(),
        };
        check_pair(("axis_d", "axis_w"), d, w, tolerance)?;
        check_pair(("axis_w", "axis_h"), w, h, tolerance)?;

        Ok(Self {
            axis_d: d,
            axis_w: w,
            axis_h: h,
        })
    }

    /// World-aligned frame: depth = X, width = Y, height = Z
    pub fn standard() -> Self {
        Self {
            axis_d: DVec3::X,
            axis_w: DVec3::Y,
            axis_h: DVec3::Z,
        }
    }

    /// Right-handed frame whose height axis is `normal`
    ///
    /// The depth axis is world X projected onto the plane normal to
    /// `normal` (world Y when `normal` is close to X).
    pub fn from_normal(normal: DVec3) -> BuildResult<Self> {
        let h = unit("normal", normal)?;
        let reference = if h.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let d = (reference - h * reference.dot(h)).normalize();
        Self::new(d, None, h)
    }

    /// Depth axis
    pub fn axis_d(&self) -> DVec3 {
        self.axis_d
    }

    /// Width axis
    pub fn axis_w(&self) -> DVec3 {
        self.axis_w
    }

    /// Height axis
    pub fn axis_h(&self) -> DVec3 {
        self.axis_h
    }

    /// Direction of one axis
    pub fn axis(&self, axis: Axis) -> DVec3 {
        match axis {
            Axis::D => self.axis_d,
            Axis::W => self.axis_w,
            Axis::H => self.axis_h,
        }
    }

    /// Whether `axis_d × axis_w` points along `axis_h`
    pub fn is_right_handed(&self) -> bool {
        self.axis_d.cross(self.axis_w).dot(self.axis_h) > 0.0
    }

    /// Convert local (d, w, h) components into a world vector
    pub fn to_world(&self, d: f64, w: f64, h: f64) -> DVec3 {
        self.axis_d * d + self.axis_w * w + self.axis_h * h
    }

    /// Project a world vector onto the frame axes
    pub fn local_coords(&self, v: DVec3) -> DVec3 {
        DVec3::new(v.dot(self.axis_d), v.dot(self.axis_w), v.dot(self.axis_h))
    }

    /// Frame rotated by `angle` radians about its height axis
    pub fn rotated_about_h(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            axis_d: self.axis_d * cos + self.axis_w * sin,
            axis_w: self.axis_w * cos - self.axis_d * sin,
            axis_h: self.axis_h,
        }
    }
}
