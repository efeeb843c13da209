//! Reference Tables
//!
//! Named positions along each frame axis. Generators never place shapes at
//! raw coordinates; they record offsets such as "wall face" or "bolt
//! center" under small integer codes and compose positions from them.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BuildError, BuildResult};
use crate::frame::AxisFrame;

/// One of the three frame axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Depth
    D,
    /// Width
    W,
    /// Height
    H,
}

impl Axis {
    /// All axes in d, w, h order
    pub const ALL: [Axis; 3] = [Axis::D, Axis::W, Axis::H];

    /// The two axes other than this one, in d, w, h order
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::D => [Axis::W, Axis::H],
            Axis::W => [Axis::D, Axis::H],
            Axis::H => [Axis::D, Axis::W],
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::D => 0,
            Axis::W => 1,
            Axis::H => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::D => "d",
            Axis::W => "w",
            Axis::H => "h",
        };
        f.write_str(name)
    }
}

/// How offset 0 of an axis relates to the part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisKind {
    /// Offset 0 is an outer face; codes grow from the edge inward
    #[default]
    Edge,
    /// Offset 0 is a plane of symmetry; code `-k` mirrors code `k`
    Symmetric,
}

/// Offsets recorded for one axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisReferences {
    kind: AxisKind,
    offsets: BTreeMap<i32, f64>,
}

impl AxisReferences {
    /// Create an empty axis table
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            offsets: BTreeMap::new(),
        }
    }

    /// Axis kind
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Explicitly recorded codes, ascending
    pub fn codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.offsets.keys().copied()
    }

    fn resolve(&self, code: i32) -> Option<f64> {
        if let Some(&value) = self.offsets.get(&code) {
            return Some(value);
        }
        match (code, self.kind) {
            (0, _) => Some(0.0),
            (c, AxisKind::Symmetric) if c < 0 => {
                self.offsets.get(&c.checked_neg()?).map(|v| -v)
            }
            _ => None,
        }
    }
}

/// Per-axis mapping from reference codes to offsets
///
/// Populated once after all dimensions are known, then read-only during
/// solid construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    axes: [AxisReferences; 3],
}

impl ReferenceTable {
    /// Create an empty table with the given axis kinds
    pub fn new(d: AxisKind, w: AxisKind, h: AxisKind) -> Self {
        Self {
            axes: [
                AxisReferences::new(d),
                AxisReferences::new(w),
                AxisReferences::new(h),
            ],
        }
    }

    /// Offsets of one axis
    pub fn axis(&self, axis: Axis) -> &AxisReferences {
        &self.axes[axis.index()]
    }

    /// Kind of one axis
    pub fn kind(&self, axis: Axis) -> AxisKind {
        self.axis(axis).kind
    }

    /// Record the offset of `code` on `axis`
    ///
    /// Setting the same code twice keeps the last value, so generators can
    /// redefine a code when an optional feature is absent (the second-bolt
    /// position collapses onto the first when there is no second bolt). On
    /// a symmetric axis an explicit negative code overrides the mirrored
    /// value.
    pub fn set_offset(&mut self, axis: Axis, code: i32, value: f64) -> &mut Self {
        self.axes[axis.index()].offsets.insert(code, value);
        self
    }

    /// Record `value` under the same code as `from` (explicit aliasing)
    pub fn alias(&mut self, axis: Axis, code: i32, from: i32) -> BuildResult<&mut Self> {
        let value = self.resolve(axis, from)?;
        Ok(self.set_offset(axis, code, value))
    }

    /// Offset of `code` along `axis`
    ///
    /// Code 0 is the axis origin and resolves to 0.0 unless overwritten.
    /// On a symmetric axis `-k` resolves to `-offset(k)`.
    pub fn resolve(&self, axis: Axis, code: i32) -> BuildResult<f64> {
        self.axis(axis)
            .resolve(code)
            .ok_or(BuildError::UndefinedReference { axis, code })
    }

    /// Displacement from the origin to `code`, along the frame direction of `axis`
    pub fn vector_to(&self, frame: &AxisFrame, axis: Axis, code: i32) -> BuildResult<DVec3> {
        Ok(frame.axis(axis) * self.resolve(axis, code)?)
    }

    /// Composite position `origin + d[pd]·axis_d + w[pw]·axis_w + h[ph]·axis_h`
    pub fn position(
        &self,
        frame: &AxisFrame,
        origin: DVec3,
        pd: i32,
        pw: i32,
        ph: i32,
    ) -> BuildResult<DVec3> {
        Ok(origin
            + self.vector_to(frame, Axis::D, pd)?
            + self.vector_to(frame, Axis::W, pw)?
            + self.vector_to(frame, Axis::H, ph)?)
    }

    /// Distance from code `from` to code `to` along `axis`
    pub fn span(&self, axis: Axis, from: i32, to: i32) -> BuildResult<f64> {
        Ok(self.resolve(axis, to)? - self.resolve(axis, from)?)
    }

    /// Check that offsets grow with their codes on `axis`
    ///
    /// Equal offsets are accepted (aliased codes). Mirrored codes of a
    /// symmetric axis are included in the check.
    pub fn check_monotonic(&self, axis: Axis) -> BuildResult<()> {
        let refs = self.axis(axis);
        let mut codes: Vec<i32> = refs.codes().collect();
        if refs.kind == AxisKind::Symmetric {
            codes.extend(refs.codes().filter(|c| *c > 0).map(|c| -c));
        }
        codes.push(0);
        codes.sort_unstable();
        codes.dedup();

        let mut previous: Option<(i32, f64)> = None;
        for code in codes {
            let value = self.resolve(axis, code)?;
            if let Some((prev_code, prev_value)) = previous
                && value < prev_value
            {
                return Err(BuildError::InvalidDimension(format!(
                    "reference offsets on axis {axis} are not monotonic: \
                     code {code} ({value}) lies before code {prev_code} ({prev_value})"
                )));
            }
            previous = Some((code, value));
        }
        Ok(())
    }

    /// Run [`check_monotonic`](Self::check_monotonic) on every axis
    pub fn check_all(&self) -> BuildResult<()> {
        Axis::ALL
            .iter()
            .try_for_each(|axis| self.check_monotonic(*axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket_table() -> ReferenceTable {
        let mut table = ReferenceTable::new(AxisKind::Edge, AxisKind::Symmetric, AxisKind::Edge);
        table
            .set_offset(Axis::D, 1, 3.0)
            .set_offset(Axis::D, 2, 8.0)
            .set_offset(Axis::D, 3, 20.0)
            .set_offset(Axis::W, 1, 6.0)
            .set_offset(Axis::W, 2, 10.0)
            .set_offset(Axis::H, 1, 4.0);
        table
    }

    #[test]
    fn test_resolve_and_origin() {
        let table = bracket_table();
        assert_eq!(table.resolve(Axis::D, 2).unwrap(), 8.0);
        assert_eq!(table.resolve(Axis::H, 0).unwrap(), 0.0);
        assert_eq!(table.span(Axis::D, 1, 3).unwrap(), 17.0);
    }

    #[test]
    fn test_undefined_reference() {
        let table = bracket_table();
        assert!(matches!(
            table.resolve(Axis::H, 7),
            Err(BuildError::UndefinedReference {
                axis: Axis::H,
                code: 7
            })
        ));
        // Negative codes are not mirrored on edge axes
        assert!(matches!(
            table.resolve(Axis::D, -1),
            Err(BuildError::UndefinedReference { .. })
        ));
    }

    #[test]
    fn test_symmetric_mirror() {
        let table = bracket_table();
        assert_eq!(table.resolve(Axis::W, -1).unwrap(), -6.0);
        assert_eq!(table.resolve(Axis::W, -2).unwrap(), -10.0);
    }

    #[test]
    fn test_explicit_negative_overrides_mirror() {
        let mut table = bracket_table();
        table.set_offset(Axis::W, -2, -12.0);
        assert_eq!(table.resolve(Axis::W, -2).unwrap(), -12.0);
        assert_eq!(table.resolve(Axis::W, 2).unwrap(), 10.0);
    }

    #[test]
    fn test_last_write_wins() {
        let mut table = bracket_table();
        table.set_offset(Axis::D, 2, 9.5);
        assert_eq!(table.resolve(Axis::D, 2).unwrap(), 9.5);
        table.alias(Axis::D, 4, 3).unwrap();
        assert_eq!(table.resolve(Axis::D, 4).unwrap(), 20.0);
    }

    #[test]
    fn test_position_composition() {
        let table = bracket_table();
        let frame = AxisFrame::new(DVec3::Y, None, DVec3::Z).unwrap();
        let origin = DVec3::new(100.0, 0.0, 0.0);
        let p = table.position(&frame, origin, 2, -1, 1).unwrap();
        // d = +Y, w = -X, h = +Z
        assert!(p.abs_diff_eq(DVec3::new(106.0, 8.0, 4.0), 1e-12));
        let v = table.vector_to(&frame, Axis::W, 1).unwrap();
        assert!(v.abs_diff_eq(DVec3::new(-6.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn test_monotonic() {
        let mut table = bracket_table();
        assert!(table.check_all().is_ok());

        // Aliased codes are fine
        table.alias(Axis::D, 4, 3).unwrap();
        assert!(table.check_monotonic(Axis::D).is_ok());

        table.set_offset(Axis::D, 5, 1.0);
        assert!(matches!(
            table.check_monotonic(Axis::D),
            Err(BuildError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_monotonic_symmetric_includes_mirror() {
        let mut table = ReferenceTable::new(AxisKind::Symmetric, AxisKind::Edge, AxisKind::Edge);
        table.set_offset(Axis::D, 1, -2.0);
        assert!(table.check_monotonic(Axis::D).is_err());
    }
}
