//! Primitive Builder
//!
//! Oriented descriptions of boxes, cylinders, stadium slots and bolt shapes,
//! expressed in an [`AxisFrame`] rather than world coordinates. Nothing here
//! touches the kernel until [`Primitive::materialize`] is called.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CUT_EXTENSION, HEX_SIDES};
use crate::error::{BuildError, BuildResult, require_non_negative, require_positive};
use crate::frame::AxisFrame;
use crate::kernel::{Axis3D, GeometryKernel, Placement, Solid};
use crate::reference::Axis;

/// Per-axis choice between centering a box on its position or growing it
/// from the position along the positive axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxAnchor {
    pub center_d: bool,
    pub center_w: bool,
    pub center_h: bool,
}

impl BoxAnchor {
    /// Position is the minimum corner
    pub fn corner() -> Self {
        Self::default()
    }

    /// Position is the box center
    pub fn centered() -> Self {
        Self {
            center_d: true,
            center_w: true,
            center_h: true,
        }
    }

    /// Centered on the listed axes only
    pub fn centered_on(axes: &[Axis]) -> Self {
        Self {
            center_d: axes.contains(&Axis::D),
            center_w: axes.contains(&Axis::W),
            center_h: axes.contains(&Axis::H),
        }
    }

    /// Whether `axis` is centered
    pub fn is_centered(&self, axis: Axis) -> bool {
        match axis {
            Axis::D => self.center_d,
            Axis::W => self.center_w,
            Axis::H => self.center_h,
        }
    }
}

/// Where a cylinder sits relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum CylinderAnchor {
    /// Base disc centered on the position
    #[default]
    Base,
    /// Middle of the axis on the position
    Centered,
    /// Base on the position, then lengthened by the given amount at both
    /// ends so cuts never leave coincident faces
    Extended(f64),
}

/// Which point of a stadium its position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StadiumReference {
    /// Center of the end cap furthest along the depth axis
    FarCenter,
    /// Center of the end cap at the start of the depth axis
    NearCenter,
    /// Halfway between the two cap centers
    #[default]
    Midpoint,
}

/// Which ends of a stadium are rounded
///
/// A flat end stops at its cap center, so a single-cap stadium spans from
/// the rounded end to the other cap center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StadiumCaps {
    #[default]
    Both,
    /// Only the cap at the start of the depth axis
    Near,
    /// Only the cap furthest along the depth axis
    Far,
}

impl StadiumCaps {
    fn near(self) -> bool {
        matches!(self, StadiumCaps::Both | StadiumCaps::Near)
    }

    fn far(self) -> bool {
        matches!(self, StadiumCaps::Both | StadiumCaps::Far)
    }
}

/// Which point of a bolt shape its position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoltAnchor {
    /// Top face of the head
    #[default]
    HeadTop,
    /// Face where the head meets the shank
    HeadBase,
    /// End of the shank
    Tip,
}

/// Two-level racetrack slot
///
/// Both levels share the same cap centers `length` apart. The lower level
/// (from the base up to `small_radius_height`) uses `small_radius`, the
/// upper level (up to `total_height`) uses `large_radius`. A bolt rail is
/// the shank slot below and the head slot above. With `small_radius_height`
/// at zero the slot has a single level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StadiumSpec {
    pub length: f64,
    pub small_radius: f64,
    pub large_radius: f64,
    pub total_height: f64,
    pub small_radius_height: f64,
    #[serde(default)]
    pub caps: StadiumCaps,
}

impl StadiumSpec {
    /// Check dimension ranges
    pub fn validate(&self) -> BuildResult<()> {
        require_positive("stadium length", self.length)?;
        require_positive("stadium small radius", self.small_radius)?;
        require_positive("stadium large radius", self.large_radius)?;
        require_positive("stadium total height", self.total_height)?;
        require_non_negative("stadium small radius height", self.small_radius_height)?;
        if self.large_radius < self.small_radius {
            return Err(BuildError::InvalidDimension(format!(
                "stadium large radius {} is smaller than small radius {}",
                self.large_radius, self.small_radius
            )));
        }
        if self.small_radius_height > self.total_height {
            return Err(BuildError::InvalidDimension(format!(
                "stadium small radius height {} exceeds total height {}",
                self.small_radius_height, self.total_height
            )));
        }
        Ok(())
    }

    /// (radius, bottom, top) of each non-empty level
    fn levels(&self) -> impl Iterator<Item = (f64, f64, f64)> {
        [
            (self.small_radius, 0.0, self.small_radius_height),
            (
                self.large_radius,
                self.small_radius_height,
                self.total_height,
            ),
        ]
        .into_iter()
        .filter(|(_, bottom, top)| top > bottom)
    }
}

/// Hex nut pocket along a bolt shank
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutPocket {
    /// Distance from the head top to the start of the pocket
    pub start: f64,
    /// Pocket length along the shank
    pub length: f64,
}

/// Bolt-with-head cut shape
///
/// Measured along the bolt axis from the head top towards the tip: the
/// head occupies `[-extra_head, head_length]` and the shank
/// `[0, head_length + shank_length + extra_shank]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltSpec {
    /// Metric size this bolt was derived from, if any
    pub metric: Option<f64>,
    pub shank_radius: f64,
    pub shank_length: f64,
    pub head_radius: f64,
    pub head_length: f64,
    /// Circumradius of the matching hex nut (clearance included)
    pub nut_radius: f64,
    /// Length of the matching hex nut (clearance included)
    pub nut_length: f64,
    /// Captured nut pocket, if the bolt has one
    pub nut_pocket: Option<NutPocket>,
    /// Extra length above the head top
    pub extra_head: f64,
    /// Extra length beyond the shank tip
    pub extra_shank: f64,
}

impl BoltSpec {
    /// Bolt without nut hardware
    pub fn new(shank_radius: f64, shank_length: f64, head_radius: f64, head_length: f64) -> Self {
        Self {
            metric: None,
            shank_radius,
            shank_length,
            head_radius,
            head_length,
            nut_radius: 0.0,
            nut_length: 0.0,
            nut_pocket: None,
            extra_head: 0.0,
            extra_shank: 0.0,
        }
    }

    /// Set the matching nut dimensions
    pub fn with_nut(mut self, nut_radius: f64, nut_length: f64) -> Self {
        self.nut_radius = nut_radius;
        self.nut_length = nut_length;
        self
    }

    /// Set the extra lengths above the head and beyond the tip
    pub fn with_clearance(mut self, extra_head: f64, extra_shank: f64) -> Self {
        self.extra_head = extra_head;
        self.extra_shank = extra_shank;
        self
    }

    /// Same bolt with a different shank length
    pub fn with_shank_length(mut self, shank_length: f64) -> Self {
        self.shank_length = shank_length;
        self
    }

    /// Head length plus shank length
    pub fn total_length(&self) -> f64 {
        self.head_length + self.shank_length
    }

    /// Whether a hex nut pocket is cut along the shank
    pub fn has_nut_pocket(&self) -> bool {
        self.nut_pocket.is_some()
    }

    /// Check dimension ranges
    pub fn validate(&self) -> BuildResult<()> {
        require_positive("bolt shank radius", self.shank_radius)?;
        require_positive("bolt shank length", self.shank_length)?;
        require_positive("bolt head radius", self.head_radius)?;
        require_positive("bolt head length", self.head_length)?;
        require_non_negative("bolt extra head clearance", self.extra_head)?;
        require_non_negative("bolt extra shank clearance", self.extra_shank)?;
        if self.head_radius < self.shank_radius {
            return Err(BuildError::InvalidDimension(format!(
                "bolt head radius {} is smaller than shank radius {}",
                self.head_radius, self.shank_radius
            )));
        }
        if let Some(pocket) = &self.nut_pocket {
            require_positive("nut radius", self.nut_radius)?;
            require_non_negative("nut pocket start", pocket.start)?;
            require_positive("nut pocket length", pocket.length)?;
            if self.nut_radius <= self.shank_radius {
                return Err(BuildError::InvalidDimension(format!(
                    "nut radius {} does not clear shank radius {}",
                    self.nut_radius, self.shank_radius
                )));
            }
        }
        Ok(())
    }
}

/// Shape and dimensions of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PrimitiveShape {
    /// Box spanning depth × width × height along the frame axes
    Box { depth: f64, width: f64, height: f64 },
    /// Cylinder along the frame height axis
    Cylinder { radius: f64, height: f64 },
    /// Racetrack slot, cap centers along the frame depth axis
    Stadium(StadiumSpec),
    /// Bolt shape, head towards the frame height axis
    Bolt(BoltSpec),
}

impl PrimitiveShape {
    /// Short name of the shape kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            PrimitiveShape::Box { .. } => "box",
            PrimitiveShape::Cylinder { .. } => "cylinder",
            PrimitiveShape::Stadium(_) => "stadium",
            PrimitiveShape::Bolt(_) => "bolt",
        }
    }
}

/// Oriented primitive ready to be materialized
///
/// `origin` is the canonical reference point of the shape after the
/// caller's anchor has been applied: the minimum corner of a box, the base
/// center of a cylinder, the near cap center of a stadium on its base, and
/// the head top of a bolt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Primitive {
    shape: PrimitiveShape,
    frame: AxisFrame,
    origin: DVec3,
}

impl Primitive {
    /// Shape and dimensions
    pub fn shape(&self) -> &PrimitiveShape {
        &self.shape
    }

    /// Orientation
    pub fn frame(&self) -> &AxisFrame {
        &self.frame
    }

    /// Canonical reference point
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Bolt spec, if this is a bolt shape
    pub fn as_bolt(&self) -> Option<&BoltSpec> {
        match &self.shape {
            PrimitiveShape::Bolt(spec) => Some(spec),
            _ => None,
        }
    }

    /// Stadium spec, if this is a stadium slot
    pub fn as_stadium(&self) -> Option<&StadiumSpec> {
        match &self.shape {
            PrimitiveShape::Stadium(spec) => Some(spec),
            _ => None,
        }
    }

    /// Convert the description into a kernel solid
    pub fn materialize(&self, kernel: &dyn GeometryKernel) -> BuildResult<Solid> {
        debug!(kind = self.shape.kind_name(), origin = ?self.origin, "Materializing primitive");
        let frame = &self.frame;
        let solid = match &self.shape {
            PrimitiveShape::Box {
                depth,
                width,
                height,
            } => kernel.make_box(
                &frame_placement(frame, self.origin),
                DVec3::new(*depth, *width, *height),
            )?,
            PrimitiveShape::Cylinder { radius, height } => kernel.make_cylinder(
                &Axis3D::new(self.origin, frame.axis_h()),
                *radius,
                *height,
            )?,
            PrimitiveShape::Stadium(spec) => {
                let mut parts = Vec::with_capacity(6);
                for (radius, bottom, top) in spec.levels() {
                    let base = self.origin + frame.axis_h() * bottom;
                    let level_height = top - bottom;
                    parts.push(kernel.make_box(
                        &frame_placement(frame, base - frame.axis_w() * radius),
                        DVec3::new(spec.length, 2.0 * radius, level_height),
                    )?);
                    let far = base + frame.axis_d() * spec.length;
                    let caps = [(spec.caps.near(), base), (spec.caps.far(), far)];
                    for cap in caps.into_iter().filter_map(|(on, c)| on.then_some(c)) {
                        parts.push(kernel.make_cylinder(
                            &Axis3D::new(cap, frame.axis_h()),
                            radius,
                            level_height,
                        )?);
                    }
                }
                kernel.fuse(&parts)?
            }
            PrimitiveShape::Bolt(spec) => {
                let h = frame.axis_h();
                let top = self.origin;
                let mut parts = Vec::with_capacity(3);
                parts.push(kernel.make_cylinder(
                    &Axis3D::new(top - h * spec.head_length, h),
                    spec.head_radius,
                    spec.head_length + spec.extra_head,
                )?);
                let shank_end = spec.total_length() + spec.extra_shank;
                parts.push(kernel.make_cylinder(
                    &Axis3D::new(top - h * shank_end, h),
                    spec.shank_radius,
                    shank_end,
                )?);
                if let Some(pocket) = &spec.nut_pocket {
                    parts.push(kernel.make_polygon_prism(
                        &Axis3D::new(top - h * (pocket.start + pocket.length), h),
                        HEX_SIDES,
                        spec.nut_radius,
                        pocket.length,
                        frame.axis_d(),
                    )?);
                }
                kernel.fuse(&parts)?
            }
        };
        Ok(solid)
    }
}

fn frame_placement(frame: &AxisFrame, origin: DVec3) -> Placement {
    Placement {
        origin,
        x_axis: frame.axis_d(),
        y_axis: frame.axis_w(),
        z_axis: frame.axis_h(),
    }
}

/// Factory for [`Primitive`] descriptions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveBuilder {
    cut_extension: f64,
}

impl Default for PrimitiveBuilder {
    fn default() -> Self {
        Self::new(CUT_EXTENSION)
    }
}

impl PrimitiveBuilder {
    /// Builder whose [`extended`](Self::extended) anchor uses `cut_extension`
    pub fn new(cut_extension: f64) -> Self {
        Self { cut_extension }
    }

    /// Configured cut extension
    pub fn cut_extension(&self) -> f64 {
        self.cut_extension
    }

    /// Cylinder anchor extended by the configured cut extension
    pub fn extended(&self) -> CylinderAnchor {
        CylinderAnchor::Extended(self.cut_extension)
    }

    /// Box of `depth` × `width` × `height` along the frame axes
    pub fn box_shape(
        &self,
        depth: f64,
        width: f64,
        height: f64,
        frame: &AxisFrame,
        anchor: BoxAnchor,
        position: DVec3,
    ) -> BuildResult<Primitive> {
        require_positive("box depth", depth)?;
        require_positive("box width", width)?;
        require_positive("box height", height)?;

        let half = |axis: Axis, size: f64| {
            if anchor.is_centered(axis) {
                frame.axis(axis) * (size / 2.0)
            } else {
                DVec3::ZERO
            }
        };
        let origin =
            position - half(Axis::D, depth) - half(Axis::W, width) - half(Axis::H, height);

        Ok(Primitive {
            shape: PrimitiveShape::Box {
                depth,
                width,
                height,
            },
            frame: *frame,
            origin,
        })
    }

    /// Cylinder of `radius` and `height` along `normal`
    pub fn cylinder(
        &self,
        radius: f64,
        height: f64,
        normal: DVec3,
        anchor: CylinderAnchor,
        position: DVec3,
    ) -> BuildResult<Primitive> {
        require_positive("cylinder radius", radius)?;
        require_positive("cylinder height", height)?;
        let frame = AxisFrame::from_normal(normal)?;
        let n = frame.axis_h();

        let (origin, height) = match anchor {
            CylinderAnchor::Base => (position, height),
            CylinderAnchor::Centered => (position - n * (height / 2.0), height),
            CylinderAnchor::Extended(extension) => {
                require_non_negative("cylinder extension", extension)?;
                (position - n * extension, height + 2.0 * extension)
            }
        };

        Ok(Primitive {
            shape: PrimitiveShape::Cylinder { radius, height },
            frame,
            origin,
        })
    }

    /// Racetrack slot whose caps lie along the frame depth axis and whose
    /// levels stack along the frame height axis from `position`
    pub fn stadium(
        &self,
        spec: StadiumSpec,
        frame: &AxisFrame,
        reference: StadiumReference,
        position: DVec3,
    ) -> BuildResult<Primitive> {
        spec.validate()?;
        let back = match reference {
            StadiumReference::NearCenter => 0.0,
            StadiumReference::Midpoint => spec.length / 2.0,
            StadiumReference::FarCenter => spec.length,
        };
        Ok(Primitive {
            shape: PrimitiveShape::Stadium(spec),
            frame: *frame,
            origin: position - frame.axis_d() * back,
        })
    }

    /// Bolt shape whose head faces the frame height axis
    pub fn bolt(
        &self,
        spec: &BoltSpec,
        frame: &AxisFrame,
        anchor: BoltAnchor,
        position: DVec3,
    ) -> BuildResult<Primitive> {
        spec.validate()?;
        let up = match anchor {
            BoltAnchor::HeadTop => 0.0,
            BoltAnchor::HeadBase => spec.head_length,
            BoltAnchor::Tip => spec.total_length(),
        };
        Ok(Primitive {
            shape: PrimitiveShape::Bolt(*spec),
            frame: *frame,
            origin: position + frame.axis_h() * up,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::CsgTreeKernel;
    use approx::assert_relative_eq;

    fn rail_spec() -> StadiumSpec {
        StadiumSpec {
            length: 20.0,
            small_radius: 1.7,
            large_radius: 3.0,
            total_height: 10.0,
            small_radius_height: 6.0,
            caps: StadiumCaps::Both,
        }
    }

    #[test]
    fn test_box_anchor_modes() {
        let kernel = CsgTreeKernel::new();
        let builder = PrimitiveBuilder::default();
        let frame = AxisFrame::standard();

        let corner = builder
            .box_shape(40.0, 10.0, 5.0, &frame, BoxAnchor::corner(), DVec3::ZERO)
            .unwrap();
        let bb = kernel
            .bounding_box(&corner.materialize(&kernel).unwrap())
            .unwrap();
        assert_eq!(bb.min, DVec3::ZERO);
        assert_eq!(bb.max, DVec3::new(40.0, 10.0, 5.0));

        let centered_w = builder
            .box_shape(
                40.0,
                10.0,
                5.0,
                &frame,
                BoxAnchor::centered_on(&[Axis::W]),
                DVec3::ZERO,
            )
            .unwrap();
        assert_eq!(centered_w.origin(), DVec3::new(0.0, -5.0, 0.0));
    }

    #[test]
    fn test_box_in_rotated_frame() {
        let kernel = CsgTreeKernel::new();
        let frame = AxisFrame::new(DVec3::Y, None, DVec3::Z).unwrap();
        let primitive = PrimitiveBuilder::default()
            .box_shape(40.0, 10.0, 5.0, &frame, BoxAnchor::corner(), DVec3::ZERO)
            .unwrap();
        let bb = kernel
            .bounding_box(&primitive.materialize(&kernel).unwrap())
            .unwrap();
        // width grows along -X
        assert!(bb.size().abs_diff_eq(DVec3::new(10.0, 40.0, 5.0), 1e-12));
        assert_relative_eq!(bb.min.x, -10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_box_rejects_non_positive() {
        let builder = PrimitiveBuilder::default();
        let result = builder.box_shape(
            0.0,
            10.0,
            5.0,
            &AxisFrame::standard(),
            BoxAnchor::corner(),
            DVec3::ZERO,
        );
        assert!(matches!(result, Err(BuildError::InvalidDimension(_))));
    }

    #[test]
    fn test_cylinder_anchor_modes() {
        let kernel = CsgTreeKernel::new();
        let builder = PrimitiveBuilder::new(1.0);
        let bounds_z = |anchor| {
            let c = builder
                .cylinder(2.0, 10.0, DVec3::Z, anchor, DVec3::ZERO)
                .unwrap();
            let bb = kernel
                .bounding_box(&c.materialize(&kernel).unwrap())
                .unwrap();
            (bb.min.z, bb.max.z)
        };

        assert_eq!(bounds_z(CylinderAnchor::Base), (0.0, 10.0));
        assert_eq!(bounds_z(CylinderAnchor::Centered), (-5.0, 5.0));
        assert_eq!(bounds_z(builder.extended()), (-1.0, 11.0));
    }

    #[test]
    fn test_cylinder_rejects_bad_input() {
        let builder = PrimitiveBuilder::default();
        assert!(matches!(
            builder.cylinder(-1.0, 10.0, DVec3::Z, CylinderAnchor::Base, DVec3::ZERO),
            Err(BuildError::InvalidDimension(_))
        ));
        assert!(matches!(
            builder.cylinder(1.0, 10.0, DVec3::ZERO, CylinderAnchor::Base, DVec3::ZERO),
            Err(BuildError::Orthogonality(_))
        ));
        assert!(matches!(
            builder.cylinder(
                1.0,
                10.0,
                DVec3::Z,
                CylinderAnchor::Extended(-0.5),
                DVec3::ZERO
            ),
            Err(BuildError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_stadium_reference_modes() {
        let builder = PrimitiveBuilder::default();
        let frame = AxisFrame::standard();
        let origin_for = |reference| {
            builder
                .stadium(rail_spec(), &frame, reference, DVec3::new(10.0, 0.0, 0.0))
                .unwrap()
                .origin()
        };
        assert_eq!(origin_for(StadiumReference::NearCenter).x, 10.0);
        assert_eq!(origin_for(StadiumReference::Midpoint).x, 0.0);
        assert_eq!(origin_for(StadiumReference::FarCenter).x, -10.0);
    }

    #[test]
    fn test_stadium_materialize() {
        let kernel = CsgTreeKernel::new();
        let stadium = PrimitiveBuilder::default()
            .stadium(
                rail_spec(),
                &AxisFrame::standard(),
                StadiumReference::Midpoint,
                DVec3::ZERO,
            )
            .unwrap();
        let solid = stadium.materialize(&kernel).unwrap();
        let bb = kernel.bounding_box(&solid).unwrap();
        assert_relative_eq!(bb.min.x, -13.0);
        assert_relative_eq!(bb.max.x, 13.0);
        assert_relative_eq!(bb.max.y, 3.0);
        assert_relative_eq!(bb.max.z, 10.0);

        let stats = kernel.stats();
        assert_eq!(stats.boxes, 2);
        assert_eq!(stats.cylinders, 4);
        assert_eq!(stats.fuses, 1);
    }

    #[test]
    fn test_single_level_stadium() {
        let kernel = CsgTreeKernel::new();
        let spec = StadiumSpec {
            small_radius_height: 10.0,
            ..rail_spec()
        };
        let stadium = PrimitiveBuilder::default()
            .stadium(
                spec,
                &AxisFrame::standard(),
                StadiumReference::NearCenter,
                DVec3::ZERO,
            )
            .unwrap();
        let bb = kernel
            .bounding_box(&stadium.materialize(&kernel).unwrap())
            .unwrap();
        assert_relative_eq!(bb.max.y, 1.7);
        assert_eq!(kernel.stats().cylinders, 2);
    }

    #[test]
    fn test_single_cap_stadium_bounds() {
        let bounds_for = |caps| {
            let kernel = CsgTreeKernel::new();
            let spec = StadiumSpec {
                caps,
                ..rail_spec()
            };
            let stadium = PrimitiveBuilder::default()
                .stadium(
                    spec,
                    &AxisFrame::standard(),
                    StadiumReference::NearCenter,
                    DVec3::ZERO,
                )
                .unwrap();
            let bb = kernel
                .bounding_box(&stadium.materialize(&kernel).unwrap())
                .unwrap();
            (bb, kernel.stats().cylinders)
        };

        let (near, cylinders) = bounds_for(StadiumCaps::Near);
        assert_relative_eq!(near.min.x, -3.0);
        assert_relative_eq!(near.max.x, 20.0);
        assert_relative_eq!(near.max.y, 3.0);
        assert_eq!(cylinders, 2);

        let (far, cylinders) = bounds_for(StadiumCaps::Far);
        assert_relative_eq!(far.min.x, 0.0);
        assert_relative_eq!(far.max.x, 23.0);
        assert_eq!(cylinders, 2);

        let (both, cylinders) = bounds_for(StadiumCaps::Both);
        assert_relative_eq!(both.min.x, -3.0);
        assert_relative_eq!(both.max.x, 23.0);
        assert_eq!(cylinders, 4);
    }

    #[test]
    fn test_single_cap_far_reference() {
        let kernel = CsgTreeKernel::new();
        let spec = StadiumSpec {
            caps: StadiumCaps::Far,
            ..rail_spec()
        };
        // Rounded end on the bolt position, flat end 20 mm back along depth
        let stadium = PrimitiveBuilder::default()
            .stadium(
                spec,
                &AxisFrame::standard(),
                StadiumReference::FarCenter,
                DVec3::new(5.0, 0.0, 0.0),
            )
            .unwrap();
        let bb = kernel
            .bounding_box(&stadium.materialize(&kernel).unwrap())
            .unwrap();
        assert_relative_eq!(bb.min.x, -15.0);
        assert_relative_eq!(bb.max.x, 8.0);
    }

    #[test]
    fn test_stadium_without_lower_level() {
        let kernel = CsgTreeKernel::new();
        let spec = StadiumSpec {
            small_radius_height: 0.0,
            ..rail_spec()
        };
        let stadium = PrimitiveBuilder::default()
            .stadium(
                spec,
                &AxisFrame::standard(),
                StadiumReference::Midpoint,
                DVec3::ZERO,
            )
            .unwrap();
        let bb = kernel
            .bounding_box(&stadium.materialize(&kernel).unwrap())
            .unwrap();
        assert_relative_eq!(bb.min.z, 0.0);
        assert_relative_eq!(bb.max.z, 10.0);
        assert_relative_eq!(bb.max.y, 3.0);
        let stats = kernel.stats();
        assert_eq!(stats.boxes, 1);
        assert_eq!(stats.cylinders, 2);
    }

    #[test]
    fn test_stadium_validation() {
        let builder = PrimitiveBuilder::default();
        let frame = AxisFrame::standard();
        let inverted = StadiumSpec {
            large_radius: 1.0,
            ..rail_spec()
        };
        assert!(matches!(
            builder.stadium(inverted, &frame, StadiumReference::Midpoint, DVec3::ZERO),
            Err(BuildError::InvalidDimension(_))
        ));
        let too_tall = StadiumSpec {
            small_radius_height: 12.0,
            ..rail_spec()
        };
        assert!(builder
            .stadium(too_tall, &frame, StadiumReference::Midpoint, DVec3::ZERO)
            .is_err());
    }

    #[test]
    fn test_bolt_shape() {
        let kernel = CsgTreeKernel::new();
        let builder = PrimitiveBuilder::default();
        let spec = BoltSpec::new(1.7, 10.0, 3.0, 3.0).with_clearance(2.0, 1.0);

        let bolt = builder
            .bolt(&spec, &AxisFrame::standard(), BoltAnchor::HeadTop, DVec3::ZERO)
            .unwrap();
        let bb = kernel
            .bounding_box(&bolt.materialize(&kernel).unwrap())
            .unwrap();
        assert_relative_eq!(bb.min.z, -14.0);
        assert_relative_eq!(bb.max.z, 2.0);
        assert_relative_eq!(bb.max.x, 3.0);

        let from_tip = builder
            .bolt(&spec, &AxisFrame::standard(), BoltAnchor::Tip, DVec3::ZERO)
            .unwrap();
        assert_eq!(from_tip.origin(), DVec3::new(0.0, 0.0, 13.0));
    }

    #[test]
    fn test_bolt_with_nut_pocket() {
        let kernel = CsgTreeKernel::new();
        let mut spec = BoltSpec::new(1.7, 10.0, 3.0, 3.0).with_nut(3.2, 2.8);
        spec.nut_pocket = Some(NutPocket {
            start: 8.0,
            length: 2.8,
        });
        assert!(spec.has_nut_pocket());

        let bolt = PrimitiveBuilder::default()
            .bolt(&spec, &AxisFrame::standard(), BoltAnchor::HeadTop, DVec3::ZERO)
            .unwrap();
        let bb = kernel
            .bounding_box(&bolt.materialize(&kernel).unwrap())
            .unwrap();
        assert_relative_eq!(bb.max.x, 3.2, epsilon = 1e-12);
        assert_eq!(kernel.stats().prisms, 1);
    }

    #[test]
    fn test_bolt_validation() {
        let builder = PrimitiveBuilder::default();
        let frame = AxisFrame::standard();
        let small_head = BoltSpec::new(2.0, 10.0, 1.5, 3.0);
        assert!(builder
            .bolt(&small_head, &frame, BoltAnchor::HeadTop, DVec3::ZERO)
            .is_err());

        let mut tight_nut = BoltSpec::new(1.7, 10.0, 3.0, 3.0).with_nut(1.5, 2.4);
        tight_nut.nut_pocket = Some(NutPocket {
            start: 5.0,
            length: 2.4,
        });
        assert!(matches!(
            builder.bolt(&tight_nut, &frame, BoltAnchor::HeadTop, DVec3::ZERO),
            Err(BuildError::InvalidDimension(_))
        ));
    }
}
