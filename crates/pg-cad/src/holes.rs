//! Hole Pattern Generator
//!
//! Compound cut shapes for bolt circles, bolt pairs, rails and captured
//! nuts. Everything returns descriptions; the assembler unions them and
//! subtracts the result in one kernel call.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, warn};

use crate::error::{BuildError, BuildResult, require_non_negative, require_positive};
use crate::frame::AxisFrame;
use crate::primitive::{
    BoltAnchor, BoltSpec, NutPocket, Primitive, PrimitiveBuilder, StadiumCaps, StadiumReference,
    StadiumSpec,
};
use crate::reference::Axis;

/// How an attachment point is drilled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Attachment {
    /// Two discrete bolt holes
    #[default]
    Holes,
    /// One continuous slot spanning both bolt positions
    Rail,
}

/// How deep a captured nut pocket sits along the bolt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NutDepth {
    /// Just deep enough for the nut, at the tip end of the shank
    MinimumFit,
    /// Starting at this distance from the head top and open towards the tip
    ExactDistance(f64),
}

/// Builds bolt hole patterns in a part frame
///
/// Every bolt is placed by its head top and drilled against the frame
/// height axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct HolePatternGenerator {
    builder: PrimitiveBuilder,
}

impl HolePatternGenerator {
    /// Create a generator on top of a primitive builder
    pub fn new(builder: PrimitiveBuilder) -> Self {
        Self { builder }
    }

    /// `count` bolts evenly spaced on a circle in the d-w plane
    ///
    /// The first bolt sits at `start_angle` radians from the depth axis,
    /// turning towards the width axis. Each bolt frame is rotated with it,
    /// so nut pockets keep the same orientation relative to the center.
    pub fn bolt_circle(
        &self,
        frame: &AxisFrame,
        center: DVec3,
        radius: f64,
        count: u32,
        bolt: &BoltSpec,
        start_angle: f64,
    ) -> BuildResult<Vec<Primitive>> {
        if count == 0 {
            return Err(BuildError::InvalidDimension(
                "bolt circle needs at least one bolt".into(),
            ));
        }
        require_non_negative("bolt circle radius", radius)?;
        debug!(count, radius, "Bolt circle");

        (0..count)
            .map(|i| {
                let angle = start_angle + TAU * f64::from(i) / f64::from(count);
                let bolt_frame = frame.rotated_about_h(angle);
                let position = center + bolt_frame.axis_d() * radius;
                self.builder
                    .bolt(bolt, &bolt_frame, BoltAnchor::HeadTop, position)
            })
            .collect()
    }

    /// Two bolts `separation` apart along `axis`, symmetric about `center`
    pub fn bolt_pair(
        &self,
        frame: &AxisFrame,
        center: DVec3,
        axis: Axis,
        separation: f64,
        bolt: &BoltSpec,
    ) -> BuildResult<Vec<Primitive>> {
        let direction = Self::spread_direction(frame, axis)?;
        require_positive("bolt pair separation", separation)?;
        debug!(%axis, separation, "Bolt pair");

        [-0.5, 0.5]
            .into_iter()
            .map(|side| {
                self.builder.bolt(
                    bolt,
                    frame,
                    BoltAnchor::HeadTop,
                    center + direction * (side * separation),
                )
            })
            .collect()
    }

    /// Either a [`bolt_pair`](Self::bolt_pair) or one rail spanning both
    /// bolt positions
    ///
    /// The rail is a stadium of length `separation` whose narrow level
    /// clears the shank and whose wide level clears the head. Rails cannot
    /// capture nuts, so a nut pocket on `bolt` is dropped in rail mode.
    pub fn rail_or_holes(
        &self,
        mode: Attachment,
        frame: &AxisFrame,
        center: DVec3,
        axis: Axis,
        separation: f64,
        bolt: &BoltSpec,
    ) -> BuildResult<Vec<Primitive>> {
        match mode {
            Attachment::Holes => self.bolt_pair(frame, center, axis, separation, bolt),
            Attachment::Rail => {
                let direction = Self::spread_direction(frame, axis)?;
                bolt.validate()?;
                if bolt.has_nut_pocket() {
                    warn!("Nut pocket ignored on a rail attachment");
                }
                let below_top = bolt.total_length() + bolt.extra_shank;
                let spec = StadiumSpec {
                    length: separation,
                    small_radius: bolt.shank_radius,
                    large_radius: bolt.head_radius,
                    total_height: below_top + bolt.extra_head,
                    small_radius_height: bolt.shank_length + bolt.extra_shank,
                    caps: StadiumCaps::Both,
                };
                let rail_frame = AxisFrame::new(direction, None, frame.axis_h())?;
                debug!(%axis, separation, "Bolt rail");
                let rail = self.builder.stadium(
                    spec,
                    &rail_frame,
                    StadiumReference::Midpoint,
                    center - frame.axis_h() * below_top,
                )?;
                Ok(vec![rail])
            }
        }
    }

    /// Same bolt with a captured hex nut pocket
    pub fn nut_pocket(&self, bolt: &BoltSpec, policy: NutDepth) -> BuildResult<BoltSpec> {
        if !(bolt.nut_radius > 0.0 && bolt.nut_length > 0.0) {
            return Err(BuildError::InvalidDimension(
                "bolt has no nut dimensions".into(),
            ));
        }
        let total = bolt.total_length();
        let pocket = match policy {
            NutDepth::MinimumFit => {
                if bolt.nut_length > bolt.shank_length {
                    return Err(BuildError::InvalidDimension(format!(
                        "nut length {} exceeds shank length {}",
                        bolt.nut_length, bolt.shank_length
                    )));
                }
                NutPocket {
                    start: total - bolt.nut_length,
                    length: bolt.nut_length + bolt.extra_shank,
                }
            }
            NutDepth::ExactDistance(depth) => {
                require_non_negative("nut pocket depth", depth)?;
                if depth + bolt.nut_length > total {
                    return Err(BuildError::InvalidDimension(format!(
                        "nut pocket at depth {depth} does not fit a bolt of length {total}"
                    )));
                }
                NutPocket {
                    start: depth,
                    length: total + bolt.extra_shank - depth,
                }
            }
        };

        let spec = BoltSpec {
            nut_pocket: Some(pocket),
            ..*bolt
        };
        spec.validate()?;
        Ok(spec)
    }

    fn spread_direction(frame: &AxisFrame, axis: Axis) -> BuildResult<DVec3> {
        if axis == Axis::H {
            return Err(BuildError::InvalidDimension(
                "bolts cannot be spread along the drilling axis".into(),
            ));
        }
        Ok(frame.axis(axis))
    }
}
