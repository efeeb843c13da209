//! Belt Clamp
//!
//! Base plate with two slotted posts the belt is threaded through, fixed
//! to a carriage by two bolts between the posts. The nuts are captured
//! from below.
//!
//! Frame: the belt runs along `w` through slots in the posts, `h` points
//! up from the base. The origin is the middle of the base's front bottom
//! edge.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pg_cad::error::{require_non_negative, require_positive};
use pg_cad::{
    Axis, AxisKind, BoxAnchor, BuildResult, CylinderAnchor, DocumentContext, EdgeSelector,
    EdgeTreatment, NutDepth, Part, PartAssembler, ReferencePoint, ReferenceTable,
};

use crate::placement::PartPlacement;

const CLAMP_COLOR: [f32; 4] = [0.85, 0.3, 0.3, 1.0];

/// Belt clamp parameters (mm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltClampParams {
    pub name: String,
    pub belt_width: f64,
    pub belt_thickness: f64,
    pub base_height: f64,
    /// Minimum material around cuts
    pub wall: f64,
    pub post_radius: f64,
    /// Post height above the base, raised to fit the belt slot
    pub post_height: f64,
    /// Center distance of the posts; the smallest that clears the bolt
    /// heads when not given
    pub post_sep: Option<f64>,
    pub bolt: f64,
    /// Center distance of the two bolts along `d`
    pub bolt_sep: Option<f64>,
    /// Depth of the nut pocket below the base top
    pub nut_depth: f64,
    /// Clamp width along `w`, raised to fit both posts
    pub width: Option<f64>,
    /// Fillet radius of the vertical base corners, 0 to skip
    pub fillet_radius: f64,
    pub placement: PartPlacement,
}

impl Default for BeltClampParams {
    fn default() -> Self {
        Self {
            name: "belt_clamp".into(),
            belt_width: 6.0,
            belt_thickness: 1.4,
            base_height: 6.0,
            wall: 2.0,
            post_radius: 4.0,
            post_height: 10.0,
            post_sep: None,
            bolt: 3.0,
            bolt_sep: None,
            nut_depth: 2.0,
            width: None,
            fillet_radius: 1.0,
            placement: PartPlacement::default(),
        }
    }
}

impl BeltClampParams {
    fn validate(&self) -> BuildResult<()> {
        require_positive("belt width", self.belt_width)?;
        require_positive("belt thickness", self.belt_thickness)?;
        require_positive("base height", self.base_height)?;
        require_positive("wall", self.wall)?;
        require_positive("post radius", self.post_radius)?;
        require_positive("post height", self.post_height)?;
        require_non_negative("nut depth", self.nut_depth)?;
        require_non_negative("fillet radius", self.fillet_radius)
    }
}

/// Build a belt clamp
pub fn belt_clamp(ctx: &DocumentContext<'_>, params: &BeltClampParams) -> BuildResult<Part> {
    params.validate()?;
    let (frame, origin) = params.placement.resolve(ctx)?;
    let mut asm = PartAssembler::new(ctx, params.name.clone(), frame, origin);
    asm.set_color(CLAMP_COLOR);

    let t = params.wall;
    let base_h = params.base_height;
    let ext = ctx.config().cut_extension;
    let tol = ctx.config().clearance_tolerance;

    let plain = ctx
        .metric_bolt(params.bolt, base_h)?
        .with_clearance(ext, ext);
    let bolt = ctx.holes().nut_pocket(
        &plain,
        NutDepth::ExactDistance(plain.head_length + params.nut_depth),
    )?;
    let max_r = bolt.head_radius.max(bolt.nut_radius);

    let post_r = params.post_radius;
    let post_sep_min = 2.0 * (post_r + bolt.head_radius);
    let post_sep = match params.post_sep {
        Some(sep) => asm.ensure_minimum("post_sep", sep, post_sep_min),
        None => post_sep_min,
    };
    let bolt_sep_min = 2.0 * max_r + t;
    let bolt_sep = match params.bolt_sep {
        Some(sep) => asm.ensure_minimum("bolt_sep", sep, bolt_sep_min),
        None => bolt_sep_min,
    };
    let post_d = (t + max_r + bolt_sep / 2.0).max(t + post_r);
    let depth = 2.0 * post_d;
    let width_min = post_sep + 2.0 * post_r + 2.0 * t;
    let width = match params.width {
        Some(w) => asm.ensure_minimum("width", w, width_min),
        None => width_min,
    };
    let slot_h = params.belt_width + tol;
    let post_h = asm.ensure_minimum("post_height", params.post_height, slot_h + t);
    debug!(depth, width, post_sep, bolt_sep, post_h, "Clamp dimensions");

    // d: 1 first bolt, 2 posts, 3 second bolt, 4 back
    // w: 1 post, 2 side
    // h: 1 base top, 2 slot bottom, 3 post top
    let mut refs = ReferenceTable::new(AxisKind::Edge, AxisKind::Symmetric, AxisKind::Edge);
    refs.set_offset(Axis::D, 1, post_d - bolt_sep / 2.0)
        .set_offset(Axis::D, 2, post_d)
        .set_offset(Axis::D, 3, post_d + bolt_sep / 2.0)
        .set_offset(Axis::D, 4, depth)
        .set_offset(Axis::W, 1, post_sep / 2.0)
        .set_offset(Axis::W, 2, width / 2.0)
        .set_offset(Axis::H, 1, base_h)
        .set_offset(Axis::H, 2, base_h + post_h - slot_h)
        .set_offset(Axis::H, 3, base_h + post_h);
    asm.set_references(refs)?;

    let prims = ctx.primitives();
    let mut bodies = vec![prims.box_shape(
        depth,
        width,
        base_h,
        &frame,
        BoxAnchor::centered_on(&[Axis::W]),
        asm.position(0, 0, 0)?,
    )?];
    for side in [-1, 1] {
        bodies.push(prims.cylinder(
            post_r,
            post_h,
            frame.axis_h(),
            CylinderAnchor::Base,
            asm.position(2, side, 1)?,
        )?);
    }
    asm.add_bodies(&bodies)?;

    let mut holes = ctx.holes().bolt_pair(
        &frame,
        asm.position(2, 0, 1)? + frame.axis_h() * bolt.head_length,
        Axis::D,
        bolt_sep,
        &bolt,
    )?;
    // Belt slot through both posts
    holes.push(prims.box_shape(
        params.belt_thickness + tol,
        width + 2.0 * ext,
        slot_h + ext,
        &frame,
        BoxAnchor::centered_on(&[Axis::D, Axis::W]),
        asm.position(2, 0, 2)?,
    )?);
    asm.cut_holes(&holes)?;

    if params.fillet_radius > 0.0 {
        let corners = [
            EdgeSelector::new(Axis::H, ReferencePoint::new(0, -2, 0)),
            EdgeSelector::new(Axis::H, ReferencePoint::new(0, 2, 0)),
            EdgeSelector::new(Axis::H, ReferencePoint::new(4, -2, 0)),
            EdgeSelector::new(Axis::H, ReferencePoint::new(4, 2, 0)),
        ];
        asm.apply_edge_treatment(&corners, EdgeTreatment::Fillet, params.fillet_radius)?;
    }
    asm.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pg_cad::{BuildError, CsgTreeKernel};

    #[test]
    fn test_default_clamp() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let part = belt_clamp(&ctx, &BeltClampParams::default()).unwrap();

        let size = part.size();
        assert_relative_eq!(size.x, 19.62, epsilon = 1e-9);
        assert_relative_eq!(size.y, 26.3, epsilon = 1e-9);
        assert_relative_eq!(size.z, 16.0, epsilon = 1e-9);
        assert_eq!(part.hole_count, 3);
        assert_eq!(part.edge_treatment.unwrap().edge_count, 4);
        assert_eq!(kernel.stats().prisms, 2);
    }

    #[test]
    fn test_short_posts_raised() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let params = BeltClampParams {
            post_height: 5.0,
            ..Default::default()
        };
        let part = belt_clamp(&ctx, &params).unwrap();
        let adj = part.diagnostics.adjustment("post_height").unwrap();
        assert_relative_eq!(adj.applied, 8.4, epsilon = 1e-9);
        assert_relative_eq!(part.size().z, 14.4, epsilon = 1e-9);
    }

    #[test]
    fn test_nut_too_deep() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let params = BeltClampParams {
            nut_depth: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            belt_clamp(&ctx, &params),
            Err(BuildError::InvalidDimension(_))
        ));
    }
}
