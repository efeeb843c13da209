//! Linear Bearing Housing
//!
//! Block with a through bore for a linear bearing, held down by four bolts
//! around the bore. Nuts can be captured in pockets on the bottom face.
//!
//! Frame: the bore runs along `w` at height `h[1]`. The origin is the
//! center of the bottom face.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, SQRT_2};
use tracing::debug;

use pg_cad::error::{require_non_negative, require_positive};
use pg_cad::{
    Axis, AxisKind, BoxAnchor, BuildError, BuildResult, DocumentContext, EdgeSelector,
    EdgeTreatment, NutDepth, Part, PartAssembler, ReferencePoint, ReferenceTable,
};

use crate::placement::PartPlacement;

const HOUSING_COLOR: [f32; 4] = [0.35, 0.65, 0.35, 1.0];

/// Bearing housing parameters (mm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingHousingParams {
    pub name: String,
    /// Outer diameter of the bearing
    pub bearing_diameter: f64,
    pub bearing_length: f64,
    /// Minimum material around the bore and the bolts
    pub wall: f64,
    /// Housing length along the bore, raised to the bearing length and the
    /// bolt footprint
    pub length: Option<f64>,
    pub bolt: f64,
    /// Cut hex pockets for nuts at the bottom of the bolt holes
    pub captured_nuts: bool,
    /// Chamfer of the top edges, 0 to skip
    pub chamfer: f64,
    pub placement: PartPlacement,
}

impl Default for BearingHousingParams {
    fn default() -> Self {
        Self {
            name: "bearing_housing".into(),
            bearing_diameter: 15.0,
            bearing_length: 24.0,
            wall: 3.0,
            length: None,
            bolt: 3.0,
            captured_nuts: true,
            chamfer: 1.0,
            placement: PartPlacement::default(),
        }
    }
}

/// Build a linear bearing housing
pub fn bearing_housing(
    ctx: &DocumentContext<'_>,
    params: &BearingHousingParams,
) -> BuildResult<Part> {
    require_positive("bearing diameter", params.bearing_diameter)?;
    require_positive("bearing length", params.bearing_length)?;
    require_positive("wall", params.wall)?;
    require_non_negative("chamfer", params.chamfer)?;
    let (frame, origin) = params.placement.resolve(ctx)?;
    let mut asm = PartAssembler::new(ctx, params.name.clone(), frame, origin);
    asm.set_color(HOUSING_COLOR);

    let wall = params.wall;
    let ext = ctx.config().cut_extension;
    let bore_r = params.bearing_diameter / 2.0 + ctx.config().clearance_tolerance / 2.0;
    let axis_h = bore_r + wall;
    let height = 2.0 * axis_h;

    // Bolts run through the full height, head flush with the top
    let sizing = ctx.metric_bolt(params.bolt, height)?;
    if height <= sizing.head_length {
        return Err(BuildError::InvalidDimension(format!(
            "housing height {height} does not fit an M{} head",
            params.bolt
        )));
    }
    let mut bolt = sizing
        .with_shank_length(height - sizing.head_length)
        .with_clearance(ext, ext);
    if params.captured_nuts {
        bolt = ctx.holes().nut_pocket(&bolt, NutDepth::MinimumFit)?;
    }

    let (bore_clear, outer_clear) = if params.captured_nuts {
        (bolt.nut_radius, bolt.head_radius.max(bolt.nut_radius))
    } else {
        (bolt.shank_radius, bolt.head_radius)
    };
    let bolt_off = bore_r + wall + bore_clear;
    let depth = 2.0 * (bolt_off + outer_clear + wall);
    let length_min = params.bearing_length.max(depth);
    let length = match params.length {
        Some(l) => asm.ensure_minimum("length", l, length_min),
        None => length_min,
    };
    debug!(bore_r, bolt_off, depth, length, height, "Housing dimensions");

    // d: 1 bolt, 2 side
    // w: 1 bolt, 2 end face
    // h: 1 bore axis, 2 top
    let mut refs = ReferenceTable::new(AxisKind::Symmetric, AxisKind::Symmetric, AxisKind::Edge);
    refs.set_offset(Axis::D, 1, bolt_off)
        .set_offset(Axis::D, 2, depth / 2.0)
        .set_offset(Axis::W, 1, bolt_off)
        .set_offset(Axis::W, 2, length / 2.0)
        .set_offset(Axis::H, 1, axis_h)
        .set_offset(Axis::H, 2, height);
    asm.set_references(refs)?;

    let prims = ctx.primitives();
    asm.add_body(&prims.box_shape(
        depth,
        length,
        height,
        &frame,
        BoxAnchor::centered_on(&[Axis::D, Axis::W]),
        asm.position(0, 0, 0)?,
    )?)?;

    let mut holes = vec![prims.cylinder(
        bore_r,
        length,
        frame.axis_w(),
        prims.extended(),
        asm.position(0, -2, 1)?,
    )?];
    holes.extend(ctx.holes().bolt_circle(
        &frame,
        asm.position(0, 0, 2)?,
        bolt_off * SQRT_2,
        4,
        &bolt,
        FRAC_PI_4,
    )?);
    asm.cut_holes(&holes)?;

    if params.chamfer > 0.0 {
        let top = [
            EdgeSelector::new(Axis::D, ReferencePoint::new(0, 2, 2)),
            EdgeSelector::new(Axis::D, ReferencePoint::new(0, -2, 2)),
            EdgeSelector::new(Axis::W, ReferencePoint::new(2, 0, 2)),
            EdgeSelector::new(Axis::W, ReferencePoint::new(-2, 0, 2)),
        ];
        asm.apply_edge_treatment(&top, EdgeTreatment::Chamfer, params.chamfer)?;
    }
    asm.finish()
}
