//! Aluminium Profile Bracket
//!
//! Perpendicular bracket joining two aluminium profiles: a plate lying on
//! the first profile and a wall bolted to the second one.
//!
//! Frame: `d` runs along the plate away from the wall, `h` is the plate
//! normal and `w` spans the bracket width. The origin is the bottom of the
//! wall's outer face, centered on the width.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pg_cad::error::{require_non_negative, require_positive};
use pg_cad::{
    Attachment, Axis, AxisKind, BoltAnchor, BoxAnchor, BuildError, BuildResult,
    DocumentContext, EdgeSelector, EdgeTreatment, Part, PartAssembler, ReferencePoint,
    ReferenceTable,
};

use crate::placement::PartPlacement;

const BRACKET_COLOR: [f32; 4] = [0.8, 0.55, 0.2, 1.0];

/// Bracket parameters (mm, metric sizes as numbers: 3.0 for M3)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AluProfBracketParams {
    pub name: String,
    /// Width of the profile the plate lies on
    pub profile_width: f64,
    /// Width of the profile the wall is bolted to
    pub wall_profile_width: f64,
    /// Plate and wall thickness
    pub thickness: f64,
    pub plate_bolt: f64,
    pub wall_bolt: f64,
    /// Distance from the wall's outer face to the first plate bolt,
    /// raised so the bolt head clears the wall
    pub bolt_position: f64,
    /// Distance between two plate bolts along the profile, 0 for one bolt
    pub plate_bolt_sep: f64,
    pub plate_attachment: Attachment,
    /// Bracket width, raised to fit the bolt heads
    pub width: f64,
    /// Side walls along both plate edges
    pub reinforce: bool,
    /// Center distance of two parallel profiles under the plate
    pub twin_sep: Option<f64>,
    /// Fillet radius of the outer corner, 0 to skip
    pub fillet_radius: f64,
    pub placement: PartPlacement,
}

impl Default for AluProfBracketParams {
    fn default() -> Self {
        Self {
            name: "bracket".into(),
            profile_width: 20.0,
            wall_profile_width: 20.0,
            thickness: 3.0,
            plate_bolt: 3.0,
            wall_bolt: 3.0,
            bolt_position: 10.0,
            plate_bolt_sep: 0.0,
            plate_attachment: Attachment::Holes,
            width: 20.0,
            reinforce: false,
            twin_sep: None,
            fillet_radius: 0.0,
            placement: PartPlacement::default(),
        }
    }
}

impl AluProfBracketParams {
    fn validate(&self) -> BuildResult<()> {
        require_positive("profile width", self.profile_width)?;
        require_positive("wall profile width", self.wall_profile_width)?;
        require_positive("thickness", self.thickness)?;
        require_non_negative("plate bolt separation", self.plate_bolt_sep)?;
        require_non_negative("fillet radius", self.fillet_radius)?;
        if let Some(sep) = self.twin_sep
            && !(sep >= 2.0 * self.profile_width)
        {
            return Err(BuildError::InvalidDimension(format!(
                "twin profile separation {sep} is below twice the profile width {}",
                self.profile_width
            )));
        }
        Ok(())
    }
}

/// Build an aluminium profile bracket
pub fn alu_prof_bracket(
    ctx: &DocumentContext<'_>,
    params: &AluProfBracketParams,
) -> BuildResult<Part> {
    params.validate()?;
    let (frame, origin) = params.placement.resolve(ctx)?;
    let mut asm = PartAssembler::new(ctx, params.name.clone(), frame, origin);
    asm.set_color(BRACKET_COLOR);

    let t = params.thickness;
    let ext = ctx.config().cut_extension;
    let plate_bolt = ctx
        .metric_bolt(params.plate_bolt, t)?
        .with_clearance(ext, ext);
    let wall_bolt = ctx
        .metric_bolt(params.wall_bolt, t)?
        .with_clearance(ext, ext);
    let twin_half = params.twin_sep.map_or(0.0, |sep| sep / 2.0);
    let head_r = plate_bolt.head_radius.max(wall_bolt.head_radius);

    let bolt_pos = asm.ensure_minimum(
        "bolt_position",
        params.bolt_position,
        t + plate_bolt.head_radius,
    );
    let width = asm.ensure_minimum("width", params.width, 2.0 * (twin_half + head_r + t));
    let last_bolt = bolt_pos + params.plate_bolt_sep;
    let plate_depth = last_bolt + plate_bolt.head_radius + t;
    let wall_bolt_h = asm.ensure_minimum(
        "wall_bolt_height",
        t + params.wall_profile_width / 2.0,
        t + wall_bolt.head_radius,
    );
    let wall_height = (t + params.wall_profile_width).max(wall_bolt_h + wall_bolt.head_radius);
    debug!(bolt_pos, width, plate_depth, wall_height, "Bracket dimensions");

    // d: 1 wall inner face, 2 first plate bolt, 3 last plate bolt, 4 plate end
    // w: 1 profile center, 2 side wall inner face, 3 outer edge
    // h: 1 plate top, 2 wall bolt, 3 wall top
    let mut refs = ReferenceTable::new(AxisKind::Edge, AxisKind::Symmetric, AxisKind::Edge);
    refs.set_offset(Axis::D, 1, t)
        .set_offset(Axis::D, 2, bolt_pos)
        .set_offset(Axis::D, 3, last_bolt)
        .set_offset(Axis::D, 4, plate_depth)
        .set_offset(Axis::W, 1, twin_half)
        .set_offset(Axis::W, 2, width / 2.0 - t)
        .set_offset(Axis::W, 3, width / 2.0)
        .set_offset(Axis::H, 1, t)
        .set_offset(Axis::H, 2, wall_bolt_h)
        .set_offset(Axis::H, 3, wall_height);
    asm.set_references(refs)?;

    let prims = ctx.primitives();
    let across = BoxAnchor::centered_on(&[Axis::W]);
    let corner = asm.position(0, 0, 0)?;
    let mut bodies = vec![
        prims.box_shape(plate_depth, width, t, &frame, across, corner)?,
        prims.box_shape(t, width, wall_height, &frame, across, corner)?,
    ];
    if params.reinforce {
        for side in [2, -3] {
            bodies.push(prims.box_shape(
                plate_depth,
                t,
                wall_height,
                &frame,
                BoxAnchor::corner(),
                asm.position(0, side, 0)?,
            )?);
        }
    }
    asm.add_bodies(&bodies)?;

    let profiles: &[i32] = if params.twin_sep.is_some() { &[-1, 1] } else { &[0] };
    if params.plate_attachment == Attachment::Rail && params.plate_bolt_sep == 0.0 {
        asm.warn("A rail needs two plate bolts; drilling single holes instead");
    }

    let holes_gen = ctx.holes();
    let mut holes = Vec::new();
    for &w in profiles {
        if params.plate_bolt_sep > 0.0 {
            let center = (asm.position(2, w, 1)? + asm.position(3, w, 1)?) / 2.0
                + frame.axis_h() * plate_bolt.head_length;
            holes.extend(holes_gen.rail_or_holes(
                params.plate_attachment,
                &frame,
                center,
                Axis::D,
                params.plate_bolt_sep,
                &plate_bolt,
            )?);
        } else {
            holes.push(prims.bolt(
                &plate_bolt,
                &frame,
                BoltAnchor::HeadBase,
                asm.position(2, w, 1)?,
            )?);
        }
    }

    // Wall bolts are drilled along d, heads on the inner face
    let wall_frame = ctx.frame(frame.axis_h(), None, frame.axis_d())?;
    match params.twin_sep {
        Some(sep) => {
            let head_top = asm.position(1, 0, 2)? + frame.axis_d() * wall_bolt.head_length;
            holes.extend(holes_gen.bolt_pair(&wall_frame, head_top, Axis::W, sep, &wall_bolt)?);
        }
        None => holes.push(prims.bolt(
            &wall_bolt,
            &wall_frame,
            BoltAnchor::HeadBase,
            asm.position(1, 0, 2)?,
        )?),
    }
    asm.cut_holes(&holes)?;

    if params.fillet_radius > 0.0 {
        let outer_corner = EdgeSelector::new(Axis::W, ReferencePoint::new(0, 0, 0));
        asm.apply_edge_treatment(&[outer_corner], EdgeTreatment::Fillet, params.fillet_radius)?;
    }
    asm.finish()
}
