//! NEMA Motor Holder
//!
//! L-shaped holder: the motor face is bolted to a vertical wall and the
//! base is fixed to the machine frame through two rails (or hole pairs).
//!
//! Frame: `h` is the wall height, `d` runs along the base away from the
//! wall and the motor sits on the `-d` side of the wall. The origin is the
//! bottom of the wall's outer face, centered on the width.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;
use tracing::debug;

use pg_cad::error::{require_non_negative, require_positive};
use pg_cad::{
    Attachment, Axis, AxisKind, BoxAnchor, BuildResult, DocumentContext, EdgeSelector,
    EdgeTreatment, Part, PartAssembler, ReferencePoint, ReferenceTable, nema_motor,
};

use crate::placement::PartPlacement;

const HOLDER_COLOR: [f32; 4] = [0.25, 0.45, 0.75, 1.0];

/// Motor holder parameters (mm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NemaHolderParams {
    pub name: String,
    /// NEMA frame size: 11, 14, 17 or 23
    pub nema_size: u32,
    /// Wall and base thickness
    pub thickness: f64,
    /// Height of the motor axis above the base bottom, raised to fit the
    /// motor; the smallest fitting height when not given
    pub motor_height: Option<f64>,
    /// Base length along `d`, raised to fit the rails
    pub base_length: Option<f64>,
    /// Length of the base rails
    pub rail_length: f64,
    pub base_bolt: f64,
    pub base_attachment: Attachment,
    /// Chamfer of the wall top edges, 0 to skip
    pub chamfer: f64,
    pub placement: PartPlacement,
}

impl Default for NemaHolderParams {
    fn default() -> Self {
        Self {
            name: "nema_holder".into(),
            nema_size: 17,
            thickness: 4.0,
            motor_height: None,
            base_length: None,
            rail_length: 10.0,
            base_bolt: 3.0,
            base_attachment: Attachment::Rail,
            chamfer: 1.0,
            placement: PartPlacement::default(),
        }
    }
}

/// Build a NEMA motor holder
pub fn nema_holder(ctx: &DocumentContext<'_>, params: &NemaHolderParams) -> BuildResult<Part> {
    require_positive("thickness", params.thickness)?;
    require_positive("rail length", params.rail_length)?;
    require_non_negative("chamfer", params.chamfer)?;
    let motor = nema_motor(params.nema_size)?;
    let (frame, origin) = params.placement.resolve(ctx)?;
    let mut asm = PartAssembler::new(ctx, params.name.clone(), frame, origin);
    asm.set_color(HOLDER_COLOR);

    let t = params.thickness;
    let ext = ctx.config().cut_extension;
    let tol = ctx.config().clearance_tolerance;
    let motor_bolt = ctx
        .metric_bolt(motor.bolt_metric, t)?
        .with_clearance(ext, ext);
    let base_bolt = ctx
        .metric_bolt(params.base_bolt, t)?
        .with_clearance(ext, ext);
    let half_sep = motor.bolt_separation / 2.0;
    let boss_r = motor.boss_diameter / 2.0 + tol;

    let width = asm.ensure_minimum(
        "width",
        motor.width,
        2.0 * (half_sep + motor_bolt.head_radius.max(base_bolt.head_radius)),
    );
    let motor_h_min = (width / 2.0)
        .max(t + half_sep + motor_bolt.head_radius)
        .max(t + boss_r);
    let motor_h = match params.motor_height {
        Some(h) => asm.ensure_minimum("motor_height", h, motor_h_min),
        None => motor_h_min,
    };
    let wall_height = motor_h + width / 2.0;

    let rail_start = t + motor_bolt.head_length + base_bolt.head_radius;
    let rail_end = rail_start + params.rail_length;
    let base_min = rail_end + base_bolt.head_radius + t;
    let base_length = match params.base_length {
        Some(l) => asm.ensure_minimum("base_length", l, base_min),
        None => base_min,
    };
    debug!(width, motor_h, wall_height, base_length, "Holder dimensions");

    // d: 1 wall inner face, 2 rail start, 3 rail end, 4 base end
    // w: 1 rail, 2 side
    // h: 1 base top, 2 motor axis, 3 wall top
    let mut refs = ReferenceTable::new(AxisKind::Edge, AxisKind::Symmetric, AxisKind::Edge);
    refs.set_offset(Axis::D, 1, t)
        .set_offset(Axis::D, 2, rail_start)
        .set_offset(Axis::D, 3, rail_end)
        .set_offset(Axis::D, 4, base_length)
        .set_offset(Axis::W, 1, half_sep)
        .set_offset(Axis::W, 2, width / 2.0)
        .set_offset(Axis::H, 1, t)
        .set_offset(Axis::H, 2, motor_h)
        .set_offset(Axis::H, 3, wall_height);
    asm.set_references(refs)?;

    let prims = ctx.primitives();
    let across = BoxAnchor::centered_on(&[Axis::W]);
    let corner = asm.position(0, 0, 0)?;
    asm.add_bodies(&[
        prims.box_shape(t, width, wall_height, &frame, across, corner)?,
        prims.box_shape(base_length, width, t, &frame, across, corner)?,
    ])?;

    let holes_gen = ctx.holes();
    let mut holes = Vec::new();

    // Motor bolts: heads inside the holder, drilled towards the motor
    let wall_frame = ctx.frame(frame.axis_h(), None, frame.axis_d())?;
    let motor_center = asm.position(1, 0, 2)? + frame.axis_d() * motor_bolt.head_length;
    holes.extend(holes_gen.bolt_circle(
        &wall_frame,
        motor_center,
        motor.bolt_circle_radius(),
        4,
        &motor_bolt,
        FRAC_PI_4,
    )?);
    holes.push(prims.cylinder(
        boss_r,
        t,
        frame.axis_d(),
        prims.extended(),
        asm.position(0, 0, 2)?,
    )?);

    for side in [-1, 1] {
        let center = rail_center(&asm, side)? + frame.axis_h() * base_bolt.head_length;
        holes.extend(holes_gen.rail_or_holes(
            params.base_attachment,
            &frame,
            center,
            Axis::D,
            params.rail_length,
            &base_bolt,
        )?);
    }
    asm.cut_holes(&holes)?;

    if params.chamfer > 0.0 {
        let wall_top = [
            EdgeSelector::new(Axis::W, ReferencePoint::new(0, 0, 3)),
            EdgeSelector::new(Axis::W, ReferencePoint::new(1, 0, 3)),
        ];
        asm.apply_edge_treatment(&wall_top, EdgeTreatment::Chamfer, params.chamfer)?;
    }
    asm.finish()
}

/// Midpoint of a base rail on the base top
fn rail_center(asm: &PartAssembler<'_>, side: i32) -> BuildResult<DVec3> {
    Ok((asm.position(2, side, 1)? + asm.position(3, side, 1)?) / 2.0)
}
