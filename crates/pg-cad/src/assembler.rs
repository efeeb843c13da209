//! Part Assembler
//!
//! Drives one part through `Empty → BodyAccumulated → HolesCut →
//! EdgeTreated`. Bodies are unioned, all holes are fused into a single tool
//! and subtracted once, then an optional fillet or chamfer is applied to
//! edges picked by reference codes.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::EDGE_MATCH_TOLERANCE;
use crate::context::DocumentContext;
use crate::error::{BuildError, BuildResult, require_positive};
use crate::frame::AxisFrame;
use crate::kernel::{Aabb, BooleanType, EdgeId, Solid};
use crate::primitive::Primitive;
use crate::reference::{Axis, ReferenceTable};

/// Assembler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyState {
    /// Nothing built yet
    Empty,
    /// At least one body primitive added
    BodyAccumulated,
    /// Holes subtracted (possibly none)
    HolesCut,
    /// Fillet or chamfer applied; terminal
    EdgeTreated,
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyState::Empty => "empty",
            AssemblyState::BodyAccumulated => "accumulating bodies",
            AssemblyState::HolesCut => "done cutting holes",
            AssemblyState::EdgeTreated => "edge treated",
        };
        f.write_str(name)
    }
}

/// A caller dimension that was raised to its geometric minimum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub parameter: String,
    pub requested: f64,
    pub applied: f64,
}

/// Recoverable findings collected while building a part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub adjustments: Vec<Adjustment>,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    /// Check if nothing was adjusted or reported
    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty() && self.warnings.is_empty()
    }

    /// Find the adjustment recorded for a parameter
    pub fn adjustment(&self, parameter: &str) -> Option<&Adjustment> {
        self.adjustments.iter().find(|a| a.parameter == parameter)
    }
}

/// Edge treatment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeTreatment {
    /// Rounded edges
    Fillet,
    /// Beveled edges
    Chamfer,
}

/// Edge treatment recorded on a finished part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedTreatment {
    pub mode: EdgeTreatment,
    /// Fillet radius or chamfer distance
    pub size: f64,
    pub edge_count: usize,
}

/// Point given as one reference code per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub d: i32,
    pub w: i32,
    pub h: i32,
}

impl ReferencePoint {
    pub fn new(d: i32, w: i32, h: i32) -> Self {
        Self { d, w, h }
    }

    /// Code for one axis
    pub fn code(&self, axis: Axis) -> i32 {
        match axis {
            Axis::D => self.d,
            Axis::W => self.w,
            Axis::H => self.h,
        }
    }
}

/// Selects the straight edges parallel to `along` that pass through
/// `point`; the code of `point` on the `along` axis is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSelector {
    pub along: Axis,
    pub point: ReferencePoint,
}

impl EdgeSelector {
    pub fn new(along: Axis, point: ReferencePoint) -> Self {
        Self { along, point }
    }
}

/// A finished part
///
/// The frame and reference table used to build it are not retained.
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub id: Uuid,
    pub name: String,
    pub solid: Solid,
    pub bounds: Aabb,
    /// RGBA color hint
    pub color: [f32; 4],
    /// Number of hole primitives subtracted
    pub hole_count: usize,
    pub edge_treatment: Option<AppliedTreatment>,
    pub diagnostics: Diagnostics,
}

impl Part {
    /// Bounding box extent along each world axis
    pub fn size(&self) -> DVec3 {
        self.bounds.size()
    }
}

/// State machine building one part
pub struct PartAssembler<'a> {
    ctx: &'a DocumentContext<'a>,
    name: String,
    frame: AxisFrame,
    refs: ReferenceTable,
    origin: DVec3,
    state: AssemblyState,
    body: Option<Solid>,
    hole_count: usize,
    edge_treatment: Option<AppliedTreatment>,
    color: [f32; 4],
    diagnostics: Diagnostics,
}

impl<'a> PartAssembler<'a> {
    /// Start a part whose reference codes are measured from `origin` along `frame`
    pub fn new(
        ctx: &'a DocumentContext<'a>,
        name: impl Into<String>,
        frame: AxisFrame,
        origin: DVec3,
    ) -> Self {
        let name = name.into();
        debug!(part = %name, "Starting part");
        Self {
            ctx,
            name,
            frame,
            refs: ReferenceTable::default(),
            origin,
            state: AssemblyState::Empty,
            body: None,
            hole_count: 0,
            edge_treatment: None,
            color: ctx.config().default_color,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn frame(&self) -> &AxisFrame {
        &self.frame
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn context(&self) -> &'a DocumentContext<'a> {
        self.ctx
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.refs
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Set the color hint of the finished part
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    /// Install the reference table
    ///
    /// Only allowed before the first body is added. Every axis must be
    /// monotonic.
    pub fn set_references(&mut self, refs: ReferenceTable) -> BuildResult<()> {
        self.require_state("set references", &[AssemblyState::Empty])?;
        refs.check_all()?;
        self.refs = refs;
        Ok(())
    }

    /// World position of a reference point
    pub fn position(&self, pd: i32, pw: i32, ph: i32) -> BuildResult<DVec3> {
        self.refs.position(&self.frame, self.origin, pd, pw, ph)
    }

    /// World position of a [`ReferencePoint`]
    pub fn point(&self, point: ReferencePoint) -> BuildResult<DVec3> {
        self.position(point.d, point.w, point.h)
    }

    /// Offset of `code` along `axis`
    pub fn offset(&self, axis: Axis, code: i32) -> BuildResult<f64> {
        self.refs.resolve(axis, code)
    }

    /// Raise `requested` to `minimum` when it is smaller
    ///
    /// The adjustment is logged and recorded in the diagnostics, never
    /// raised as an error. The result only depends on the two inputs.
    pub fn ensure_minimum(&mut self, parameter: &str, requested: f64, minimum: f64) -> f64 {
        let applied = raise_to_minimum(requested, minimum);
        if applied != requested {
            warn!(
                part = %self.name,
                parameter,
                requested,
                applied,
                "Dimension raised to its minimum"
            );
            // Bitwise so a NaN request is recorded once
            let recorded = self.diagnostics.adjustments.iter().any(|a| {
                a.parameter == parameter
                    && a.requested.to_bits() == requested.to_bits()
                    && a.applied.to_bits() == applied.to_bits()
            });
            if !recorded {
                self.diagnostics.adjustments.push(Adjustment {
                    parameter: parameter.to_string(),
                    requested,
                    applied,
                });
            }
        }
        applied
    }

    /// Record a free-form warning
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(part = %self.name, "{message}");
        self.diagnostics.warnings.push(message);
    }

    /// Union one body primitive into the part
    pub fn add_body(&mut self, primitive: &Primitive) -> BuildResult<()> {
        self.add_bodies(std::slice::from_ref(primitive))
    }

    /// Union several body primitives into the part in one kernel call
    pub fn add_bodies(&mut self, primitives: &[Primitive]) -> BuildResult<()> {
        self.require_state(
            "add a body",
            &[AssemblyState::Empty, AssemblyState::BodyAccumulated],
        )?;
        if primitives.is_empty() {
            return Ok(());
        }

        let kernel = self.ctx.kernel();
        let mut solids = Vec::with_capacity(primitives.len() + 1);
        if let Some(body) = &self.body {
            solids.push(body.clone());
        }
        for primitive in primitives {
            solids.push(primitive.materialize(kernel)?);
        }
        debug!(part = %self.name, count = primitives.len(), "Adding bodies");

        self.body = Some(kernel.fuse(&solids)?);
        self.state = AssemblyState::BodyAccumulated;
        Ok(())
    }

    /// Fuse all holes into one tool and subtract it from the body once
    pub fn cut_holes(&mut self, holes: &[Primitive]) -> BuildResult<()> {
        self.require_state("cut holes", &[AssemblyState::BodyAccumulated])?;
        let body = self.require_body()?;

        if !holes.is_empty() {
            let kernel = self.ctx.kernel();
            let tools = holes
                .iter()
                .map(|h| h.materialize(kernel))
                .collect::<BuildResult<Vec<_>>>()?;
            let tool = kernel.fuse(&tools)?;
            debug!(part = %self.name, count = holes.len(), "Cutting holes");
            self.body = Some(kernel.boolean(&body, &tool, BooleanType::Subtract)?);
        }

        self.hole_count = holes.len();
        self.state = AssemblyState::HolesCut;
        Ok(())
    }

    /// Edges of the current body matched by `selectors`
    ///
    /// Each selector must match at least one edge.
    pub fn select_edges(&self, selectors: &[EdgeSelector]) -> BuildResult<Vec<EdgeId>> {
        let body = self.require_body()?;
        let edges = self.ctx.kernel().get_edges(&body)?;

        let mut selected: Vec<EdgeId> = Vec::new();
        for selector in selectors {
            let axis_dir = self.frame.axis(selector.along);
            let target = self.frame.local_coords(self.point(selector.point)? - self.origin);
            let [a, b] = selector.along.others();
            let component = |v: DVec3, axis: Axis| match axis {
                Axis::D => v.x,
                Axis::W => v.y,
                Axis::H => v.z,
            };

            let before = selected.len();
            for edge in &edges {
                if edge.length <= EDGE_MATCH_TOLERANCE
                    || edge.direction().dot(axis_dir).abs() < 1.0 - EDGE_MATCH_TOLERANCE
                {
                    continue;
                }
                let mid = self.frame.local_coords(edge.midpoint - self.origin);
                let matches = [a, b].iter().all(|axis| {
                    (component(mid, *axis) - component(target, *axis)).abs()
                        <= EDGE_MATCH_TOLERANCE
                });
                if matches && !selected.contains(&edge.id) {
                    selected.push(edge.id);
                }
            }
            if selected.len() == before {
                return Err(BuildError::EdgeSelection(format!(
                    "no edge along {} through ({}, {}, {})",
                    selector.along, selector.point.d, selector.point.w, selector.point.h
                )));
            }
        }
        Ok(selected)
    }

    /// Fillet or chamfer the edges picked by `selectors`
    pub fn apply_edge_treatment(
        &mut self,
        selectors: &[EdgeSelector],
        mode: EdgeTreatment,
        size: f64,
    ) -> BuildResult<()> {
        self.require_state("apply an edge treatment", &[AssemblyState::HolesCut])?;
        require_positive("edge treatment size", size)?;
        if selectors.is_empty() {
            return Err(BuildError::EdgeSelection("no edge selectors given".into()));
        }

        let edges = self.select_edges(selectors)?;
        let body = self.require_body()?;
        let kernel = self.ctx.kernel();
        debug!(part = %self.name, ?mode, size, edges = edges.len(), "Treating edges");
        let treated = match mode {
            EdgeTreatment::Fillet => kernel.fillet(&body, &edges, size)?,
            EdgeTreatment::Chamfer => kernel.chamfer(&body, &edges, size)?,
        };

        self.body = Some(treated);
        self.edge_treatment = Some(AppliedTreatment {
            mode,
            size,
            edge_count: edges.len(),
        });
        self.state = AssemblyState::EdgeTreated;
        Ok(())
    }

    /// Produce the finished part
    pub fn finish(self) -> BuildResult<Part> {
        self.require_state(
            "finish",
            &[AssemblyState::HolesCut, AssemblyState::EdgeTreated],
        )?;
        let solid = self.require_body()?;
        let bounds = self.ctx.kernel().bounding_box(&solid)?;

        info!(
            part = %self.name,
            holes = self.hole_count,
            adjustments = self.diagnostics.adjustments.len(),
            "Part finished"
        );
        Ok(Part {
            id: Uuid::new_v4(),
            name: self.name,
            solid,
            bounds,
            color: self.color,
            hole_count: self.hole_count,
            edge_treatment: self.edge_treatment,
            diagnostics: self.diagnostics,
        })
    }

    fn require_state(&self, operation: &'static str, allowed: &[AssemblyState]) -> BuildResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(BuildError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn require_body(&self) -> BuildResult<Solid> {
        self.body.clone().ok_or(BuildError::InvalidState {
            operation: "use the body",
            state: self.state,
        })
    }
}

/// `requested` raised to `minimum`; NaN requests take the minimum
pub fn raise_to_minimum(requested: f64, minimum: f64) -> f64 {
    if requested >= minimum {
        requested
    } else {
        minimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{CsgTreeKernel, GeometryKernel};
    use crate::primitive::BoxAnchor;
    use crate::reference::AxisKind;

    fn plate(ctx: &DocumentContext<'_>) -> Primitive {
        ctx.primitives()
            .box_shape(
                40.0,
                10.0,
                5.0,
                &AxisFrame::standard(),
                BoxAnchor::corner(),
                DVec3::ZERO,
            )
            .unwrap()
    }

    fn hole(ctx: &DocumentContext<'_>, x: f64) -> Primitive {
        ctx.primitives()
            .cylinder(
                1.7,
                5.0,
                DVec3::Z,
                ctx.primitives().extended(),
                DVec3::new(x, 5.0, 0.0),
            )
            .unwrap()
    }

    fn plate_refs() -> ReferenceTable {
        let mut refs = ReferenceTable::new(AxisKind::Edge, AxisKind::Edge, AxisKind::Edge);
        refs.set_offset(Axis::D, 1, 40.0)
            .set_offset(Axis::W, 1, 10.0)
            .set_offset(Axis::H, 1, 5.0);
        refs
    }

    #[test]
    fn test_full_sequence() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);
        asm.set_references(plate_refs()).unwrap();
        asm.add_body(&plate(&ctx)).unwrap();
        assert_eq!(asm.state(), AssemblyState::BodyAccumulated);

        asm.cut_holes(&[hole(&ctx, 10.0), hole(&ctx, 30.0)]).unwrap();
        assert_eq!(asm.state(), AssemblyState::HolesCut);

        // Vertical edge at the far outer corner
        let corner = EdgeSelector::new(Axis::H, ReferencePoint::new(1, 1, 0));
        asm.apply_edge_treatment(&[corner], EdgeTreatment::Fillet, 2.0)
            .unwrap();
        assert_eq!(asm.state(), AssemblyState::EdgeTreated);

        let part = asm.finish().unwrap();
        assert_eq!(part.hole_count, 2);
        assert_eq!(part.size(), DVec3::new(40.0, 10.0, 5.0));
        assert_eq!(part.edge_treatment.unwrap().edge_count, 1);

        let stats = kernel.stats();
        assert_eq!(stats.fuses, 1);
        assert_eq!(stats.subtractions, 1);
        assert_eq!(stats.fillets, 1);
    }

    #[test]
    fn test_out_of_order_calls() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);

        assert!(matches!(
            asm.cut_holes(&[]),
            Err(BuildError::InvalidState {
                state: AssemblyState::Empty,
                ..
            })
        ));
        let selector = EdgeSelector::new(Axis::H, ReferencePoint::default());
        assert!(matches!(
            asm.apply_edge_treatment(&[selector], EdgeTreatment::Chamfer, 1.0),
            Err(BuildError::InvalidState { .. })
        ));

        asm.add_body(&plate(&ctx)).unwrap();
        assert!(matches!(
            asm.set_references(plate_refs()),
            Err(BuildError::InvalidState { .. })
        ));
        asm.cut_holes(&[]).unwrap();
        assert!(matches!(
            asm.add_body(&plate(&ctx)),
            Err(BuildError::InvalidState {
                state: AssemblyState::HolesCut,
                ..
            })
        ));
        assert!(matches!(
            asm.cut_holes(&[]),
            Err(BuildError::InvalidState { .. })
        ));
        assert!(asm.finish().is_ok());
    }

    #[test]
    fn test_finish_before_cut_fails() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);
        asm.add_body(&plate(&ctx)).unwrap();
        let err = asm.finish().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot finish while assembler is accumulating bodies"
        );
    }

    #[test]
    fn test_empty_hole_list_skips_kernel() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);
        asm.add_body(&plate(&ctx)).unwrap();
        asm.cut_holes(&[]).unwrap();
        let part = asm.finish().unwrap();
        assert_eq!(part.hole_count, 0);
        assert_eq!(kernel.stats().subtractions, 0);
    }

    #[test]
    fn test_unmatched_selector() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut refs = plate_refs();
        refs.set_offset(Axis::W, 2, 12.0);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);
        asm.set_references(refs).unwrap();
        asm.add_body(&plate(&ctx)).unwrap();
        asm.cut_holes(&[]).unwrap();

        let outside = EdgeSelector::new(Axis::D, ReferencePoint::new(0, 2, 1));
        assert!(matches!(
            asm.apply_edge_treatment(&[outside], EdgeTreatment::Chamfer, 0.5),
            Err(BuildError::EdgeSelection(_))
        ));
        // Failed treatment leaves the assembler usable
        assert_eq!(asm.state(), AssemblyState::HolesCut);

        let top_edges = [
            EdgeSelector::new(Axis::D, ReferencePoint::new(0, 0, 1)),
            EdgeSelector::new(Axis::D, ReferencePoint::new(0, 1, 1)),
        ];
        let selected = asm.select_edges(&top_edges).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_set_references_checks_monotonic() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut refs = plate_refs();
        refs.set_offset(Axis::D, 2, 20.0);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);
        assert!(matches!(
            asm.set_references(refs),
            Err(BuildError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_ensure_minimum() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);

        assert_eq!(asm.ensure_minimum("base_length", 50.0, 30.0), 50.0);
        assert!(asm.diagnostics().is_empty());

        let first = asm.ensure_minimum("base_length", 10.0, 30.0);
        let second = asm.ensure_minimum("base_length", 10.0, 30.0);
        assert_eq!(first, 30.0);
        assert_eq!(first, second);
        assert_eq!(asm.diagnostics().adjustments.len(), 1);
        let adj = asm.diagnostics().adjustment("base_length").unwrap();
        assert_eq!((adj.requested, adj.applied), (10.0, 30.0));
    }

    #[test]
    fn test_ensure_minimum_nan_recorded_once() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);

        assert_eq!(asm.ensure_minimum("len", f64::NAN, 5.0), 5.0);
        assert_eq!(asm.ensure_minimum("len", f64::NAN, 5.0), 5.0);
        assert_eq!(asm.diagnostics().adjustments.len(), 1);
        assert!(asm.diagnostics().adjustments[0].requested.is_nan());
    }

    #[test]
    fn test_raise_to_minimum() {
        assert_eq!(raise_to_minimum(5.0, 3.0), 5.0);
        assert_eq!(raise_to_minimum(2.0, 3.0), 3.0);
        assert_eq!(raise_to_minimum(f64::NAN, 3.0), 3.0);
    }

    #[test]
    fn test_null_kernel_error_propagates() {
        let kernel = crate::kernel::NullKernel;
        let ctx = DocumentContext::new(&kernel);
        let mut asm = PartAssembler::new(&ctx, "plate", AxisFrame::standard(), DVec3::ZERO);
        assert!(!ctx.kernel().is_available());
        assert!(matches!(
            asm.add_body(&plate(&ctx)),
            Err(BuildError::Kernel(_))
        ));
    }
}
