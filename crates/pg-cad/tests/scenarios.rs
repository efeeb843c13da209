//! End-to-end construction scenarios against the CSG-tree kernel

use approx::assert_relative_eq;
use glam::DVec3;
use pg_cad::{
    AssemblyState, Attachment, Axis, AxisFrame, AxisKind, BoxAnchor, BuildError, CsgTreeKernel,
    DocumentContext, EdgeSelector, EdgeTreatment, GeometryKernel, Part, PartAssembler,
    PrimitiveShape, ReferencePoint, ReferenceTable,
};

/// Bracket plate 40 deep, 10 wide, 10 high with two M3 bolts 20 mm apart
fn build_bracket(ctx: &DocumentContext<'_>, mode: Attachment) -> Part {
    let frame = ctx.frame(DVec3::X, None, DVec3::Z).unwrap();
    let mut asm = PartAssembler::new(ctx, "bracket", frame, DVec3::ZERO);

    let mut refs = ReferenceTable::new(AxisKind::Edge, AxisKind::Edge, AxisKind::Edge);
    refs.set_offset(Axis::D, 1, 20.0)
        .set_offset(Axis::D, 2, 40.0)
        .set_offset(Axis::W, 1, 5.0)
        .set_offset(Axis::W, 2, 10.0)
        .set_offset(Axis::H, 1, 10.0);
    asm.set_references(refs).unwrap();

    let body = ctx
        .primitives()
        .box_shape(40.0, 10.0, 10.0, &frame, BoxAnchor::corner(), DVec3::ZERO)
        .unwrap();
    asm.add_body(&body).unwrap();

    let bolt = ctx.metric_bolt(3.0, 10.0).unwrap().with_clearance(1.0, 1.0);
    let head_top = asm.position(1, 1, 1).unwrap() + frame.axis_h() * bolt.head_length;
    let holes = ctx
        .holes()
        .rail_or_holes(mode, &frame, head_top, Axis::D, 20.0, &bolt)
        .unwrap();
    asm.cut_holes(&holes).unwrap();
    assert_eq!(asm.state(), AssemblyState::HolesCut);

    let corners = [
        EdgeSelector::new(Axis::H, ReferencePoint::new(2, 0, 0)),
        EdgeSelector::new(Axis::H, ReferencePoint::new(2, 2, 0)),
    ];
    asm.apply_edge_treatment(&corners, EdgeTreatment::Fillet, 2.0)
        .unwrap();
    assert_eq!(asm.state(), AssemblyState::EdgeTreated);
    asm.finish().unwrap()
}

#[test]
fn bracket_with_rail_cuts_once() {
    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::new(&kernel);
    let part = build_bracket(&ctx, Attachment::Rail);

    assert_relative_eq!(part.bounds.extent_along(DVec3::X), 40.0, epsilon = 1e-9);
    assert_relative_eq!(part.size().y, 10.0, epsilon = 1e-9);
    assert_eq!(part.hole_count, 1);
    assert_eq!(part.edge_treatment.unwrap().edge_count, 2);

    let stats = kernel.stats();
    assert_eq!(stats.subtractions, 1);
    assert_eq!(stats.unions, 0);
    assert_eq!(stats.fillets, 1);
}

#[test]
fn bracket_with_holes_cuts_once() {
    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::new(&kernel);
    let part = build_bracket(&ctx, Attachment::Holes);

    assert_relative_eq!(part.size().x, 40.0, epsilon = 1e-9);
    assert_eq!(part.hole_count, 2);

    let stats = kernel.stats();
    assert_eq!(stats.subtractions, 1);
    // One fuse per bolt shape and one for the hole tool
    assert_eq!(stats.fuses, 3);
    assert_eq!(kernel.leaf_count(&part.solid).unwrap(), 5);
}

#[test]
fn frame_with_omitted_width() {
    let frame = AxisFrame::new(DVec3::X, None, DVec3::Z).unwrap();
    assert!(frame.axis_w().abs_diff_eq(DVec3::Y, 1e-12));
    assert!(frame.axis_d().dot(frame.axis_w()).abs() < 1e-12);
    assert!(frame.axis_w().dot(frame.axis_h()).abs() < 1e-12);
    assert!(frame.axis_d().dot(frame.axis_h()).abs() < 1e-12);
    assert!(frame.is_right_handed());
}

#[test]
fn collinear_depth_and_width_rejected() {
    let result = AxisFrame::new(DVec3::X, Some(DVec3::X), DVec3::Z);
    assert!(matches!(result, Err(BuildError::Orthogonality(_))));
}

#[test]
fn rail_or_holes_with_m4() {
    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::new(&kernel);
    let frame = AxisFrame::standard();
    let bolt = ctx.metric_bolt(4.0, 12.0).unwrap();
    let center = DVec3::new(15.0, 0.0, 8.0);

    let holes = ctx
        .holes()
        .rail_or_holes(Attachment::Holes, &frame, center, Axis::D, 30.0, &bolt)
        .unwrap();
    assert_eq!(holes.len(), 2);
    assert!(holes
        .iter()
        .all(|p| matches!(p.shape(), PrimitiveShape::Bolt(_))));
    let gap = holes[1].origin() - holes[0].origin();
    assert_relative_eq!(gap.length(), 30.0, epsilon = 1e-12);
    assert!(gap.normalize().abs_diff_eq(frame.axis_d(), 1e-12));

    let rail = ctx
        .holes()
        .rail_or_holes(Attachment::Rail, &frame, center, Axis::D, 30.0, &bolt)
        .unwrap();
    assert_eq!(rail.len(), 1);
    assert!(rail.iter().all(|p| p.as_bolt().is_none()));
    assert_relative_eq!(rail[0].as_stadium().unwrap().length, 30.0);
}

#[test]
fn state_machine_rejects_out_of_order_calls() {
    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::new(&kernel);
    let frame = AxisFrame::standard();

    let mut asm = PartAssembler::new(&ctx, "early cut", frame, DVec3::ZERO);
    assert!(matches!(
        asm.cut_holes(&[]),
        Err(BuildError::InvalidState { .. })
    ));

    let mut asm = PartAssembler::new(&ctx, "early finish", frame, DVec3::ZERO);
    let body = ctx
        .primitives()
        .box_shape(10.0, 10.0, 10.0, &frame, BoxAnchor::centered(), DVec3::ZERO)
        .unwrap();
    asm.add_body(&body).unwrap();
    assert!(matches!(
        asm.finish(),
        Err(BuildError::InvalidState {
            state: AssemblyState::BodyAccumulated,
            ..
        })
    ));
}

#[test]
fn minimum_adjustment_is_idempotent() {
    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::new(&kernel);
    let mut asm = PartAssembler::new(&ctx, "base", AxisFrame::standard(), DVec3::ZERO);

    let a = asm.ensure_minimum("base_length", 12.0, 27.5);
    let b = asm.ensure_minimum("base_length", 12.0, 27.5);
    assert_eq!(a, 27.5);
    assert_eq!(a, b);
    assert_eq!(asm.diagnostics().adjustments.len(), 1);
}

#[test]
fn independent_builds_on_separate_threads() {
    let sizes: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = [Attachment::Holes, Attachment::Rail]
            .into_iter()
            .map(|mode| {
                scope.spawn(move || {
                    let kernel = CsgTreeKernel::new();
                    let ctx = DocumentContext::new(&kernel);
                    build_bracket(&ctx, mode).size().x
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(sizes.len(), 2);
    for size in sizes {
        assert_relative_eq!(size, 40.0, epsilon = 1e-9);
    }
}

#[test]
fn kernel_is_explicit() {
    let kernel = CsgTreeKernel::new();
    let ctx = DocumentContext::new(&kernel);
    assert!(ctx.kernel().is_available());
    assert!(kernel.is_empty());
}
