//! CSG Tree Reference Kernel
//!
//! Pure Rust kernel that records the construction tree of every solid
//! instead of evaluating B-rep booleans. It answers bounds and edge queries
//! from the tree, which is enough to drive and verify the construction
//! engine without an external geometry library.
//!
//! Note: bounds of a subtraction are the bounds of its left operand, and
//! only straight edges of boxes and prisms on the material side of the tree
//! are reported.

use glam::DVec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use uuid::Uuid;

use super::{
    Aabb, Axis3D, BooleanType, EdgeId, EdgeInfo, GeometryKernel, KernelError, KernelResult,
    Placement, Solid,
};
use crate::constants::LENGTH_EPSILON;

/// Which edge treatment a node applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreatmentKind {
    /// Rounded edges
    Fillet,
    /// Beveled edges
    Chamfer,
}

/// One node of the recorded construction tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CsgNode {
    /// Box primitive
    Box { placement: Placement, size: DVec3 },
    /// Cylinder primitive
    Cylinder {
        axis: Axis3D,
        radius: f64,
        height: f64,
    },
    /// Regular polygon prism primitive
    Prism {
        axis: Axis3D,
        vertex_count: u32,
        circumradius: f64,
        height: f64,
        reference_direction: DVec3,
    },
    /// Binary boolean operation
    Boolean {
        op: BooleanType,
        left: Uuid,
        right: Uuid,
    },
    /// Multi-union of several solids
    Fuse { children: Vec<Uuid> },
    /// Fillet or chamfer applied to edges of `child`
    EdgeTreatment {
        kind: TreatmentKind,
        child: Uuid,
        edges: Vec<EdgeId>,
        size: f64,
    },
}

/// Counters of kernel calls, useful to verify batching behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelStats {
    pub boxes: usize,
    pub cylinders: usize,
    pub prisms: usize,
    pub unions: usize,
    pub fuses: usize,
    pub subtractions: usize,
    pub intersections: usize,
    pub fillets: usize,
    pub chamfers: usize,
}

/// CSG-tree recording kernel
///
/// Nodes are never released: every primitive, intermediate boolean and
/// solid left behind by a failed build stays in the map until the kernel
/// is dropped. Use one kernel per build or batch of builds.
pub struct CsgTreeKernel {
    /// Storage for node data (keyed by UUID)
    nodes: Mutex<HashMap<Uuid, CsgNode>>,
    stats: Mutex<KernelStats>,
}

impl CsgTreeKernel {
    /// Create a new empty kernel
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
            stats: Mutex::new(KernelStats::default()),
        }
    }

    /// Snapshot of the call counters
    pub fn stats(&self) -> KernelStats {
        *self.stats.lock()
    }

    /// Reset the call counters
    pub fn reset_stats(&self) {
        *self.stats.lock() = KernelStats::default();
    }

    /// Number of stored nodes
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    /// Check if no solid has been created yet
    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }

    /// Get the node that produced a solid
    pub fn node(&self, solid: &Solid) -> Option<CsgNode> {
        self.nodes.lock().get(&solid.id).cloned()
    }

    /// Count the primitive leaves below a solid
    pub fn leaf_count(&self, solid: &Solid) -> KernelResult<usize> {
        let nodes = self.nodes.lock();
        count_leaves(&nodes, solid.id)
    }

    /// Store a node and return a Solid reference
    fn store(&self, node: CsgNode) -> Solid {
        let id = Uuid::new_v4();
        self.nodes.lock().insert(id, node);
        Solid::new(id).with_kernel_data()
    }

    fn require(&self, solid: &Solid) -> KernelResult<()> {
        if self.nodes.lock().contains_key(&solid.id) {
            Ok(())
        } else {
            Err(KernelError::SolidNotFound(solid.id))
        }
    }

    fn treat(
        &self,
        kind: TreatmentKind,
        solid: &Solid,
        edges: &[EdgeId],
        size: f64,
    ) -> KernelResult<Solid> {
        if !size.is_finite() || size <= 0.0 {
            return Err(KernelError::EdgeTreatmentFailed(format!(
                "{kind:?} size must be positive, got {size}"
            )));
        }
        if edges.is_empty() {
            return Err(KernelError::EdgeTreatmentFailed(
                "No edges selected".into(),
            ));
        }

        let available = self.get_edges(solid)?.len() as u32;
        if let Some(bad) = edges
            .iter()
            .find(|e| e.solid_id != solid.id || e.index >= available)
        {
            return Err(KernelError::EdgeTreatmentFailed(format!(
                "Edge {} does not belong to solid {}",
                bad.index, solid.id
            )));
        }

        {
            let mut stats = self.stats.lock();
            match kind {
                TreatmentKind::Fillet => stats.fillets += 1,
                TreatmentKind::Chamfer => stats.chamfers += 1,
            }
        }

        Ok(self.store(CsgNode::EdgeTreatment {
            kind,
            child: solid.id,
            edges: edges.to_vec(),
            size,
        }))
    }
}

impl Default for CsgTreeKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup(nodes: &HashMap<Uuid, CsgNode>, id: Uuid) -> KernelResult<&CsgNode> {
    nodes.get(&id).ok_or(KernelError::SolidNotFound(id))
}

fn count_leaves(nodes: &HashMap<Uuid, CsgNode>, id: Uuid) -> KernelResult<usize> {
    Ok(match lookup(nodes, id)? {
        CsgNode::Box { .. } | CsgNode::Cylinder { .. } | CsgNode::Prism { .. } => 1,
        CsgNode::Boolean { left, right, .. } => {
            count_leaves(nodes, *left)? + count_leaves(nodes, *right)?
        }
        CsgNode::Fuse { children } => children
            .iter()
            .map(|c| count_leaves(nodes, *c))
            .sum::<KernelResult<usize>>()?,
        CsgNode::EdgeTreatment { child, .. } => count_leaves(nodes, *child)?,
    })
}

/// Perpendicular basis (u, v) for a prism or cylinder axis
fn cross_section_basis(direction: DVec3, reference: DVec3) -> (DVec3, DVec3) {
    let projected = reference - direction * reference.dot(direction);
    let u = if projected.length() > LENGTH_EPSILON {
        projected.normalize()
    } else {
        direction.any_orthonormal_vector()
    };
    (u, direction.cross(u))
}

fn prism_vertices(
    axis: &Axis3D,
    vertex_count: u32,
    circumradius: f64,
    height: f64,
    reference_direction: DVec3,
) -> Vec<DVec3> {
    let (u, v) = cross_section_basis(axis.direction, reference_direction);
    let top = axis.direction * height;
    let mut points = Vec::with_capacity(2 * vertex_count as usize);
    for i in 0..vertex_count {
        let angle = TAU * i as f64 / vertex_count as f64;
        let p = axis.origin + (u * angle.cos() + v * angle.sin()) * circumradius;
        points.push(p);
        points.push(p + top);
    }
    points
}

fn bounds_of(nodes: &HashMap<Uuid, CsgNode>, id: Uuid) -> KernelResult<Aabb> {
    match lookup(nodes, id)? {
        CsgNode::Box { placement, size } => Aabb::from_points(placement.corners(*size))
            .ok_or_else(|| KernelError::InvalidShape("Box has no corners".into())),
        CsgNode::Cylinder {
            axis,
            radius,
            height,
        } => {
            let base = axis.origin;
            let top = axis.origin + axis.direction * *height;
            let d = axis.direction;
            let extent = DVec3::new(
                (1.0 - d.x * d.x).max(0.0).sqrt(),
                (1.0 - d.y * d.y).max(0.0).sqrt(),
                (1.0 - d.z * d.z).max(0.0).sqrt(),
            ) * *radius;
            Ok(Aabb::new(base.min(top) - extent, base.max(top) + extent))
        }
        CsgNode::Prism {
            axis,
            vertex_count,
            circumradius,
            height,
            reference_direction,
        } => Aabb::from_points(prism_vertices(
            axis,
            *vertex_count,
            *circumradius,
            *height,
            *reference_direction,
        ))
        .ok_or_else(|| KernelError::InvalidShape("Prism has no vertices".into())),
        CsgNode::Boolean { op, left, right } => {
            let l = bounds_of(nodes, *left)?;
            match op {
                BooleanType::Union => Ok(l.union(&bounds_of(nodes, *right)?)),
                BooleanType::Subtract => Ok(l),
                BooleanType::Intersect => l
                    .intersection(&bounds_of(nodes, *right)?)
                    .ok_or_else(|| KernelError::InvalidShape("Empty intersection".into())),
            }
        }
        CsgNode::Fuse { children } => {
            let mut iter = children.iter();
            let first = iter
                .next()
                .ok_or_else(|| KernelError::EmptyInput("Fuse without children".into()))?;
            iter.try_fold(bounds_of(nodes, *first)?, |acc, c| {
                Ok(acc.union(&bounds_of(nodes, *c)?))
            })
        }
        CsgNode::EdgeTreatment { child, .. } => bounds_of(nodes, *child),
    }
}

const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn collect_edges(
    nodes: &HashMap<Uuid, CsgNode>,
    id: Uuid,
    out: &mut Vec<(DVec3, DVec3)>,
) -> KernelResult<()> {
    match lookup(nodes, id)? {
        CsgNode::Box { placement, size } => {
            let c = placement.corners(*size);
            out.extend(BOX_EDGES.iter().map(|&(a, b)| (c[a], c[b])));
        }
        CsgNode::Cylinder { .. } => {}
        CsgNode::Prism {
            axis,
            vertex_count,
            circumradius,
            height,
            reference_direction,
        } => {
            let v = prism_vertices(
                axis,
                *vertex_count,
                *circumradius,
                *height,
                *reference_direction,
            );
            let n = *vertex_count as usize;
            for i in 0..n {
                let j = (i + 1) % n;
                out.push((v[2 * i], v[2 * i + 1]));
                out.push((v[2 * i], v[2 * j]));
                out.push((v[2 * i + 1], v[2 * j + 1]));
            }
        }
        CsgNode::Boolean { op, left, right } => {
            collect_edges(nodes, *left, out)?;
            if *op == BooleanType::Union {
                collect_edges(nodes, *right, out)?;
            }
        }
        CsgNode::Fuse { children } => {
            for c in children {
                collect_edges(nodes, *c, out)?;
            }
        }
        CsgNode::EdgeTreatment { child, edges, .. } => {
            let treated: HashSet<u32> = edges.iter().map(|e| e.index).collect();
            let mut inner = Vec::new();
            collect_edges(nodes, *child, &mut inner)?;
            out.extend(
                inner
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| !treated.contains(&(*i as u32)))
                    .map(|(_, e)| e),
            );
        }
    }
    Ok(())
}

fn check_positive(what: &str, value: f64) -> KernelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidShape(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

fn check_direction(what: &str, direction: DVec3) -> KernelResult<()> {
    if direction.length() > LENGTH_EPSILON {
        Ok(())
    } else {
        Err(KernelError::InvalidShape(format!("{what} has zero length")))
    }
}

impl GeometryKernel for CsgTreeKernel {
    fn name(&self) -> &str {
        "csg-tree"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn make_box(&self, placement: &Placement, size: DVec3) -> KernelResult<Solid> {
        check_positive("Box length", size.x)?;
        check_positive("Box width", size.y)?;
        check_positive("Box height", size.z)?;
        check_direction("Box x axis", placement.x_axis)?;
        check_direction("Box y axis", placement.y_axis)?;
        check_direction("Box z axis", placement.z_axis)?;

        self.stats.lock().boxes += 1;
        Ok(self.store(CsgNode::Box {
            placement: *placement,
            size,
        }))
    }

    fn make_cylinder(&self, axis: &Axis3D, radius: f64, height: f64) -> KernelResult<Solid> {
        check_positive("Cylinder radius", radius)?;
        check_positive("Cylinder height", height)?;
        check_direction("Cylinder axis", axis.direction)?;

        self.stats.lock().cylinders += 1;
        Ok(self.store(CsgNode::Cylinder {
            axis: *axis,
            radius,
            height,
        }))
    }

    fn make_polygon_prism(
        &self,
        axis: &Axis3D,
        vertex_count: u32,
        circumradius: f64,
        height: f64,
        reference_direction: DVec3,
    ) -> KernelResult<Solid> {
        if vertex_count < 3 {
            return Err(KernelError::InvalidShape(format!(
                "Prism needs at least 3 vertices, got {vertex_count}"
            )));
        }
        check_positive("Prism circumradius", circumradius)?;
        check_positive("Prism height", height)?;
        check_direction("Prism axis", axis.direction)?;

        self.stats.lock().prisms += 1;
        Ok(self.store(CsgNode::Prism {
            axis: *axis,
            vertex_count,
            circumradius,
            height,
            reference_direction,
        }))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> KernelResult<Solid> {
        self.require(a)?;
        self.require(b)?;
        if a.id == b.id {
            return Err(KernelError::BooleanFailed(
                "Operands must be distinct solids".into(),
            ));
        }

        {
            let mut stats = self.stats.lock();
            match op {
                BooleanType::Union => stats.unions += 1,
                BooleanType::Subtract => stats.subtractions += 1,
                BooleanType::Intersect => stats.intersections += 1,
            }
        }

        Ok(self.store(CsgNode::Boolean {
            op,
            left: a.id,
            right: b.id,
        }))
    }

    fn fuse(&self, solids: &[Solid]) -> KernelResult<Solid> {
        match solids {
            [] => Err(KernelError::EmptyInput(
                "fuse needs at least one solid".into(),
            )),
            [single] => {
                self.require(single)?;
                Ok(single.clone())
            }
            many => {
                for s in many {
                    self.require(s)?;
                }
                self.stats.lock().fuses += 1;
                Ok(self.store(CsgNode::Fuse {
                    children: many.iter().map(|s| s.id).collect(),
                }))
            }
        }
    }

    fn bounding_box(&self, solid: &Solid) -> KernelResult<Aabb> {
        let nodes = self.nodes.lock();
        bounds_of(&nodes, solid.id)
    }

    fn get_edges(&self, solid: &Solid) -> KernelResult<Vec<EdgeInfo>> {
        let nodes = self.nodes.lock();
        let mut segments = Vec::new();
        collect_edges(&nodes, solid.id, &mut segments)?;
        Ok(segments
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| EdgeInfo::new(EdgeId::new(solid.id, i as u32), start, end))
            .collect())
    }

    fn fillet(&self, solid: &Solid, edges: &[EdgeId], radius: f64) -> KernelResult<Solid> {
        self.treat(TreatmentKind::Fillet, solid, edges, radius)
    }

    fn chamfer(&self, solid: &Solid, edges: &[EdgeId], distance: f64) -> KernelResult<Solid> {
        self.treat(TreatmentKind::Chamfer, solid, edges, distance)
    }
}
