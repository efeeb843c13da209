//! Caller-supplied part orientation

use glam::DVec3;
use serde::{Deserialize, Serialize};

use pg_cad::{AxisFrame, BuildResult, DocumentContext};

/// Axis vectors and origin of a part, as plain arrays
///
/// `axis_w` may be left out; it is then derived as `axis_h × axis_d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartPlacement {
    pub axis_d: [f64; 3],
    pub axis_w: Option<[f64; 3]>,
    pub axis_h: [f64; 3],
    pub position: [f64; 3],
}

impl Default for PartPlacement {
    fn default() -> Self {
        Self {
            axis_d: [1.0, 0.0, 0.0],
            axis_w: None,
            axis_h: [0.0, 0.0, 1.0],
            position: [0.0; 3],
        }
    }
}

impl PartPlacement {
    /// Validated frame and world origin
    pub fn resolve(&self, ctx: &DocumentContext<'_>) -> BuildResult<(AxisFrame, DVec3)> {
        let frame = ctx.frame(
            DVec3::from_array(self.axis_d),
            self.axis_w.map(DVec3::from_array),
            DVec3::from_array(self.axis_h),
        )?;
        Ok((frame, DVec3::from_array(self.position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_cad::{BuildError, CsgTreeKernel};

    #[test]
    fn test_default_is_world_aligned() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let (frame, origin) = PartPlacement::default().resolve(&ctx).unwrap();
        assert_eq!(frame, AxisFrame::standard());
        assert_eq!(origin, DVec3::ZERO);
    }

    #[test]
    fn test_skewed_axes_rejected() {
        let kernel = CsgTreeKernel::new();
        let ctx = DocumentContext::new(&kernel);
        let placement = PartPlacement {
            axis_w: Some([1.0, 0.0, 0.0]),
            ..Default::default()
        };
        assert!(matches!(
            placement.resolve(&ctx),
            Err(BuildError::Orthogonality(_))
        ));
    }
}
