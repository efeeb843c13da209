//! Document context
//!
//! Explicit handle bundling the geometry kernel and build settings. Every
//! construction call receives one; nothing is kept in process-wide state, so
//! independent builds can run side by side on separate kernels.

use glam::DVec3;

use crate::config::BuildConfig;
use crate::error::BuildResult;
use crate::frame::AxisFrame;
use crate::holes::HolePatternGenerator;
use crate::kernel::GeometryKernel;
use crate::primitive::{BoltSpec, PrimitiveBuilder};

/// Kernel and settings for one or more part builds
#[derive(Clone)]
pub struct DocumentContext<'k> {
    kernel: &'k dyn GeometryKernel,
    config: BuildConfig,
}

impl std::fmt::Debug for DocumentContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentContext")
            .field("kernel", &self.kernel.name())
            .field("config", &self.config)
            .finish()
    }
}

impl<'k> DocumentContext<'k> {
    /// Context with the default configuration
    pub fn new(kernel: &'k dyn GeometryKernel) -> Self {
        Self::with_config(kernel, BuildConfig::default())
    }

    /// Context with an explicit configuration
    pub fn with_config(kernel: &'k dyn GeometryKernel, config: BuildConfig) -> Self {
        Self { kernel, config }
    }

    pub fn kernel(&self) -> &'k dyn GeometryKernel {
        self.kernel
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Primitive builder using the configured cut extension
    pub fn primitives(&self) -> PrimitiveBuilder {
        PrimitiveBuilder::new(self.config.cut_extension)
    }

    /// Hole pattern generator using the configured cut extension
    pub fn holes(&self) -> HolePatternGenerator {
        HolePatternGenerator::new(self.primitives())
    }

    /// Validated frame using the configured orthogonality tolerance
    pub fn frame(
        &self,
        axis_d: DVec3,
        axis_w: Option<DVec3>,
        axis_h: DVec3,
    ) -> BuildResult<AxisFrame> {
        AxisFrame::with_tolerance(axis_d, axis_w, axis_h, self.config.orthogonality_tolerance)
    }

    /// Metric clearance bolt using the configured printing tolerance
    pub fn metric_bolt(&self, metric: f64, shank_length: f64) -> BuildResult<BoltSpec> {
        BoltSpec::metric(metric, shank_length, self.config.clearance_tolerance)
    }
}
