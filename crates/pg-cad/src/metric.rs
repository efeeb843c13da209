//! Metric Hardware
//!
//! Dimensions of ISO 4762 / DIN 912 socket head cap screws, DIN 934 hex
//! nuts, DIN 125 washers and NEMA stepper motor frames. All values in mm.

use serde::Serialize;

use crate::error::{BuildError, BuildResult, require_non_negative, require_positive};
use crate::primitive::BoltSpec;

/// Screw, nut and washer dimensions for one metric size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricBolt {
    /// Nominal size (3.0 for M3)
    pub metric: f64,
    pub shank_diameter: f64,
    pub head_diameter: f64,
    pub head_length: f64,
    /// Nut width across corners
    pub nut_circumdiameter: f64,
    /// Nut width across flats
    pub nut_across_flats: f64,
    pub nut_length: f64,
    pub washer_diameter: f64,
    pub washer_thickness: f64,
}

impl MetricBolt {
    /// Nut circumradius without clearance
    pub fn nut_radius(&self) -> f64 {
        self.nut_circumdiameter / 2.0
    }
}

/// Supported metric sizes, ascending
pub const METRIC_BOLTS: [MetricBolt; 6] = [
    MetricBolt {
        metric: 2.5,
        shank_diameter: 2.5,
        head_diameter: 4.5,
        head_length: 2.5,
        nut_circumdiameter: 5.45,
        nut_across_flats: 5.0,
        nut_length: 2.0,
        washer_diameter: 6.0,
        washer_thickness: 0.5,
    },
    MetricBolt {
        metric: 3.0,
        shank_diameter: 3.0,
        head_diameter: 5.5,
        head_length: 3.0,
        nut_circumdiameter: 6.01,
        nut_across_flats: 5.5,
        nut_length: 2.4,
        washer_diameter: 7.0,
        washer_thickness: 0.5,
    },
    MetricBolt {
        metric: 4.0,
        shank_diameter: 4.0,
        head_diameter: 7.0,
        head_length: 4.0,
        nut_circumdiameter: 7.66,
        nut_across_flats: 7.0,
        nut_length: 3.2,
        washer_diameter: 9.0,
        washer_thickness: 0.8,
    },
    MetricBolt {
        metric: 5.0,
        shank_diameter: 5.0,
        head_diameter: 8.5,
        head_length: 5.0,
        nut_circumdiameter: 8.79,
        nut_across_flats: 8.0,
        nut_length: 4.0,
        washer_diameter: 10.0,
        washer_thickness: 1.0,
    },
    MetricBolt {
        metric: 6.0,
        shank_diameter: 6.0,
        head_diameter: 10.0,
        head_length: 6.0,
        nut_circumdiameter: 11.05,
        nut_across_flats: 10.0,
        nut_length: 5.0,
        washer_diameter: 12.0,
        washer_thickness: 1.6,
    },
    MetricBolt {
        metric: 8.0,
        shank_diameter: 8.0,
        head_diameter: 13.0,
        head_length: 8.0,
        nut_circumdiameter: 14.38,
        nut_across_flats: 13.0,
        nut_length: 6.5,
        washer_diameter: 16.0,
        washer_thickness: 1.6,
    },
];

/// Look up a metric size
pub fn metric_bolt(metric: f64) -> BuildResult<&'static MetricBolt> {
    METRIC_BOLTS
        .iter()
        .find(|b| (b.metric - metric).abs() < 1e-6)
        .ok_or_else(|| BuildError::InvalidDimension(format!("Unsupported bolt size M{metric}")))
}

impl BoltSpec {
    /// Clearance bolt shape for a metric screw
    ///
    /// Radial clearances: shank `d/2 + tol/2`, head `head_d/2 + tol`,
    /// nut `nut_d/2 + tol`. The nut length also grows by `tol`.
    pub fn metric(metric: f64, shank_length: f64, tolerance: f64) -> BuildResult<Self> {
        require_positive("bolt shank length", shank_length)?;
        require_non_negative("bolt tolerance", tolerance)?;
        let hw = metric_bolt(metric)?;
        let mut spec = BoltSpec::new(
            hw.shank_diameter / 2.0 + tolerance / 2.0,
            shank_length,
            hw.head_diameter / 2.0 + tolerance,
            hw.head_length,
        )
        .with_nut(hw.nut_radius() + tolerance, hw.nut_length + tolerance);
        spec.metric = Some(hw.metric);
        Ok(spec)
    }
}

/// NEMA stepper motor frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NemaMotor {
    /// NEMA size (17 for NEMA17)
    pub size: u32,
    /// Square frame width
    pub width: f64,
    /// Distance between adjacent mounting holes
    pub bolt_separation: f64,
    /// Metric size of the mounting screws
    pub bolt_metric: f64,
    /// Diameter of the centring boss around the shaft
    pub boss_diameter: f64,
    /// Height the boss protrudes from the frame
    pub boss_height: f64,
    pub shaft_diameter: f64,
}

impl NemaMotor {
    /// Radius of the circle through the four mounting holes
    pub fn bolt_circle_radius(&self) -> f64 {
        self.bolt_separation * std::f64::consts::FRAC_1_SQRT_2
    }
}

/// Supported NEMA sizes, ascending
pub const NEMA_MOTORS: [NemaMotor; 4] = [
    NemaMotor {
        size: 11,
        width: 28.2,
        bolt_separation: 23.0,
        bolt_metric: 2.5,
        boss_diameter: 22.0,
        boss_height: 2.0,
        shaft_diameter: 5.0,
    },
    NemaMotor {
        size: 14,
        width: 35.2,
        bolt_separation: 26.0,
        bolt_metric: 3.0,
        boss_diameter: 22.0,
        boss_height: 2.0,
        shaft_diameter: 5.0,
    },
    NemaMotor {
        size: 17,
        width: 42.3,
        bolt_separation: 31.0,
        bolt_metric: 3.0,
        boss_diameter: 22.0,
        boss_height: 2.0,
        shaft_diameter: 5.0,
    },
    NemaMotor {
        size: 23,
        width: 56.4,
        bolt_separation: 47.14,
        bolt_metric: 5.0,
        boss_diameter: 38.1,
        boss_height: 1.6,
        shaft_diameter: 6.35,
    },
];

/// Look up a NEMA frame size
pub fn nema_motor(size: u32) -> BuildResult<&'static NemaMotor> {
    NEMA_MOTORS
        .iter()
        .find(|m| m.size == size)
        .ok_or_else(|| BuildError::InvalidDimension(format!("Unsupported motor size NEMA{size}")))
}
