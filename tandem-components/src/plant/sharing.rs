use serde::{Deserialize, Serialize};
use uom::si::angle::degree;
use uom::si::f64::{Angle, Ratio};
use uom::si::power::watt;
use uom::si::ratio::ratio;

use crate::plant::{GeneratorId, PlantReport};

/// A power angle beyond this magnitude (degrees) puts the machine
/// uncomfortably close to its steady-state stability limit.
pub const STABILITY_LIMIT_DEGREES: f64 = 30.0;

/// How the two machines split the generated power at the solved operating
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSharing {
    /// Each machine's share of the total active power; zeros when the
    /// total is not positive.
    pub active_share: [Ratio; 2],
    /// Each machine's share of the total reactive power; zeros when the
    /// total is not positive.
    pub reactive_share: [Ratio; 2],
    /// Absolute difference between the two power angles.
    pub power_angle_spread: Angle,
    /// Set when either power angle magnitude exceeds
    /// [`STABILITY_LIMIT_DEGREES`].
    pub stability_warning: bool,
}

impl LoadSharing {
    /// Analyzes the sharing implied by a solved report.
    #[must_use]
    pub fn from_report(report: &PlantReport) -> Self {
        let g_1 = report.generator(GeneratorId::One);
        let g_2 = report.generator(GeneratorId::Two);

        let p = [
            g_1.active_power.get::<watt>(),
            g_2.active_power.get::<watt>(),
        ];
        let q = [
            g_1.reactive_power.get::<watt>(),
            g_2.reactive_power.get::<watt>(),
        ];

        let delta_1 = g_1.power_angle.get::<degree>();
        let delta_2 = g_2.power_angle.get::<degree>();

        Self {
            active_share: shares(p),
            reactive_share: shares(q),
            power_angle_spread: Angle::new::<degree>((delta_1 - delta_2).abs()),
            stability_warning: delta_1.abs() > STABILITY_LIMIT_DEGREES
                || delta_2.abs() > STABILITY_LIMIT_DEGREES,
        }
    }
}

fn shares(values: [f64; 2]) -> [Ratio; 2] {
    let total = values[0] + values[1];
    if total > 0.0 {
        [
            Ratio::new::<ratio>(values[0] / total),
            Ratio::new::<ratio>(values[1] / total),
        ]
    } else {
        [Ratio::new::<ratio>(0.0), Ratio::new::<ratio>(0.0)]
    }
}
