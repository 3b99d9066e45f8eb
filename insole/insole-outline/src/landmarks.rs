//! Anatomical landmarks along the heel-to-toe axis and width rays.

use serde::{Deserialize, Serialize};

use crate::{OutlineError, OutlineResult};

/// Named landmark positions as percentages of outline length (heel = 0).
///
/// The two width rays are stored alongside, as percentages across the width
/// where 0 is the lateral edge and 100 is the medial edge. Serialized as one
/// flat map so a request can override any subset.
///
/// # Example
///
/// ```
/// use insole_outline::Landmarks;
///
/// let lm: Landmarks = serde_json::from_str(r#"{"navicular": 40.0}"#).unwrap();
/// assert_eq!(lm.navicular, 40.0);
/// assert_eq!(lm.cuboid, 45.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    /// Start of the medial longitudinal arch.
    pub arch_start: f64,
    /// Start of the lateral longitudinal arch.
    pub lateral_arch_start: f64,
    /// Talo-calcaneal joint level.
    pub subtalar: f64,
    /// Navicular; near the medial arch peak.
    pub navicular: f64,
    /// Cuboid; end of the lateral arch.
    pub cuboid: f64,
    /// Medial cuneiform.
    pub medial_cuneiform: f64,
    /// Base of the first metatarsal (medial Lisfranc joint).
    pub metatarsal_base_1: f64,
    /// Metatarsal heads; end of the medial wall.
    pub metatarsal: f64,
    /// Boundary between the 5th ray and rays 2-4 (percent from lateral).
    pub ray5_boundary: f64,
    /// Boundary between rays 2-4 and the 1st ray (percent from lateral).
    pub ray1_boundary: f64,
}

impl Default for Landmarks {
    fn default() -> Self {
        Self {
            arch_start: 15.0,
            lateral_arch_start: 20.0,
            subtalar: 30.0,
            navicular: 43.0,
            cuboid: 45.0,
            medial_cuneiform: 55.0,
            metatarsal_base_1: 62.0,
            metatarsal: 70.0,
            ray5_boundary: 25.0,
            ray1_boundary: 65.0,
        }
    }
}

/// Two landmarks that appear out of heel-to-toe order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderViolation {
    /// The landmark expected to come first.
    pub earlier: &'static str,
    /// The landmark expected to come second.
    pub later: &'static str,
    /// Value of `earlier`.
    pub earlier_value: f64,
    /// Value of `later`.
    pub later_value: f64,
}

impl std::fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.1}%) should not lie after {} ({:.1}%)",
            self.earlier, self.earlier_value, self.later, self.later_value
        )
    }
}

/// Width rays across the foot, in percent from the lateral edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthRays {
    /// Lateral reference line.
    pub ray5: f64,
    /// Medial reference line.
    pub ray1: f64,
}

impl Landmarks {
    /// Chains along the heel-to-toe axis whose order is anatomically expected.
    const MEDIAL_CHAIN: [&'static str; 6] = [
        "arch_start",
        "subtalar",
        "navicular",
        "medial_cuneiform",
        "metatarsal_base_1",
        "metatarsal",
    ];
    const LATERAL_CHAIN: [&'static str; 3] = ["lateral_arch_start", "cuboid", "metatarsal"];

    /// Look up an axis landmark or width ray by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        Some(match name {
            "arch_start" => self.arch_start,
            "lateral_arch_start" => self.lateral_arch_start,
            "subtalar" => self.subtalar,
            "navicular" => self.navicular,
            "cuboid" => self.cuboid,
            "medial_cuneiform" => self.medial_cuneiform,
            "metatarsal_base_1" => self.metatarsal_base_1,
            "metatarsal" => self.metatarsal,
            "ray5_boundary" => self.ray5_boundary,
            "ray1_boundary" => self.ray1_boundary,
            _ => return None,
        })
    }

    /// The width rays.
    #[must_use]
    pub const fn width_rays(&self) -> WidthRays {
        WidthRays {
            ray5: self.ray5_boundary,
            ray1: self.ray1_boundary,
        }
    }

    /// All values by name, in declaration order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("arch_start", self.arch_start),
            ("lateral_arch_start", self.lateral_arch_start),
            ("subtalar", self.subtalar),
            ("navicular", self.navicular),
            ("cuboid", self.cuboid),
            ("medial_cuneiform", self.medial_cuneiform),
            ("metatarsal_base_1", self.metatarsal_base_1),
            ("metatarsal", self.metatarsal),
            ("ray5_boundary", self.ray5_boundary),
            ("ray1_boundary", self.ray1_boundary),
        ]
    }

    /// Check that every value is a finite percentage.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::LandmarkOutOfRange`] for the first bad value.
    pub fn validate(&self) -> OutlineResult<()> {
        for (name, value) in self.entries() {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(OutlineError::LandmarkOutOfRange {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Report adjacent landmarks that are out of heel-to-toe order.
    ///
    /// Ordering is not enforced; callers decide whether to proceed.
    #[must_use]
    pub fn check_order(&self) -> Vec<OrderViolation> {
        let mut out = Vec::new();
        for chain in [&Self::MEDIAL_CHAIN[..], &Self::LATERAL_CHAIN[..]] {
            for pair in chain.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let (va, vb) = (self.get(a).unwrap_or(0.0), self.get(b).unwrap_or(0.0));
                if va > vb {
                    out.push(OrderViolation {
                        earlier: a,
                        later: b,
                        earlier_value: va,
                        later_value: vb,
                    });
                }
            }
        }
        if self.ray5_boundary > self.ray1_boundary {
            out.push(OrderViolation {
                earlier: "ray5_boundary",
                later: "ray1_boundary",
                earlier_value: self.ray5_boundary,
                later_value: self.ray1_boundary,
            });
        }
        out
    }

    /// Landmarks strictly inside the open interval `(start, end)`, sorted.
    #[must_use]
    pub fn axis_between(&self, start: f64, end: f64) -> Vec<(&'static str, f64)> {
        let mut found: Vec<_> = self
            .entries()
            .into_iter()
            .take(8)
            .filter(|&(_, v)| v > start && v < end)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_ordered() {
        let lm = Landmarks::default();
        assert!(lm.check_order().is_empty());
        assert!(lm.validate().is_ok());
    }

    #[test]
    fn test_partial_override_from_json() {
        let lm: Landmarks =
            serde_json::from_str(r#"{"arch_start": 12.0, "ray1_boundary": 70.0}"#).unwrap();
        assert_eq!(lm.arch_start, 12.0);
        assert_eq!(lm.width_rays().ray1, 70.0);
        assert_eq!(lm.metatarsal, 70.0);
    }

    #[test]
    fn test_check_order_reports_swaps() {
        let lm = Landmarks {
            navicular: 60.0,
            ..Landmarks::default()
        };
        let violations = lm.check_order();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].earlier, "navicular");
        assert_eq!(violations[0].later, "medial_cuneiform");
        assert!(violations[0].to_string().contains("navicular"));

        let lm = Landmarks {
            ray5_boundary: 80.0,
            ..Landmarks::default()
        };
        assert_eq!(lm.check_order().len(), 1);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let lm = Landmarks {
            cuboid: 120.0,
            ..Landmarks::default()
        };
        assert!(matches!(
            lm.validate(),
            Err(OutlineError::LandmarkOutOfRange { .. })
        ));
    }

    #[test]
    fn test_axis_between() {
        let lm = Landmarks::default();
        let inner: Vec<_> = lm.axis_between(15.0, 70.0).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            inner,
            [
                "lateral_arch_start",
                "subtalar",
                "navicular",
                "cuboid",
                "medial_cuneiform",
                "metatarsal_base_1"
            ]
        );
    }
}
