//! Planar kinematics of an SLA corner.
//!
//! The corner is reduced to the transverse `(y, z)` plane. The lower arm is
//! displaced at the lower kingpin, the upper kingpin follows from the fixed
//! upper arm and kingpin lengths.
//!
//! ```
//! use sla::{kin, Corner, SuspensionState};
//!
//! let state = SuspensionState::example();
//! let linkage = kin::solve_linkage(&state, Corner::Front, 0.5).unwrap();
//! let camber = linkage.camber(state.front.camber_offset).unwrap();
//! let rch = linkage.roll_center_height().unwrap();
//! # assert!(camber < 0. && rch > 0.);
//! ```
use crate::{point::*, GeometryError, SuspensionState};

// Tolerance of the degenerate checks
const EPS: f64 = 1e-9;

/// The governing 2D points of one corner at one displacement.
#[derive(Clone, Debug, PartialEq)]
pub struct Linkage {
    /// Lower arm chassis pivot
    pub lower_chassis: [f64; 2],
    /// Lower ball joint
    pub lower_kingpin: [f64; 2],
    /// Upper ball joint
    pub upper_kingpin: [f64; 2],
    /// Upper arm chassis pivot
    pub upper_chassis: [f64; 2],
    /// Tire contact patch
    pub contact_patch: [f64; 2],
}

/// Solve the linkage of a corner when the lower kingpin is displaced
/// vertically by `displacement`.
///
/// The lower kingpin stays on the circle around its chassis pivot. Of the two
/// circle roots, the one on the same side of the pivot as the static kingpin
/// is taken, so the outboard root for an SLA corner. The upper kingpin keeps
/// the side of the diagonal (lower kingpin to upper pivot) it has in the
/// static state. Thus a zero displacement reproduces the static geometry.
pub fn solve_linkage(
    state: &SuspensionState,
    corner: Corner,
    displacement: f64,
) -> Result<Linkage, GeometryError> {
    let asm = state.corner(corner);
    let lc = <[f64; 2]>::from_coord(&asm.bot_rwd_chassis);
    let lk = <[f64; 2]>::from_coord(&asm.lower_kingpin);
    let uk = <[f64; 2]>::from_coord(&asm.upper_kingpin);
    let uc = <[f64; 2]>::from_coord(&asm.top_rwd_chassis);
    let contact_patch = <[f64; 2]>::from_coord(&asm.contact_patch);
    // Lower kingpin: circle around the lower chassis pivot
    let r = lc.dist(&lk);
    let z = lk.z() + displacement;
    let radicand = r * r - (z - lc.z()).powi(2);
    if radicand < 0. || !radicand.is_finite() {
        return Err(GeometryError::Unreachable { displacement });
    }
    let h = radicand.sqrt();
    let y = if lk.y() >= lc.y() { lc.y() + h } else { lc.y() - h };
    let lower_kingpin = [y, z];
    // Upper kingpin: law of cosines on the diagonal triangle
    let upper_len = uc.dist(&uk);
    let kingpin_len = lk.dist(&uk);
    if kingpin_len < EPS {
        return Err(GeometryError::Degenerate("zero-length kingpin"));
    }
    let diag = lower_kingpin.dist(&uc);
    let u = lower_kingpin
        .unit_to(&uc)
        .ok_or(GeometryError::Degenerate("lower kingpin meets the upper chassis pivot"))?;
    let cos_b = (diag * diag + kingpin_len * kingpin_len - upper_len * upper_len)
        / (2. * diag * kingpin_len);
    if cos_b.is_nan() || cos_b.abs() > 1. + EPS {
        return Err(GeometryError::Unreachable { displacement });
    }
    let b = cos_b.clamp(-1., 1.).acos();
    let n = static_side(&lk, &uk, &uc).normal(&u);
    let upper_kingpin = lower_kingpin.offset(&u, b.cos() * kingpin_len, &n, b.sin() * kingpin_len);
    Ok(Linkage {
        lower_chassis: lc,
        lower_kingpin,
        upper_kingpin,
        upper_chassis: uc,
        contact_patch,
    })
}

enum Side {
    Cw,
    Ccw,
}

impl Side {
    fn normal(&self, u: &[f64; 2]) -> [f64; 2] {
        let n = u.normal_cw();
        match self {
            Self::Cw => n,
            Self::Ccw => [-n[0], -n[1]],
        }
    }
}

// Side of the upper kingpin with respect to the static diagonal
fn static_side(lk: &[f64; 2], uk: &[f64; 2], uc: &[f64; 2]) -> Side {
    let Some(u) = lk.unit_to(uc) else {
        return Side::Cw;
    };
    let n = u.normal_cw();
    if (uk.y() - lk.y()) * n.y() + (uk.z() - lk.z()) * n.z() >= 0. {
        Side::Cw
    } else {
        Side::Ccw
    }
}

impl Linkage {
    /// Kingpin inclination from vertical in degrees.
    ///
    /// Positive when the upper kingpin is outboard of the lower kingpin.
    pub fn kingpin_angle(&self) -> Result<f64, GeometryError> {
        let dy = self.upper_kingpin.y() - self.lower_kingpin.y();
        let dz = self.upper_kingpin.z() - self.lower_kingpin.z();
        if dz.abs() < EPS {
            return Err(GeometryError::Degenerate("horizontal kingpin"));
        }
        Ok((dy / dz).atan().to_degrees())
    }

    /// Camber angle in degrees: the kingpin angle plus the corner offset.
    pub fn camber(&self, offset: f64) -> Result<f64, GeometryError> {
        Ok(self.kingpin_angle()? + offset)
    }

    /// Intersection of the upper and lower arm lines.
    pub fn instant_center(&self) -> Result<[f64; 2], GeometryError> {
        let [mt, bt] = self
            .upper_kingpin
            .line_to(&self.upper_chassis)
            .ok_or(GeometryError::Degenerate("vertical upper arm"))?;
        let [mb, bb] = self
            .lower_kingpin
            .line_to(&self.lower_chassis)
            .ok_or(GeometryError::Degenerate("vertical lower arm"))?;
        if (mt - mb).abs() < EPS {
            return Err(GeometryError::Parallel);
        }
        let y = (bb - bt) / (mt - mb);
        Ok([y, mt * y + bt])
    }

    /// Roll-center height.
    ///
    /// The line from the instant center through the contact patch crosses the
    /// vehicle center plane (`y = 0`) at the roll center.
    pub fn roll_center_height(&self) -> Result<f64, GeometryError> {
        let ic = self.instant_center()?;
        let tcp_y = self.contact_patch.y();
        if (tcp_y - ic.y()).abs() < EPS {
            return Err(GeometryError::Degenerate("instant center above the contact patch"));
        }
        Ok(ic.z() * tcp_y / (tcp_y - ic.y()))
    }
}

/// Camber angles of a corner at each displacement.
///
/// The state is not validated, and each displacement fails independently.
pub fn cambers(
    state: &SuspensionState,
    corner: Corner,
    displacements: &[f64],
) -> Vec<Result<f64, GeometryError>> {
    let offset = state.corner(corner).camber_offset;
    displacements
        .iter()
        .map(|&d| solve_linkage(state, corner, d)?.camber(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::parallelogram;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_displacement_is_static() {
        let state = SuspensionState::example();
        for corner in Corner::ALL {
            let asm = state.corner(corner);
            let lk = solve_linkage(&state, corner, 0.).unwrap();
            assert_abs_diff_eq!(lk.lower_kingpin[0], asm.lower_kingpin[1], epsilon = 1e-12);
            assert_abs_diff_eq!(lk.upper_kingpin[0], asm.upper_kingpin[1], epsilon = 1e-9);
            assert_abs_diff_eq!(lk.upper_kingpin[1], asm.upper_kingpin[2], epsilon = 1e-9);
            let [dy, dz] = [
                asm.upper_kingpin[1] - asm.lower_kingpin[1],
                asm.upper_kingpin[2] - asm.lower_kingpin[2],
            ];
            let expect = (dy / dz).atan().to_degrees() + asm.camber_offset;
            assert_abs_diff_eq!(lk.camber(asm.camber_offset).unwrap(), expect, epsilon = 1e-9);
        }
    }

    #[test]
    fn link_lengths_are_kept() {
        let state = SuspensionState::example();
        let asm = &state.front;
        for d in [-2., -0.7, 0.3, 1.9] {
            let lk = solve_linkage(&state, Corner::Front, d).unwrap();
            assert_abs_diff_eq!(lk.lower_kingpin[1], asm.lower_kingpin[2] + d, epsilon = 1e-12);
            let lower = lk.lower_chassis.dist(&lk.lower_kingpin);
            let upper = lk.upper_chassis.dist(&lk.upper_kingpin);
            let kingpin = lk.lower_kingpin.dist(&lk.upper_kingpin);
            assert_abs_diff_eq!(lower, asm.lower_arm_len(), epsilon = 1e-9);
            assert_abs_diff_eq!(upper, asm.upper_arm_len(), epsilon = 1e-9);
            assert_abs_diff_eq!(kingpin, asm.kingpin_len(), epsilon = 1e-9);
        }
    }

    #[test]
    fn symmetric_linkage() {
        let state = parallelogram();
        for d in [0.25, 0.5, 1., 2.] {
            let [up, down] = [d, -d].map(|d| {
                solve_linkage(&state, Corner::Front, d)
                    .unwrap()
                    .camber(0.)
                    .unwrap()
            });
            assert_abs_diff_eq!(up, -down, epsilon = 1e-9);
            assert_abs_diff_eq!(up, 0., epsilon = 1e-9);
        }
    }

    #[test]
    fn unreachable_displacement() {
        let state = parallelogram();
        // Lower arm is 10 in. long and horizontal
        let e = solve_linkage(&state, Corner::Front, 10.5).unwrap_err();
        assert_eq!(e, GeometryError::Unreachable { displacement: 10.5 });
        assert!(solve_linkage(&state, Corner::Front, -11.).is_err());
        assert!(solve_linkage(&state, Corner::Front, 9.9).is_ok());
    }

    #[test]
    fn upper_arm_cannot_follow() {
        let state = SuspensionState::example();
        // The lower kingpin circle is reachable (14 in. arm, 12 in. drop)
        // but the kingpin and upper arm cannot span the diagonal
        let e = solve_linkage(&state, Corner::Front, -12.).unwrap_err();
        assert_eq!(e, GeometryError::Unreachable { displacement: -12. });
        assert!(solve_linkage(&state, Corner::Front, -10.).is_ok());
    }

    #[test]
    fn parallel_arms_have_no_roll_center() {
        let state = parallelogram();
        let lk = solve_linkage(&state, Corner::Rear, 0.5).unwrap();
        assert_eq!(lk.roll_center_height(), Err(GeometryError::Parallel));
        // Camber is still defined
        assert_abs_diff_eq!(lk.camber(1.5).unwrap(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn roll_center_by_similar_triangles() {
        let state = SuspensionState::example();
        let lk = solve_linkage(&state, Corner::Front, 0.).unwrap();
        let [y, z] = lk.instant_center().unwrap();
        assert_abs_diff_eq!(y, -78., epsilon = 1e-9);
        assert_abs_diff_eq!(z, 5., epsilon = 1e-9);
        assert_abs_diff_eq!(lk.roll_center_height().unwrap(), 5. * 24. / 102., epsilon = 1e-9);
    }

    #[test]
    fn camber_is_monotonic_near_rest() {
        let state = SuspensionState::example();
        for corner in Corner::ALL {
            let ds = (-10..=10).map(|i| i as f64 * 0.1).collect::<Vec<_>>();
            let c = cambers(&state, corner, &ds)
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            // Short upper arm: camber goes negative in bump
            assert!(c.windows(2).all(|w| w[1] < w[0]), "{corner}: {c:?}");
        }
    }

    #[test]
    fn cambers_fail_per_sample() {
        let state = parallelogram();
        let c = cambers(&state, Corner::Front, &[0., 20., -1.]);
        assert!(c[0].is_ok());
        assert!(matches!(c[1], Err(GeometryError::Unreachable { .. })));
        assert!(c[2].is_ok());
    }
}
