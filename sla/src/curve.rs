//! Camber and roll-center curves over a displacement range.
use crate::{kin, Corner, Error, GeometryError, SuspensionState};

/// Displacement, camber and roll-center height of a corner.
///
/// The three sequences have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    /// Wheel displacement
    pub displacement: Vec<f64>,
    /// Camber angle (degrees)
    pub camber: Vec<f64>,
    /// Roll-center height
    pub roll_center: Vec<f64>,
}

/// A row of a curve file.
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveRecord {
    /// Wheel displacement
    #[serde(rename = "dZ (in.)")]
    pub displacement: f64,
    /// Camber angle (degrees)
    #[serde(rename = "Camber (deg)")]
    pub camber: f64,
    /// Roll-center height
    #[serde(rename = "Roll Center Height (in.)")]
    pub roll_center: f64,
}

/// Upper limit of `floor(range / step)`.
pub const MAX_SAMPLES_PER_SIDE: i64 = 1_000_000;

/// Displacements `-n·step ..= n·step` where `n = floor(range / step)`.
///
/// Return error if `n` exceeds [`MAX_SAMPLES_PER_SIDE`].
pub fn displacements(step: f64, range: f64) -> Result<Vec<f64>, Error> {
    if !(step > 0. && step.is_finite()) {
        return Err(Error::config(format!("displacement step must be positive, got {step}")));
    }
    if !(range >= 0. && range.is_finite()) {
        return Err(Error::config(format!("displacement range must be non-negative, got {range}")));
    }
    // Absorb the representation error of decimal steps, e.g. 3 / 0.05
    let q = range / step;
    let n = (q + q * 1e-12).floor();
    if n > MAX_SAMPLES_PER_SIDE as f64 {
        return Err(Error::config(format!(
            "displacement step {step} is too small for range {range}, \
             at most {MAX_SAMPLES_PER_SIDE} samples per side"
        )));
    }
    let n = n as i64;
    Ok((-n..=n).map(|i| i as f64 * step).collect())
}

/// Compute the camber and roll-center curves of a corner.
///
/// The state is validated once before sampling
/// `2·floor(range/step) + 1` displacements centered at zero.
pub fn compute_curve(
    state: &SuspensionState,
    corner: Corner,
    step: f64,
    range: f64,
) -> Result<Curve, Error> {
    state.validate()?;
    let displacement = displacements(step, range)?;
    Ok(Curve::from_displacements(state, corner, displacement)?)
}

impl Curve {
    /// Evaluate the curves at the given displacements without validation.
    pub fn from_displacements(
        state: &SuspensionState,
        corner: Corner,
        displacement: Vec<f64>,
    ) -> Result<Self, GeometryError> {
        let offset = state.corner(corner).camber_offset;
        let mut camber = Vec::with_capacity(displacement.len());
        let mut roll_center = Vec::with_capacity(displacement.len());
        for &d in &displacement {
            let linkage = kin::solve_linkage(state, corner, d)?;
            camber.push(linkage.camber(offset)?);
            roll_center.push(linkage.roll_center_height()?);
        }
        Ok(Self { displacement, camber, roll_center })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.displacement.len()
    }

    /// Return true if there is no sample.
    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty()
    }

    /// Iterate over the rows.
    pub fn records(&self) -> impl Iterator<Item = CurveRecord> + '_ {
        self.displacement
            .iter()
            .zip(&self.camber)
            .zip(&self.roll_center)
            .map(|((&displacement, &camber), &roll_center)| CurveRecord {
                displacement,
                camber,
                roll_center,
            })
    }

    /// Scale the displacement axis by the wheel rate, turning it into a
    /// normal-force axis.
    pub fn scaled(&self, wheel_rate: f64) -> Self {
        let displacement = self.displacement.iter().map(|d| d * wheel_rate).collect();
        Self { displacement, ..self.clone() }
    }

    /// Linear interpolation of the camber.
    pub fn camber_at(&self, x: f64) -> Result<f64, Error> {
        interpolate(&self.displacement, &self.camber, x)
    }

    /// Linear interpolation of the roll-center height.
    pub fn roll_center_at(&self, x: f64) -> Result<f64, Error> {
        interpolate(&self.displacement, &self.roll_center, x)
    }

    /// Dump the curve to CSV string with a header.
    pub fn to_csv(&self) -> Result<String, Error> {
        crate::csv::dump_csv(self.records().collect::<Vec<_>>())
    }
}

fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> Result<f64, Error> {
    xs.windows(2)
        .zip(ys.windows(2))
        .find(|(xw, _)| xw[0].min(xw[1]) <= x && x <= xw[0].max(xw[1]))
        .map(|(xw, yw)| {
            if xw[1] == xw[0] {
                yw[0]
            } else {
                (x - xw[0]) / (xw[1] - xw[0]) * (yw[1] - yw[0]) + yw[0]
            }
        })
        .ok_or_else(|| Error::config(format!("{x} is outside the curve range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::parallelogram;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sample_count() {
        assert_eq!(displacements(0.05, 3.).unwrap().len(), 121);
        assert_eq!(displacements(0.4, 1.).unwrap(), [-0.8, -0.4, 0., 0.4, 0.8]);
        // Tolerance is relative to the quotient
        assert_eq!(displacements(1., 0.9999999995).unwrap(), [0.]);
        assert!(displacements(1e-12, 3.).unwrap_err().is_config());
        assert_eq!(displacements(1., 0.).unwrap(), [0.]);
        assert!(displacements(0., 1.).unwrap_err().is_config());
        assert!(displacements(0.1, -1.).unwrap_err().is_config());
    }

    #[test]
    fn zero_sample_is_independent_of_step() {
        let state = SuspensionState::example();
        let expect = kin::solve_linkage(&state, Corner::Rear, 0.)
            .unwrap()
            .camber(state.rear.camber_offset)
            .unwrap();
        for step in [0.05, 0.1, 0.3, 0.7] {
            let curve = compute_curve(&state, Corner::Rear, step, 2.).unwrap();
            assert_eq!(curve.len(), curve.camber.len());
            assert_eq!(curve.len(), curve.roll_center.len());
            let mid = curve.len() / 2;
            assert_eq!(curve.displacement[mid], 0.);
            assert_abs_diff_eq!(curve.camber[mid], expect, epsilon = 1e-12);
            assert_abs_diff_eq!(curve.camber_at(0.).unwrap(), expect, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_state_fails_before_sampling() {
        let mut state = SuspensionState::example();
        state.front.top_fwd_chassis[1] += 1.;
        let e = compute_curve(&state, Corner::Front, 0.1, 1.).unwrap_err();
        assert!(e.is_config());
    }

    #[test]
    fn parallel_arms_curve_fails() {
        let e = compute_curve(&parallelogram(), Corner::Front, 0.5, 1.).unwrap_err();
        assert!(matches!(e, Error::Geometry(GeometryError::Parallel)));
    }

    #[test]
    fn interpolation_and_scaling() {
        let curve = Curve {
            displacement: vec![-1., 0., 1.],
            camber: vec![1., 0., -2.],
            roll_center: vec![2., 3., 4.],
        };
        assert_abs_diff_eq!(curve.camber_at(0.5).unwrap(), -1.);
        assert_abs_diff_eq!(curve.roll_center_at(-0.25).unwrap(), 2.75);
        assert!(curve.camber_at(1.5).is_err());
        let force = curve.scaled(585.);
        assert_eq!(force.displacement, [-585., 0., 585.]);
        assert_abs_diff_eq!(force.camber_at(292.5).unwrap(), -1.);
    }

    #[test]
    fn csv_header() {
        let curve = compute_curve(&SuspensionState::example(), Corner::Front, 0.5, 1.).unwrap();
        let csv = curve.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("dZ (in.),Camber (deg),Roll Center Height (in.)"));
        assert_eq!(lines.count(), 5);
    }
}
