//! Target camber curve of the synthesis.
//!
//! The target usually comes from tire data: the optimal camber at each
//! normal force, mapped to wheel travel by the wheel rate.
use crate::Error;
use std::path::Path;

/// Ordered `(displacement, camber)` samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetCurve {
    /// Wheel displacement
    pub displacement: Vec<f64>,
    /// Target camber angle (degrees)
    pub camber: Vec<f64>,
}

fn check_len(a: &[f64], b: &[f64]) -> Result<(), Error> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(Error::config(format!("lists differ in length: {} and {}", a.len(), b.len())))
    }
}

impl TargetCurve {
    /// Create from the samples.
    ///
    /// Return error if the target is empty, the lengths differ or a value is
    /// not finite.
    pub fn new(displacement: Vec<f64>, camber: Vec<f64>) -> Result<Self, Error> {
        check_len(&displacement, &camber)?;
        if displacement.is_empty() {
            return Err(Error::config("empty target curve"));
        }
        if !displacement.iter().chain(&camber).all(|x| x.is_finite()) {
            return Err(Error::config("target curve has non-finite values"));
        }
        Ok(Self { displacement, camber })
    }

    /// Parse from CSV string, rows of `displacement, camber`.
    ///
    /// A leading header row is skipped.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let mut displacement = Vec::new();
        let mut camber = Vec::new();
        for (i, rec) in crate::csv::parse_rows(s)?.into_iter().enumerate() {
            let row = match (rec.get(0), rec.get(1), rec.len()) {
                (Some(d), Some(c), 2) => d.parse::<f64>().and_then(|d| Ok([d, c.parse()?])),
                _ => {
                    return Err(Error::config(format!(
                        "target row {}: expected 2 columns, got {}",
                        i + 1,
                        rec.len()
                    )))
                }
            };
            match row {
                Ok([d, c]) => {
                    displacement.push(d);
                    camber.push(c);
                }
                Err(_) if i == 0 => {}
                Err(e) => return Err(Error::config(format!("target row {}: {e}", i + 1))),
            }
        }
        Self::new(displacement, camber)
    }

    /// Read from a CSV file, see [`TargetCurve::parse()`].
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Create from optimal cambers over normal forces.
    ///
    /// The samples with `fz_min <= F <= fz_max` are kept, and each force is
    /// mapped to the displacement `|F / wheel_rate|`.
    pub fn from_force_camber(
        wheel_rate: f64,
        fz_min: f64,
        fz_max: f64,
        forces: &[f64],
        cambers: &[f64],
    ) -> Result<Self, Error> {
        if !(fz_min < fz_max) {
            return Err(Error::config(format!(
                "maximum force {fz_max} is not larger than minimum force {fz_min}"
            )));
        }
        if !(wheel_rate > 0.) {
            return Err(Error::config(format!("wheel rate must be positive, got {wheel_rate}")));
        }
        check_len(forces, cambers)?;
        let (displacement, camber) = forces
            .iter()
            .zip(cambers)
            .filter(|(f, _)| (fz_min..=fz_max).contains(*f))
            .map(|(f, c)| ((f / wheel_rate).abs(), *c))
            .unzip();
        Self::new(displacement, camber)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.displacement.len()
    }

    /// Return true if there is no sample.
    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty()
    }

    /// Cambers relative to a resting camber.
    ///
    /// Return error if the resting camber is not strictly inside the camber
    /// range.
    pub fn camber_gain(&self, resting: f64) -> Result<Self, Error> {
        let [min, max] = self
            .camber
            .iter()
            .fold([f64::INFINITY, f64::NEG_INFINITY], |[a, b], &c| [a.min(c), b.max(c)]);
        if !(min < resting && resting < max) {
            return Err(Error::config(format!(
                "resting camber {resting} is outside the camber range [{min}, {max}]"
            )));
        }
        let camber = self.camber.iter().map(|c| c - resting).collect();
        Ok(Self { displacement: self.displacement.clone(), camber })
    }
}

/// Resting camber from the optimal cambers over normal forces.
///
/// After sorting by force, the midpoint of the two cambers bracketing the
/// resting force is taken.
pub fn resting_camber(forces: &[f64], cambers: &[f64], resting_force: f64) -> Result<f64, Error> {
    check_len(forces, cambers)?;
    let mut pairs = forces.iter().copied().zip(cambers.iter().copied()).collect::<Vec<_>>();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs
        .windows(2)
        .find(|w| w[0].0 <= resting_force && resting_force <= w[1].0)
        .map(|w| (w[0].1 + w[1].1) / 2.)
        .ok_or_else(|| {
            Error::config(format!("resting force {resting_force} is outside the force range"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parse_with_header() {
        let t = TargetCurve::parse("displacement,camber\n-1, 0.5\n0,0\n# comment\n1,-0.5\n").unwrap();
        assert_eq!(t.displacement, [-1., 0., 1.]);
        assert_eq!(t.camber, [0.5, 0., -0.5]);
        assert!(TargetCurve::parse("0,0\n1,x\n").unwrap_err().is_config());
        assert!(TargetCurve::parse("0,0,0\n").unwrap_err().is_config());
        assert!(TargetCurve::parse("displacement,camber\n").unwrap_err().is_config());
        assert!(TargetCurve::parse("").unwrap_err().is_config());
    }

    #[test]
    fn force_to_displacement() {
        let forces = [-300., -200., -100., 0., 100.];
        let cambers = [-2., -1.5, -1., -0.5, 0.];
        let t = TargetCurve::from_force_camber(100., -250., 0., &forces, &cambers).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.displacement, [2., 1., 0.]);
        assert_eq!(t.camber, [-1.5, -1., -0.5]);
        assert!(TargetCurve::from_force_camber(100., 0., 0., &forces, &cambers).is_err());
        assert!(TargetCurve::from_force_camber(0., -1., 0., &forces, &cambers).is_err());
        assert!(TargetCurve::from_force_camber(100., -1., 0., &forces, &cambers[1..]).is_err());
        // No sample in range
        assert!(TargetCurve::from_force_camber(100., 500., 600., &forces, &cambers).is_err());
    }

    #[test]
    fn resting_and_gain() {
        let forces = [0., -200., -100., -300.];
        let cambers = [-0.5, -1.5, -1., -2.];
        assert_abs_diff_eq!(resting_camber(&forces, &cambers, -150.).unwrap(), -1.25);
        assert_abs_diff_eq!(resting_camber(&forces, &cambers, -300.).unwrap(), -1.75);
        assert!(resting_camber(&forces, &cambers, 10.).unwrap_err().is_config());
        let t = TargetCurve::new(vec![0., 1., 2.], vec![-0.5, -1., -1.5]).unwrap();
        let gain = t.camber_gain(-1.).unwrap();
        assert_eq!(gain.camber, [0.5, 0., -0.5]);
        assert_eq!(gain.displacement, t.displacement);
        assert!(t.camber_gain(-0.5).is_err());
    }
}
