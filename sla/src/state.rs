//! Suspension state: the named hardpoints of both corners.
use crate::{point::*, Error};

/// One corner assembly.
///
/// + Seven 3D hardpoints `[x, y, z]`
/// + Camber offset relative to the kingpin axis (degrees)
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Assembly {
    /// Upper arm, forward chassis pickup
    pub top_fwd_chassis: Coord,
    /// Upper arm, rearward chassis pickup
    pub top_rwd_chassis: Coord,
    /// Lower arm, forward chassis pickup
    pub bot_fwd_chassis: Coord,
    /// Lower arm, rearward chassis pickup
    pub bot_rwd_chassis: Coord,
    /// Upper ball joint
    pub upper_kingpin: Coord,
    /// Lower ball joint
    pub lower_kingpin: Coord,
    /// Tire contact patch
    pub contact_patch: Coord,
    /// Camber offset relative to the kingpin axis (degrees)
    pub camber_offset: f64,
}

impl Assembly {
    /// Get the scalars of an entry.
    pub fn get(&self, hp: Hardpoint) -> &[f64] {
        match hp {
            Hardpoint::TopForwardChassis => &self.top_fwd_chassis,
            Hardpoint::TopRearwardChassis => &self.top_rwd_chassis,
            Hardpoint::BottomForwardChassis => &self.bot_fwd_chassis,
            Hardpoint::BottomRearwardChassis => &self.bot_rwd_chassis,
            Hardpoint::UpperKingpin => &self.upper_kingpin,
            Hardpoint::LowerKingpin => &self.lower_kingpin,
            Hardpoint::ContactPatch => &self.contact_patch,
            Hardpoint::CamberOffset => std::slice::from_ref(&self.camber_offset),
        }
    }

    /// Get the scalars of an entry mutably.
    pub fn get_mut(&mut self, hp: Hardpoint) -> &mut [f64] {
        match hp {
            Hardpoint::TopForwardChassis => &mut self.top_fwd_chassis,
            Hardpoint::TopRearwardChassis => &mut self.top_rwd_chassis,
            Hardpoint::BottomForwardChassis => &mut self.bot_fwd_chassis,
            Hardpoint::BottomRearwardChassis => &mut self.bot_rwd_chassis,
            Hardpoint::UpperKingpin => &mut self.upper_kingpin,
            Hardpoint::LowerKingpin => &mut self.lower_kingpin,
            Hardpoint::ContactPatch => &mut self.contact_patch,
            Hardpoint::CamberOffset => std::slice::from_mut(&mut self.camber_offset),
        }
    }

    /// Length of the lower arm in the transverse plane.
    pub fn lower_arm_len(&self) -> f64 {
        <[f64; 2]>::from_coord(&self.bot_rwd_chassis).dist(&Point::from_coord(&self.lower_kingpin))
    }

    /// Length of the upper arm in the transverse plane.
    pub fn upper_arm_len(&self) -> f64 {
        <[f64; 2]>::from_coord(&self.top_rwd_chassis).dist(&Point::from_coord(&self.upper_kingpin))
    }

    /// Length of the kingpin axis in the transverse plane.
    pub fn kingpin_len(&self) -> f64 {
        <[f64; 2]>::from_coord(&self.lower_kingpin).dist(&Point::from_coord(&self.upper_kingpin))
    }

    fn validate(&self, corner: Corner) -> Result<(), Error> {
        let key = |hp| Key::new(corner, hp);
        for [fwd, rwd] in Hardpoint::ARMS {
            let [a, b] = [self.get(fwd), self.get(rwd)];
            if a[1] != b[1] || a[2] != b[2] {
                return Err(Error::config(format!(
                    "A-arm chassis pickups must share Y and Z: {} and {}",
                    key(fwd),
                    key(rwd)
                )));
            }
        }
        if self.contact_patch[2] != 0. {
            return Err(Error::config(format!(
                "tire contact patch must be on the ground (Z = 0): {}",
                key(Hardpoint::ContactPatch)
            )));
        }
        for hp in Hardpoint::ALL {
            if hp.arity() == 3 && self.get(hp)[1] < 0. {
                return Err(Error::config(format!(
                    "all suspension points must be on the right side (Y >= 0): {}",
                    key(hp)
                )));
            }
        }
        Ok(())
    }

    fn set_to_planar_arms(&mut self) {
        let [_, y, z] = self.top_rwd_chassis;
        [self.top_fwd_chassis[1], self.top_fwd_chassis[2]] = [y, z];
        let [_, y, z] = self.bot_rwd_chassis;
        [self.bot_fwd_chassis[1], self.bot_fwd_chassis[2]] = [y, z];
        self.contact_patch[2] = 0.;
    }
}

/// Suspension state of a vehicle: the front and rear assemblies.
///
/// There are 16 entries in total, see [`Key::all()`].
#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SuspensionState {
    /// Front assembly
    pub front: Assembly,
    /// Rear assembly
    pub rear: Assembly,
}

impl SuspensionState {
    /// An example SLA suspension with a short upper arm (inches).
    pub fn example() -> Self {
        let front = Assembly {
            top_fwd_chassis: [4., 10., 13.],
            top_rwd_chassis: [-4., 10., 13.],
            bot_fwd_chassis: [5., 8., 5.],
            bot_rwd_chassis: [-5., 8., 5.],
            upper_kingpin: [0., 21., 14.],
            lower_kingpin: [0., 22., 5.],
            contact_patch: [0., 24., 0.],
            camber_offset: 6.,
        };
        let rear = Assembly {
            top_fwd_chassis: [64., 9., 12.],
            top_rwd_chassis: [56., 9., 12.],
            bot_fwd_chassis: [65., 7., 5.],
            bot_rwd_chassis: [55., 7., 5.],
            upper_kingpin: [60., 20., 13.],
            lower_kingpin: [60., 21., 5.],
            contact_patch: [60., 23., 0.],
            camber_offset: 5.,
        };
        Self { front, rear }
    }

    /// Get the assembly of a corner.
    pub fn corner(&self, corner: Corner) -> &Assembly {
        match corner {
            Corner::Front => &self.front,
            Corner::Rear => &self.rear,
        }
    }

    /// Get the assembly of a corner mutably.
    pub fn corner_mut(&mut self, corner: Corner) -> &mut Assembly {
        match corner {
            Corner::Front => &mut self.front,
            Corner::Rear => &mut self.rear,
        }
    }

    /// Get the scalars of an entry.
    pub fn get(&self, key: Key) -> &[f64] {
        self.corner(key.corner).get(key.hp)
    }

    /// Get the scalars of an entry mutably.
    pub fn get_mut(&mut self, key: Key) -> &mut [f64] {
        self.corner_mut(key.corner).get_mut(key.hp)
    }

    /// Check the physical constraints of the state.
    ///
    /// + The two chassis pickups of an A-arm share `y` and `z` (planar arm).
    /// + The tire contact patch is on the ground (`z == 0`).
    /// + All hardpoints are on the right side (`y >= 0`).
    pub fn validate(&self) -> Result<(), Error> {
        Corner::ALL
            .into_iter()
            .try_for_each(|c| self.corner(c).validate(c))
    }

    /// Check the physical constraints of one corner, see
    /// [`SuspensionState::validate()`].
    pub fn validate_corner(&self, corner: Corner) -> Result<(), Error> {
        self.corner(corner).validate(corner)
    }

    /// Move the forward chassis pickups onto the plane of their rearward
    /// pickups and put the contact patches on the ground.
    ///
    /// The rearward pickups govern the transverse-plane kinematics.
    pub fn set_to_planar_arms(&mut self) {
        self.front.set_to_planar_arms();
        self.rear.set_to_planar_arms();
    }

    /// Build with [`SuspensionState::set_to_planar_arms()`].
    pub fn with_planar_arms(mut self) -> Self {
        self.set_to_planar_arms();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_is_valid() {
        SuspensionState::example().validate().unwrap();
    }

    #[test]
    fn non_planar_arm() {
        let mut s = SuspensionState::example();
        s.rear.bot_fwd_chassis[2] += 0.5;
        let e = s.validate().unwrap_err();
        assert!(e.is_config());
        assert!(e.to_string().contains("RBFC"), "{e}");
        s.set_to_planar_arms();
        s.validate().unwrap();
        assert_eq!(s.rear.bot_fwd_chassis, [65., 7., 5.]);
    }

    #[test]
    fn contact_patch_off_ground() {
        let mut s = SuspensionState::example();
        s.front.contact_patch[2] = 0.1;
        assert!(s.validate().unwrap_err().to_string().contains("FTCP"));
    }

    #[test]
    fn left_side_point() {
        let mut s = SuspensionState::example();
        s.front.upper_kingpin[1] = -1.;
        assert!(s.validate().unwrap_err().to_string().contains("FUK"));
    }

    #[test]
    fn one_corner() {
        let mut s = SuspensionState::example();
        s.rear.lower_kingpin[1] = -1.;
        assert!(s.validate().is_err());
        s.validate_corner(Corner::Front).unwrap();
        assert!(s.validate_corner(Corner::Rear).unwrap_err().to_string().contains("RLK"));
    }

    #[test]
    fn entry_access() {
        let mut s = SuspensionState::example();
        let key = Key::new(Corner::Rear, Hardpoint::CamberOffset);
        assert_eq!(s.get(key), &[5.]);
        s.get_mut(key)[0] = -1.;
        assert_eq!(s.rear.camber_offset, -1.);
        assert_eq!(s.front.lower_arm_len(), 14.);
    }
}
