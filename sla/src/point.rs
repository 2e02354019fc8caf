//! Hardpoint identifiers and planar point operations.
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A 3D hardpoint coordinate `[x, y, z]`.
///
/// + `x`: longitudinal
/// + `y`: lateral (outboard positive)
/// + `z`: vertical (ground at zero)
pub type Coord = [f64; 3];

/// One wheel's suspension assembly.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    /// Front corner
    Front,
    /// Rear corner
    Rear,
}

impl Corner {
    /// Both corners, front first.
    pub const ALL: [Self; 2] = [Self::Front, Self::Rear];

    /// Uppercase name, used as the prefix of curve files.
    pub const fn name_uppercase(&self) -> &'static str {
        match self {
            Self::Front => "FRONT",
            Self::Rear => "REAR",
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Rear => "Rear",
        }
    }

    const fn code(&self) -> char {
        match self {
            Self::Front => 'F',
            Self::Rear => 'R',
        }
    }
}

impl Display for Corner {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.label())
    }
}

/// Entry of a corner assembly.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Hardpoint {
    /// Upper arm, forward chassis pickup
    TopForwardChassis,
    /// Upper arm, rearward chassis pickup
    TopRearwardChassis,
    /// Lower arm, forward chassis pickup
    BottomForwardChassis,
    /// Lower arm, rearward chassis pickup
    BottomRearwardChassis,
    /// Upper ball joint
    UpperKingpin,
    /// Lower ball joint
    LowerKingpin,
    /// Tire contact patch
    ContactPatch,
    /// Camber offset relative to the kingpin axis (degrees)
    CamberOffset,
}

impl Hardpoint {
    /// All entries of an assembly in canonical order.
    pub const ALL: [Self; 8] = [
        Self::TopForwardChassis,
        Self::TopRearwardChassis,
        Self::BottomForwardChassis,
        Self::BottomRearwardChassis,
        Self::UpperKingpin,
        Self::LowerKingpin,
        Self::ContactPatch,
        Self::CamberOffset,
    ];

    /// The forward and rearward chassis pickups of the upper and lower arms.
    pub const ARMS: [[Self; 2]; 2] = [
        [Self::TopForwardChassis, Self::TopRearwardChassis],
        [Self::BottomForwardChassis, Self::BottomRearwardChassis],
    ];

    /// Number of scalars stored by this entry.
    pub const fn arity(&self) -> usize {
        match self {
            Self::CamberOffset => 1,
            _ => 3,
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::TopForwardChassis => "top forward chassis pickup",
            Self::TopRearwardChassis => "top rearward chassis pickup",
            Self::BottomForwardChassis => "bottom forward chassis pickup",
            Self::BottomRearwardChassis => "bottom rearward chassis pickup",
            Self::UpperKingpin => "upper kingpin pickup",
            Self::LowerKingpin => "lower kingpin pickup",
            Self::ContactPatch => "tire contact patch",
            Self::CamberOffset => "camber offset relative to kingpin",
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::TopForwardChassis => "TFC",
            Self::TopRearwardChassis => "TRC",
            Self::BottomForwardChassis => "BFC",
            Self::BottomRearwardChassis => "BRC",
            Self::UpperKingpin => "UK",
            Self::LowerKingpin => "LK",
            Self::ContactPatch => "TCP",
            Self::CamberOffset => "CO",
        }
    }
}

/// Name of a suspension state entry: a corner and one of its hardpoints.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Key {
    /// Corner
    pub corner: Corner,
    /// Entry of the corner
    pub hp: Hardpoint,
}

impl Key {
    /// All 16 keys, front assembly first.
    pub fn all() -> impl Iterator<Item = Self> {
        Corner::ALL
            .into_iter()
            .flat_map(|corner| Hardpoint::ALL.into_iter().map(move |hp| Self::new(corner, hp)))
    }

    /// Create a new key.
    pub const fn new(corner: Corner, hp: Hardpoint) -> Self {
        Self { corner, hp }
    }

    /// Number of scalars stored by this entry.
    pub const fn arity(&self) -> usize {
        self.hp.arity()
    }

    /// Row label used in the configuration file,
    /// e.g. `Front top forward chassis pickup`.
    pub fn label(&self) -> String {
        format!("{} {}", self.corner.label(), self.hp.label())
    }

    /// Short code, e.g. `FTFC`.
    pub fn code(&self) -> String {
        format!("{}{}", self.corner.code(), self.hp.code())
    }

    /// Find the key by its configuration label.
    ///
    /// Leading and trailing whitespace is ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::all().find(|k| k.label() == label)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// Planar `(y, z)` point operations used by the linkage solver.
pub trait Point: Sized + Copy {
    /// Create a point.
    fn point(y: f64, z: f64) -> Self;
    /// Lateral coordinate.
    fn y(&self) -> f64;
    /// Vertical coordinate.
    fn z(&self) -> f64;

    /// Project a 3D coordinate onto the transverse plane.
    fn from_coord(c: &Coord) -> Self {
        Self::point(c[1], c[2])
    }

    /// Distance to another point.
    fn dist(&self, rhs: &Self) -> f64 {
        (rhs.y() - self.y()).hypot(rhs.z() - self.z())
    }

    /// Unit vector pointing to another point.
    ///
    /// Return `None` if the points coincide.
    fn unit_to(&self, rhs: &Self) -> Option<Self> {
        let d = self.dist(rhs);
        (d > f64::EPSILON).then(|| Self::point((rhs.y() - self.y()) / d, (rhs.z() - self.z()) / d))
    }

    /// Clockwise normal of a direction vector.
    fn normal_cw(&self) -> Self {
        Self::point(self.z(), -self.y())
    }

    /// Move along the direction `u` by `ds`, then along `n` by `dq`.
    fn offset(&self, u: &Self, ds: f64, n: &Self, dq: f64) -> Self {
        Self::point(
            self.y() + ds * u.y() + dq * n.y(),
            self.z() + ds * u.z() + dq * n.z(),
        )
    }

    /// Slope and intercept `z = m y + b` of the line through two points.
    ///
    /// Return `None` for a vertical line.
    fn line_to(&self, rhs: &Self) -> Option<[f64; 2]> {
        let dy = rhs.y() - self.y();
        if dy.abs() < f64::EPSILON {
            return None;
        }
        let m = (rhs.z() - self.z()) / dy;
        Some([m, rhs.z() - m * rhs.y()])
    }
}

impl Point for [f64; 2] {
    #[inline(always)]
    fn point(y: f64, z: f64) -> Self {
        [y, z]
    }
    #[inline(always)]
    fn y(&self) -> f64 {
        self[0]
    }
    #[inline(always)]
    fn z(&self) -> f64 {
        self[1]
    }
}

#[test]
fn key_names() {
    let keys = Key::all().collect::<Vec<_>>();
    assert_eq!(keys.len(), 16);
    let k = Key::new(Corner::Front, Hardpoint::TopForwardChassis);
    assert_eq!(k.label(), "Front top forward chassis pickup");
    assert_eq!(k.code(), "FTFC");
    assert_eq!(Key::from_label(" Rear camber offset relative to kingpin "),
        Some(Key::new(Corner::Rear, Hardpoint::CamberOffset)));
    assert_eq!(Key::from_label("Rear wing"), None);
}

#[test]
fn line_through_points() {
    let [m, b] = [0., 1.].line_to(&[2., 5.]).unwrap();
    assert_eq!([m, b], [2., 1.]);
    assert!([1., 0.].line_to(&[1., 3.]).is_none());
    assert!([1., 1.].unit_to(&[1., 1.]).is_none());
}
