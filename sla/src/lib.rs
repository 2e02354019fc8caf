//! SLA is a kinematics solver and a hardpoint synthesizing tool for
//! double-A-arm (short-long arm) suspensions.
//!
//! + [`kin`]: camber and roll-center height over wheel travel.
//! + [`vectorized`]: the codec between a [`SuspensionState`] and the
//!   parameter vector.
//! + [`opt`]: multi-start bounded fitting of a target camber curve.
#![cfg_attr(doc_cfg, feature(doc_cfg))]
#![warn(missing_docs)]
pub use crate::config::{bounds_from_config, read_config, Config};
pub use crate::curve::*;
pub use crate::error::*;
pub use crate::opt::{optimize, OptCfg, Solution, Trial};
pub use crate::point::*;
pub use crate::state::*;
pub use crate::target::TargetCurve;
pub use crate::vectorized::*;

pub mod config;
pub mod csv;
mod curve;
mod error;
pub mod kin;
pub mod opt;
mod point;
mod state;
pub mod target;
#[cfg(test)]
mod tests;
pub mod vectorized;
