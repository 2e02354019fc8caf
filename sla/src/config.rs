//! Suspension configuration file.
//!
//! A CSV table without header, one row per entry:
//!
//! + Point: `label, x, y, z[, x_min, x_max, y_min, y_max, z_min, z_max]`
//! + Offset: `label, value[, min, max]`
//!
//! Rows with an unknown label are ignored. An entry without bound columns is
//! pinned to its value.
//!
//! ```
//! use sla::config;
//!
//! let s = config::dump_config(&sla::SuspensionState::example(), None).unwrap();
//! let cfg = config::parse_config(&s).unwrap();
//! assert_eq!(cfg.state, sla::SuspensionState::example());
//! ```
use crate::{point::*, vectorized::*, Error, SuspensionState};
use std::path::Path;

/// A configuration row.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// Entry name
    pub key: Key,
    /// Values, the length is the arity of the entry
    pub values: Vec<f64>,
    /// Bounds of each value
    pub bounds: Vec<[f64; 2]>,
}

/// All 16 rows of a configuration, in the canonical order.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Get the row of an entry.
    pub fn row(&self, key: Key) -> Result<&Row, Error> {
        self.rows
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| Error::config(format!("missing entry: {key}")))
    }

    /// Get the bounds of an entry.
    pub fn bounds(&self, key: Key) -> Result<&[[f64; 2]], Error> {
        Ok(&self.row(key)?.bounds)
    }

    /// Rows in the canonical order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// A loaded configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Suspension state (not validated)
    pub state: SuspensionState,
    /// Table with the bounds
    pub table: Table,
}

impl Config {
    /// Initial guess of the parameters, see [`Schema::encode()`].
    pub fn initial_guess(&self, schema: &Schema) -> Vec<f64> {
        schema.encode(&self.state)
    }

    /// Bounds of the parameters, see [`Schema::bounds()`].
    pub fn bounds(&self, schema: &Schema) -> Result<Bounds, Error> {
        schema.bounds(&self.table)
    }
}

fn parse_row(key: Key, cells: &[&str]) -> Result<Row, Error> {
    let n = key.arity();
    let nums = cells
        .iter()
        .map(|c| {
            c.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::config(format!("{key}: invalid number {c:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let (values, bounds): (Vec<f64>, Vec<[f64; 2]>) = match nums.len() {
        len if len == n => (nums.clone(), nums.iter().map(|&v| [v, v]).collect()),
        len if len == n * 3 => {
            let (values, rest) = nums.split_at(n);
            let bounds = rest.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
            (values.to_vec(), bounds)
        }
        len => {
            return Err(Error::config(format!(
                "{key}: expected {n} values or {} values with bounds, got {len}",
                n * 3
            )))
        }
    };
    if let Some([lo, hi]) = bounds.iter().find(|[lo, hi]| lo > hi) {
        return Err(Error::config(format!("{key}: lower bound {lo} exceeds upper bound {hi}")));
    }
    Ok(Row { key, values, bounds })
}

// The chassis pickups of an arm share y and z, so they share the
// intersection of their bounds
fn tie_arm_bounds(rows: &mut [Row]) -> Result<(), Error> {
    for corner in Corner::ALL {
        for [fwd, rwd] in Hardpoint::ARMS {
            let [fwd, rwd] = [fwd, rwd].map(|hp| Key::new(corner, hp));
            let pos = |key| rows.iter().position(|r: &Row| r.key == key);
            let (Some(i), Some(j)) = (pos(fwd), pos(rwd)) else {
                continue;
            };
            for (c, axis) in [(1, "Y"), (2, "Z")] {
                let [a, b] = rows[i].bounds[c];
                let [e, f] = rows[j].bounds[c];
                let [lo, hi] = [a.max(e), b.min(f)];
                if lo > hi {
                    return Err(Error::config(format!(
                        "{fwd} and {rwd} must share {axis} but their bounds are disjoint"
                    )));
                }
                rows[i].bounds[c] = [lo, hi];
                rows[j].bounds[c] = [lo, hi];
            }
        }
    }
    Ok(())
}

/// Parse a configuration from string.
///
/// Return error if an entry is missing, repeated or malformed.
pub fn parse_config(s: &str) -> Result<Config, Error> {
    let mut rows = Vec::<Row>::new();
    for rec in crate::csv::parse_rows(s)? {
        let Some(key) = rec.get(0).and_then(Key::from_label) else {
            continue;
        };
        if rows.iter().any(|r| r.key == key) {
            return Err(Error::config(format!("repeated entry: {key}")));
        }
        let mut cells = rec.iter().skip(1).collect::<Vec<_>>();
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        rows.push(parse_row(key, &cells)?);
    }
    let missing = Key::all()
        .filter(|k| !rows.iter().any(|r| r.key == *k))
        .map(|k| k.label())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(Error::config(format!(
            "suspension points file does not have all required points, missing: {}",
            missing.join(", ")
        )));
    }
    tie_arm_bounds(&mut rows)?;
    let mut table = Vec::with_capacity(rows.len());
    let mut state = SuspensionState::default();
    for key in Key::all() {
        if let Some(i) = rows.iter().position(|r| r.key == key) {
            let row = rows.swap_remove(i);
            state.get_mut(key).copy_from_slice(&row.values);
            table.push(row);
        }
    }
    Ok(Config { state, table: Table { rows: table } })
}

/// Read a configuration file.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Read the bounds of the schema entries from a configuration file.
pub fn bounds_from_config<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Bounds, Error> {
    read_config(path)?.bounds(schema)
}

/// Dump a state to the configuration format.
///
/// The bounds are copied from the table if provided.
pub fn dump_config(state: &SuspensionState, table: Option<&Table>) -> Result<String, Error> {
    let mut rows = Vec::with_capacity(16);
    for key in Key::all() {
        let mut row = vec![key.label()];
        row.extend(state.get(key).iter().map(f64::to_string));
        if let Some(table) = table {
            for [lo, hi] in table.bounds(key)? {
                row.push(lo.to_string());
                row.push(hi.to_string());
            }
        }
        rows.push(row);
    }
    crate::csv::dump_rows(rows)
}
