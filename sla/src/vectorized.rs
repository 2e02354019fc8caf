//! Vectorized number support: the parameter codec.
//!
//! A [`Schema`] is the ordered list of free entries. The parameter vector and
//! the bounds vector are both laid out by walking the schema, so they always
//! correspond one-to-one.
use crate::{config::Table, point::*, Error, SuspensionState};
use rand::Rng;

/// An ordered list of free entries and their arity.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    entries: Vec<(Key, usize)>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::full()
    }
}

impl Schema {
    /// The canonical schema: all 14 points then the 2 camber offsets.
    ///
    /// Its dimension is `3 × 14 + 1 × 2 = 44`.
    pub fn full() -> Self {
        let points = Key::all().filter(|k| k.hp != Hardpoint::CamberOffset);
        let offsets = Key::all().filter(|k| k.hp == Hardpoint::CamberOffset);
        let entries = points.chain(offsets).map(|k| (k, k.arity())).collect();
        Self { entries }
    }

    /// The canonical schema without the tire contact patches, which stay
    /// fixed reference geometry.
    pub fn without_contact_patches() -> Self {
        Self::full().without(|k| k.hp == Hardpoint::ContactPatch)
    }

    /// Create a schema from keys in order. The arity is taken from the key.
    ///
    /// Return error if a key is repeated.
    pub fn from_keys<I>(keys: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Key>,
    {
        let mut entries = Vec::<(Key, usize)>::new();
        for key in keys {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(Error::config(format!("repeated schema entry: {key}")));
            }
            entries.push((key, key.arity()));
        }
        Ok(Self { entries })
    }

    /// Remove the entries matching the predicate.
    pub fn without<F>(mut self, f: F) -> Self
    where
        F: Fn(&Key) -> bool,
    {
        self.entries.retain(|(k, _)| !f(k));
        self
    }

    /// The entries and their arity.
    pub fn entries(&self) -> &[(Key, usize)] {
        &self.entries
    }

    /// Length of the parameter vector.
    pub fn dim(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Find the entry and its component of a parameter index.
    pub fn locate(&self, mut i: usize) -> Option<(Key, usize)> {
        for (key, n) in &self.entries {
            if i < *n {
                return Some((*key, i));
            }
            i -= n;
        }
        None
    }

    /// Index of the first value of an entry in the parameter vector.
    pub fn position(&self, key: Key) -> Option<usize> {
        let mut i = 0;
        for (k, n) in &self.entries {
            if *k == key {
                return Some(i);
            }
            i += n;
        }
        None
    }

    /// Flatten the free entries of the state.
    pub fn encode(&self, state: &SuspensionState) -> Vec<f64> {
        let mut xs = Vec::with_capacity(self.dim());
        for (key, _) in &self.entries {
            xs.extend_from_slice(state.get(*key));
        }
        xs
    }

    /// Write the vector into the free entries of `base`.
    ///
    /// The entries outside the schema are kept from `base`.
    pub fn decode(&self, xs: &[f64], base: &SuspensionState) -> Result<SuspensionState, Error> {
        self.check_dim("parameter vector", xs.len())?;
        let mut state = base.clone();
        let mut rest = xs;
        for (key, n) in &self.entries {
            let (v, tail) = rest.split_at(*n);
            state.get_mut(*key).copy_from_slice(v);
            rest = tail;
        }
        Ok(state)
    }

    /// Read the bounds of the free entries from a configuration table, in
    /// the same order as [`Schema::encode()`].
    pub fn bounds(&self, table: &Table) -> Result<Bounds, Error> {
        let mut bounds = Vec::with_capacity(self.dim());
        for (key, _) in &self.entries {
            bounds.extend_from_slice(table.bounds(*key)?);
        }
        Ok(Bounds::new(bounds))
    }

    pub(crate) fn check_dim(&self, what: &str, len: usize) -> Result<(), Error> {
        let dim = self.dim();
        if len == dim {
            Ok(())
        } else {
            Err(Error::config(format!("{what} has {len} values, the schema needs {dim}")))
        }
    }
}

/// Support a type transforming from a vectored number.
pub trait FromVectorized: Sized {
    /// Create a new instance from a vector in the canonical order.
    fn from_vectorized(v: &[f64]) -> Result<Self, Error>;
}

/// Support a type transforming to a vectored number.
pub trait IntoVectorized {
    /// Convert the type to a vector in the canonical order.
    fn into_vectorized(self) -> Vec<f64>;
}

impl FromVectorized for SuspensionState {
    fn from_vectorized(v: &[f64]) -> Result<Self, Error> {
        Schema::full().decode(v, &Self::default())
    }
}

impl IntoVectorized for SuspensionState {
    fn into_vectorized(self) -> Vec<f64> {
        Schema::full().encode(&self)
    }
}

/// Per-dimension `[min, max]` bounds of a parameter vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds(Vec<[f64; 2]>);

impl Bounds {
    /// Create from bound pairs. A pair is sorted if it is reversed.
    pub fn new(bounds: Vec<[f64; 2]>) -> Self {
        Self(bounds.into_iter().map(|[a, b]| [a.min(b), a.max(b)]).collect())
    }

    /// Length of the bounds.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if there is no bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bound pairs.
    pub fn as_slice(&self) -> &[[f64; 2]] {
        &self.0
    }

    /// Return error if the vector length is different.
    pub fn check(&self, xs: &[f64]) -> Result<(), Error> {
        if xs.len() == self.len() {
            Ok(())
        } else {
            Err(Error::config(format!(
                "bounds have {} values but the vector has {}",
                self.len(),
                xs.len()
            )))
        }
    }

    /// Indices of the values outside their bounds.
    pub fn out_of_bounds(&self, xs: &[f64]) -> Vec<usize> {
        self.0
            .iter()
            .zip(xs)
            .enumerate()
            .filter(|&(_, (&[lo, hi], &x))| !(lo..=hi).contains(&x))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the dimensions with a positive width.
    pub fn free_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, [lo, hi])| hi > lo)
            .map(|(i, _)| i)
            .collect()
    }

    /// Draw a point uniformly inside the bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.0
            .iter()
            .map(|&[lo, hi]| if hi > lo { rng.gen_range(lo..=hi) } else { lo })
            .collect()
    }

    /// Clamp a vector into the bounds.
    pub fn clamp(&self, xs: &mut [f64]) {
        for (x, [lo, hi]) in xs.iter_mut().zip(&self.0) {
            *x = x.clamp(*lo, *hi);
        }
    }
}

impl From<Vec<[f64; 2]>> for Bounds {
    fn from(bounds: Vec<[f64; 2]>) -> Self {
        Self::new(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn canonical_dim() {
        let schema = Schema::full();
        assert_eq!(schema.dim(), 44);
        assert_eq!(schema.entries().len(), 16);
        assert_eq!(schema.entries()[0].0.code(), "FTFC");
        assert_eq!(schema.entries()[6].0.code(), "FTCP");
        assert_eq!(schema.entries()[7].0.code(), "RTFC");
        assert_eq!(schema.entries()[14].0.code(), "FCO");
        assert_eq!(schema.entries()[15].0.code(), "RCO");
        assert_eq!(Schema::without_contact_patches().dim(), 38);
        let (key, c) = schema.locate(16).unwrap();
        assert_eq!((key.code().as_str(), c), ("FLK", 1));
        assert_eq!(schema.locate(43).unwrap().0.code(), "RCO");
        assert_eq!(schema.locate(44), None);
        let key = Key::new(Corner::Rear, Hardpoint::TopRearwardChassis);
        assert_eq!(schema.position(key), Some(24));
        let key = Key::new(Corner::Front, Hardpoint::ContactPatch);
        assert_eq!(Schema::without_contact_patches().position(key), None);
    }

    #[test]
    fn round_trip() {
        let state = SuspensionState::example();
        let xs = state.clone().into_vectorized();
        assert_eq!(xs.len(), 44);
        assert_eq!(&xs[..3], &state.front.top_fwd_chassis);
        assert_eq!(xs[42], state.front.camber_offset);
        assert_eq!(xs[43], state.rear.camber_offset);
        let back = SuspensionState::from_vectorized(&xs).unwrap();
        assert_eq!(back, state);
        // The other side of the identity
        let ys = (0..44).map(|i| i as f64 * 0.5 - 3.).collect::<Vec<_>>();
        let state = SuspensionState::from_vectorized(&ys).unwrap();
        assert_eq!(state.into_vectorized(), ys);
    }

    #[test]
    fn reduced_schema_keeps_base() {
        let base = SuspensionState::example();
        let schema = Schema::without_contact_patches();
        let mut xs = schema.encode(&base);
        xs.iter_mut().for_each(|x| *x += 1.);
        let state = schema.decode(&xs, &base).unwrap();
        assert_eq!(state.front.contact_patch, base.front.contact_patch);
        assert_eq!(state.rear.camber_offset, base.rear.camber_offset + 1.);
        assert_eq!(schema.encode(&state), xs);
    }

    #[test]
    fn length_mismatch() {
        let e = SuspensionState::from_vectorized(&[0.; 43]).unwrap_err();
        assert!(e.is_config());
        let bounds = Bounds::new(vec![[0., 1.]; 3]);
        assert!(bounds.check(&[0.5; 2]).unwrap_err().is_config());
        bounds.check(&[0.5; 3]).unwrap();
    }

    #[test]
    fn repeated_entry() {
        let key = Key::new(Corner::Front, Hardpoint::UpperKingpin);
        assert!(Schema::from_keys([key, key]).unwrap_err().is_config());
    }

    #[test]
    fn bounds_ops() {
        let bounds = Bounds::new(vec![[0., 1.], [2., 2.], [5., -5.]]);
        assert_eq!(bounds.as_slice()[2], [-5., 5.]);
        assert_eq!(bounds.free_indices(), [0, 2]);
        assert_eq!(bounds.out_of_bounds(&[0.5, 3., -6.]), [1, 2]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let xs = bounds.sample(&mut rng);
            assert!(bounds.out_of_bounds(&xs).is_empty());
            assert_eq!(xs[1], 2.);
        }
        let mut xs = [2., 0., 9.];
        bounds.clamp(&mut xs);
        assert_eq!(xs, [1., 2., 5.]);
    }
}
