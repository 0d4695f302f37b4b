//! Explicit dependency-tracked memoization.
//!
//! Each [`Input`] carries a revision that bumps on every write. A derived
//! value remembers the revisions it was computed from and recomputes only
//! when they no longer match — re-reading an unchanged graph is free, and
//! there is no observer registration anywhere, so nothing can fire
//! mid-update: within one synchronous state transition every reader sees
//! one consistent snapshot.

/// A monotonically increasing change marker for one input cell.
pub type Revision = u64;

// ----------------------------------------------------------------------------

/// A mutable input to the computation graph. Every write bumps the
/// revision; reads never do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Input<T> {
    value: T,
    revision: Revision,
}

impl<T> Input<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Self { value, revision: 0 }
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    #[inline]
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.revision += 1;
    }

    /// Mutate in place; counts as one write.
    #[inline]
    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.revision += 1;
    }
}

// ----------------------------------------------------------------------------

/// A memoized derived value: caches the result together with the input
/// revisions it was computed from.
#[derive(Clone, Debug)]
pub struct Derived<T> {
    cached: Option<(Vec<Revision>, T)>,
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Derived<T> {
    pub const fn new() -> Self {
        Self { cached: None }
    }

    /// The cached value if the input revisions still match.
    pub fn get(&self, inputs: &[Revision]) -> Option<&T> {
        match &self.cached {
            Some((revs, value)) if revs == inputs => Some(value),
            _ => None,
        }
    }

    /// Recompute if (and only if) one of the inputs changed since the last
    /// computation.
    pub fn get_or_compute(&mut self, inputs: &[Revision], compute: impl FnOnce() -> T) -> &T {
        let stale = match &self.cached {
            Some((revs, _)) => revs != inputs,
            None => true,
        };
        if stale {
            self.cached = Some((inputs.to_vec(), compute()));
        }
        match &self.cached {
            Some((_, value)) => value,
            None => unreachable!("just computed"),
        }
    }

    /// Fallible variant of [`Self::get_or_compute`]. A failed computation
    /// caches nothing.
    pub fn try_get_or_compute<E>(
        &mut self,
        inputs: &[Revision],
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        let stale = match &self.cached {
            Some((revs, _)) => revs != inputs,
            None => true,
        };
        if stale {
            self.cached = Some((inputs.to_vec(), compute()?));
        }
        match &self.cached {
            Some((_, value)) => Ok(value),
            None => unreachable!("just computed"),
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

// ----------------------------------------------------------------------------
