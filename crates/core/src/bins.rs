//! Explicit bin tables.
//!
//! Every categorical label in the engine is derived through a [`BinTable`]: an inclusive floor
//! followed by an ordered list of `(upper_bound_inclusive, label)` pairs. The lowest bin includes
//! its left edge (the floor) and every bin includes its right edge, so a value sitting exactly on
//! a boundary belongs to the lower bin.

/// One bin: every value in `(previous upper, upper]` maps to `label`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin<L> {
    pub upper: f64,
    pub label: L,
}

/// An ordered, right-inclusive bin table with an inclusive floor.
#[derive(Debug, Clone, Copy)]
pub struct BinTable<L: 'static> {
    name: &'static str,
    floor: f64,
    bins: &'static [Bin<L>],
}

impl<L: Copy> BinTable<L> {
    /// Builds a table. `bins` must be sorted by strictly increasing `upper`.
    pub const fn new(name: &'static str, floor: f64, bins: &'static [Bin<L>]) -> Self {
        Self { name, floor, bins }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the label for `value`, or `None` when the value is NaN, below the floor or above
    /// the last upper bound.
    pub fn classify(&self, value: f64) -> Option<L> {
        if value.is_nan() || value < self.floor {
            return None;
        }
        self.bins
            .iter()
            .find(|bin| value <= bin.upper)
            .map(|bin| bin.label)
    }

    /// Labels in bin order.
    pub fn labels(&self) -> impl Iterator<Item = L> + '_ {
        self.bins.iter().map(|bin| bin.label)
    }
}
