//! Floating-point helpers: a cheap ordered wrapper and epsilon comparisons.

use std::cmp::Ordering;
use std::hash::Hash;

/// The tolerance used by [`section_lines`](crate::section_lines).
///
/// Two coordinates closer than this are treated as equal, both when merging
/// nearby points into a single sweep event and when ordering segments along
/// the sweep line.
pub const DEFAULT_EPS: f64 = 1e-10;

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the more principled wrappers in the `ordered_float` crate, this
/// one just panics when comparing NaNs -- it doesn't order them, nor does
/// it guard against them on construction. Inputs are validated for NaNs
/// before they get anywhere near a sweep, so the only way to hit the panic
/// is a bug.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheapOrderedFloat(f64);

impl Hash for CheapOrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

// Now comes the fishy stuff.
impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 < other.0 {
            Ordering::Less
        } else if self.0 > other.0 {
            Ordering::Greater
        } else if self.0 == other.0 {
            Ordering::Equal
        } else {
            panic!("tried to compare NaN")
        }
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

/// Compares two numbers, treating them as equal if they are within `eps`.
///
/// This is not transitive, so it isn't a total order. It's a strict weak
/// order on any set of numbers whose clusters are separated by more than `eps`,
/// which is all the sweep needs.
#[inline]
pub fn cmp_eps(a: f64, b: f64, eps: f64) -> Ordering {
    if a < b - eps {
        Ordering::Less
    } else if a > b + eps {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Are `a` and `b` within `eps` of one another?
#[inline]
pub fn eq_eps(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Checks that `eps` is usable as a tolerance.
pub(crate) fn valid_eps(eps: f64) -> bool {
    eps.is_finite() && eps >= 0.0
}
