//! Type selector: which alternative does an input construct?
//!
//! The policy is evaluated against the declared alternative order:
//!
//! 1. **Exact**: no extra arguments and the input's own type is an alternative
//!    that accepts it.
//! 2. **Literal**: a boolean or null input with no extra arguments goes to the
//!    *last* alternative that accepts it, so `true` does not land in a numeric
//!    alternative declared before `bool`.
//! 3. **Integral**: an integer input with no extra arguments prefers integral
//!    alternatives of the same signedness, then any integral alternative, then
//!    floats. Integral candidates must hold the value without narrowing; this
//!    is the only step that looks at the value rather than the type.
//! 4. **First**: the first alternative accepting `(input, args)`.
//!
//! [`rank`] turns an input shape into a [`Ranking`] once; [`resolve`] applies it
//! to a concrete input. The registry precomputes rankings for every built-in
//! input type.

use crate::alternative::AltKind;
use crate::input::{Input, InputClass, InputShape};
use crate::registry::Descriptor;

/// Outcome of ranking one input shape against an alternative set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ranking {
    /// Rule 1: the input's own type.
    Exact(usize),
    /// Rule 2: last alternative accepting a bool/null literal.
    Literal(usize),
    /// Rule 3: candidates in preference order; the first holding the value wins.
    Integral(Vec<usize>),
    /// Rule 4: first alternative accepting the input.
    First(usize),
    /// Nothing in the set is constructible from this shape.
    Unsupported,
}

impl Ranking {
    pub fn is_supported(&self) -> bool {
        !matches!(self, Ranking::Unsupported)
    }
}

/// Rank `(input, args)` against the declared alternatives.
pub(crate) fn rank(alternatives: &[Descriptor], input: &InputShape, args: &[InputShape]) -> Ranking {
    let accepts = |d: &Descriptor| (d.accepts)(input, args);

    if args.is_empty() {
        if let Some(index) = alternatives
            .iter()
            .position(|d| d.type_id == input.type_id && accepts(d))
        {
            return Ranking::Exact(index);
        }

        match input.class {
            InputClass::Null | InputClass::Bool => {
                if let Some(index) = alternatives.iter().rposition(accepts) {
                    return Ranking::Literal(index);
                }
            }
            InputClass::Int { signed, .. } => {
                let integral = |want_same: bool| {
                    alternatives.iter().enumerate().filter_map(move |(i, d)| match d.kind {
                        AltKind::Int { signed: s, .. } if (s == signed) == want_same && accepts(d) => {
                            Some(i)
                        }
                        _ => None,
                    })
                };
                let floats = alternatives
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| d.kind.is_float() && accepts(d))
                    .map(|(i, _)| i);
                let candidates: Vec<usize> = integral(true).chain(integral(false)).chain(floats).collect();
                if !candidates.is_empty() {
                    return Ranking::Integral(candidates);
                }
            }
            _ => {}
        }
    }

    alternatives
        .iter()
        .position(accepts)
        .map_or(Ranking::Unsupported, Ranking::First)
}

/// Apply a ranking to a concrete input.
pub(crate) fn resolve(ranking: &Ranking, alternatives: &[Descriptor], input: &Input) -> Option<usize> {
    match ranking {
        Ranking::Exact(i) | Ranking::Literal(i) | Ranking::First(i) => Some(*i),
        Ranking::Integral(candidates) => candidates
            .iter()
            .copied()
            .find(|&i| alternatives[i].kind.holds(input.payload())),
        Ranking::Unsupported => None,
    }
}
