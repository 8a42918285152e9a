//! Lifting plain values into the algebra.

use crate::element::Value;
use crate::rank::Rank;
use crate::ranking::Ranking;
use std::ops::Add;

impl<T: Value> From<T> for Ranking<T> {
    /// A plain value is the singleton ranking holding it at rank 0,
    /// which is the autocast that lets operators accept mixed operands.
    fn from(value: T) -> Self {
        Ranking::singleton(value, Rank::ZERO)
    }
}

impl<T> Add for Ranking<T>
where
    T: Value + Add<Output = T>,
{
    type Output = Ranking<T>;

    /// Pointwise sum of two rankings: every pair of values combines, and
    /// their ranks add (saturating). Built on bind, so the result stays
    /// lazy and rank-ordered.
    fn add(self, rhs: Ranking<T>) -> Ranking<T> {
        self.merge_apply(move |lhs| {
            let lhs = lhs.clone();
            rhs.map(move |r| lhs.clone() + r.clone())
        })
    }
}

impl<T> Add<T> for Ranking<T>
where
    T: Value + Add<Output = T>,
{
    type Output = Ranking<T>;

    /// `ranking + scalar`: the scalar lifts to a rank-0 singleton first.
    fn add(self, rhs: T) -> Ranking<T> {
        self + Ranking::from(rhs)
    }
}
