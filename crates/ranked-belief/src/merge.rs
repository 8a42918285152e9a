//! Lazy rank-ordered interleaving.

use crate::element::{lazy_link, Element, SharedLink, Value};
use crate::error::RankingError;
use crate::ranking::Ranking;
use std::sync::Arc;

impl<T: Value> Ranking<T> {
    /// Lazy rank-ordered interleaving of two rankings.
    ///
    /// The element with the smaller rank is emitted first; on ties the
    /// left input (`self`) wins, which makes `merge` deterministic. An
    /// exhausted side's remainder is shared with the result, not copied.
    ///
    /// Constructing the merge forces nothing. Producing an element forces
    /// at most both input heads; when the left head's rank is at or below
    /// the right side's rank bound, the right side is not forced at all,
    /// which is what keeps recursively nested merges lazy.
    ///
    /// The result carries `self`'s dedup flag.
    pub fn merge(&self, other: &Ranking<T>) -> Ranking<T> {
        let left = self.head_link();
        let right = other.head_link();
        let bound = left.bound().min(right.bound());
        Ranking::from_head(
            lazy_link(bound, move || merge_step(&left, &right)),
            self.dedup_enabled(),
        )
    }

    /// N-way merge by pairwise reduction from the left, so an earlier
    /// ranking wins every tie against a later one.
    pub fn merge_all<I>(rankings: I) -> Ranking<T>
    where
        I: IntoIterator<Item = Ranking<T>>,
    {
        let mut rankings = rankings.into_iter();
        let Some(first) = rankings.next() else {
            return Ranking::empty();
        };
        rankings.fold(first, |acc, next| acc.merge(&next))
    }
}

pub(crate) fn merge_step<T: Value>(
    left: &SharedLink<T>,
    right: &SharedLink<T>,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    let Some(a) = left.force()?.clone() else {
        // Left side exhausted: the result is the right side, shared.
        return Ok(right.force()?.clone());
    };
    // Nothing behind `right` can come before a rank equal to its bound,
    // and on ties the left side wins anyway.
    if a.rank <= right.bound() {
        return Ok(Some(emit_left(a, right)));
    }
    match right.force()?.clone() {
        None => Ok(Some(a)),
        Some(b) => {
            if a.rank <= b.rank {
                Ok(Some(emit_left(a, right)))
            } else {
                let tail = Arc::clone(&b.next);
                let other = Arc::clone(left);
                Ok(Some(b.with_tail(move || merge_step(&other, &tail))))
            }
        }
    }
}

fn emit_left<T: Value>(a: Arc<Element<T>>, right: &SharedLink<T>) -> Arc<Element<T>> {
    let tail = Arc::clone(&a.next);
    let other = Arc::clone(right);
    a.with_tail(move || merge_step(&tail, &other))
}
