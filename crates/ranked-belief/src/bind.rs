//! Monadic bind: flattening a ranking of rankings with rank addition.

use crate::element::{empty_link, lazy_link, Element, SharedLink, Value};
use crate::error::RankingError;
use crate::merge::merge_step;
use crate::prefix::shift_step;
use crate::rank::Rank;
use crate::ranking::Ranking;
use std::sync::Arc;

type BindFn<T, U> = dyn Fn(&T) -> Ranking<U> + Send + Sync;

impl<T: Value> Ranking<T> {
    /// Monadic bind with rank addition.
    ///
    /// For each element `(v, r)` of `self`, `f(v)` produces a child
    /// ranking whose every rank is shifted by `+r` (saturating): a parent
    /// rank of `r` means "r surprises to get here", and a child rank of
    /// `c` adds c further surprises. The result is the rank-ordered merge
    /// of all shifted children, built lazily: producing the result's head
    /// forces only the first child's head, and later children are
    /// expanded only when the consumer advances past what earlier
    /// children can supply. Ties between children go to the earlier
    /// parent element.
    ///
    /// # Example
    ///
    /// ```
    /// use ranked_belief_rs::{Rank, Ranking};
    ///
    /// let rk = |n| Rank::from_value(n).unwrap();
    /// let parents = Ranking::from_values_sequential(vec![1_u64, 2], Rank::ZERO);
    /// let bound = parents.merge_apply(move |n| {
    ///     let n = *n;
    ///     Ranking::from_list(vec![(n, Rank::ZERO), (n + 1, rk(1))])
    /// });
    /// assert_eq!(
    ///     bound.take_n(3).unwrap(),
    ///     vec![(1, rk(0)), (2, rk(1)), (3, rk(2))]
    /// );
    /// ```
    pub fn merge_apply<U, F>(&self, f: F) -> Ranking<U>
    where
        U: Value,
        F: Fn(&T) -> Ranking<U> + Send + Sync + 'static,
    {
        let f: Arc<BindFn<T, U>> = Arc::new(f);
        let parent = self.head_link();
        Ranking::from_head(
            lazy_link(parent.bound(), move || bind_step(empty_link(), parent, f)),
            self.dedup_enabled(),
        )
    }
}

/// One step of the bind frontier.
///
/// `merged` is the lazy merge of every child ranking expanded so far
/// (already shifted); `parent` is the unconsumed parent tail. An element
/// can be emitted from `merged` as soon as its rank is at most the next
/// parent rank: every child of that parent (and of all later parents, by
/// rank order) starts at or above that rank, so nothing yet unexpanded
/// can come earlier. Otherwise exactly one more child is expanded and
/// folded into the frontier.
fn bind_step<T: Value, U: Value>(
    mut merged: SharedLink<U>,
    mut parent: SharedLink<T>,
    f: Arc<BindFn<T, U>>,
) -> Result<Option<Arc<Element<U>>>, RankingError> {
    loop {
        let Some(next_parent) = parent.force()?.clone() else {
            // Parent exhausted: the rest is whatever the expanded
            // children still hold, shared as-is.
            return Ok(merged.force()?.clone());
        };

        if let Some(candidate) = merged.force()?.clone() {
            if candidate.rank <= next_parent.rank {
                let tail = Arc::clone(&candidate.next);
                let parent_rest = Arc::clone(&parent);
                let f_rest = Arc::clone(&f);
                return Ok(Some(candidate.with_tail(move || {
                    bind_step(tail, parent_rest, f_rest)
                })));
            }
        }

        // Expand one more child: f(value), shifted by the parent's rank.
        let child = f(next_parent.value.force()?);
        let child_link = if next_parent.rank == Rank::ZERO {
            child.head_link()
        } else {
            let head = child.head_link();
            let delta = next_parent.rank;
            let shifted_bound = head.bound().saturating_add(delta);
            lazy_link(shifted_bound, move || shift_step(&head, delta))
        };
        let expanded = merged;
        let frontier_bound = expanded.bound().min(child_link.bound());
        merged = lazy_link(frontier_bound, move || merge_step(&expanded, &child_link));
        parent = Arc::clone(&next_parent.next);
    }
}
