//! Conditioning: filter, then re-normalize ranks.

use crate::element::{lazy_link, Element, SharedLink, Value};
use crate::error::RankingError;
use crate::rank::Rank;
use crate::ranking::Ranking;
use crate::transform::Pred;
use std::sync::Arc;

impl<T: Value> Ranking<T> {
    /// Conditions the ranking on a predicate.
    ///
    /// Keeps only matching elements and subtracts the first survivor's
    /// rank from every survivor, so the surviving minimum becomes 0.
    /// The result is empty when nothing matches, or when the first match
    /// sits at ∞; survivors at ∞ stay at ∞.
    ///
    /// The shift amount is fixed by forcing only up to the first match;
    /// later survivors shift lazily as the consumer advances. Predicate
    /// failures propagate through the iterator exactly as
    /// [`filter`](Ranking::filter)'s do.
    ///
    /// # Example
    ///
    /// ```
    /// use ranked_belief_rs::{Rank, Ranking};
    ///
    /// let rk = |n| Rank::from_value(n).unwrap();
    /// let beliefs = Ranking::from_list(vec![(1_u8, rk(2)), (2, rk(5)), (3, rk(9))]);
    /// let conditioned = beliefs.observe(|n| *n >= 2);
    /// assert_eq!(
    ///     conditioned.take_n(10).unwrap(),
    ///     vec![(2, rk(0)), (3, rk(4))]
    /// );
    /// ```
    pub fn observe<P>(&self, pred: P) -> Ranking<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let pred: Arc<Pred<T>> = Arc::new(pred);
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(Rank::ZERO, move || observe_start(&src, &pred)),
            self.dedup_enabled(),
        )
    }

    /// Conditions the ranking on equality with a specific value.
    pub fn observe_eq(&self, expected: T) -> Ranking<T>
    where
        T: PartialEq,
    {
        self.observe(move |value| *value == expected)
    }
}

fn observe_start<T: Value>(
    src: &SharedLink<T>,
    pred: &Arc<Pred<T>>,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    let mut cursor = src.force()?.clone();
    while let Some(element) = cursor {
        if pred(element.value.force()?) {
            if element.rank.is_infinite() {
                return Ok(None);
            }
            let shift = element.rank;
            let tail = Arc::clone(&element.next);
            let tail_pred = Arc::clone(pred);
            return Ok(Some(element.re_rank(Rank::ZERO, move || {
                observe_step(&tail, shift, &tail_pred)
            })));
        }
        cursor = element.next.force()?.clone();
    }
    Ok(None)
}

fn observe_step<T: Value>(
    src: &SharedLink<T>,
    shift: Rank,
    pred: &Arc<Pred<T>>,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    let mut cursor = src.force()?.clone();
    while let Some(element) = cursor {
        if pred(element.value.force()?) {
            let rank = conditioned_rank(element.rank, shift)?;
            let tail = Arc::clone(&element.next);
            let tail_pred = Arc::clone(pred);
            return Ok(Some(element.re_rank(rank, move || {
                observe_step(&tail, shift, &tail_pred)
            })));
        }
        cursor = element.next.force()?.clone();
    }
    Ok(None)
}

/// Rank of a survivor after conditioning. ∞ stays ∞; a finite survivor
/// sits at or above the shift by rank order, so underflow here would be a
/// bug in the machinery, not a caller fault.
fn conditioned_rank(rank: Rank, shift: Rank) -> Result<Rank, RankingError> {
    if rank.is_infinite() {
        return Ok(Rank::INFINITY);
    }
    rank.checked_sub(shift)
        .map_err(|_| RankingError::Internal("conditioning shift exceeded a survivor's rank"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(n: u64) -> Rank {
        Rank::from_value(n).unwrap()
    }

    fn collect<T: Value + PartialEq>(ranking: &Ranking<T>) -> Vec<(T, Rank)> {
        ranking.iter_all().map(Result::unwrap).collect()
    }

    #[test]
    fn renormalizes_the_surviving_minimum_to_zero() {
        let ranking = Ranking::from_list(vec![(1_u8, rank(2)), (2, rank(5)), (3, rank(9))])
            .observe(|n| *n >= 2);
        assert_eq!(collect(&ranking), vec![(2, rank(0)), (3, rank(4))]);
    }

    #[test]
    fn observing_an_already_normal_survivor_changes_nothing() {
        let ranking = Ranking::from_values_sequential(vec![1_u8, 2, 3], Rank::ZERO)
            .observe(|n| *n != 2);
        assert_eq!(collect(&ranking), vec![(1, rank(0)), (3, rank(2))]);
    }

    #[test]
    fn no_match_yields_empty() {
        let ranking =
            Ranking::from_values_uniform(vec![1_u8, 2], Rank::ZERO).observe(|n| *n > 9);
        assert!(ranking.is_empty().unwrap());
    }

    #[test]
    fn impossible_first_match_yields_empty() {
        let ranking = Ranking::from_list(vec![(1_u8, rank(0)), (2, Rank::INFINITY)])
            .observe(|n| *n == 2);
        assert!(ranking.is_empty().unwrap());
    }

    #[test]
    fn impossible_survivors_stay_impossible() {
        let ranking =
            Ranking::from_list(vec![(1_u8, rank(3)), (2, Rank::INFINITY)]).observe(|_| true);
        assert_eq!(
            collect(&ranking),
            vec![(1, rank(0)), (2, Rank::INFINITY)]
        );
    }

    #[test]
    fn observe_eq_conditions_on_the_value() {
        let ranking = Ranking::from_values_sequential(vec!["a", "b", "c"], Rank::ZERO)
            .observe_eq("b");
        assert_eq!(collect(&ranking), vec![("b", rank(0))]);
    }

    #[test]
    fn first_of_a_nonempty_observation_is_rank_zero() {
        let ranking = Ranking::from_generator(
            |i| Some((i as u64, rank(i as u64))),
            0,
        )
        .observe(|n| n % 7 == 3);
        assert_eq!(ranking.most_normal().unwrap(), Some((3, rank(0))));
    }
}
