//! Element-wise transformation and predicate elision.

use crate::element::{lazy_link, Element, SharedLink, Value};
use crate::error::RankingError;
use crate::promise::Promise;
use crate::rank::Rank;
use crate::ranking::Ranking;
use std::sync::Arc;

pub(crate) type Pred<T> = dyn Fn(&T) -> bool + Send + Sync;
type MapFn<T, U> = dyn Fn(&T) -> U + Send + Sync;
type TryMapFn<T, U> = dyn Fn(&T) -> Result<U, RankingError> + Send + Sync;
type RankMapFn<T, U> = dyn Fn(&T, Rank) -> (U, Rank) + Send + Sync;
type IndexMapFn<T, U> = dyn Fn(&T, usize) -> U + Send + Sync;

impl<T: Value> Ranking<T> {
    /// Lazy element-wise transformation; ranks are preserved.
    ///
    /// Each result element defers `f` inside its value promise, so the
    /// transformation runs only when a consumer reads the value, exactly
    /// once. A panicking `f` is cached in that promise as a
    /// [`RankingError::Callback`] and replayed on every later read.
    pub fn map<U, F>(&self, f: F) -> Ranking<U>
    where
        U: Value,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let f: Arc<MapFn<T, U>> = Arc::new(f);
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(src.bound(), move || map_step(&src, &f)),
            self.dedup_enabled(),
        )
    }

    /// Fallible [`map`](Ranking::map): an `Err` from `f` is cached in the
    /// element's value promise and surfaces whenever that element is
    /// forced. The elements around it stay readable.
    pub fn try_map<U, F>(&self, f: F) -> Ranking<U>
    where
        U: Value,
        F: Fn(&T) -> Result<U, RankingError> + Send + Sync + 'static,
    {
        let f: Arc<TryMapFn<T, U>> = Arc::new(f);
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(src.bound(), move || try_map_step(&src, &f)),
            self.dedup_enabled(),
        )
    }

    /// Transformation that replaces both value and rank.
    ///
    /// Because the replacement rank is part of the lazy structure, each
    /// source value is forced as its element materializes. The result is
    /// **not** checked for rank order: keeping it sorted is the caller's
    /// responsibility, and downstream primitives assume it.
    pub fn map_with_rank<U, F>(&self, f: F) -> Ranking<U>
    where
        U: Value,
        F: Fn(&T, Rank) -> (U, Rank) + Send + Sync + 'static,
    {
        let f: Arc<RankMapFn<T, U>> = Arc::new(f);
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(Rank::ZERO, move || map_rank_step(&src, &f)),
            self.dedup_enabled(),
        )
    }

    /// Like [`map`](Ranking::map), with the 0-based element index.
    pub fn map_with_index<U, F>(&self, f: F) -> Ranking<U>
    where
        U: Value,
        F: Fn(&T, usize) -> U + Send + Sync + 'static,
    {
        let f: Arc<IndexMapFn<T, U>> = Arc::new(f);
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(src.bound(), move || map_index_step(&src, &f, 0)),
            self.dedup_enabled(),
        )
    }

    /// Lazily elides elements whose value fails the predicate. Ranks are
    /// preserved: the surviving sequence typically starts at a non-zero
    /// rank, which is what distinguishes `filter` from
    /// [`observe`](Ranking::observe).
    pub fn filter<P>(&self, pred: P) -> Ranking<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let pred: Arc<Pred<T>> = Arc::new(pred);
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(src.bound(), move || filter_step(&src, &pred)),
            self.dedup_enabled(),
        )
    }
}

fn map_step<T: Value, U: Value>(
    src: &SharedLink<T>,
    f: &Arc<MapFn<T, U>>,
) -> Result<Option<Arc<Element<U>>>, RankingError> {
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    let value_source = Arc::clone(&element);
    let value_fn = Arc::clone(f);
    let tail = Arc::clone(&element.next);
    let tail_fn = Arc::clone(f);
    Ok(Some(Arc::new(Element {
        value: Promise::new(move || Ok(value_fn(value_source.value.force()?))),
        rank: element.rank,
        next: lazy_link(element.rank, move || map_step(&tail, &tail_fn)),
    })))
}

fn try_map_step<T: Value, U: Value>(
    src: &SharedLink<T>,
    f: &Arc<TryMapFn<T, U>>,
) -> Result<Option<Arc<Element<U>>>, RankingError> {
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    let value_source = Arc::clone(&element);
    let value_fn = Arc::clone(f);
    let tail = Arc::clone(&element.next);
    let tail_fn = Arc::clone(f);
    Ok(Some(Arc::new(Element {
        value: Promise::new(move || value_fn(value_source.value.force()?)),
        rank: element.rank,
        next: lazy_link(element.rank, move || try_map_step(&tail, &tail_fn)),
    })))
}

fn map_rank_step<T: Value, U: Value>(
    src: &SharedLink<T>,
    f: &Arc<RankMapFn<T, U>>,
) -> Result<Option<Arc<Element<U>>>, RankingError> {
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    let (value, rank) = f(element.value.force()?, element.rank);
    let tail = Arc::clone(&element.next);
    let tail_fn = Arc::clone(f);
    Ok(Some(Arc::new(Element {
        value: Promise::ready(value),
        rank,
        next: lazy_link(Rank::ZERO, move || map_rank_step(&tail, &tail_fn)),
    })))
}

fn map_index_step<T: Value, U: Value>(
    src: &SharedLink<T>,
    f: &Arc<IndexMapFn<T, U>>,
    index: usize,
) -> Result<Option<Arc<Element<U>>>, RankingError> {
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    let value_source = Arc::clone(&element);
    let value_fn = Arc::clone(f);
    let tail = Arc::clone(&element.next);
    let tail_fn = Arc::clone(f);
    Ok(Some(Arc::new(Element {
        value: Promise::new(move || Ok(value_fn(value_source.value.force()?, index))),
        rank: element.rank,
        next: lazy_link(element.rank, move || map_index_step(&tail, &tail_fn, index + 1)),
    })))
}

pub(crate) fn filter_step<T: Value>(
    src: &SharedLink<T>,
    pred: &Arc<Pred<T>>,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    let mut cursor = src.force()?.clone();
    while let Some(element) = cursor {
        if pred(element.value.force()?) {
            let tail = Arc::clone(&element.next);
            let tail_pred = Arc::clone(pred);
            return Ok(Some(
                element.with_tail(move || filter_step(&tail, &tail_pred)),
            ));
        }
        cursor = element.next.force()?.clone();
    }
    Ok(None)
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
    fn map_preserves_ranks() {
        let doubled =
            Ranking::from_values_sequential(vec![1_u64, 2, 3], Rank::ZERO).map(|n| n * 2);
        assert_eq!(
            collect(&doubled),
            vec![(2, rank(0)), (4, rank(1)), (6, rank(2))]
        );
    }

    #[test]
    fn map_defers_the_closure() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mapped = Ranking::from_values_uniform(vec![1_u8, 2], Rank::ZERO).map(move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            n + 1
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(mapped.most_normal().unwrap(), Some((2, Rank::ZERO)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn try_map_caches_the_failure_in_place() {
        let ranking = Ranking::from_values_sequential(vec![1_i64, -1, 3], Rank::ZERO)
            .try_map(|n| {
                if *n < 0 {
                    Err(RankingError::callback("negative"))
                } else {
                    Ok(*n)
                }
            });

        let collected: Vec<_> = ranking.iter_all().collect();
        assert_eq!(collected[0].as_ref().unwrap(), &(1, rank(0)));
        assert!(collected[1].is_err());
        // A consumer can step around the failing element.
        assert_eq!(
            ranking.filter(|n| *n > 0).take_n(10).unwrap(),
            vec![(1, rank(0)), (3, rank(2))]
        );
    }

    #[test]
    fn map_with_rank_replaces_both_parts() {
        let ranking = Ranking::from_values_uniform(vec![1_u64, 2], rank(1))
            .map_with_rank(|n, r| (n * 10, r.saturating_add(rank(1))));
        assert_eq!(collect(&ranking), vec![(10, rank(2)), (20, rank(2))]);
    }

    #[test]
    fn map_with_index_sees_positions() {
        let ranking = Ranking::from_values_uniform(vec!['a', 'b', 'c'], Rank::ZERO)
            .map_with_index(|c, i| format!("{c}{i}"));
        let values: Vec<String> = ranking
            .iter_all()
            .map(|pair| pair.unwrap().0)
            .collect();
        assert_eq!(values, vec!["a0", "b1", "c2"]);
    }

    #[test]
    fn filter_keeps_ranks_unshifted() {
        let ranking = Ranking::from_list(vec![(1_u8, rank(2)), (2, rank(5)), (3, rank(9))])
            .filter(|n| *n >= 2);
        assert_eq!(collect(&ranking), vec![(2, rank(5)), (3, rank(9))]);
    }

    #[test]
    fn filter_of_everything_is_empty() {
        let ranking =
            Ranking::from_values_uniform(vec![1_u8, 2], Rank::ZERO).filter(|_| false);
        assert!(ranking.is_empty().unwrap());
    }
}
