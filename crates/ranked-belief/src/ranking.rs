//! The ranking handle and its constructors.

use crate::element::{
    empty_link, infinite_sequence, lazy_link, ready_link, Element, Generator, SharedLink, Value,
};
use crate::error::RankingError;
use crate::invariants::debug_assert_rank_sorted;
use crate::iter::{Iter, RawIter};
use crate::rank::Rank;
use std::sync::Arc;

/// A ranking function: a conceptually infinite, rank-sorted lazy sequence
/// of `(value, rank)` pairs.
///
/// A ranking is a thin value over shared lazy structure: cloning is O(1)
/// and shares every element, and no primitive ever mutates an existing
/// ranking: each returns a new handle whose elements are built on demand
/// and point back into their inputs. Passing a ranking to another thread
/// is safe; the memoized promises underneath are the only synchronization
/// points.
///
/// Deduplication (suppression of consecutive equal values during
/// iteration) is enabled by default and carried as a per-ranking flag;
/// see [`Ranking::with_dedup`].
pub struct Ranking<T: Value> {
    head: SharedLink<T>,
    dedup: bool,
}

impl<T: Value> Clone for Ranking<T> {
    fn clone(&self) -> Self {
        Self {
            head: Arc::clone(&self.head),
            dedup: self.dedup,
        }
    }
}

impl<T: Value> Ranking<T> {
    pub(crate) fn from_head(head: SharedLink<T>, dedup: bool) -> Self {
        Self { head, dedup }
    }

    pub(crate) fn head_link(&self) -> SharedLink<T> {
        Arc::clone(&self.head)
    }

    /// The ranking with no elements.
    pub fn empty() -> Self {
        Self {
            head: empty_link(),
            dedup: true,
        }
    }

    /// A single value at the given rank.
    pub fn singleton(value: T, rank: Rank) -> Self {
        Self {
            head: ready_link(Element::terminal(value, rank)),
            dedup: true,
        }
    }

    /// Builds a ranking from a materialized pair list, preserving input
    /// order. The input must already be sorted by rank; a debug assertion
    /// checks this, release builds trust the caller.
    pub fn from_list(pairs: Vec<(T, Rank)>) -> Self {
        debug_assert_rank_sorted!(pairs);
        Self::from_sorted_pairs(pairs)
    }

    /// Assigns the same rank to every value.
    pub fn from_values_uniform(values: Vec<T>, rank: Rank) -> Self {
        Self::from_sorted_pairs(values.into_iter().map(|value| (value, rank)).collect())
    }

    /// Value `i` gets rank `start + i` (saturating at ∞).
    pub fn from_values_sequential(values: Vec<T>, start: Rank) -> Self {
        Self::from_sorted_pairs(
            values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (value, index_rank(start, index)))
                .collect(),
        )
    }

    /// Ranks each value with a `(value, index) -> Rank` function. The
    /// ranker must produce non-decreasing ranks over the input order.
    pub fn from_values_with_ranker<F>(values: Vec<T>, ranker: F) -> Self
    where
        F: Fn(&T, usize) -> Rank,
    {
        let pairs: Vec<(T, Rank)> = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let rank = ranker(&value, index);
                (value, rank)
            })
            .collect();
        debug_assert_rank_sorted!(pairs);
        Self::from_sorted_pairs(pairs)
    }

    /// Lazily materializes an index-parameterized sequence starting at
    /// `start_index`. The generator is invoked only as traversal demands
    /// elements; returning `None` ends the sequence, so a generator that
    /// never does is the infinite case. Ranks must be non-decreasing in
    /// the index (caller responsibility, debug-asserted).
    ///
    /// # Example
    ///
    /// ```
    /// use ranked_belief_rs::{Rank, Ranking};
    ///
    /// // Powers of two, each one more surprising than the last.
    /// let powers = Ranking::from_generator(
    ///     |i| Some((1_u64 << i, Rank::from_value(i as u64).unwrap())),
    ///     0,
    /// );
    /// assert_eq!(
    ///     powers.take_n(3).unwrap(),
    ///     vec![
    ///         (1, Rank::ZERO),
    ///         (2, Rank::from_value(1).unwrap()),
    ///         (4, Rank::from_value(2).unwrap()),
    ///     ]
    /// );
    /// ```
    pub fn from_generator<G>(gen: G, start_index: usize) -> Self
    where
        G: Fn(usize) -> Option<(T, Rank)> + Send + Sync + 'static,
    {
        let gen: Arc<Generator<T>> = Arc::new(gen);
        Self {
            head: lazy_link(Rank::ZERO, move || infinite_sequence(&gen, start_index)),
            dedup: true,
        }
    }

    /// Consumes any finite sequence, ranking item `i` at `start_rank + i`.
    pub fn from_range<I>(values: I, start_rank: Rank) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_values_sequential(values.into_iter().collect(), start_rank)
    }

    /// Consumes any finite sequence of pairs, which must already be
    /// sorted by rank.
    pub fn from_pair_range<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, Rank)>,
    {
        Self::from_list(pairs.into_iter().collect())
    }

    /// A ranking whose construction itself is deferred.
    ///
    /// `builder` runs when the head is first demanded. This is what makes
    /// recursive definitions possible: the recursive call sits inside the
    /// builder instead of running at construction time.
    pub fn defer<F>(builder: F) -> Self
    where
        F: FnOnce() -> Ranking<T> + Send + 'static,
    {
        Self {
            head: lazy_link(Rank::ZERO, move || {
                let ranking = builder();
                ranking.head.force().cloned()
            }),
            dedup: true,
        }
    }

    fn from_sorted_pairs(pairs: Vec<(T, Rank)>) -> Self {
        let mut head: Option<Arc<Element<T>>> = None;
        for (value, rank) in pairs.into_iter().rev() {
            head = Some(match head {
                None => Element::terminal(value, rank),
                Some(next) => Element::cons(value, rank, next),
            });
        }
        Self {
            head: match head {
                None => empty_link(),
                Some(element) => ready_link(element),
            },
            dedup: true,
        }
    }

    /// Returns a copy of this ranking with deduplication switched on or
    /// off. The underlying structure is shared either way.
    #[must_use]
    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.dedup = enabled;
        self
    }

    /// Whether iteration suppresses consecutive duplicate values.
    #[inline]
    pub fn dedup_enabled(&self) -> bool {
        self.dedup
    }

    /// Iterates `(value, rank)` pairs, honoring the dedup flag.
    pub fn iter(&self) -> Iter<T>
    where
        T: PartialEq,
    {
        Iter::new(self.head_link(), self.dedup)
    }

    /// Iterates every element, never deduplicating. Usable with value
    /// types that have no equality relation.
    pub fn iter_all(&self) -> RawIter<T> {
        RawIter::new(self.head_link())
    }

    /// Forces the head. `Ok(true)` means the ranking has no elements.
    pub fn is_empty(&self) -> Result<bool, RankingError> {
        Ok(self.head.force()?.is_none())
    }

    /// Materializes the single most normal element, or `None` on an empty
    /// ranking. Forces exactly the head.
    pub fn most_normal(&self) -> Result<Option<(T, Rank)>, RankingError> {
        match self.head.force()? {
            None => Ok(None),
            Some(element) => Ok(Some((element.value.force()?.clone(), element.rank))),
        }
    }

    /// Materializes at most `n` pairs, the one eager primitive. Honors
    /// the dedup flag.
    pub fn take_n(&self, n: usize) -> Result<Vec<(T, Rank)>, RankingError>
    where
        T: PartialEq,
    {
        let mut out = Vec::with_capacity(n.min(1024));
        for pair in self.iter().take(n) {
            out.push(pair?);
        }
        Ok(out)
    }
}

impl<'a, T: Value + PartialEq> IntoIterator for &'a Ranking<T> {
    type Item = Result<(T, Rank), RankingError>;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn index_rank(start: Rank, index: usize) -> Rank {
    match Rank::from_value(index as u64) {
        Ok(step) => start.saturating_add(step),
        Err(_) => Rank::INFINITY,
    }
}
