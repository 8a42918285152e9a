//! Single-pass traversal of a ranking.
//!
//! Iterators force elements as they advance and yield `(value, rank)`
//! pairs in rank order. Iterator state is not shared-thread-safe; each
//! thread walks its own iterator. The sequence itself is fully determined
//! by the ranking's construction history: the promises underneath
//! memoize, so two traversals of the same ranking agree element for
//! element, including any cached failures.
//!
//! # Failure delivery
//!
//! A cached failure in an element's value is yielded as `Err` once, and
//! the cursor then moves past the element, so bulk consumption always
//! terminates. A failure in a successor cell also yields `Err`, but ends
//! the iteration: the cell will fail identically forever, so nothing
//! behind it is reachable. Either way the ranking itself stays valid, and
//! a fresh traversal replays the same prefix and the same failure.

use crate::element::{SharedLink, Value};
use crate::error::RankingError;
use crate::rank::Rank;
use std::sync::Arc;

/// Cursor over a ranking that suppresses consecutive duplicate values
/// when the source ranking has deduplication enabled.
///
/// Only the value most recently emitted is compared against, so the head
/// of the stream is never skipped and non-adjacent repeats survive.
pub struct Iter<T: Value> {
    cursor: Option<SharedLink<T>>,
    last_emitted: Option<T>,
    dedup: bool,
}

impl<T: Value> Iter<T> {
    pub(crate) fn new(head: SharedLink<T>, dedup: bool) -> Self {
        Self {
            cursor: Some(head),
            last_emitted: None,
            dedup,
        }
    }
}

impl<T: Value + PartialEq> Iterator for Iter<T> {
    type Item = Result<(T, Rank), RankingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let link = self.cursor.clone()?;
            let element = match link.force() {
                Ok(Some(element)) => Arc::clone(element),
                Ok(None) => {
                    self.cursor = None;
                    return None;
                }
                Err(err) => {
                    self.cursor = None;
                    return Some(Err(err));
                }
            };
            self.cursor = Some(Arc::clone(&element.next));
            let value = match element.value.force() {
                Ok(value) => value.clone(),
                Err(err) => return Some(Err(err)),
            };
            if self.dedup && self.last_emitted.as_ref() == Some(&value) {
                continue;
            }
            self.last_emitted = Some(value.clone());
            return Some(Ok((value, element.rank)));
        }
    }
}

/// Cursor over a ranking that never deduplicates.
///
/// Carries no equality bound, so values without `PartialEq` can still be
/// traversed.
pub struct RawIter<T: Value> {
    cursor: Option<SharedLink<T>>,
}

impl<T: Value> RawIter<T> {
    pub(crate) fn new(head: SharedLink<T>) -> Self {
        Self { cursor: Some(head) }
    }
}

impl<T: Value> Iterator for RawIter<T> {
    type Item = Result<(T, Rank), RankingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.cursor.clone()?;
        let element = match link.force() {
            Ok(Some(element)) => Arc::clone(element),
            Ok(None) => {
                self.cursor = None;
                return None;
            }
            Err(err) => {
                self.cursor = None;
                return Some(Err(err));
            }
        };
        self.cursor = Some(Arc::clone(&element.next));
        let value = match element.value.force() {
            Ok(value) => value.clone(),
            Err(err) => return Some(Err(err)),
        };
        Some(Ok((value, element.rank)))
    }
}

#[cfg(test)]
mod tests {
    use crate::rank::Rank;
    use crate::ranking::Ranking;

    fn rank(n: u64) -> Rank {
        Rank::from_value(n).unwrap()
    }

    #[test]
    fn dedup_suppresses_consecutive_duplicates_only() {
        let ranking = Ranking::from_list(vec![
            ('a', rank(0)),
            ('a', rank(1)),
            ('b', rank(2)),
            ('a', rank(3)),
        ]);

        let deduped: Vec<_> = ranking.iter().map(Result::unwrap).collect();
        assert_eq!(deduped, vec![('a', rank(0)), ('b', rank(2)), ('a', rank(3))]);

        let all: Vec<_> = ranking.iter_all().map(Result::unwrap).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[1], ('a', rank(1)));
    }

    #[test]
    fn dedup_disabled_on_the_ranking_is_honored() {
        let ranking =
            Ranking::from_list(vec![(1_u8, rank(0)), (1, rank(0))]).with_dedup(false);
        assert_eq!(ranking.iter().count(), 2);
    }

    #[test]
    fn value_failure_is_delivered_once_and_stepped_past() {
        let ranking = Ranking::from_values_sequential(vec![1_u32, 2, 3], Rank::ZERO)
            .try_map(|n| {
                if *n == 2 {
                    Err(crate::error::RankingError::callback("no twos"))
                } else {
                    Ok(*n)
                }
            });

        let mut iter = ranking.iter();
        assert_eq!(iter.next().unwrap().unwrap(), (1, rank(0)));
        let failure = iter.next().unwrap().unwrap_err();
        assert!(failure.is_callback());
        // Delivery consumed the failing element; iteration continues.
        assert_eq!(iter.next().unwrap().unwrap(), (3, rank(2)));
        assert!(iter.next().is_none());

        // A fresh traversal replays the identical cached failure.
        let replayed = ranking.iter().nth(1).unwrap().unwrap_err();
        assert_eq!(replayed, failure);
    }
}
