//! Prefix extraction and rank translation.

use crate::element::{lazy_link, Element, SharedLink, Value};
use crate::error::RankingError;
use crate::rank::Rank;
use crate::ranking::Ranking;
use std::sync::Arc;

impl<T: Value> Ranking<T> {
    /// Lazy prefix of at most `n` elements.
    pub fn take(&self, n: usize) -> Ranking<T> {
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(src.bound(), move || take_step(&src, n)),
            self.dedup_enabled(),
        )
    }

    /// Lazy prefix of all elements whose rank is at most `max_rank`.
    ///
    /// Rank order means the first element beyond the bound ends the
    /// prefix; nothing after it is forced.
    pub fn take_while_rank(&self, max_rank: Rank) -> Ranking<T> {
        let src = self.head_link();
        Ranking::from_head(
            lazy_link(src.bound(), move || take_while_rank_step(&src, max_rank)),
            self.dedup_enabled(),
        )
    }

    /// Adds `delta` to every rank, saturating at ∞. A zero shift returns
    /// a clone sharing the input outright.
    pub fn shift_ranks(&self, delta: Rank) -> Ranking<T> {
        if delta == Rank::ZERO {
            return self.clone();
        }
        let src = self.head_link();
        let bound = src.bound().saturating_add(delta);
        Ranking::from_head(
            lazy_link(bound, move || shift_step(&src, delta)),
            self.dedup_enabled(),
        )
    }
}

fn take_step<T: Value>(
    src: &SharedLink<T>,
    remaining: usize,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    if remaining == 0 {
        return Ok(None);
    }
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    let tail = Arc::clone(&element.next);
    Ok(Some(
        element.with_tail(move || take_step(&tail, remaining - 1)),
    ))
}

fn take_while_rank_step<T: Value>(
    src: &SharedLink<T>,
    max_rank: Rank,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    if element.rank > max_rank {
        return Ok(None);
    }
    let tail = Arc::clone(&element.next);
    Ok(Some(
        element.with_tail(move || take_while_rank_step(&tail, max_rank)),
    ))
}

pub(crate) fn shift_step<T: Value>(
    src: &SharedLink<T>,
    delta: Rank,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    let Some(element) = src.force()?.clone() else {
        return Ok(None);
    };
    let tail = Arc::clone(&element.next);
    let shifted = element.rank.saturating_add(delta);
    Ok(Some(
        element.re_rank(shifted, move || shift_step(&tail, delta)),
    ))
}
