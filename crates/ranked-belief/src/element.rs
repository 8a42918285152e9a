//! Nodes of the rank-sorted lazy list.
//!
//! An element carries a (possibly deferred) value, a rank, and a lazy
//! successor cell. Elements are immutable after construction and shared by
//! reference counting: any number of rankings and iterators may hold the
//! same subtree, and the promises inside are the only synchronization
//! points. Successor thunks produce elements that did not exist when the
//! thunk was built, so the structure is acyclic by construction and plain
//! refcounts suffice.

use crate::error::RankingError;
use crate::invariants::debug_assert_generator_order;
use crate::promise::Promise;
use crate::rank::Rank;
use std::sync::Arc;

/// Pervasive bound on ranked values: the lazy machinery shares values
/// across threads and clones them out of shared elements on read.
///
/// Blanket-implemented for every eligible type; never implement manually.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}

/// Lazy cell producing the next element of a sequence, or `None` at its
/// end. The head of a ranking is held through the same cell type, which
/// is what lets every primitive construct in O(1) without forcing
/// anything.
///
/// Each cell carries a static lower bound on the rank of the first
/// element it can produce. The bound is what keeps `merge` lazy over
/// recursive structure: when one side's head rank is at or below the
/// other side's bound, the element can be emitted without forcing the
/// other side at all.
pub(crate) struct Link<T: 'static> {
    bound: Rank,
    cell: Promise<Option<Arc<Element<T>>>>,
}

/// Shared handle to a successor cell.
pub(crate) type SharedLink<T> = Arc<Link<T>>;

/// Index-parameterized sequence producer. Returning `None` ends the
/// sequence; a generator that never returns `None` is the infinite case.
pub(crate) type Generator<T> = dyn Fn(usize) -> Option<(T, Rank)> + Send + Sync;

impl<T: Value> Link<T> {
    /// Forces the cell to its element (or end-of-sequence).
    #[inline]
    pub(crate) fn force(&self) -> Result<&Option<Arc<Element<T>>>, RankingError> {
        self.cell.force()
    }

    /// Lower bound on the rank of the first element this cell can
    /// produce. Every element behind the cell sits at or above it.
    #[inline]
    pub(crate) fn bound(&self) -> Rank {
        self.bound
    }

    /// Whether the cell has been forced; never blocks.
    #[cfg(test)]
    pub(crate) fn is_forced(&self) -> bool {
        self.cell.is_forced()
    }
}

/// Immutable node of a rank-sorted lazy list.
pub(crate) struct Element<T: 'static> {
    pub(crate) value: Promise<T>,
    pub(crate) rank: Rank,
    pub(crate) next: SharedLink<T>,
}

impl<T: Value> Element<T> {
    /// Final element of a sequence.
    pub(crate) fn terminal(value: T, rank: Rank) -> Arc<Self> {
        Arc::new(Self {
            value: Promise::ready(value),
            rank,
            next: empty_link(),
        })
    }

    /// Element with an already-built successor.
    pub(crate) fn cons(value: T, rank: Rank, next: Arc<Element<T>>) -> Arc<Self> {
        Arc::new(Self {
            value: Promise::ready(value),
            rank,
            next: ready_link(next),
        })
    }

    /// Element whose successor is produced on demand. The successor cell
    /// inherits this element's rank as its bound, which is exactly the
    /// rank-order contract.
    pub(crate) fn lazy_cons<F>(value: T, rank: Rank, next: F) -> Arc<Self>
    where
        F: FnOnce() -> Result<Option<Arc<Element<T>>>, RankingError> + Send + 'static,
    {
        Arc::new(Self {
            value: Promise::ready(value),
            rank,
            next: lazy_link(rank, next),
        })
    }

    /// New element at a different rank, sharing this element's value and
    /// deferring to a new tail. The value promise forwards to the source
    /// element, so the underlying computation still runs at most once no
    /// matter how many derived elements force it.
    pub(crate) fn re_rank<F>(self: Arc<Self>, rank: Rank, next: F) -> Arc<Element<T>>
    where
        F: FnOnce() -> Result<Option<Arc<Element<T>>>, RankingError> + Send + 'static,
    {
        Arc::new(Element {
            value: Promise::new(move || self.value.force().cloned()),
            rank,
            next: lazy_link(rank, next),
        })
    }

    /// New element sharing this element's value and rank, with a new tail.
    pub(crate) fn with_tail<F>(self: Arc<Self>, next: F) -> Arc<Element<T>>
    where
        F: FnOnce() -> Result<Option<Arc<Element<T>>>, RankingError> + Send + 'static,
    {
        let rank = self.rank;
        self.re_rank(rank, next)
    }
}

/// The end of a sequence. Its bound is ∞: no element at any rank will
/// ever come out of it.
pub(crate) fn empty_link<T: Value>() -> SharedLink<T> {
    Arc::new(Link {
        bound: Rank::INFINITY,
        cell: Promise::ready(None),
    })
}

/// A cell that already holds its element.
pub(crate) fn ready_link<T: Value>(element: Arc<Element<T>>) -> SharedLink<T> {
    Arc::new(Link {
        bound: element.rank,
        cell: Promise::ready(Some(element)),
    })
}

/// A cell that builds its element on first force. `bound` must be a true
/// lower bound on the first produced rank; use [`Rank::ZERO`] when
/// nothing better is known.
pub(crate) fn lazy_link<T, F>(bound: Rank, thunk: F) -> SharedLink<T>
where
    T: Value,
    F: FnOnce() -> Result<Option<Arc<Element<T>>>, RankingError> + Send + 'static,
{
    Arc::new(Link {
        bound,
        cell: Promise::new(thunk),
    })
}

/// Materializes one element of an index-parameterized sequence.
///
/// The successor thunk re-enters with `index + 1`, so each generator call
/// happens only when traversal demands the corresponding element. The
/// generator must produce non-decreasing ranks; a debug assertion checks
/// each consecutive pair as it materializes.
pub(crate) fn infinite_sequence<T: Value>(
    gen: &Arc<Generator<T>>,
    index: usize,
) -> Result<Option<Arc<Element<T>>>, RankingError> {
    match gen(index) {
        None => Ok(None),
        Some((value, rank)) => {
            let tail_gen = Arc::clone(gen);
            Ok(Some(Element::lazy_cons(value, rank, move || {
                let next = infinite_sequence(&tail_gen, index + 1)?;
                if let Some(element) = &next {
                    debug_assert_generator_order!(rank, element.rank, index + 1);
                }
                Ok(next)
            })))
        }
    }
}
