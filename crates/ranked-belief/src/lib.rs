//! Ranked belief computation over lazy, memoized sequences.
//!
//! Uncertainty is encoded as non-negative integer *ranks* rather than
//! probabilities: rank 0 is maximally normal, higher finite ranks are
//! increasingly surprising, and ∞ marks the impossible. A [`Ranking`] is a
//! conceptually infinite, rank-sorted lazy sequence of `(value, rank)`
//! pairs, composed through a small algebra (`map`, `filter`, `merge`,
//! `merge_apply` as monadic bind, `observe` as conditioning, and prefix
//! takers) that shares structure between inputs and outputs and never
//! forces more elements than a consumer demands.
//!
//! # Key Properties
//!
//! - Every lazy cell is a [`Promise`]: forced at most once across all
//!   threads, with the outcome (value or failure) cached and replayed
//!   identically forever after.
//! - Rank order survives every composition: an iterated ranking never
//!   yields a rank smaller than the one before it.
//! - Rankings are cheap values: cloning is O(1), nothing is ever mutated
//!   in place, and handing a ranking to another thread is safe.
//!
//! # Example
//!
//! ```
//! use ranked_belief_rs::{Rank, Ranking};
//!
//! let weather = Ranking::from_list(vec![
//!     ("clear", Rank::ZERO),
//!     ("rain", Rank::from_value(1).unwrap()),
//!     ("snow", Rank::from_value(4).unwrap()),
//! ]);
//!
//! // Condition on precipitation: the most normal survivor drops to rank 0.
//! let wet = weather.observe(|w| *w != "clear");
//! assert_eq!(wet.most_normal().unwrap(), Some(("rain", Rank::ZERO)));
//!
//! // Belief about tomorrow given today, with surprises adding up.
//! let tomorrow = weather.merge_apply(|today| {
//!     let today = *today;
//!     Ranking::from_list(vec![
//!         (today, Rank::ZERO),
//!         ("change", Rank::from_value(2).unwrap()),
//!     ])
//! });
//! assert_eq!(
//!     tomorrow.most_normal().unwrap(),
//!     Some(("clear", Rank::ZERO))
//! );
//! ```

mod backoff;
mod bind;
mod element;
mod error;
mod invariants;
mod iter;
mod lift;
mod merge;
mod observe;
mod prefix;
mod promise;
mod rank;
mod ranking;
mod transform;

pub use element::Value;
pub use error::{RankOp, RankingError};
pub use iter::{Iter, RawIter};
pub use promise::Promise;
pub use rank::Rank;
pub use ranking::Ranking;
