//! Debug assertion macros for the rank-order contracts.
//!
//! Constructors that accept pre-ranked input trust the caller to hand over
//! a rank-sorted sequence; these macros catch violations in debug builds.
//! They compile to nothing in release builds.

/// Assert that a materialized pair list is already sorted by rank.
///
/// Used in: `from_list`, `from_pair_range`, `from_values_with_ranker`.
macro_rules! debug_assert_rank_sorted {
    ($pairs:expr) => {
        debug_assert!(
            $pairs.windows(2).all(|window| window[0].1 <= window[1].1),
            "rank order violated: constructor input is not sorted by rank"
        )
    };
}

/// Assert that a generator's ranks are non-decreasing in the index.
///
/// Used in: `infinite_sequence` when the successor element materializes.
macro_rules! debug_assert_generator_order {
    ($prev:expr, $next:expr, $index:expr) => {
        debug_assert!(
            $prev <= $next,
            "rank order violated: generator rank decreased from {} to {} at index {}",
            $prev,
            $next,
            $index
        )
    };
}

pub(crate) use debug_assert_generator_order;
pub(crate) use debug_assert_rank_sorted;
