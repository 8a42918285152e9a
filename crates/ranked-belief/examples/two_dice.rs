//! Two fair dice, combined through the lifted `+` operator.
//!
//! Every face is equally normal (rank 0), so all 36 pair sums come out at
//! rank 0; the interesting part is that the full grid is enumerated by
//! the bind underneath the operator, lazily.

use ranked_belief_rs::{Rank, Ranking};

fn main() {
    let die = || Ranking::from_values_uniform((1_u32..=6).collect(), Rank::ZERO);

    let sums = die() + die();

    let mut counts = [0_usize; 13];
    for pair in sums.iter_all() {
        let (sum, _) = pair.expect("finite dice grid");
        counts[sum as usize] += 1;
    }

    println!("sum: ways");
    for (sum, count) in counts.iter().enumerate().filter(|(_, c)| **c > 0) {
        println!("{sum:>4}: {count}");
    }

    // Conditioning on a die showing doubles-or-better total.
    let high = (die() + die()).observe(|sum| *sum >= 10);
    println!(
        "most normal total once we learn the roll is at least 10: {:?}",
        high.most_normal().expect("finite dice grid")
    );
}
