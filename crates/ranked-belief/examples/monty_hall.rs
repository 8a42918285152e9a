//! The Monty Hall problem as ranked belief revision.
//!
//! Prize and pick are uniformly normal; the host's door opening is
//! unsurprising when forced and surprising to degree 1 when the host has
//! a free choice. Conditioning on the opened door shows that switching
//! wins in the most normal surviving worlds.

use ranked_belief_rs::{Rank, Ranking};

/// (prize, pick, opened)
type World = (u8, u8, u8);

fn worlds() -> Ranking<World> {
    let doors = || Ranking::from_values_uniform(vec![0_u8, 1, 2], Rank::ZERO);

    let states = doors().merge_apply(move |prize| {
        let prize = *prize;
        doors().map(move |pick| (prize, *pick))
    });

    states.merge_apply(|&(prize, pick)| {
        let options: Vec<World> = (0..3)
            .filter(|door| *door != prize && *door != pick)
            .map(|door| (prize, pick, door))
            .collect();
        let surprise = if options.len() == 1 {
            Rank::ZERO
        } else {
            Rank::from_value(1).unwrap()
        };
        Ranking::from_values_uniform(options, surprise)
    })
}

fn main() {
    let observed = worlds().observe(|&(_, _, opened)| opened == 1);

    println!("worlds after the host opens door 1 (value @ rank):");
    for pair in observed.iter_all() {
        let ((prize, pick, opened), rank) = pair.expect("static world model");
        println!("  prize={prize} pick={pick} opened={opened} @ {rank}");
    }

    let stay = observed
        .filter(|&(prize, pick, _)| pick == prize)
        .most_normal()
        .expect("static world model");
    let switch = observed
        .filter(|&(prize, pick, _)| pick != prize)
        .most_normal()
        .expect("static world model");

    println!("most normal stay-wins world:   {stay:?}");
    println!("most normal switch-wins world: {switch:?}");
    println!("switching is the less surprising way to win.");
}
