use clap::Parser;
use coinflip_puzzle::engine::{Sequence, Token, DEFAULT_LENGTH};
use coinflip_puzzle::solver::{min_moves, Strategy};
use std::collections::HashMap;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compare both auto-solvers over seeded random sequences", long_about = None)]
struct Args {
    /// Number of random sequences to evaluate
    #[clap(short, long, default_value_t = 20)]
    count: u64,

    /// Coins per sequence
    #[clap(short, long, default_value_t = DEFAULT_LENGTH)]
    length: usize,

    /// First seed; sequence k uses seed `start_seed + k`
    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    /// Goal face (heads or tails)
    #[clap(short, long, default_value = "heads")]
    goal: Token,
}

/// `true` when seeds `start_seed .. start_seed + count` all fit in a `u64`.
fn seed_range_fits(start_seed: u64, count: u64) -> bool {
    count == 0 || start_seed.checked_add(count - 1).is_some()
}

/// `true` when every strategy finished on the same sequence.
fn strategies_agree(finals: &[Sequence]) -> bool {
    finals.windows(2).all(|pair| pair[0] == pair[1])
}

#[derive(Default)]
struct Totals {
    moves: u64,
    swaps: u64,
    steps: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(count = args.count, length = args.length, goal = %args.goal, "starting evaluation");

    if !seed_range_fits(args.start_seed, args.count) {
        error!(
            start_seed = args.start_seed,
            count = args.count,
            "seed range overflows u64"
        );
        return ExitCode::FAILURE;
    }

    let mut totals: HashMap<Strategy, Totals> = HashMap::new();
    let mut total_min_moves = 0u64;
    let mut failures = 0u64;
    let mut disagreements = 0u64;

    for offset in 0..args.count {
        // Range checked above.
        let seed = args.start_seed.wrapping_add(offset);
        let initial = match Sequence::new_random_with_seed(args.length, seed) {
            Ok(sequence) => sequence,
            Err(e) => {
                error!(%e, "cannot build sequence");
                return ExitCode::FAILURE;
            }
        };
        let optimum = min_moves(&initial, args.goal);
        total_min_moves += u64::from(optimum);
        println!(
            "\nSequence {} (Seed: {}): {}  min moves {}",
            offset,
            seed,
            initial.to_compact_string(),
            optimum
        );

        let mut finals = Vec::with_capacity(Strategy::ALL.len());
        for strategy in Strategy::ALL {
            let mut sequence = initial.clone();
            let solution = strategy.solve(&mut sequence, args.goal);
            let solved = sequence.all_equal(args.goal);
            if !solved {
                failures += 1;
                error!(%strategy, seed, "strategy did not reach the goal");
            }
            println!(
                "  Strategy: {:<20}, Moves: {:<3}, Swaps: {:<3}, Solved: {}",
                strategy,
                solution.moves,
                solution.swaps(),
                solved
            );
            let entry = totals.entry(strategy).or_default();
            entry.moves += u64::from(solution.moves);
            entry.swaps += solution.swaps() as u64;
            entry.steps += solution.steps.len() as u64;
            finals.push(sequence);
        }

        let agree = strategies_agree(&finals);
        if !agree {
            disagreements += 1;
            error!(seed, "strategies finished on different sequences");
        }
        println!("  Strategies agree: {}", agree);
    }

    println!("\n--- Evaluation Complete ---");
    println!("Sequences evaluated: {}", args.count);
    println!("Disagreements: {}", disagreements);
    if args.count > 0 {
        let n = args.count as f64;
        println!("Average minimum moves: {:.2}", total_min_moves as f64 / n);
        for strategy in Strategy::ALL {
            if let Some(t) = totals.get(&strategy) {
                println!(
                    "Strategy {:<20}: Avg moves = {:.2}, Avg swaps = {:.2}, Avg steps = {:.2}",
                    strategy,
                    t.moves as f64 / n,
                    t.swaps as f64 / n,
                    t.steps as f64 / n
                );
            }
        }
    }

    if failures > 0 || disagreements > 0 {
        error!(failures, disagreements, "evaluation found faulty solves");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
