//! Minimum-move calculation and the two deterministic auto-solvers.
use crate::engine::{Sequence, Token};
use crate::error::GameError;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, instrument};

/// One intermediate mutation performed by a solver, in the order applied.
///
/// A front end can replay these to animate a solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveStep {
    /// Every position in the range was set to the goal.
    Collapse(Range<usize>),
    /// The tokens at the two positions were exchanged.
    Swap(usize, usize),
}

/// Represents a solution found by a solver.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Strategy that produced this solution.
    pub strategy: Strategy,
    /// Mutations in the order they were applied.
    pub steps: Vec<SolveStep>,
    /// Logical moves spent, one per collapsed block.
    pub moves: u32,
    /// The sequence once solved; every token equals the goal.
    pub final_sequence: Sequence,
}

impl Solution {
    /// Number of swaps in the trace.
    pub fn swaps(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, SolveStep::Swap(..)))
            .count()
    }
}

/// The available auto-solve strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Strategy A: collapse each maximal non-goal run in place.
    RunCollapse,
    /// Strategy B: partition goal tokens to the front, then flip the tail block.
    PartitionThenFlip,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::RunCollapse, Strategy::PartitionThenFlip];

    /// Runs this strategy on `sequence`, leaving every token equal to `goal`.
    pub fn solve(self, sequence: &mut Sequence, goal: Token) -> Solution {
        match self {
            Strategy::RunCollapse => solve_run_collapse(sequence, goal),
            Strategy::PartitionThenFlip => solve_partition_then_flip(sequence, goal),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::RunCollapse => write!(f, "run-collapse"),
            Strategy::PartitionThenFlip => write!(f, "partition-then-flip"),
        }
    }
}

impl FromStr for Strategy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "1" | "run-collapse" => Ok(Strategy::RunCollapse),
            "b" | "2" | "partition-then-flip" | "partition" => Ok(Strategy::PartitionThenFlip),
            _ => Err(GameError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Finds the first maximal non-goal run at or after `from`, sets it to
/// `goal`, and returns its range. Goal runs on the way are skipped untouched.
fn collapse_next_run(tokens: &mut [Token], goal: Token, mut from: usize) -> Option<Range<usize>> {
    while from < tokens.len() {
        if tokens[from] != goal {
            let start = from;
            while from < tokens.len() && tokens[from] != goal {
                tokens[from] = goal;
                from += 1;
            }
            return Some(start..from);
        }
        while from < tokens.len() && tokens[from] == goal {
            from += 1;
        }
    }
    None
}

/// Computes the fewest flips needed to make every token equal `goal`.
///
/// Works on a scratch copy: each maximal non-goal run is consumed and counted
/// once, so the result is the number of such runs. The budget plays no part.
///
/// # Examples
/// ```
/// use coinflip_puzzle::engine::Token;
/// use coinflip_puzzle::solver::min_moves;
/// use coinflip_puzzle::utils::sequence_from_str;
///
/// let seq = sequence_from_str("HHTTTH").unwrap();
/// assert_eq!(min_moves(&seq, Token::Heads), 1);
/// assert_eq!(min_moves(&seq, Token::Tails), 2);
/// ```
pub fn min_moves(sequence: &Sequence, goal: Token) -> u32 {
    let mut scratch = sequence.tokens().to_vec();
    let mut moves = 0;
    let mut cursor = 0;
    while let Some(run) = collapse_next_run(&mut scratch, goal, cursor) {
        moves += 1;
        cursor = run.end;
    }
    moves
}

/// Strategy A: walks left to right and sets each maximal non-goal run to
/// `goal`, one logical move per run. Spends exactly `min_moves` moves.
#[instrument(skip(sequence), fields(sequence = %sequence.to_compact_string()))]
pub fn solve_run_collapse(sequence: &mut Sequence, goal: Token) -> Solution {
    let mut steps = Vec::new();
    let mut cursor = 0;
    while let Some(run) = collapse_next_run(sequence.tokens_mut(), goal, cursor) {
        debug!(?run, "collapsed run");
        cursor = run.end;
        steps.push(SolveStep::Collapse(run));
    }
    Solution {
        strategy: Strategy::RunCollapse,
        moves: steps.len() as u32,
        steps,
        final_sequence: sequence.clone(),
    }
}

/// Strategy B: partitions, then flips.
///
/// A two-pointer pass keeps goal tokens at the front by swapping every
/// non-goal token it meets with the back of the unexplored region. Once the
/// pointers meet, the collected non-goal block at the back is set to `goal`
/// in a single logical move. Relative order among swapped tokens is not kept.
#[instrument(skip(sequence), fields(sequence = %sequence.to_compact_string()))]
pub fn solve_partition_then_flip(sequence: &mut Sequence, goal: Token) -> Solution {
    let tokens = sequence.tokens_mut();
    let mut steps = Vec::new();

    // `boundary` is one past the last unexplored position; everything from
    // it onwards is known to be non-goal.
    let mut front = 0;
    let mut boundary = tokens.len();
    while front < boundary {
        if tokens[front] == goal {
            front += 1;
        } else {
            boundary -= 1;
            if front != boundary {
                tokens.swap(front, boundary);
                steps.push(SolveStep::Swap(front, boundary));
            }
        }
    }
    debug!(boundary, swaps = steps.len(), "partitioned");

    let len = tokens.len();
    let mut moves = 0;
    if boundary < len {
        for token in &mut tokens[boundary..] {
            *token = goal;
        }
        steps.push(SolveStep::Collapse(boundary..len));
        moves = 1;
    }

    Solution {
        strategy: Strategy::PartitionThenFlip,
        steps,
        moves,
        final_sequence: sequence.clone(),
    }
}
