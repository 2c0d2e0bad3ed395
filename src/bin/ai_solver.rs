use clap::Parser;
use coinflip_puzzle::engine::{Game, Token};
use coinflip_puzzle::error::GameError;
use coinflip_puzzle::solver::{SolveStep, Strategy};
use coinflip_puzzle::utils::sequence_from_str;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Solve a coin-flip puzzle and print the steps", long_about = None)]
struct Args {
    /// Strategy to use: 'a' (run-collapse) or 'b' (partition-then-flip)
    #[clap(short, long, default_value = "a")]
    strategy: Strategy,

    /// Face every coin must show (heads or tails)
    #[clap(short, long, default_value = "heads")]
    goal: Token,

    /// The sequence as H/T characters, e.g. "HHTTTH"
    #[clap(conflicts_with = "file", required_unless_present = "file")]
    sequence: Option<String>,

    /// Read the sequence from a file instead (blank lines are ignored)
    #[clap(short, long)]
    file: Option<PathBuf>,
}

fn read_sequence(args: &Args) -> Result<String, String> {
    if let Some(path) = &args.file {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
        Ok(content.lines().collect::<Vec<_>>().join(""))
    } else {
        Ok(args.sequence.clone().unwrap_or_default())
    }
}

fn run(args: &Args) -> Result<(), String> {
    let text = read_sequence(args)?;
    let sequence =
        sequence_from_str(&text).map_err(|e: GameError| format!("Invalid sequence: {}", e))?;
    let budget = u32::try_from(sequence.len()).unwrap_or(u32::MAX);
    let mut game = Game::from_sequence(sequence, args.goal, budget);

    println!("Initial sequence (goal {}):\n{}\n", game.goal(), game.sequence());
    println!("Minimum moves: {}\n", game.min_moves());

    let (solution, status) = game
        .auto_solve(args.strategy)
        .map_err(|e| format!("Solver refused: {}", e))?;
    info!(strategy = %solution.strategy, steps = solution.steps.len(), "solved");

    println!("Steps ({}):", solution.steps.len());
    if solution.steps.is_empty() {
        println!("  Already solved.");
    }
    for (i, step) in solution.steps.iter().enumerate() {
        match step {
            SolveStep::Collapse(range) => println!(
                "  Step {}: set {}..{} to {}",
                i + 1,
                range.start,
                range.end,
                game.goal()
            ),
            SolveStep::Swap(a, b) => println!("  Step {}: swap {} and {}", i + 1, a, b),
        }
    }
    println!("Logical moves: {}", solution.moves);
    println!("Status: {}\n", status);
    println!("Final sequence:\n{}", solution.final_sequence);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
