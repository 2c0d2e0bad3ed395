use clap::Parser;
use coinflip_puzzle::engine::{Game, GameConfig, Status, Token, DEFAULT_LENGTH};
use coinflip_puzzle::solver::Strategy;
use std::io::{self, Write};
use std::ops::Range;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play the coin-flip puzzle in the terminal", long_about = None)]
struct Args {
    /// Number of coins in the row
    #[clap(short, long, default_value_t = DEFAULT_LENGTH)]
    length: usize,

    /// Moves per game (defaults to one per coin)
    #[clap(short, long)]
    budget: Option<u32>,

    /// Face every coin must show to win (heads or tails)
    #[clap(short, long, default_value = "heads")]
    goal: Token,

    /// Seed for reproducible games
    #[clap(short, long)]
    seed: Option<u64>,
}

const HELP: &str = "Commands: 'f i' flip from i, 'm from to' move a coin, 'g h|t' set goal, \
'a a|b' auto-solve, 'n' new game, 'q' quit";

fn print_state(game: &Game, highlight: Option<Range<usize>>) {
    println!("---------------------");
    println!(
        "Goal: {}, Moves left: {}, Minimum moves: {}",
        game.goal(),
        game.budget(),
        game.min_moves()
    );
    println!("{}", game.sequence().to_string_with_highlight(highlight));
}

fn announce_end(game: &Game) {
    println!();
    println!("---------------------");
    match game.status() {
        Status::Won => println!("🎉 Congratulations! You solved the puzzle!"),
        Status::Lost => println!("💥 You lost! Try again."),
        Status::Playing => return,
    }
    println!("Enter 'n' to play again or 'q' to quit.");
    println!("---------------------");
}

fn parse_index(part: Option<&str>) -> Option<usize> {
    part.and_then(|p| p.parse::<usize>().ok())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = GameConfig {
        length: args.length,
        budget: args.budget,
        goal: args.goal,
        seed: args.seed,
    };
    let mut game = match Game::with_config(config) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Cannot start a game: {}", e);
            std::process::exit(2);
        }
    };

    println!("Welcome to the coin-flip puzzle!");
    let config = game.config();
    println!(
        "{} coins, {} moves per game{}",
        config.length,
        config.starting_budget(),
        config
            .seed
            .map_or(String::new(), |seed| format!(", seed {}", seed))
    );
    println!("{}", HELP);
    print_state(&game, None);

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        let mut parts = input.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "n" => {
                game.new_game();
                print_state(&game, None);
            }
            "g" => match parts.next().map(str::parse::<Token>) {
                Some(Ok(goal)) => {
                    game.set_goal(goal);
                    print_state(&game, None);
                }
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: g h|t"),
            },
            "f" => match parse_index(parts.next()) {
                Some(index) => match game.flip(index) {
                    Ok(report) => {
                        print_state(&game, Some(report.flipped));
                        announce_end(&game);
                    }
                    Err(e) => println!("Move rejected: {}", e),
                },
                None => println!("Usage: f <index>"),
            },
            "m" => match (parse_index(parts.next()), parse_index(parts.next())) {
                (Some(from), Some(to)) => match game.reorder(from, to) {
                    Ok(_) => {
                        print_state(&game, Some(to..to + 1));
                        announce_end(&game);
                    }
                    Err(e) => println!("Move rejected: {}", e),
                },
                _ => println!("Usage: m <from> <to>"),
            },
            "a" => {
                let strategy = parts
                    .next()
                    .unwrap_or("a")
                    .parse::<Strategy>();
                match strategy {
                    Ok(strategy) => match game.auto_solve(strategy) {
                        Ok((solution, _)) => {
                            println!(
                                "Solved with {} in {} step(s) ({} swap(s)).",
                                solution.strategy,
                                solution.steps.len(),
                                solution.swaps()
                            );
                            print_state(&game, None);
                            announce_end(&game);
                        }
                        Err(e) => println!("Cannot auto-solve: {}", e),
                    },
                    Err(e) => println!("{}", e),
                }
            }
            _ => println!("{}", HELP),
        }
    }
}
