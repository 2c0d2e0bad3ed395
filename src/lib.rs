//! # Coin-Flip Puzzle Library
//!
//! This library provides the game logic for a single-player coin-flip puzzle:
//! a row of coins showing heads or tails must be turned to a chosen goal face
//! within a limited number of moves. A move flips the run of identical coins
//! that starts at the chosen position and extends to the right.
//!
//! It is used by three binaries:
//! - `human_player`: Allows interactive gameplay via the command line.
//! - `ai_solver`: Takes a sequence and a strategy, then prints the steps the
//!   solver performs.
//! - `strategy_evaluator`: Runs both solvers over many seeded random
//!   sequences and compares them against the minimum move count.
//!
//! ## Modules
//! - `engine`: Contains the token type (`Token`), the row of coins (`Sequence`),
//!   the win/loss rule (`check_status`) and session management (`Game`).
//! - `solver`: Provides `min_moves` and the two auto-solve strategies.
//! - `error`: Defines `GameError`, returned by every rejected command.
//! - `utils`: Provides utility functions, such as parsing sequences from strings.

pub mod engine;
pub mod error;
pub mod solver;
pub mod utils;
