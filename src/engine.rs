//! Core game engine for the coin-flip puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Token`: the two faces a coin can show.
//! - `Sequence`: the fixed-length row of tokens, with the run-based flip move
//!   and drag-style reordering.
//! - `Status` / `check_status`: the win/loss state machine.
//! - `Game`: a play-through holding the sequence, goal, remaining budget and
//!   terminal status, and exposing the player commands.
use crate::error::{GameError, InvalidCommand};
use crate::solver::{min_moves, Solution, Strategy};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// One face of a coin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Heads,
    Tails,
}

fn generate_random_token(rng: &mut impl Rng) -> Token {
    if rng.gen_bool(0.5) {
        Token::Heads
    } else {
        Token::Tails
    }
}

impl Token {
    /// Returns the opposite face.
    ///
    /// # Examples
    ///
    /// ```
    /// use coinflip_puzzle::engine::Token;
    /// assert_eq!(Token::Heads.flipped(), Token::Tails);
    /// assert_eq!(Token::Tails.flipped(), Token::Heads);
    /// ```
    pub fn flipped(self) -> Token {
        match self {
            Token::Heads => Token::Tails,
            Token::Tails => Token::Heads,
        }
    }

    /// Converts the token to its character representation, `H` or `T`.
    pub fn to_char(&self) -> char {
        match self {
            Token::Heads => 'H',
            Token::Tails => 'T',
        }
    }

    /// Returns the ANSI color code string for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Token::Heads => "43",
            Token::Tails => "44",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Heads => write!(f, "heads"),
            Token::Tails => write!(f, "tails"),
        }
    }
}

impl FromStr for Token {
    type Err = GameError;

    /// Accepts `h`, `heads`, `t` or `tails`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "heads" => Ok(Token::Heads),
            "t" | "tails" => Ok(Token::Tails),
            _ => Err(GameError::UnknownToken(s.to_string())),
        }
    }
}

/// Number of tokens in a freshly generated sequence unless configured otherwise.
pub const DEFAULT_LENGTH: usize = 10;

/// The row of tokens being played.
///
/// The length is fixed when the sequence is created. Mutations either
/// overwrite tokens in place or permute them (`reorder`), so the length never
/// changes and is never zero.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sequence {
    tokens: Vec<Token>,
}

impl Sequence {
    /// Creates a sequence from the given tokens.
    ///
    /// # Errors
    /// Returns `GameError::EmptySequence` if `tokens` is empty.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, GameError> {
        if tokens.is_empty() {
            return Err(GameError::EmptySequence);
        }
        Ok(Sequence { tokens })
    }

    /// Creates a sequence of `len` tokens, each independently heads or tails
    /// with probability one half.
    ///
    /// # Errors
    /// Returns `GameError::EmptySequence` if `len` is zero.
    pub fn new_random(len: usize, rng: &mut impl Rng) -> Result<Self, GameError> {
        if len == 0 {
            return Err(GameError::EmptySequence);
        }
        Ok(Self::random_unchecked(len, rng))
    }

    /// Creates a reproducible random sequence: the same `seed` always yields
    /// the same tokens.
    pub fn new_random_with_seed(len: usize, seed: u64) -> Result<Self, GameError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new_random(len, &mut rng)
    }

    // Callers guarantee `len > 0`.
    fn random_unchecked(len: usize, rng: &mut impl Rng) -> Self {
        Sequence {
            tokens: (0..len).map(|_| generate_random_token(rng)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// `true` when the sequence holds no tokens, which construction rules out.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns a mutable view of the tokens.
    ///
    /// The slice cannot grow or shrink, so the length invariant holds; the
    /// solvers use this to rewrite tokens in bulk.
    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    fn check_index(&self, index: usize) -> Result<(), GameError> {
        if index < self.tokens.len() {
            Ok(())
        } else {
            Err(GameError::IndexOutOfRange {
                index,
                len: self.tokens.len(),
            })
        }
    }

    /// Returns the token at `index`.
    ///
    /// # Errors
    /// Returns `GameError::IndexOutOfRange` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<Token, GameError> {
        self.check_index(index)?;
        Ok(self.tokens[index])
    }

    /// Overwrites the token at `index`.
    ///
    /// # Errors
    /// Returns `GameError::IndexOutOfRange` if `index >= len()`.
    pub fn set(&mut self, index: usize, token: Token) -> Result<(), GameError> {
        self.check_index(index)?;
        self.tokens[index] = token;
        Ok(())
    }

    /// Removes the token at `from` and reinserts it at `to`, shifting the
    /// tokens in between. `reorder(i, i)` does nothing.
    ///
    /// Both indices are validated before anything moves.
    ///
    /// # Examples
    /// ```
    /// use coinflip_puzzle::utils::sequence_from_str;
    /// let mut seq = sequence_from_str("HTTH").unwrap();
    /// seq.reorder(0, 2).unwrap();
    /// assert_eq!(seq.to_compact_string(), "TTHH");
    /// ```
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), GameError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let token = self.tokens.remove(from);
        self.tokens.insert(to, token);
        Ok(())
    }

    /// `true` iff every token equals `goal`.
    pub fn all_equal(&self, goal: Token) -> bool {
        self.tokens.iter().all(|&t| t == goal)
    }

    /// Returns the exclusive end of the run that starts at `index`.
    ///
    /// The scan only moves forward: the result is the first position at or
    /// after `index` whose token differs from the one at `index`, or `len()`.
    /// Tokens before `index` are never considered, even when they match.
    ///
    /// # Errors
    /// Returns `GameError::IndexOutOfRange` if `index >= len()`.
    pub fn run_end(&self, index: usize) -> Result<usize, GameError> {
        let token = self.get(index)?;
        let run_len = self.tokens[index..]
            .iter()
            .take_while(|&&t| t == token)
            .count();
        Ok(index + run_len)
    }

    /// Lists every maximal run of equal tokens, left to right.
    pub fn runs(&self) -> Vec<(Token, Range<usize>)> {
        let mut runs = Vec::new();
        let mut start = 0;
        while start < self.tokens.len() {
            let token = self.tokens[start];
            let end = start
                + self.tokens[start..]
                    .iter()
                    .take_while(|&&t| t == token)
                    .count();
            runs.push((token, start..end));
            start = end;
        }
        runs
    }

    /// Flips every token in the forward run starting at `index`.
    ///
    /// This is the single move a player has. The run is `index..k` where `k`
    /// is given by [`Sequence::run_end`]. Budget bookkeeping belongs to
    /// [`Game::flip`]; this only rewrites tokens.
    ///
    /// # Returns
    /// The range of positions that were flipped.
    ///
    /// # Examples
    /// ```
    /// use coinflip_puzzle::utils::sequence_from_str;
    /// let mut seq = sequence_from_str("HTTHT").unwrap();
    /// // Only the run to the right of index 1 flips.
    /// assert_eq!(seq.flip_from_index(1).unwrap(), 1..3);
    /// assert_eq!(seq.to_compact_string(), "HHHHT");
    /// ```
    pub fn flip_from_index(&mut self, index: usize) -> Result<Range<usize>, GameError> {
        let end = self.run_end(index)?;
        for token in &mut self.tokens[index..end] {
            *token = token.flipped();
        }
        Ok(index..end)
    }

    /// Renders the tokens as a plain `H`/`T` string.
    pub fn to_compact_string(&self) -> String {
        self.tokens.iter().map(Token::to_char).collect()
    }

    /// Generates a two-line terminal rendering: an index header, then the
    /// tokens on ANSI colored backgrounds. Positions inside `highlight` are
    /// bracketed so a front end can point at the run it just flipped.
    pub fn to_string_with_highlight(&self, highlight: Option<Range<usize>>) -> String {
        let mut output = String::new();

        for idx in 0..self.tokens.len() {
            output.push_str(&format!("{:<3}", idx));
        }
        output.push('\n');

        for (idx, token) in self.tokens.iter().enumerate() {
            let is_highlight = highlight.as_ref().map_or(false, |r| r.contains(&idx));
            let content = if is_highlight {
                format!("[{}]", token.to_char())
            } else {
                format!(" {} ", token.to_char())
            };
            output.push_str(&format!(
                "\x1b[1;{}m{}\x1b[m",
                token.to_ansi_color_code(),
                content
            ));
        }

        output
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// Where a play-through stands. `Won` and `Lost` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Playing,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Playing)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Playing => write!(f, "playing"),
            Status::Won => write!(f, "won"),
            Status::Lost => write!(f, "lost"),
        }
    }
}

/// Evaluates the win/loss rule.
///
/// A uniform sequence wins regardless of budget, so the move that spends the
/// last unit of budget can still win. Otherwise an empty budget loses.
///
/// # Examples
/// ```
/// use coinflip_puzzle::engine::{check_status, Status, Token};
/// use coinflip_puzzle::utils::sequence_from_str;
/// let solved = sequence_from_str("HHH").unwrap();
/// assert_eq!(check_status(&solved, Token::Heads, 0), Status::Won);
/// assert_eq!(check_status(&solved, Token::Tails, 0), Status::Lost);
/// assert_eq!(check_status(&solved, Token::Tails, 1), Status::Playing);
/// ```
pub fn check_status(sequence: &Sequence, goal: Token, budget: u32) -> Status {
    if sequence.all_equal(goal) {
        Status::Won
    } else if budget == 0 {
        Status::Lost
    } else {
        Status::Playing
    }
}

/// Settings for a play-through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of tokens in each generated sequence.
    pub length: usize,
    /// Moves granted per game. `None` grants one move per token.
    pub budget: Option<u32>,
    /// The face every token must show to win.
    pub goal: Token,
    /// Seed for sequence generation. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            length: DEFAULT_LENGTH,
            budget: None,
            goal: Token::Heads,
            seed: None,
        }
    }
}

impl GameConfig {
    /// The budget each new game starts with.
    pub fn starting_budget(&self) -> u32 {
        self.budget
            .unwrap_or_else(|| u32::try_from(self.length).unwrap_or(u32::MAX))
    }
}

/// What a successful flip did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    /// Positions whose tokens were flipped.
    pub flipped: Range<usize>,
    /// Budget left after the move.
    pub budget: u32,
    /// Status after the move.
    pub status: Status,
}

/// A play-through of the puzzle.
///
/// The game exclusively owns its sequence and budget. Every command either
/// applies completely or returns an error and leaves the game untouched.
///
/// # Examples
/// ```
/// use coinflip_puzzle::engine::{Game, Status, Token};
/// use coinflip_puzzle::utils::sequence_from_str;
///
/// let seq = sequence_from_str("HHTTTH").unwrap();
/// let mut game = Game::from_sequence(seq, Token::Heads, 6);
/// assert_eq!(game.min_moves(), 1);
///
/// let report = game.flip(2).unwrap();
/// assert_eq!(report.flipped, 2..5);
/// assert_eq!(report.budget, 5);
/// assert_eq!(report.status, Status::Won);
///
/// // Terminal games only accept a new game.
/// assert!(game.flip(0).is_err());
/// game.new_game();
/// assert_eq!(game.status(), Status::Playing);
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    sequence: Sequence,
    goal: Token,
    budget: u32,
    status: Status,
    config: GameConfig,
    rng: SmallRng,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game with the default configuration: ten random tokens,
    /// ten moves, goal heads.
    pub fn new() -> Self {
        Self::build(GameConfig::default())
    }

    /// Creates a game from an explicit configuration.
    ///
    /// # Errors
    /// - `GameError::EmptySequence` if `config.length` is zero.
    /// - `GameError::ZeroBudget` if `config.budget` is `Some(0)`.
    pub fn with_config(config: GameConfig) -> Result<Self, GameError> {
        if config.length == 0 {
            return Err(GameError::EmptySequence);
        }
        if config.budget == Some(0) {
            return Err(GameError::ZeroBudget);
        }
        Ok(Self::build(config))
    }

    /// Status of a freshly dealt game. A game dealt with no budget is already
    /// over; otherwise play starts even if the row happens to be uniform.
    fn opening_status(sequence: &Sequence, goal: Token, budget: u32) -> Status {
        if budget == 0 {
            check_status(sequence, goal, budget)
        } else {
            Status::Playing
        }
    }

    fn build(config: GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let sequence = Sequence::random_unchecked(config.length, &mut rng);
        let budget = config.starting_budget();
        info!(sequence = %sequence.to_compact_string(), goal = %config.goal, "new game");
        Game {
            status: Self::opening_status(&sequence, config.goal, budget),
            sequence,
            goal: config.goal,
            budget,
            config,
            rng,
        }
    }

    /// Creates a game around a known sequence. Used by tests and by the
    /// one-shot solver, which read their sequence from text.
    ///
    /// A later `new_game` generates random sequences of the same length with
    /// the same budget. With a budget of zero the game starts out finished.
    pub fn from_sequence(sequence: Sequence, goal: Token, budget: u32) -> Self {
        let config = GameConfig {
            length: sequence.len(),
            budget: Some(budget),
            goal,
            seed: None,
        };
        Game {
            status: Self::opening_status(&sequence, goal, budget),
            sequence,
            goal,
            budget,
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn goal(&self) -> Token {
        self.goal
    }

    /// Moves remaining.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Discards the current play-through and starts a fresh one: a newly
    /// randomized sequence and the configured budget. The goal carries over.
    pub fn new_game(&mut self) -> &Sequence {
        self.sequence = Sequence::random_unchecked(self.config.length, &mut self.rng);
        self.budget = self.config.starting_budget();
        self.status = Self::opening_status(&self.sequence, self.goal, self.budget);
        info!(sequence = %self.sequence.to_compact_string(), goal = %self.goal, "new game");
        &self.sequence
    }

    /// Changes the goal. The sequence, budget and status are left alone;
    /// `min_moves` reflects the new goal immediately.
    pub fn set_goal(&mut self, goal: Token) {
        debug!(from = %self.goal, to = %goal, "goal changed");
        self.goal = goal;
    }

    /// Minimum number of flips needed to reach the current goal from the
    /// current sequence, ignoring the budget.
    pub fn min_moves(&self) -> u32 {
        min_moves(&self.sequence, self.goal)
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.status.is_terminal() {
            warn!(status = %self.status, "command rejected: session is over");
            return Err(InvalidCommand::SessionOver(self.status).into());
        }
        Ok(())
    }

    fn refresh_status(&mut self) -> Status {
        self.status = check_status(&self.sequence, self.goal, self.budget);
        if self.status.is_terminal() {
            info!(status = %self.status, budget = self.budget, "game finished");
        }
        self.status
    }

    /// Flips the forward run starting at `index` and spends one move.
    ///
    /// # Errors
    /// - `InvalidCommand::SessionOver` if the game already ended, which
    ///   includes every game whose budget is spent.
    /// - `GameError::IndexOutOfRange` if `index` is outside the sequence.
    ///
    /// In every error case the game is unchanged.
    #[instrument(skip(self), fields(goal = %self.goal, budget = self.budget))]
    pub fn flip(&mut self, index: usize) -> Result<MoveReport, GameError> {
        self.ensure_playing()?;
        let flipped = self.sequence.flip_from_index(index)?;
        self.budget -= 1;
        debug!(
            ?flipped,
            sequence = %self.sequence.to_compact_string(),
            "flipped run"
        );
        let status = self.refresh_status();
        Ok(MoveReport {
            flipped,
            budget: self.budget,
            status,
        })
    }

    /// Moves the token at `from` to `to`. Costs nothing.
    ///
    /// # Errors
    /// - `InvalidCommand::SessionOver` if the game already ended.
    /// - `GameError::IndexOutOfRange` if either index is outside the sequence.
    #[instrument(skip(self))]
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<Status, GameError> {
        self.ensure_playing()?;
        self.sequence.reorder(from, to)?;
        debug!(sequence = %self.sequence.to_compact_string(), "reordered");
        Ok(self.refresh_status())
    }

    /// Solves the puzzle with the chosen strategy. The budget is forced to
    /// zero and the game ends as won.
    ///
    /// # Returns
    /// The solver's step trace and the resulting status.
    ///
    /// # Errors
    /// `InvalidCommand::SessionOver` if the game already ended.
    #[instrument(skip(self), fields(goal = %self.goal))]
    pub fn auto_solve(&mut self, strategy: Strategy) -> Result<(Solution, Status), GameError> {
        self.ensure_playing()?;
        let solution = strategy.solve(&mut self.sequence, self.goal);
        self.budget = 0;
        let status = self.refresh_status();
        Ok((solution, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sequence_from_str;
    use rstest::rstest;

    fn game(s: &str, goal: Token, budget: u32) -> Game {
        Game::from_sequence(sequence_from_str(s).unwrap(), goal, budget)
    }

    #[test]
    fn test_token_flipped_and_chars() {
        assert_eq!(Token::Heads.flipped(), Token::Tails);
        assert_eq!(Token::Tails.flipped().flipped(), Token::Tails);
        assert_eq!(Token::Heads.to_char(), 'H');
        assert_eq!(Token::Tails.to_char(), 'T');
    }

    #[rstest]
    #[case("h", Token::Heads)]
    #[case("Heads", Token::Heads)]
    #[case(" T ", Token::Tails)]
    #[case("TAILS", Token::Tails)]
    fn test_token_from_str(#[case] input: &str, #[case] expected: Token) {
        assert_eq!(input.parse::<Token>().unwrap(), expected);
    }

    #[test]
    fn test_token_from_str_rejects_unknown() {
        assert_eq!(
            "edge".parse::<Token>(),
            Err(GameError::UnknownToken("edge".to_string()))
        );
    }

    #[test]
    fn test_new_random_with_seed_determinism() {
        let a = Sequence::new_random_with_seed(DEFAULT_LENGTH, 7).unwrap();
        let b = Sequence::new_random_with_seed(DEFAULT_LENGTH, 7).unwrap();
        assert_eq!(a, b, "Sequences with the same seed must be identical.");
        assert_eq!(a.len(), DEFAULT_LENGTH);

        let differs = (0..20u64)
            .map(|seed| Sequence::new_random_with_seed(DEFAULT_LENGTH, seed).unwrap())
            .any(|s| s != a);
        assert!(differs, "Different seeds should produce different sequences.");
    }

    #[test]
    fn test_new_random_rejects_zero_length() {
        assert_eq!(
            Sequence::new_random_with_seed(0, 1),
            Err(GameError::EmptySequence)
        );
        assert_eq!(Sequence::from_tokens(vec![]), Err(GameError::EmptySequence));
    }

    #[test]
    fn test_get_and_set() {
        let mut seq = sequence_from_str("HT").unwrap();
        assert_eq!(seq.get(1), Ok(Token::Tails));
        seq.set(1, Token::Heads).unwrap();
        assert_eq!(seq.get(1), Ok(Token::Heads));
        assert_eq!(
            seq.get(2),
            Err(GameError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(seq.set(5, Token::Tails).is_err());
        assert_eq!(seq.to_compact_string(), "HH");
    }

    #[rstest]
    #[case("HTTH", 0, 3, "TTHH")]
    #[case("HTTH", 3, 0, "HHTT")]
    #[case("HTHT", 1, 2, "HHTT")]
    #[case("HTHT", 2, 2, "HTHT")]
    fn test_reorder(
        #[case] start: &str,
        #[case] from: usize,
        #[case] to: usize,
        #[case] expected: &str,
    ) {
        let mut seq = sequence_from_str(start).unwrap();
        seq.reorder(from, to).unwrap();
        assert_eq!(seq.to_compact_string(), expected);
    }

    #[test]
    fn test_reorder_out_of_range_leaves_sequence() {
        let mut seq = sequence_from_str("HTT").unwrap();
        assert!(seq.reorder(0, 3).is_err());
        assert!(seq.reorder(3, 3).is_err());
        assert_eq!(seq.to_compact_string(), "HTT");
    }

    #[test]
    fn test_reorder_preserves_length_and_counts() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..200 {
            let mut seq = Sequence::new_random(12, &mut rng).unwrap();
            let mut before = seq.tokens().to_vec();
            let from = rng.gen_range(0..12);
            let to = rng.gen_range(0..12);
            seq.reorder(from, to).unwrap();
            assert_eq!(seq.len(), 12);
            let mut after = seq.tokens().to_vec();
            before.sort_by_key(|t| t.to_char());
            after.sort_by_key(|t| t.to_char());
            assert_eq!(after, before);
        }
    }

    #[test]
    fn test_all_equal() {
        let seq = sequence_from_str("TTT").unwrap();
        assert!(seq.all_equal(Token::Tails));
        assert!(!seq.all_equal(Token::Heads));
    }

    #[test]
    fn test_run_end_scans_forward_only() {
        let seq = sequence_from_str("TTTHHT").unwrap();
        assert_eq!(seq.run_end(0), Ok(3));
        assert_eq!(seq.run_end(1), Ok(3));
        assert_eq!(seq.run_end(3), Ok(5));
        assert_eq!(seq.run_end(5), Ok(6));
    }

    #[test]
    fn test_runs() {
        let seq = sequence_from_str("HHTTTH").unwrap();
        assert_eq!(
            seq.runs(),
            vec![
                (Token::Heads, 0..2),
                (Token::Tails, 2..5),
                (Token::Heads, 5..6),
            ]
        );
    }

    #[test]
    fn test_flip_from_index_mid_run() {
        // Starting inside a run flips only from that index onwards.
        let mut seq = sequence_from_str("TTTH").unwrap();
        assert_eq!(seq.flip_from_index(1), Ok(1..3));
        assert_eq!(seq.to_compact_string(), "THHH");
    }

    #[test]
    fn test_flip_from_index_out_of_range() {
        let mut seq = sequence_from_str("TH").unwrap();
        assert!(seq.flip_from_index(2).is_err());
        assert_eq!(seq.to_compact_string(), "TH");
    }

    #[test]
    fn test_display_sequence_formatting() {
        let seq = sequence_from_str("HTHTHTHTHT").unwrap();
        let display_str = format!("{}", seq);
        println!("---Sequence Display Test:\n{}---", display_str);
        assert!(display_str.starts_with("0  1  2  3  4  5  6  7  8  9  \n"));
        assert_eq!(display_str.lines().count(), 2);
        assert!(display_str.contains(" H "));
        assert!(!display_str.contains("[H]"));

        let highlighted = seq.to_string_with_highlight(Some(0..1));
        assert!(highlighted.contains("[H]"));
        assert!(!highlighted.contains("[T]"));
    }

    #[test]
    fn test_check_status_win_takes_precedence() {
        let seq = sequence_from_str("HHHH").unwrap();
        assert_eq!(check_status(&seq, Token::Heads, 0), Status::Won);
        let seq = sequence_from_str("HHTH").unwrap();
        assert_eq!(check_status(&seq, Token::Heads, 0), Status::Lost);
        assert_eq!(check_status(&seq, Token::Heads, 3), Status::Playing);
    }

    #[test]
    fn test_game_new_defaults() {
        let game = Game::new();
        assert_eq!(game.sequence().len(), DEFAULT_LENGTH);
        assert_eq!(game.budget(), DEFAULT_LENGTH as u32);
        assert_eq!(game.goal(), Token::Heads);
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn test_game_with_config_seeded_is_reproducible() {
        let config = GameConfig {
            length: 16,
            budget: Some(4),
            goal: Token::Tails,
            seed: Some(2024),
        };
        let mut a = Game::with_config(config.clone()).unwrap();
        let mut b = Game::with_config(config).unwrap();
        assert_eq!(a.sequence(), b.sequence());
        assert_eq!(a.budget(), 4);
        assert_eq!(a.goal(), Token::Tails);
        assert_eq!(a.new_game(), b.new_game());
    }

    #[test]
    fn test_game_with_config_rejects_zero_length() {
        let config = GameConfig {
            length: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            Game::with_config(config),
            Err(GameError::EmptySequence)
        ));
    }

    #[test]
    fn test_flip_wins_example() {
        let mut game = game("HHTTTH", Token::Heads, 6);
        let report = game.flip(2).unwrap();
        assert_eq!(report.flipped, 2..5);
        assert_eq!(game.sequence().to_compact_string(), "HHHHHH");
        assert_eq!(report.budget, 5);
        assert_eq!(report.status, Status::Won);
        assert_eq!(game.status(), Status::Won);
    }

    #[test]
    fn test_flip_last_move_loses() {
        let mut game = game("HTHT", Token::Heads, 1);
        let report = game.flip(1).unwrap();
        assert_eq!(report.flipped, 1..2);
        assert_eq!(game.sequence().to_compact_string(), "HHHT");
        assert_eq!(report.budget, 0);
        assert_eq!(report.status, Status::Lost);
    }

    #[test]
    fn test_flip_last_move_can_still_win() {
        let mut game = game("HHT", Token::Heads, 1);
        let report = game.flip(2).unwrap();
        assert_eq!(report.budget, 0);
        assert_eq!(report.status, Status::Won);
    }

    #[test]
    fn test_flip_decrements_budget_by_one_per_run() {
        let mut game = game("TTTTHT", Token::Heads, 5);
        let report = game.flip(0).unwrap();
        assert_eq!(report.flipped.len(), 4);
        assert_eq!(game.budget(), 4);
        assert_eq!(game.sequence().to_compact_string(), "HHHHHT");
    }

    #[test]
    fn test_flip_with_zero_budget_is_rejected() {
        let mut game = game("HTHT", Token::Heads, 0);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(
            game.flip(1),
            Err(GameError::InvalidCommand(InvalidCommand::SessionOver(
                Status::Lost
            )))
        );
        assert_eq!(game.sequence().to_compact_string(), "HTHT");
        assert_eq!(game.budget(), 0);
        assert_eq!(game.status(), Status::Lost);
    }

    #[test]
    fn test_zero_budget_game_starts_finished() {
        let won = game("TTT", Token::Tails, 0);
        assert_eq!(won.status(), Status::Won);

        let mut lost = game("TTH", Token::Tails, 0);
        assert_eq!(lost.status(), Status::Lost);
        // Dealing again keeps the zero budget, so the new game is over too.
        lost.new_game();
        assert!(lost.status().is_terminal());
        assert_eq!(lost.budget(), 0);
    }

    #[test]
    fn test_with_config_rejects_zero_budget() {
        let config = GameConfig {
            length: 6,
            budget: Some(0),
            seed: Some(3),
            ..GameConfig::default()
        };
        assert!(matches!(
            Game::with_config(config),
            Err(GameError::ZeroBudget)
        ));
    }

    #[test]
    fn test_flip_spends_one_move_per_run_on_random_sequences() {
        let mut rng = SmallRng::seed_from_u64(314);
        for _ in 0..300 {
            let len = rng.gen_range(1..=16);
            let seq = Sequence::new_random(len, &mut rng).unwrap();
            let budget = rng.gen_range(1..=len as u32);
            let index = rng.gen_range(0..len);
            let expected_end = seq.run_end(index).unwrap();

            let mut game = Game::from_sequence(seq.clone(), Token::Heads, budget);
            let report = game.flip(index).unwrap();

            assert_eq!(report.flipped, index..expected_end);
            assert_eq!(report.flipped.len(), expected_end - index);
            assert_eq!(game.budget(), budget - 1);
            assert_eq!(report.budget, budget - 1);
            let after = game.sequence().tokens();
            for (pos, (&old, &new)) in seq.tokens().iter().zip(after).enumerate() {
                if report.flipped.contains(&pos) {
                    assert_eq!(new, old.flipped(), "position {} should flip", pos);
                } else {
                    assert_eq!(new, old, "position {} should be untouched", pos);
                }
            }
        }
    }

    #[test]
    fn test_flip_out_of_range_is_rejected() {
        let mut game = game("HTHT", Token::Heads, 3);
        assert_eq!(
            game.flip(4),
            Err(GameError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(game.budget(), 3);
        assert_eq!(game.sequence().to_compact_string(), "HTHT");
    }

    #[test]
    fn test_commands_rejected_after_terminal() {
        let mut game = game("HT", Token::Heads, 1);
        game.flip(0).unwrap(); // "TT", budget 0, lost
        assert_eq!(game.status(), Status::Lost);

        let over = GameError::InvalidCommand(InvalidCommand::SessionOver(Status::Lost));
        assert_eq!(game.flip(0), Err(over.clone()));
        assert_eq!(game.reorder(0, 1), Err(over.clone()));
        assert!(matches!(
            game.auto_solve(Strategy::RunCollapse),
            Err(GameError::InvalidCommand(InvalidCommand::SessionOver(Status::Lost)))
        ));
        assert_eq!(game.sequence().to_compact_string(), "TT");
    }

    #[test]
    fn test_reorder_costs_nothing() {
        let mut game = game("HTTH", Token::Heads, 2);
        assert_eq!(game.reorder(3, 1), Ok(Status::Playing));
        assert_eq!(game.sequence().to_compact_string(), "HHTT");
        assert_eq!(game.budget(), 2);
        assert_eq!(game.min_moves(), 1);
    }

    #[test]
    fn test_reorder_after_goal_change_can_win() {
        let mut game = game("TTT", Token::Heads, 3);
        game.set_goal(Token::Tails);
        // Goal changes never evaluate status by themselves.
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.reorder(0, 0), Ok(Status::Won));
    }

    #[test]
    fn test_set_goal_refreshes_min_moves() {
        let mut game = game("HTTHHT", Token::Heads, 6);
        assert_eq!(game.min_moves(), 2);
        game.set_goal(Token::Tails);
        assert_eq!(game.min_moves(), 2);
        game.flip(3).unwrap(); // HTTTTT
        assert_eq!(game.min_moves(), 1);
        game.set_goal(Token::Heads);
        assert_eq!(game.min_moves(), 1);
        assert_eq!(game.min_moves(), game.min_moves());
    }

    #[rstest]
    #[case(Strategy::RunCollapse)]
    #[case(Strategy::PartitionThenFlip)]
    fn test_auto_solve_forces_budget_and_wins(#[case] strategy: Strategy) {
        let mut game = game("THTTHHT", Token::Heads, 7);
        let (solution, status) = game.auto_solve(strategy).unwrap();
        assert_eq!(status, Status::Won);
        assert_eq!(game.status(), Status::Won);
        assert_eq!(game.budget(), 0);
        assert!(game.sequence().all_equal(Token::Heads));
        assert_eq!(&solution.final_sequence, game.sequence());
    }

    #[test]
    fn test_auto_solve_rejected_once_budget_is_spent() {
        let mut game = game("TH", Token::Heads, 0);
        assert!(matches!(
            game.auto_solve(Strategy::PartitionThenFlip),
            Err(GameError::InvalidCommand(InvalidCommand::SessionOver(Status::Lost)))
        ));
        assert_eq!(game.sequence().to_compact_string(), "TH");
    }

    #[test]
    fn test_new_game_resets_session() {
        let mut game = game("HT", Token::Tails, 1);
        game.flip(0).unwrap(); // TT, won
        assert_eq!(game.status(), Status::Won);

        let len = game.new_game().len();
        assert_eq!(len, 2);
        assert_eq!(game.budget(), 1);
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.goal(), Token::Tails);
        assert!(game.flip(0).is_ok());
    }
}
