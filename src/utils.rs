use crate::engine::{Sequence, Token};
use crate::error::GameError;

/// Parses a string of `H`/`T` characters into a `Sequence`.
///
/// Characters are matched case-insensitively. Whitespace is skipped so rows
/// may be written spaced out (`"H T T"`); any other character is an error.
///
/// # Returns
/// * `Ok(Sequence)` if parsing is successful.
/// * `Err(GameError::UnrecognizedToken)` naming the first bad character and
///   its position in the input.
/// * `Err(GameError::EmptySequence)` if no tokens were found.
///
/// # Examples
/// ```
/// use coinflip_puzzle::utils::sequence_from_str;
/// use coinflip_puzzle::engine::Token;
///
/// let seq = sequence_from_str("HHt").unwrap();
/// assert_eq!(seq.tokens(), &[Token::Heads, Token::Heads, Token::Tails]);
///
/// assert!(sequence_from_str("HXT").is_err());
/// assert!(sequence_from_str("").is_err());
/// ```
pub fn sequence_from_str(s: &str) -> Result<Sequence, GameError> {
    let mut tokens = Vec::with_capacity(s.len());
    for (position, ch) in s.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        tokens.push(match ch.to_ascii_uppercase() {
            'H' => Token::Heads,
            'T' => Token::Tails,
            _ => return Err(GameError::UnrecognizedToken { ch, position }),
        });
    }
    Sequence::from_tokens(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_from_str_valid() {
        let seq = sequence_from_str("HTHHT").unwrap();
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.get(0), Ok(Token::Heads));
        assert_eq!(seq.get(1), Ok(Token::Tails));
        assert_eq!(seq.to_compact_string(), "HTHHT");
    }

    #[test]
    fn test_sequence_from_str_with_spaces() {
        let seq = sequence_from_str(" H T\tt ").unwrap();
        assert_eq!(seq.to_compact_string(), "HTT");
    }

    #[test]
    fn test_sequence_from_str_invalid_char() {
        let result = sequence_from_str("HTX");
        assert_eq!(
            result,
            Err(GameError::UnrecognizedToken { ch: 'X', position: 2 })
        );
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unrecognized character 'X'"));
    }

    #[test]
    fn test_sequence_from_str_empty_input() {
        assert_eq!(sequence_from_str(""), Err(GameError::EmptySequence));
        assert_eq!(sequence_from_str("   "), Err(GameError::EmptySequence));
    }
}
