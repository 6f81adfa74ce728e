//! Single-token parsing using winnow combinators.
//!
//! Parsing happens in two steps: a winnow pass splits the token into its
//! lexical parts, then `validate` decides whether those parts form a command.

use winnow::combinator::{opt, repeat};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::ast::{Accidental, Length, NoteName, Token};

type PResult<T> = winnow::ModalResult<T>;

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(char),

    #[error("'{0}' needs a numeric argument")]
    MissingArgument(char),

    #[error("number '{0}' is out of range")]
    NumberOutOfRange(String),

    #[error("length must be greater than zero")]
    ZeroLength,

    #[error("tempo must be greater than zero")]
    ZeroTempo,

    #[error("'{0}' does not take an accidental")]
    UnexpectedAccidental(char),

    #[error("'{0}' does not take dots")]
    UnexpectedDots(char),

    #[error("dots need an explicit length")]
    DotWithoutLength,

    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}

impl TokenError {
    /// A hint for fixing the token, if there is an obvious one
    pub fn suggestion(&self) -> Option<String> {
        match self {
            TokenError::UnknownCommand(_) => {
                Some("Commands are t v o l r @ or a note letter c-b".to_string())
            }
            TokenError::MissingArgument(c) => Some(format!("Write e.g. '{}4'", c)),
            TokenError::ZeroLength => Some("Use 1 for a whole note, 4 for a quarter".to_string()),
            TokenError::ZeroTempo => Some("Tempo is in beats per minute, e.g. t120".to_string()),
            TokenError::DotWithoutLength => Some("Write the length before the dot, e.g. c8.".to_string()),
            _ => None,
        }
    }
}

/// Lexical parts of a token before validation
#[derive(Debug, Clone, PartialEq)]
struct RawToken<'a> {
    command: char,
    modifier: Option<char>,
    digits: Option<&'a str>,
    dots: usize,
}

fn parse_digits<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)
}

/// Parse `<command>[+#-][digits][.*]`
fn parse_raw<'a>(input: &mut &'a str) -> PResult<RawToken<'a>> {
    let command: char = any.parse_next(input)?;
    let modifier = opt(one_of(['+', '#', '-'])).parse_next(input)?;
    let digits = opt(parse_digits).parse_next(input)?;
    let dots: Vec<char> = repeat(0.., '.').parse_next(input)?;

    Ok(RawToken {
        command: command.to_ascii_lowercase(),
        modifier,
        digits,
        dots: dots.len(),
    })
}

/// Parse one whitespace-free MML token.
pub fn parse_token(text: &str) -> Result<Token, TokenError> {
    let mut input = text;
    let raw = parse_raw(&mut input).map_err(|_| TokenError::Empty)?;
    if !input.is_empty() {
        return Err(TokenError::TrailingInput(input.to_string()));
    }
    validate(raw)
}

fn parse_number(digits: &str) -> Result<u32, TokenError> {
    digits
        .parse()
        .map_err(|_| TokenError::NumberOutOfRange(digits.to_string()))
}

fn parse_length(digits: Option<&str>, dots: usize) -> Result<Option<Length>, TokenError> {
    let Some(digits) = digits else {
        return if dots > 0 {
            Err(TokenError::DotWithoutLength)
        } else {
            Ok(None)
        };
    };
    let denominator = parse_number(digits)?;
    if denominator == 0 {
        return Err(TokenError::ZeroLength);
    }
    let dots = u8::try_from(dots).map_err(|_| TokenError::NumberOutOfRange(".".repeat(dots)))?;
    Ok(Some(Length { denominator, dots }))
}

fn validate(raw: RawToken<'_>) -> Result<Token, TokenError> {
    let RawToken {
        command,
        modifier,
        digits,
        dots,
    } = raw;

    if let Some(name) = NoteName::from_letter(command) {
        let accidental = modifier.map(|m| match m {
            '-' => Accidental::Flat,
            _ => Accidental::Sharp,
        });
        let length = parse_length(digits, dots)?;
        return Ok(Token::Note {
            name,
            accidental,
            length,
        });
    }

    if !matches!(command, 't' | 'v' | 'o' | 'l' | 'r' | '@') {
        return Err(TokenError::UnknownCommand(command));
    }
    if modifier.is_some() {
        return Err(TokenError::UnexpectedAccidental(command));
    }

    match command {
        'r' => Ok(Token::Rest(parse_length(digits, dots)?)),
        'l' => {
            let length = parse_length(digits, dots)?.ok_or(TokenError::MissingArgument('l'))?;
            Ok(Token::DefaultLength(length))
        }
        _ => {
            if dots > 0 {
                return Err(TokenError::UnexpectedDots(command));
            }
            let value = parse_number(digits.ok_or(TokenError::MissingArgument(command))?)?;
            match command {
                't' if value == 0 => Err(TokenError::ZeroTempo),
                't' => Ok(Token::Tempo(value)),
                'v' => Ok(Token::Volume(value)),
                'o' => Ok(Token::Octave(value)),
                _ => Ok(Token::Program(value)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_parts() {
        let mut input = "c+16.";
        let raw = parse_raw(&mut input).unwrap();
        assert_eq!(raw.command, 'c');
        assert_eq!(raw.modifier, Some('+'));
        assert_eq!(raw.digits, Some("16"));
        assert_eq!(raw.dots, 1);
        assert!(input.is_empty());

        let mut input = "Rx";
        let raw = parse_raw(&mut input).unwrap();
        assert_eq!(raw.command, 'r');
        assert_eq!(raw.digits, None);
        assert_eq!(input, "x");
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(parse_token("t120"), Ok(Token::Tempo(120)));
        assert_eq!(parse_token("v10"), Ok(Token::Volume(10)));
        assert_eq!(parse_token("o5"), Ok(Token::Octave(5)));
        assert_eq!(parse_token("@0"), Ok(Token::Program(0)));
        assert_eq!(
            parse_token("l8"),
            Ok(Token::DefaultLength(Length::new(8)))
        );
        assert_eq!(parse_token("T90"), Ok(Token::Tempo(90)));
    }

    #[test]
    fn test_parse_notes() {
        assert_eq!(
            parse_token("c4"),
            Ok(Token::note(NoteName::C, None, Length::new(4)))
        );
        assert_eq!(
            parse_token("f+8"),
            Ok(Token::note(NoteName::F, Some(Accidental::Sharp), Length::new(8)))
        );
        assert_eq!(
            parse_token("g#"),
            Ok(Token::Note {
                name: NoteName::G,
                accidental: Some(Accidental::Sharp),
                length: None
            })
        );
        assert_eq!(
            parse_token("b-2"),
            Ok(Token::note(NoteName::B, Some(Accidental::Flat), Length::new(2)))
        );
        assert_eq!(
            parse_token("a8."),
            Ok(Token::note(NoteName::A, None, Length::dotted(8)))
        );
        assert_eq!(
            parse_token("E"),
            Ok(Token::Note {
                name: NoteName::E,
                accidental: None,
                length: None
            })
        );
    }

    #[test]
    fn test_parse_rests() {
        assert_eq!(parse_token("r"), Ok(Token::Rest(None)));
        assert_eq!(parse_token("r16"), Ok(Token::rest(Length::new(16))));
        assert_eq!(parse_token("r8."), Ok(Token::rest(Length::dotted(8))));
    }

    #[test]
    fn test_reject_malformed() {
        assert_eq!(parse_token(""), Err(TokenError::Empty));
        assert_eq!(parse_token("z99"), Err(TokenError::UnknownCommand('z')));
        assert_eq!(parse_token("t"), Err(TokenError::MissingArgument('t')));
        assert_eq!(parse_token("l"), Err(TokenError::MissingArgument('l')));
        assert_eq!(parse_token("t0"), Err(TokenError::ZeroTempo));
        assert_eq!(parse_token("c0"), Err(TokenError::ZeroLength));
        assert_eq!(parse_token("r."), Err(TokenError::DotWithoutLength));
        assert_eq!(parse_token("o+4"), Err(TokenError::UnexpectedAccidental('o')));
        assert_eq!(parse_token("t120."), Err(TokenError::UnexpectedDots('t')));
        assert_eq!(
            parse_token("c4x"),
            Err(TokenError::TrailingInput("x".to_string()))
        );
        assert_eq!(
            parse_token("c++"),
            Err(TokenError::TrailingInput("+".to_string()))
        );
        assert_eq!(
            parse_token("o99999999999"),
            Err(TokenError::NumberOutOfRange("99999999999".to_string()))
        );
    }

    #[test]
    fn test_suggestions() {
        assert!(TokenError::UnknownCommand('z').suggestion().is_some());
        assert!(TokenError::TrailingInput("x".into()).suggestion().is_none());
    }
}
