use super::{ParseError, ParseErrorKind};
use crate::position::Position;
use num_bigint::BigInt;
use std::fmt::{self, Display, Formatter};
use tracing::instrument;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenKind {
    /// Keywords, operation names, types, and booleans.
    Word(String),
    /// `$name`
    Value(String),
    /// `@name`
    Symbol(String),
    Int(BigInt),
    Text(String),
    Colon,
    Comma,
    Equals,
    OpeningParenthesis,
    ClosingParenthesis,
    OpeningBracket,
    ClosingBracket,
    OpeningCurlyBrace,
    ClosingCurlyBrace,
    Newline,
    EndOfInput,
}
impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Word(word) => write!(f, "`{word}`"),
            Self::Value(name) => write!(f, "`${name}`"),
            Self::Symbol(name) => write!(f, "`@{name}`"),
            Self::Int(value) => write!(f, "`{value}`"),
            Self::Text(_) => write!(f, "a text"),
            Self::Colon => write!(f, "`:`"),
            Self::Comma => write!(f, "`,`"),
            Self::Equals => write!(f, "`=`"),
            Self::OpeningParenthesis => write!(f, "`(`"),
            Self::ClosingParenthesis => write!(f, "`)`"),
            Self::OpeningBracket => write!(f, "`[`"),
            Self::ClosingBracket => write!(f, "`]`"),
            Self::OpeningCurlyBrace => write!(f, "`{{`"),
            Self::ClosingCurlyBrace => write!(f, "`}}`"),
            Self::Newline => write!(f, "a line break"),
            Self::EndOfInput => write!(f, "the end of the input"),
        }
    }
}

/// Splits `source` into tokens. The last token is always
/// [`TokenKind::EndOfInput`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut input = source;
    let mut position = Position::default();
    let mut tokens = vec![];
    loop {
        let rest = skip_whitespace_and_comments(input);
        advance(&mut position, &input[..input.len() - rest.len()]);
        input = rest;
        if input.is_empty() {
            break;
        }

        let (rest, kind) = token(input).map_err(|kind| ParseError { position, kind })?;
        tokens.push(Token { kind, position });
        advance(&mut position, &input[..input.len() - rest.len()]);
        input = rest;
    }
    tokens.push(Token {
        kind: TokenKind::EndOfInput,
        position,
    });
    Ok(tokens)
}

fn advance(position: &mut Position, consumed: &str) {
    for c in consumed.chars() {
        if c == '\n' {
            position.line += 1;
            position.character = 0;
        } else {
            position.character += 1;
        }
    }
}

/// Line breaks are tokens, so this only skips horizontal whitespace and
/// comments up to (excluding) the end of their line.
fn skip_whitespace_and_comments(mut input: &str) -> &str {
    loop {
        let trimmed = input.trim_start_matches([' ', '\t', '\r']);
        if let Some(comment) = trimmed.strip_prefix('#') {
            input = comment.find('\n').map_or("", |end| &comment[end..]);
        } else {
            return trimmed;
        }
    }
}

#[instrument(level = "trace")]
fn token(input: &str) -> Result<(&str, TokenKind), ParseErrorKind> {
    let Some(c) = input.chars().next() else {
        return Ok((input, TokenKind::EndOfInput));
    };
    let after_c = &input[c.len_utf8()..];
    let simple = match c {
        '\n' => Some(TokenKind::Newline),
        ':' => Some(TokenKind::Colon),
        ',' => Some(TokenKind::Comma),
        '=' => Some(TokenKind::Equals),
        '(' => Some(TokenKind::OpeningParenthesis),
        ')' => Some(TokenKind::ClosingParenthesis),
        '[' => Some(TokenKind::OpeningBracket),
        ']' => Some(TokenKind::ClosingBracket),
        '{' => Some(TokenKind::OpeningCurlyBrace),
        '}' => Some(TokenKind::ClosingCurlyBrace),
        _ => None,
    };
    if let Some(kind) = simple {
        return Ok((after_c, kind));
    }

    match c {
        '$' | '@' => {
            let (rest, name) = word(after_c).ok_or(ParseErrorKind::MissingName(c))?;
            let kind = if c == '$' {
                TokenKind::Value(name)
            } else {
                TokenKind::Symbol(name)
            };
            Ok((rest, kind))
        }
        '"' => text(after_c),
        '-' | '0'..='9' => int(input).ok_or(ParseErrorKind::UnexpectedCharacter(c)),
        _ => word(input)
            .map(|(rest, word)| (rest, TokenKind::Word(word)))
            .ok_or(ParseErrorKind::UnexpectedCharacter(c)),
    }
}

/// Identifiers, keywords, and value names consist of alphanumeric characters
/// and underscores.
#[instrument(level = "trace")]
fn word(input: &str) -> Option<(&str, String)> {
    let end = input
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(input.len());
    if end == 0 {
        None
    } else {
        Some((&input[end..], input[..end].to_string()))
    }
}

#[instrument(level = "trace")]
fn int(input: &str) -> Option<(&str, TokenKind)> {
    let digits_start = usize::from(input.starts_with('-'));
    let end = input[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(input.len(), |end| digits_start + end);
    if end == digits_start {
        return None;
    }
    let value = input[..end].parse::<BigInt>().ok()?;
    Some((&input[end..], TokenKind::Int(value)))
}

/// Parses the rest of a text after its opening quote.
#[instrument(level = "trace")]
fn text(input: &str) -> Result<(&str, TokenKind), ParseErrorKind> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return Ok((&input[index + 1..], TokenKind::Text(value))),
            '\\' => {
                let escaped = match chars.next() {
                    Some((_, '"')) => '"',
                    Some((_, '\\')) => '\\',
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, other)) => return Err(ParseErrorKind::UnknownEscape(other)),
                    None => break,
                };
                value.push(escaped);
            }
            '\n' => break,
            c => value.push(c),
        }
    }
    Err(ParseErrorKind::TextNotClosed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_word() {
        assert_eq!(word("hello"), Some(("", "hello".to_string())));
        assert_eq!(word("less_than $1"), Some((" $1", "less_than".to_string())));
        assert_eq!(word("0:"), Some((":", "0".to_string())));
        assert_eq!(word(": Int"), None);
    }

    #[test]
    fn test_int() {
        assert_eq!(int("123 "), Some((" ", TokenKind::Int(123.into()))));
        assert_eq!(int("-4]"), Some(("]", TokenKind::Int((-4).into()))));
        assert_eq!(int("-x"), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(
            text(r#"a \"quoted\"\n text" rest"#),
            Ok((" rest", TokenKind::Text("a \"quoted\"\n text".to_string()))),
        );
        assert_eq!(text(r"\q"), Err(ParseErrorKind::UnknownEscape('q')));
        assert_eq!(text("open"), Err(ParseErrorKind::TextNotClosed));
    }

    #[test]
    fn comments_are_skipped_but_line_breaks_are_kept() {
        assert_eq!(
            kinds("store $x @g # a comment\nreturn"),
            [
                TokenKind::Word("store".to_string()),
                TokenKind::Value("x".to_string()),
                TokenKind::Symbol("g".to_string()),
                TokenKind::Newline,
                TokenKind::Word("return".to_string()),
                TokenKind::EndOfInput,
            ],
        );
    }

    #[test]
    fn tokens_know_their_position() {
        let tokens = tokenize("func @main() {\n  return\n}").unwrap();
        let return_ = tokens
            .iter()
            .find(|token| token.kind == TokenKind::Word("return".to_string()))
            .unwrap();
        assert_eq!(return_.position, Position::new(1, 2));
        assert_eq!(tokens.last().unwrap().position, Position::new(2, 1));
    }

    #[test]
    fn errors_point_at_the_offending_character() {
        assert_eq!(
            tokenize("global @x: Int\n  % oops"),
            Err(ParseError {
                position: Position::new(1, 2),
                kind: ParseErrorKind::UnexpectedCharacter('%'),
            }),
        );
        assert_eq!(
            tokenize("load @"),
            Err(ParseError {
                position: Position::new(0, 5),
                kind: ParseErrorKind::MissingName('@'),
            }),
        );
    }
}
