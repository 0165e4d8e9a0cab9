//! Parses the textual module format that `Module`'s `Display` produces.
//!
//! ```text
//! global private @hoisted: Int
//! global mutable @counter: Int = 0
//!
//! func @main($x: Int) {
//!   $a: Int = constant 2
//!   $b: Int, $c: Int = divrem $a $x
//!   store $b @counter
//!   call @print $c
//!   return $b  # comments run until the end of the line
//! }
//! ```
//!
//! Value names are scoped to their body and get renumbered while parsing.

use crate::{ir::Module, position::Position};
use thiserror::Error;

mod lexer;
mod parser;

pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let tokens = lexer::tokenize(source)?;
    parser::Parser::new(tokens).parse_module()
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{position}: {kind}")]
pub struct ParseError {
    pub position: Position,
    pub kind: ParseErrorKind,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
    #[error("`{0}` must be followed by a name")]
    MissingName(char),
    #[error("text is not closed")]
    TextNotClosed,
    #[error("unknown escape sequence `\\{0}`")]
    UnknownEscape(char),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("value `${0}` is not defined")]
    UndefinedValue(String),
    #[error("value `${0}` is already defined")]
    ValueAlreadyDefined(String),
    #[error("`{operation}` produces {expected} results, but {found} are declared")]
    WrongResultCount {
        operation: &'static str,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Item, Literal, Type, Visibility},
        position::Location,
    };

    #[test]
    fn values_are_renumbered_per_module() {
        let module = parse_module(
            r#"
            # Counts things.
            global private @hoisted: Int
            global mutable @counter: Int = 0
            global @greeting: Text = "hi \"you\""

            func @main($x: Int) {
              $a: Int = constant 2
              $b: Int, $c: Int = divrem $a $x  # quotient and remainder

              store $b @counter
              call @print $c
              return $b
            }
            initializer {
              $one: Int = constant 1
              return
            }
            "#,
        )
        .unwrap();
        insta::assert_snapshot!(module, @r###"
        global private @hoisted: Int
        global mutable @counter: Int = 0
        global @greeting: Text = "hi \"you\""

        func @main($0: Int) {
          $1: Int = constant 2
          $2: Int, $3: Int = divrem $1 $0
          store $2 @counter
          call @print $3
          return $2
        }

        initializer {
          $4: Int = constant 1
          return
        }
        "###);
        assert_eq!(module.verify(), Ok(()));
    }

    #[test]
    fn items_remember_their_attributes() {
        let module = parse_module(
            "global private mutable @flags: List[Bool] = true\nfunc @f() {\n  return\n}",
        )
        .unwrap();
        let Item::Global(global) = &module.items[0] else {
            panic!("Expected a global.");
        };
        assert_eq!(global.visibility, Visibility::Private);
        assert!(global.is_mutable);
        assert_eq!(global.type_, Type::list(Type::Bool));
        assert_eq!(global.initial_value, Some(Literal::Bool(true)));
        assert_eq!(global.location, Location::Source(Position::new(0, 0)));
        assert_eq!(
            module.function("f").unwrap().body.iter().next().unwrap().location,
            Location::Source(Position::new(2, 2)),
        );
    }

    #[test]
    fn parsing_the_printed_module_is_stable() {
        let source = "\
global @limit: Int = -3

func @main($0: Int, $1: Bool) {
  $2: Int = load @limit
  $3: Bool = less_than $0 $2
  $4: Bool = and $3 $1
  $5: Bool = not $4
  $6: Text = constant \"a\\tb\"
  $7: Text = concatenate $6 $6
  $8: List[Text] = splat $7 $0
  $9: Int, $10: Bool = call @helper $8
  return $9 $10 $5
}";
        assert_eq!(parse_module(source).unwrap().to_string(), source);
    }

    fn parse_error(source: &str) -> String {
        parse_module(source).unwrap_err().to_string()
    }

    #[test]
    fn undefined_values_are_rejected() {
        assert_eq!(
            parse_error("func @main() {\n  return $x\n}"),
            "2:10: value `$x` is not defined",
        );
    }

    #[test]
    fn values_are_only_visible_in_their_body() {
        assert_eq!(
            parse_error(
                "func @a() {\n  $x: Int = constant 1\n  return\n}\nfunc @b() {\n  return $x\n}",
            ),
            "6:10: value `$x` is not defined",
        );
    }

    #[test]
    fn redefinitions_are_rejected() {
        assert_eq!(
            parse_error("func @main($x: Int) {\n  $x: Int = constant 1\n  return\n}"),
            "2:3: value `$x` is already defined",
        );
    }

    #[test]
    fn result_counts_are_checked() {
        assert_eq!(
            parse_error("func @main() {\n  $a: Int = constant 1\n  $b: Int = divrem $a $a\n}"),
            "3:3: `divrem` produces 2 results, but 1 are declared",
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            parse_error("func @main() {\n  $a: Int = frobnicate\n}"),
            "2:13: unknown operation `frobnicate`",
        );
        assert_eq!(
            parse_error("global @x: Float"),
            "1:12: unknown type `Float`",
        );
    }

    #[test]
    fn unexpected_tokens_are_reported() {
        assert_eq!(
            parse_error("global @x Int"),
            "1:11: expected `:`, found `Int`",
        );
        assert_eq!(
            parse_error("initializer {\n  return"),
            "2:9: expected an operation, found the end of the input",
        );
        assert_eq!(
            parse_error("return"),
            "1:1: expected `global`, `func`, or `initializer`, found `return`",
        );
    }
}
