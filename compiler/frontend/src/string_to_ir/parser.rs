use super::{
    lexer::{Token, TokenKind},
    ParseError, ParseErrorKind,
};
use crate::{
    ir::{
        BinaryOperator, Body, Function, Global, Id, IdGenerators, Initializer, Item, Literal,
        Module, Operation, OperationKind, Type, UnaryOperator, Visibility,
    },
    position::{Location, Position},
};
use rustc_hash::FxHashMap;
use std::str::FromStr;
use tracing::trace;

const ITEM_KEYWORDS: &str = "`global`, `func`, or `initializer`";

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    ids: IdGenerators,
}
impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            ids: IdGenerators::default(),
        }
    }

    pub fn parse_module(mut self) -> Result<Module, ParseError> {
        let mut items = vec![];
        loop {
            self.skip_newlines();
            let keyword = match &self.peek().kind {
                TokenKind::EndOfInput => break,
                TokenKind::Word(word) => word.clone(),
                _ => return Err(self.unexpected(ITEM_KEYWORDS)),
            };
            let item: Item = match keyword.as_str() {
                "global" => self.global()?.into(),
                "func" => self.function()?.into(),
                "initializer" => self.initializer()?.into(),
                _ => return Err(self.unexpected(ITEM_KEYWORDS)),
            };
            trace!("Parsed item {:?}", Item::symbol(&item));
            items.push(item);
            self.end_of_line()?;
        }
        Ok(Module {
            ids: self.ids,
            items,
        })
    }

    fn global(&mut self) -> Result<Global, ParseError> {
        let location = Location::from(self.next().position);
        let mut visibility = Visibility::Public;
        if self.accept_word("private") {
            visibility = Visibility::Private;
        } else {
            self.accept_word("public");
        }
        let is_mutable = self.accept_word("mutable");
        let name = self.symbol()?;
        self.expect(&TokenKind::Colon, "`:`")?;
        let type_ = self.type_()?;
        let initial_value = if self.accept(&TokenKind::Equals) {
            Some(self.literal()?)
        } else {
            None
        };
        Ok(Global {
            name,
            type_,
            is_mutable,
            visibility,
            initial_value,
            location,
        })
    }

    fn function(&mut self) -> Result<Function, ParseError> {
        let location = Location::from(self.next().position);
        let name = self.symbol()?;
        self.expect(&TokenKind::OpeningParenthesis, "`(`")?;
        let mut scope = Scope::default();
        let mut parameters = vec![];
        if !self.accept(&TokenKind::ClosingParenthesis) {
            loop {
                let id = self.definition(&mut scope)?;
                self.expect(&TokenKind::Colon, "`:`")?;
                parameters.push((id, self.type_()?));
                if self.accept(&TokenKind::ClosingParenthesis) {
                    break;
                }
                self.expect(&TokenKind::Comma, "`,` or `)`")?;
            }
        }
        let body = self.body(scope)?;
        Ok(Function {
            name,
            parameters,
            body,
            location,
        })
    }

    fn initializer(&mut self) -> Result<Initializer, ParseError> {
        let location = Location::from(self.next().position);
        let body = self.body(Scope::default())?;
        Ok(Initializer { body, location })
    }

    fn body(&mut self, mut scope: Scope) -> Result<Body, ParseError> {
        self.expect(&TokenKind::OpeningCurlyBrace, "`{`")?;
        self.end_of_line()?;
        let mut body = Body::default();
        loop {
            self.skip_newlines();
            if self.accept(&TokenKind::ClosingCurlyBrace) {
                break;
            }
            body.push(self.operation(&mut scope)?);
            self.end_of_line()?;
        }
        Ok(body)
    }

    fn operation(&mut self, scope: &mut Scope) -> Result<Operation, ParseError> {
        let position = self.peek().position;

        let mut result_names = vec![];
        if matches!(self.peek().kind, TokenKind::Value(_)) {
            loop {
                let token = self.next();
                let TokenKind::Value(name) = &token.kind else {
                    return Err(unexpected(&token, "a value"));
                };
                let name = name.clone();
                self.expect(&TokenKind::Colon, "`:`")?;
                result_names.push((name, token.position, self.type_()?));
                if self.accept(&TokenKind::Equals) {
                    break;
                }
                self.expect(&TokenKind::Comma, "`,` or `=`")?;
            }
        }

        let kind = self.operation_kind(scope)?;
        if let Some(expected) = kind.result_count() {
            if expected != result_names.len() {
                return Err(ParseError {
                    position,
                    kind: ParseErrorKind::WrongResultCount {
                        operation: kind.name(),
                        expected,
                        found: result_names.len(),
                    },
                });
            }
        }

        let mut results = vec![];
        for (name, position, type_) in result_names {
            results.push((scope.define(name, position, &mut self.ids)?, type_));
        }
        Ok(Operation {
            id: self.ids.operations.generate(),
            results,
            kind,
            location: Location::from(position),
        })
    }
    fn operation_kind(&mut self, scope: &Scope) -> Result<OperationKind, ParseError> {
        let token = self.next();
        let TokenKind::Word(name) = &token.kind else {
            return Err(unexpected(&token, "an operation"));
        };
        let kind = match name.as_str() {
            "constant" => OperationKind::Constant(self.literal()?),
            "divrem" => OperationKind::DivRem {
                dividend: self.value(scope)?,
                divisor: self.value(scope)?,
            },
            "splat" => OperationKind::Splat {
                value: self.value(scope)?,
                length: self.value(scope)?,
            },
            "load" => OperationKind::Load {
                global: self.symbol()?,
            },
            "store" => OperationKind::Store {
                value: self.value(scope)?,
                global: self.symbol()?,
            },
            "call" => OperationKind::Call {
                function: self.symbol()?,
                arguments: self.values(scope)?,
            },
            "return" => OperationKind::Return {
                values: self.values(scope)?,
            },
            name => {
                if let Ok(operator) = BinaryOperator::from_str(name) {
                    OperationKind::Binary {
                        operator,
                        lhs: self.value(scope)?,
                        rhs: self.value(scope)?,
                    }
                } else if let Ok(operator) = UnaryOperator::from_str(name) {
                    OperationKind::Unary {
                        operator,
                        operand: self.value(scope)?,
                    }
                } else {
                    return Err(ParseError {
                        position: token.position,
                        kind: ParseErrorKind::UnknownOperation(name.to_string()),
                    });
                }
            }
        };
        Ok(kind)
    }

    fn value(&mut self, scope: &Scope) -> Result<Id, ParseError> {
        let token = self.next();
        let TokenKind::Value(name) = &token.kind else {
            return Err(unexpected(&token, "a value"));
        };
        scope.lookup(name, token.position)
    }
    /// Values until the end of the line.
    fn values(&mut self, scope: &Scope) -> Result<Vec<Id>, ParseError> {
        let mut values = vec![];
        while matches!(self.peek().kind, TokenKind::Value(_)) {
            values.push(self.value(scope)?);
        }
        Ok(values)
    }
    fn definition(&mut self, scope: &mut Scope) -> Result<Id, ParseError> {
        let token = self.next();
        let TokenKind::Value(name) = &token.kind else {
            return Err(unexpected(&token, "a value"));
        };
        scope.define(name.clone(), token.position, &mut self.ids)
    }

    fn symbol(&mut self) -> Result<String, ParseError> {
        let token = self.next();
        match &token.kind {
            TokenKind::Symbol(name) => Ok(name.clone()),
            _ => Err(unexpected(&token, "a symbol")),
        }
    }

    fn type_(&mut self) -> Result<Type, ParseError> {
        let token = self.next();
        let TokenKind::Word(name) = &token.kind else {
            return Err(unexpected(&token, "a type"));
        };
        match name.as_str() {
            "Int" => Ok(Type::Int),
            "Bool" => Ok(Type::Bool),
            "Text" => Ok(Type::Text),
            "List" => {
                self.expect(&TokenKind::OpeningBracket, "`[`")?;
                let element = self.type_()?;
                self.expect(&TokenKind::ClosingBracket, "`]`")?;
                Ok(Type::list(element))
            }
            _ => Err(ParseError {
                position: token.position,
                kind: ParseErrorKind::UnknownType(name.to_string()),
            }),
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        let token = self.next();
        match &token.kind {
            TokenKind::Int(value) => Ok(Literal::Int(value.clone())),
            TokenKind::Text(value) => Ok(Literal::Text(value.clone())),
            TokenKind::Word(word) if word == "true" => Ok(Literal::Bool(true)),
            TokenKind::Word(word) if word == "false" => Ok(Literal::Bool(false)),
            _ => Err(unexpected(&token, "a literal")),
        }
    }

    fn peek(&self) -> &Token {
        // The lexer always ends with `EndOfInput`, which is never consumed.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }
    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndOfInput {
            self.index += 1;
        }
        token
    }
    fn accept(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.next();
            true
        } else {
            false
        }
    }
    fn accept_word(&mut self, word: &str) -> bool {
        self.accept(&TokenKind::Word(word.to_string()))
    }
    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.accept(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }
    fn end_of_line(&mut self) -> Result<(), ParseError> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.next();
                Ok(())
            }
            TokenKind::EndOfInput => Ok(()),
            _ => Err(self.unexpected("a line break")),
        }
    }
    fn skip_newlines(&mut self) {
        while self.accept(&TokenKind::Newline) {}
    }
    fn unexpected(&self, expected: &'static str) -> ParseError {
        unexpected(self.peek(), expected)
    }
}

fn unexpected(token: &Token, expected: &'static str) -> ParseError {
    ParseError {
        position: token.position,
        kind: ParseErrorKind::UnexpectedToken {
            expected,
            found: token.kind.to_string(),
        },
    }
}

/// Value names visible in the current body.
#[derive(Default)]
struct Scope {
    values: FxHashMap<String, Id>,
}
impl Scope {
    fn define(
        &mut self,
        name: String,
        position: Position,
        ids: &mut IdGenerators,
    ) -> Result<Id, ParseError> {
        if self.values.contains_key(&name) {
            return Err(ParseError {
                position,
                kind: ParseErrorKind::ValueAlreadyDefined(name),
            });
        }
        let id = ids.values.generate();
        self.values.insert(name, id);
        Ok(id)
    }
    fn lookup(&self, name: &str, position: Position) -> Result<Id, ParseError> {
        self.values.get(name).copied().ok_or_else(|| ParseError {
            position,
            kind: ParseErrorKind::UndefinedValue(name.to_string()),
        })
    }
}
