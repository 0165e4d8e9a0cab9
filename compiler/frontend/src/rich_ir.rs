use crate::position::Offset;
use std::{
    fmt::{self, Display, Formatter},
    ops::Range,
};

/// Text with annotated token ranges, used for printing colored IR.
#[derive(Debug, Default)]
pub struct RichIr {
    pub text: String,
    pub annotations: Vec<RichIrAnnotation>,
}
impl Display for RichIr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[derive(Debug)]
pub struct RichIrAnnotation {
    pub range: Range<Offset>,
    pub token_type: TokenType,
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    Keyword,
    Symbol,
    Function,
    Variable,
    Parameter,
    Type,
    Int,
    Text,
    Comment,
}

pub trait ToRichIr {
    fn to_rich_ir(&self) -> RichIr {
        let mut builder = RichIrBuilder::default();
        self.build_rich_ir(&mut builder);
        builder.finish()
    }
    fn build_rich_ir(&self, builder: &mut RichIrBuilder);
}
impl ToRichIr for str {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push(self, None);
    }
}
impl<T: ToRichIr> ToRichIr for Option<T> {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        if let Some(value) = self {
            value.build_rich_ir(builder);
        }
    }
}
impl<T: ToRichIr> ToRichIr for [T] {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        match self {
            [] => {}
            [first, rest @ ..] => {
                first.build_rich_ir(builder);
                for child in rest {
                    builder.push_newline();
                    child.build_rich_ir(builder);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RichIrBuilder {
    ir: RichIr,
    indentation: usize,
}
impl RichIrBuilder {
    pub fn indent(&mut self) {
        self.indentation += 1;
    }
    pub fn dedent(&mut self) {
        self.indentation -= 1;
    }
    pub fn push_newline(&mut self) {
        self.push("\n", None);
        self.push("  ".repeat(self.indentation), None);
    }
    /// Pushes each child on its own line, indented by one level.
    pub fn push_children_multiline<'c, CS, C>(&mut self, children: CS)
    where
        CS: IntoIterator<Item = &'c C>,
        C: ToRichIr + 'c,
    {
        self.indent();
        for child in children {
            self.push_newline();
            child.build_rich_ir(self);
        }
        self.dedent();
    }

    pub fn push_children<CS, C, S>(&mut self, children: CS, separator: S)
    where
        CS: AsRef<[C]>,
        C: ToRichIr,
        S: AsRef<str>,
    {
        self.push_children_custom(
            children,
            |builder, child| child.build_rich_ir(builder),
            separator,
        );
    }
    pub fn push_children_custom<CS, C, F, S>(
        &mut self,
        children: CS,
        mut push_child: F,
        separator: S,
    ) where
        CS: AsRef<[C]>,
        F: FnMut(&mut Self, &C),
        S: AsRef<str>,
    {
        match children.as_ref() {
            [] => {}
            [child] => push_child(self, child),
            [first, rest @ ..] => {
                push_child(self, first);
                for child in rest {
                    self.push(separator.as_ref(), None);
                    push_child(self, child);
                }
            }
        }
    }

    pub fn push_comment_line<S: AsRef<str>>(&mut self, text: S) {
        let text = text.as_ref();
        if text.is_empty() {
            self.push("#", TokenType::Comment);
        } else {
            self.push("# ", TokenType::Comment);
            self.push(text, TokenType::Comment);
        }
        self.push_newline();
    }

    pub fn push<S, TT>(&mut self, text: S, token_type: TT) -> Range<Offset>
    where
        S: AsRef<str>,
        TT: Into<Option<TokenType>>,
    {
        let start = self.ir.text.len().into();
        self.ir.text.push_str(text.as_ref());
        let end = self.ir.text.len().into();
        let range = start..end;
        if let Some(token_type) = token_type.into() {
            self.ir.annotations.push(RichIrAnnotation {
                range: range.clone(),
                token_type,
            });
        }
        range
    }

    #[must_use]
    pub fn finish(self) -> RichIr {
        self.ir
    }
}

#[macro_export]
macro_rules! impl_display_via_richir {
    ($type:ty) => {
        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "{}",
                    $crate::rich_ir::ToRichIr::to_rich_ir(self).text,
                )
            }
        }
    };
}
