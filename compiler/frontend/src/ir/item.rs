use super::{
    body::Body,
    id::Id,
    types::{Literal, Type},
};
use crate::{
    impl_display_via_richir,
    position::Location,
    rich_ir::{RichIrBuilder, ToRichIr, TokenType},
};
use derive_more::From;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// A named module-level storage slot.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Global {
    pub name: String,
    pub type_: Type,
    pub is_mutable: bool,
    pub visibility: Visibility,
    pub initial_value: Option<Literal>,
    pub location: Location,
}
impl Global {
    /// A public, immutable global without an initial value.
    pub fn new(name: impl Into<String>, type_: Type) -> Self {
        Self {
            name: name.into(),
            type_,
            is_mutable: false,
            visibility: Visibility::Public,
            initial_value: None,
            location: Location::Unknown,
        }
    }
    #[must_use]
    pub fn mutable(mut self) -> Self {
        self.is_mutable = true;
        self
    }
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<Literal>) -> Self {
        self.initial_value = Some(value.into());
        self
    }
}
impl_display_via_richir!(Global);
impl ToRichIr for Global {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push("global", TokenType::Keyword);
        if self.visibility == Visibility::Private {
            builder.push(" ", None);
            builder.push("private", TokenType::Keyword);
        }
        if self.is_mutable {
            builder.push(" ", None);
            builder.push("mutable", TokenType::Keyword);
        }
        builder.push(" ", None);
        builder.push(format!("@{}", self.name), TokenType::Symbol);
        builder.push(": ", None);
        self.type_.build_rich_ir(builder);
        if let Some(initial_value) = &self.initial_value {
            builder.push(" = ", None);
            initial_value.build_rich_ir(builder);
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<(Id, Type)>,
    pub body: Body,
    pub location: Location,
}
impl_display_via_richir!(Function);
impl ToRichIr for Function {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push("func", TokenType::Keyword);
        builder.push(" ", None);
        builder.push(format!("@{}", self.name), TokenType::Function);
        builder.push("(", None);
        builder.push_children_custom(
            &self.parameters,
            |builder, (id, type_)| {
                builder.push(id.to_string(), TokenType::Parameter);
                builder.push(": ", None);
                type_.build_rich_ir(builder);
            },
            ", ",
        );
        builder.push(") ", None);
        build_body_rich_ir(&self.body, builder);
    }
}

/// A routine that runs once when the module is loaded, in module order.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Initializer {
    pub body: Body,
    pub location: Location,
}
impl Initializer {
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            body: Body::default(),
            location,
        }
    }
}
impl_display_via_richir!(Initializer);
impl ToRichIr for Initializer {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push("initializer", TokenType::Keyword);
        builder.push(" ", None);
        build_body_rich_ir(&self.body, builder);
    }
}

fn build_body_rich_ir(body: &Body, builder: &mut RichIrBuilder) {
    builder.push("{", None);
    if !body.is_empty() {
        builder.push_children_multiline(body);
    }
    builder.push_newline();
    builder.push("}", None);
}

#[derive(Clone, Debug, Eq, From, Hash, PartialEq)]
pub enum Item {
    Global(Global),
    Function(Function),
    Initializer(Initializer),
}
impl Item {
    /// The symbol this item defines. Initializers are anonymous.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Global(global) => Some(&global.name),
            Self::Function(function) => Some(&function.name),
            Self::Initializer(_) => None,
        }
    }
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        match self {
            Self::Global(_) => None,
            Self::Function(function) => Some(&function.body),
            Self::Initializer(initializer) => Some(&initializer.body),
        }
    }
    pub fn body_mut(&mut self) -> Option<&mut Body> {
        match self {
            Self::Global(_) => None,
            Self::Function(function) => Some(&mut function.body),
            Self::Initializer(initializer) => Some(&mut initializer.body),
        }
    }
    #[must_use]
    pub const fn location(&self) -> Location {
        match self {
            Self::Global(global) => global.location,
            Self::Function(function) => function.location,
            Self::Initializer(initializer) => initializer.location,
        }
    }
}
impl ToRichIr for Item {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        match self {
            Self::Global(global) => global.build_rich_ir(builder),
            Self::Function(function) => function.build_rich_ir(builder),
            Self::Initializer(initializer) => initializer.build_rich_ir(builder),
        }
    }
}
impl_display_via_richir!(Item);
