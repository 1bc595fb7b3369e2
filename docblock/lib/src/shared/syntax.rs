use std::fmt;

use serde::{Deserialize, Serialize};

/// A source code range with line/column and byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

/// A declared parameter or return type.
///
/// Union, intersection and DNF types are carried as `Named` using their
/// own string form; nothing beyond nullability is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    Nullable(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => formatter.write_str(name),
            Self::Nullable(name) => write!(formatter, "?{name}"),
        }
    }
}

/// The default value expression of a parameter, classified for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// A named constant such as `null`, `true` or `SOME_CONST`, as written.
    Constant(String),
    /// A scalar literal's value. Integers are decimal, strings lose their
    /// quotes; floats and double-quoted escapes stay as written.
    Literal(String),
    /// Anything else: the syntactic category and the collapsed source text.
    Other { category: String, source: String },
}

/// A single formal parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Identifier without the leading `$`.
    pub name: String,
    pub type_ref: Option<TypeRef>,
    pub default: Option<DefaultValue>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
            default: None,
        }
    }

    pub fn with_type(mut self, type_ref: TypeRef) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// A comment attached in front of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBlock {
    /// Raw comment text, delimiters included.
    pub text: String,
    /// Where the comment sits in the original source; `None` once synthesized.
    pub range: Option<CodeRange>,
}

impl CommentBlock {
    pub fn synthesized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            range: None,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.range.is_none()
    }
}

/// A method of a class, interface, trait, enum or anonymous class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub leading_comment: Option<CommentBlock>,
    /// Span of the declaration, starting at its attributes when present.
    pub range: CodeRange,
    /// Whitespace in front of the declaration when it starts its line.
    pub indent: Option<String>,
}

impl MethodDeclaration {
    pub fn has_comment(&self) -> bool {
        self.leading_comment.is_some()
    }
}

/// The line terminator used by a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Picks CRLF when the first line break in `source` is one.
    pub fn detect(source: &str) -> Self {
        match source.find('\n') {
            Some(index) if index > 0 && source.as_bytes()[index - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Visits the declarations of a [`SourceUnit`].
///
/// Only methods are dispatched; every other construct in the file passes
/// through untouched.
pub trait DeclarationVisitor {
    fn visit_method(&mut self, method: &mut MethodDeclaration);
}

/// Every method declaration of one file, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceUnit {
    pub methods: Vec<MethodDeclaration>,
    pub line_ending: LineEnding,
}

impl SourceUnit {
    pub fn accept<V: DeclarationVisitor + ?Sized>(&mut self, visitor: &mut V) {
        for method in &mut self.methods {
            visitor.visit_method(method);
        }
    }
}
