//! Doc comment synthesis for undocumented methods.
//!
//! The synthesizer is a [`DeclarationVisitor`]: methods that already carry
//! a comment are left alone, every other method receives exactly one
//! generated block built from its signature.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::shared::{CommentBlock, DeclarationVisitor, DefaultValue, MethodDeclaration, Parameter};

/// Type string used when a parameter has no declared type.
pub const FALLBACK_PARAM_TYPE: &str = "mixed";

/// Type string used when a method has no declared return type.
pub const FALLBACK_RETURN_TYPE: &str = "void";

/// How default values that are neither constants nor literals are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultStyle {
    /// Re-emit the expression's source text, whitespace collapsed.
    #[default]
    Verbatim,
    /// Emit only the syntactic category of the expression.
    Category,
}

/// Attaches synthesized doc comments to undocumented methods.
#[derive(Debug, Clone, Default)]
pub struct DocSynthesizer {
    style: DefaultStyle,
    documented: usize,
    skipped: usize,
}

impl DocSynthesizer {
    pub fn new(style: DefaultStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Methods that received a synthesized comment so far.
    pub fn documented(&self) -> usize {
        self.documented
    }

    /// Methods left alone because they already had a comment.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Builds the comment text for a method, using `\n` between lines.
    pub fn synthesize(&self, method: &MethodDeclaration) -> String {
        let params: Vec<String> = method
            .parameters
            .iter()
            .map(|parameter| self.param_line(parameter))
            .collect();

        let return_type = method
            .return_type
            .as_ref()
            .map_or_else(|| FALLBACK_RETURN_TYPE.to_string(), ToString::to_string);

        let mut doc = String::from("/**\n");
        doc.push_str(&format!(" * {} function\n", method.name));
        doc.push_str(" *\n");
        if !params.is_empty() {
            doc.push_str(&params.join("\n"));
            doc.push('\n');
        }
        doc.push_str(&format!(" * @return {return_type}\n"));
        doc.push_str(" */");
        doc
    }

    fn param_line(&self, parameter: &Parameter) -> String {
        let type_string = parameter
            .type_ref
            .as_ref()
            .map_or_else(|| FALLBACK_PARAM_TYPE.to_string(), ToString::to_string);

        let mut name = format!("${}", parameter.name);
        if let Some(default) = &parameter.default {
            name.push_str(" = ");
            name.push_str(&render_default(default, self.style));
        }

        format!(" * @param {type_string} {name}")
    }
}

impl DeclarationVisitor for DocSynthesizer {
    fn visit_method(&mut self, method: &mut MethodDeclaration) {
        if method.has_comment() {
            self.skipped += 1;
            trace!(method = %method.name, "already documented");
            return;
        }

        let doc = self.synthesize(method);
        method.leading_comment = Some(CommentBlock::synthesized(doc));
        self.documented += 1;
        trace!(method = %method.name, line = method.range.start_line, "synthesized doc comment");
    }
}

/// Renders a default value for display in a `@param` line.
///
/// Any `*/` in the value is written as `*\/` so the generated block
/// cannot be closed early.
pub fn render_default(default: &DefaultValue, style: DefaultStyle) -> String {
    let rendered = match default {
        DefaultValue::Constant(name) => name.as_str(),
        DefaultValue::Literal(value) => value.as_str(),
        DefaultValue::Other { category, source } => match style {
            DefaultStyle::Verbatim if !source.is_empty() => source.as_str(),
            _ => category.as_str(),
        },
    };

    rendered.replace("*/", "*\\/")
}
