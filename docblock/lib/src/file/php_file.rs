use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::DocBlockError;
use crate::shared::{
    CodeRange, CommentBlock, DefaultValue, LineEnding, MethodDeclaration, Parameter,
    SourceUnit, SyntaxDiagnostic, TypeRef,
};

/// A parsed PHP source file backed by tree-sitter.
///
/// The original text and tree are kept alongside the extracted
/// [`SourceUnit`] so the unit can be cloned, rewritten and printed back
/// against them.
#[derive(Debug, Clone)]
pub struct PhpFile {
    /// Path to the file on disk.
    pub file: PathBuf,
    source: String,
    tree: Tree,
    unit: SourceUnit,
}

impl PhpFile {
    /// Reads and parses the file on disk, rejecting files with syntax errors.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read, or if tree-sitter
    /// reports any error or missing node.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DocBlockError> {
        let file = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&file).map_err(|source| DocBlockError::Io {
            path: file.clone(),
            source,
        })?;

        let parsed = Self::from_source(file, source)?;
        parsed.check_syntax()?;
        Ok(parsed)
    }

    /// Parses in-memory source without rejecting syntax errors.
    ///
    /// ## Errors
    /// Returns an error if the grammar cannot be loaded or tree-sitter
    /// produces no tree at all.
    pub fn from_source<P: Into<PathBuf>>(
        path: P,
        source: impl Into<String>,
    ) -> Result<Self, DocBlockError> {
        let file = path.into();
        let source = source.into();

        let language: Language = tree_sitter_php::LANGUAGE_PHP.into();
        let mut parser = Parser::new();
        parser.set_language(&language)?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| DocBlockError::ParseFailed { path: file.clone() })?;

        let unit = SourceUnit {
            methods: collect_methods(tree.root_node(), &source),
            line_ending: LineEnding::detect(&source),
        };

        Ok(Self {
            file,
            source,
            tree,
            unit,
        })
    }

    /// The original text of the file.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The method declarations extracted from the tree.
    pub fn unit(&self) -> &SourceUnit {
        &self.unit
    }

    /// Fails with the first syntax diagnostic, if there is one.
    pub fn check_syntax(&self) -> Result<(), DocBlockError> {
        match self.syntax_diagnostics().into_iter().next() {
            Some(diagnostic) => Err(DocBlockError::Syntax {
                path: self.file.clone(),
                line: diagnostic.range.start_line,
                column: diagnostic.range.start_column,
                message: diagnostic.message,
            }),
            None => Ok(()),
        }
    }

    /// Provides syntax diagnostics for this file in document order.
    ///
    /// ## Returns
    /// Returns one diagnostic per tree-sitter error or missing node.
    pub fn syntax_diagnostics(&self) -> Vec<SyntaxDiagnostic> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return Vec::new();
        }

        let mut diagnostics = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if node.is_missing() {
                diagnostics.push(SyntaxDiagnostic {
                    message: format!("Missing `{}`", node.kind()),
                    range: range_for_node(node),
                });
                continue;
            }

            if node.is_error() {
                diagnostics.push(SyntaxDiagnostic {
                    message: format!("Unexpected `{}`", error_snippet(node, &self.source)),
                    range: range_for_node(node),
                });
                continue;
            }

            if !node.has_error() {
                continue;
            }

            push_children_reversed(node, &mut stack);
        }

        diagnostics
    }
}

/// Walks the tree in document order and extracts every method declaration.
///
/// Dispatch happens on the node kind: only `method_declaration` produces a
/// declaration, everything else is descended into.
fn collect_methods(root: Node<'_>, source: &str) -> Vec<MethodDeclaration> {
    let mut methods = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.kind() == "method_declaration" {
            methods.push(method_from_node(node, source));
        }

        push_children_reversed(node, &mut stack);
    }

    methods
}

fn push_children_reversed<'a>(node: Node<'a>, stack: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    stack.extend(children.into_iter().rev());
}

fn method_from_node(node: Node<'_>, source: &str) -> MethodDeclaration {
    let name = node
        .child_by_field_name("name")
        .map(|name| node_text(name, source).to_string())
        .unwrap_or_default();

    let parameters = node
        .child_by_field_name("parameters")
        .map(|params| extract_parameters(params, source))
        .unwrap_or_default();

    let return_type = node
        .child_by_field_name("return_type")
        .or_else(|| type_after_colon(node))
        .map(|type_node| type_ref_from_node(type_node, source));

    MethodDeclaration {
        name,
        parameters,
        return_type,
        leading_comment: leading_comment(node, source),
        range: range_for_node(node),
        indent: line_indent(source, node.start_byte()),
    }
}

/// Finds the return type for grammars that do not label it with a field.
fn type_after_colon(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let mut found_colon = false;

    for child in node.children(&mut cursor) {
        let kind = child.kind();
        if kind == ":" {
            found_colon = true;
            continue;
        }
        if kind == "compound_statement" || kind == ";" {
            break;
        }
        if found_colon && is_type_node(kind) {
            return Some(child);
        }
    }

    None
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "named_type"
            | "primitive_type"
            | "optional_type"
            | "union_type"
            | "intersection_type"
            | "disjunctive_normal_form_type"
            | "bottom_type"
    )
}

fn extract_parameters(params: Node<'_>, source: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = params.walk();

    for child in params.named_children(&mut cursor) {
        if let Some(parameter) = extract_single_parameter(child, source) {
            parameters.push(parameter);
        }
    }

    parameters
}

fn extract_single_parameter(node: Node<'_>, source: &str) -> Option<Parameter> {
    let kind = node.kind();
    if !matches!(
        kind,
        "simple_parameter" | "variadic_parameter" | "property_promotion_parameter"
    ) {
        return None;
    }

    let name_node = node.child_by_field_name("name")?;
    let variable = if name_node.kind() == "by_ref" {
        find_child_by_kind(name_node, "variable_name").unwrap_or(name_node)
    } else {
        name_node
    };

    let name = find_child_by_kind(variable, "name")
        .map(|name| node_text(name, source).to_string())
        .unwrap_or_else(|| {
            node_text(variable, source)
                .trim_start_matches(['&', '$'])
                .to_string()
        });

    Some(Parameter {
        name,
        type_ref: node
            .child_by_field_name("type")
            .map(|type_node| type_ref_from_node(type_node, source)),
        default: node
            .child_by_field_name("default_value")
            .map(|value| default_from_node(value, source)),
    })
}

/// Converts a type node into its string form.
fn type_ref_from_node(node: Node<'_>, source: &str) -> TypeRef {
    match node.kind() {
        "optional_type" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .next()
                .map(|inner| type_name(inner, source))
                .unwrap_or_else(|| compact(node_text(node, source).trim_start_matches('?')));
            TypeRef::Nullable(inner)
        }
        "union_type" => TypeRef::Named(join_member_types(node, source, "|")),
        "intersection_type" => TypeRef::Named(join_member_types(node, source, "&")),
        _ => TypeRef::Named(type_name(node, source)),
    }
}

fn join_member_types(node: Node<'_>, source: &str, separator: &str) -> String {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|member| member.kind() != "comment")
        .map(|member| type_ref_from_node(member, source).to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// The string form of a single named or primitive type.
///
/// Fully qualified names render without their leading separator.
fn type_name(node: Node<'_>, source: &str) -> String {
    let text = compact(node_text(node, source));
    match node.kind() {
        "named_type" | "qualified_name" | "name" => text.trim_start_matches('\\').to_string(),
        _ => text,
    }
}

/// Classifies a default value expression.
fn default_from_node(node: Node<'_>, source: &str) -> DefaultValue {
    let text = node_text(node, source);

    match node.kind() {
        "boolean" | "null" | "name" => DefaultValue::Constant(text.trim().to_string()),
        "qualified_name" => {
            DefaultValue::Constant(text.trim().trim_start_matches('\\').to_string())
        }
        "integer" => DefaultValue::Literal(integer_value(text.trim())),
        "float" => DefaultValue::Literal(text.trim().replace('_', "")),
        "string" => DefaultValue::Literal(unescape_single_quoted(strip_quotes(text))),
        "encapsed_string" if is_plain_string(node) => {
            DefaultValue::Literal(strip_quotes(text).to_string())
        }
        kind => DefaultValue::Other {
            category: kind.to_string(),
            source: compact_expression(text),
        },
    }
}

/// The decimal value of an integer literal. Digit separators are dropped
/// and hex, octal and binary forms are converted. Literals that overflow
/// `i64` keep their written digits.
fn integer_value(text: &str) -> String {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        i64::from_str_radix(binary, 2)
    } else if let Some(octal) = lower.strip_prefix("0o") {
        i64::from_str_radix(octal, 8)
    } else if let Some(octal) = lower.strip_prefix('0').filter(|rest| !rest.is_empty()) {
        i64::from_str_radix(octal, 8)
    } else {
        lower.parse::<i64>()
    };

    parsed.map_or(digits, |value| value.to_string())
}

/// Resolves the two escapes a single-quoted string knows, `\'` and `\\`.
fn unescape_single_quoted(text: &str) -> String {
    let mut value = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('\'' | '\\')) => value.push(escaped),
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }

    value
}

/// True for double-quoted strings without interpolation.
fn is_plain_string(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).all(|child| {
        matches!(
            child.kind(),
            "string_content" | "string_value" | "escape_sequence"
        )
    })
}

fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix(['b', 'B'])
        .filter(|rest| rest.starts_with(['\'', '"']))
        .unwrap_or(text);

    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('\'' | '"')), Some(close)) if open == close && text.len() >= 2 => {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

/// Removes all whitespace; type names never need it.
fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapses runs of whitespace so an expression fits on one comment line.
fn compact_expression(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collects the run of comments immediately preceding a declaration.
fn leading_comment(node: Node<'_>, source: &str) -> Option<CommentBlock> {
    let mut first: Option<Node<'_>> = None;
    let mut last: Option<Node<'_>> = None;
    let mut prev = node.prev_sibling();

    while let Some(sibling) = prev {
        if sibling.kind() != "comment" {
            break;
        }
        if last.is_none() {
            last = Some(sibling);
        }
        first = Some(sibling);
        prev = sibling.prev_sibling();
    }

    let (first, last) = (first?, last?);
    let start = range_for_node(first);
    let end = range_for_node(last);

    Some(CommentBlock {
        text: source[first.start_byte()..last.end_byte()].to_string(),
        range: Some(CodeRange {
            start_line: start.start_line,
            start_column: start.start_column,
            end_line: end.end_line,
            end_column: end.end_column,
            start_byte: start.start_byte,
            end_byte: end.end_byte,
        }),
    })
}

/// Returns the whitespace between the start of the line and `byte`, or
/// `None` when something else precedes it on that line.
fn line_indent(source: &str, byte: usize) -> Option<String> {
    let line_start = source[..byte].rfind('\n').map_or(0, |index| index + 1);
    let prefix = &source[line_start..byte];

    prefix
        .chars()
        .all(|c| c == ' ' || c == '\t')
        .then(|| prefix.to_string())
}

fn error_snippet(node: Node<'_>, source: &str) -> String {
    let text = node_text(node, source).trim();
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > 24 {
        let truncated: String = line.chars().take(24).collect();
        format!("{truncated}...")
    } else {
        line.to_string()
    }
}

fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

fn range_for_node(node: Node<'_>) -> CodeRange {
    let start = node.start_position();
    let end = node.end_position();

    CodeRange {
        start_line: start.row.saturating_add(1),
        start_column: start.column.saturating_add(1),
        end_line: end.row.saturating_add(1),
        end_column: end.column.saturating_add(1),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

/// Finds the first child node with the given kind.
fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}
