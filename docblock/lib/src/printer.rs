//! Format-preserving printer.
//!
//! The original text is the baseline: every byte is copied through
//! unchanged, and only comments that exist in the modified unit but not
//! in the original one are spliced in, in front of their declaration.

use std::path::Path;

use crate::error::DocBlockError;
use crate::shared::{LineEnding, MethodDeclaration, SourceUnit};

/// Prints `modified` against the `original` unit and its source text.
///
/// ## Errors
/// Returns [`DocBlockError::TreeMismatch`] when the two units do not
/// describe the same declarations.
pub fn print_preserving(
    path: &Path,
    source: &str,
    original: &SourceUnit,
    modified: &SourceUnit,
) -> Result<String, DocBlockError> {
    let mismatch = || DocBlockError::TreeMismatch {
        path: path.to_path_buf(),
        original: original.methods.len(),
        modified: modified.methods.len(),
    };

    if original.methods.len() != modified.methods.len() {
        return Err(mismatch());
    }

    let mut insertions: Vec<(usize, String)> = Vec::new();
    for (before, after) in original.methods.iter().zip(&modified.methods) {
        if before.range != after.range {
            return Err(mismatch());
        }

        if before.leading_comment.is_some() {
            continue;
        }

        if let Some(comment) = &after.leading_comment {
            let text = layout_comment(&comment.text, after, original.line_ending);
            insertions.push((after.range.start_byte, text));
        }
    }

    if insertions.is_empty() {
        return Ok(source.to_string());
    }

    insertions.sort_by_key(|(offset, _)| *offset);

    let extra: usize = insertions.iter().map(|(_, text)| text.len()).sum();
    let mut output = String::with_capacity(source.len() + extra);
    let mut cursor = 0;

    for (offset, text) in insertions {
        if offset > source.len() || offset < cursor {
            return Err(mismatch());
        }
        output.push_str(&source[cursor..offset]);
        output.push_str(&text);
        cursor = offset;
    }
    output.push_str(&source[cursor..]);

    Ok(output)
}

/// Lays out a comment so it sits on its own lines in front of `method`.
///
/// When the declaration starts its line, every comment line after the
/// first is indented to match and the declaration's original indentation
/// is reproduced after the comment. Otherwise the comment is wrapped in
/// line breaks.
fn layout_comment(text: &str, method: &MethodDeclaration, line_ending: LineEnding) -> String {
    let eol = line_ending.as_str();

    match &method.indent {
        Some(indent) => {
            let separator = format!("{eol}{indent}");
            let mut laid_out = text.lines().collect::<Vec<_>>().join(&separator);
            laid_out.push_str(&separator);
            laid_out
        }
        None => {
            let body = text.lines().collect::<Vec<_>>().join(eol);
            format!("{eol}{body}{eol}")
        }
    }
}
