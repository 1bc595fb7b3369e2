use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::CodeRange;

/// A syntax diagnostic derived from parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDiagnostic {
    pub message: String,
    pub range: CodeRange,
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} on line {}, column {}",
            self.message, self.range.start_line, self.range.start_column
        )
    }
}
