pub mod diagnostic;
pub mod syntax;

pub use diagnostic::*;
pub use syntax::*;
