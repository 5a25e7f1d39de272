//! leakcheck-par - The permissive class/function skeleton parser.
//!
//! Consumes the token stream produced by `leakcheck-lex` and recovers a flat
//! structural model of classes, their pointer members, and the
//! allocation/deallocation/invocation/alias facts found in each
//! constructor, destructor, and method body. It does not build a real
//! expression or statement AST — the analyzer downstream never needs one.

mod model;
mod parser;

pub use model::{Allocation, Class, Deallocation, Function, Member, PointerAlias};
pub use parser::parse_source;
