//! The structural model the parser recovers from a token stream: classes,
//! their pointer members, and the allocations/deallocations/invocations/
//! aliases found in each constructor, destructor, and method body.
//!
//! None of this is a real C++ AST — there's no expression tree, no
//! statement tree, nothing nested beyond "a function has a flat list of
//! these four kinds of fact, in source order." That's all four analyzer
//! rules ever need.

use indexmap::IndexMap;
use leakcheck_util::Span;

/// A class-scoped field declaration with a `*` sigil.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub type_text: String,
    pub is_pointer: bool,
    pub is_array: bool,
    pub line: Span,
}

/// A `new` / `new[]` expression assigned to a named variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub variable: String,
    pub is_array: bool,
    pub line: Span,
}

/// A `delete` / `delete[]` expression targeting a named variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deallocation {
    pub variable: String,
    pub is_array: bool,
    pub line: Span,
}

/// A local `target = source;` assignment between two plain identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerAlias {
    pub target: String,
    pub source: String,
    pub line: Span,
}

/// A constructor, destructor, or method body, reduced to the four kinds of
/// fact the analyzer cares about, in source order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Function {
    pub name: String,
    pub is_destructor: bool,
    pub start_line: Span,
    pub end_line: Span,
    pub allocations: Vec<Allocation>,
    pub deallocations: Vec<Deallocation>,
    pub invocations: Vec<String>,
    pub aliases: Vec<PointerAlias>,
}

impl Function {
    pub fn new(name: impl Into<String>, is_destructor: bool, start_line: Span) -> Self {
        Self {
            name: name.into(),
            is_destructor,
            start_line,
            end_line: start_line,
            ..Default::default()
        }
    }

    /// True for a declaration with no recovered body at all (e.g. `~Foo();`
    /// inside a class body — see §4.2.4).
    pub fn is_declaration_only(&self) -> bool {
        self.allocations.is_empty()
            && self.deallocations.is_empty()
            && self.invocations.is_empty()
            && self.aliases.is_empty()
            && self.start_line == self.end_line
    }
}

/// One class record, as recovered from a single file. The registry merges
/// same-named records from multiple files into one of these before analysis
/// sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub file: String,
    pub start_line: Span,
    pub end_line: Span,
    pub members: Vec<Member>,
    pub constructor: Option<Function>,
    pub destructor: Option<Function>,
    pub methods: IndexMap<String, Function>,
}

impl Class {
    pub fn new(name: impl Into<String>, file: impl Into<String>, start_line: Span) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            start_line,
            end_line: start_line,
            members: Vec::new(),
            constructor: None,
            destructor: None,
            methods: IndexMap::new(),
        }
    }

    /// A placeholder record for a class whose body was never seen in this
    /// file — created when an out-of-class definition (`Class::method`)
    /// shows up before (or without) a matching in-class declaration.
    pub fn placeholder(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self::new(name, file, Span::START)
    }
}
