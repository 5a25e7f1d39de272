//! The fixed keyword set. A larger C++ lexer would generate this from a
//! token-definition table; this one just lists it, since the tolerant
//! parser only ever looks for a handful of these by name anyway.

pub const KEYWORDS: &[&str] = &[
    "class", "struct", "public", "private", "protected", "new", "delete",
    "virtual", "const", "static", "void", "int", "char", "float", "double",
    "bool", "long", "short", "unsigned", "signed", "if", "else", "for",
    "while", "do", "return", "nullptr", "NULL", "this", "template",
    "typename", "namespace", "using",
];

#[inline]
pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}
