//! Parser configuration
//!
//! Options can be built in code or deserialized from a (possibly partial)
//! JSON object; missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Whether reserved words may be used where identifiers are expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowReserved {
    /// Reserved words are tolerated as property names
    #[default]
    Yes,
    /// Reserved words are rejected as binding names
    No,
    /// Reserved words are rejected everywhere, private names included
    Never,
}

/// Script or module goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Classic script, sloppy mode unless a directive says otherwise
    #[default]
    Script,
    /// Module, always strict
    Module,
}

/// Options controlling a parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// ECMAScript version, as an edition number (8) or a year (2017)
    pub ecma_version: u32,
    /// Reserved-word policy
    pub allow_reserved: AllowReserved,
    /// Script or module
    pub source_type: SourceType,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            ecma_version: 2018,
            allow_reserved: AllowReserved::Yes,
            source_type: SourceType::Script,
        }
    }
}

impl ParserOptions {
    /// Edition number, with year forms (2015 and later) normalized
    pub fn ecma_edition(&self) -> u32 {
        if self.ecma_version >= 2015 {
            self.ecma_version - 2009
        } else {
            self.ecma_version
        }
    }

    /// Private class elements need edition 8 or later
    pub fn supports_private_names(&self) -> bool {
        self.ecma_edition() >= 8
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with",
];

const STRICT_RESERVED_WORDS: &[&str] = &[
    "implements", "interface", "let", "package", "private", "protected", "public", "static",
    "yield",
];

/// Message rejecting `name` as an identifier, or `None` when it is allowed.
///
/// Keywords are always rejected; `enum` and, in strict code, the strict
/// reserved words are reported as reserved. Module code also reserves `await`.
pub fn reserved_word_message(name: &str, strict: bool, source_type: SourceType) -> Option<String> {
    if KEYWORDS.contains(&name) {
        return Some(format!("Unexpected keyword '{}'", name));
    }
    if name == "await" && source_type == SourceType::Module {
        return Some("Cannot use keyword 'await' outside an async function".to_string());
    }
    if name == "enum" || (strict && STRICT_RESERVED_WORDS.contains(&name)) {
        return Some(format!("The keyword '{}' is reserved", name));
    }
    None
}
