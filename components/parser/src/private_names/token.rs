//! Scanning rule for `#name`

use crate::lexer::{Lexer, Token};
use core_types::JsError;

/// Scan `#` and the identifier word after it as one [`Token::PrivateName`].
///
/// Anything other than an identifier character after the `#` (whitespace, a
/// comment, punctuation) leaves the name empty; the grammar rejects it.
pub fn private_name_rule(ch: char, lexer: &mut Lexer) -> Option<Result<Token, JsError>> {
    if ch != '#' {
        return None;
    }
    lexer.bump();
    Some(lexer.read_word().map(Token::PrivateName))
}
