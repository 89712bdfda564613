use serde::{Deserialize, Serialize};

/// A Lex (V1) bot associated with a contact-center instance.
///
/// The pair `(name, lex_region)` is unique within one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexBot {
    pub name: String,
    pub lex_region: String,
}

impl LexBot {
    pub fn new(name: impl Into<String>, lex_region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lex_region: lex_region.into(),
        }
    }
}
