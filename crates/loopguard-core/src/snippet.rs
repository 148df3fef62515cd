use serde::{Deserialize, Serialize};

/// One snippet record exchanged with the surrounding pipeline.
///
/// `lang` gates whether the transform applies at all; `test` is opaque
/// metadata carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub code: String,
    pub lang: String,
    #[serde(default)]
    pub test: bool,
}

impl Snippet {
    pub fn new(code: impl Into<String>, lang: impl Into<String>, test: bool) -> Self {
        Self {
            code: code.into(),
            lang: lang.into(),
            test,
        }
    }

    /// Whether `lang` names the C-family scripting dialect this engine
    /// transforms.
    pub fn is_guardable_lang(&self) -> bool {
        const GUARDABLE: &[&str] = &["js", "javascript", "jsx", "ecmascript"];
        GUARDABLE
            .iter()
            .any(|lang| self.lang.eq_ignore_ascii_case(lang))
    }
}
