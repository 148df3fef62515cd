use loopguard_core::{GuardConfig, Result, Snippet};
use tracing::debug;

use crate::transform::transform;

/// Pipeline boundary: guard one snippet record.
///
/// Snippets in a language this engine does not transform pass through
/// untouched. The returned record keeps the incoming `lang` and `test`
/// metadata; on parse fallback it carries the original code.
pub fn guard_snippet(snippet: &Snippet, config: &GuardConfig) -> Result<Snippet> {
    if !snippet.is_guardable_lang() {
        debug!(lang = %snippet.lang, "loop guard: snippet language not applicable");
        return Ok(snippet.clone());
    }
    let outcome = transform(&snippet.code, config)?;
    Ok(Snippet {
        code: outcome.into_code(),
        lang: snippet.lang.clone(),
        test: snippet.test,
    })
}
