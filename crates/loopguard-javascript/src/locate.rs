use loopguard_core::{LoopKind, LoopKindSet, LoopSite};
use swc_ecma_ast::{Program, Stmt};

/// Classify a statement as one of the six guarded loop constructs.
pub fn classify(stmt: &Stmt) -> Option<LoopKind> {
    match stmt {
        Stmt::For(_) => Some(LoopKind::For),
        Stmt::While(_) => Some(LoopKind::While),
        Stmt::DoWhile(_) => Some(LoopKind::DoWhile),
        Stmt::ForIn(_) => Some(LoopKind::ForIn),
        Stmt::ForOf(for_of) if for_of.is_await => Some(LoopKind::ForAwaitOf),
        Stmt::ForOf(_) => Some(LoopKind::ForOf),
        _ => None,
    }
}

/// Locate every loop of the enabled kinds, in discovery order.
///
/// The walk is a single pre-order traversal descending into nested scopes
/// (function bodies inside loops, loops inside functions, class members),
/// so outer loops are numbered before inner ones. Excluded kinds are not
/// reported but are still descended into.
pub fn locate(program: &Program, kinds: &LoopKindSet) -> Vec<LoopSite> {
    // The walker is shared with the injector and wants a mutable tree;
    // in dry-run mode it records sites without editing, so a scratch
    // clone keeps this entry point read-only.
    let mut scratch = program.clone();
    crate::inject::scan(&mut scratch, kinds)
}
