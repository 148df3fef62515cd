use pretty_assertions::assert_eq;
use swc_ecma_ast::{Program, Stmt};

use loopguard_core::{GuardConfig, LoopKind, LoopKindSet, LoopSite};

use crate::transform::transform;
use crate::{locate, parser};

fn script_body(program: &Program) -> &[Stmt] {
    match program {
        Program::Script(script) => &script.body,
        Program::Module(_) => panic!("expected a script"),
    }
}

fn guarded_code(source: &str) -> String {
    let outcome = transform(source, &GuardConfig::default()).expect("default config is valid");
    assert!(outcome.is_guarded(), "expected guarded outcome");
    outcome.into_code()
}

fn reparse(code: &str) -> Program {
    parser::parse(code).expect("generated code should parse")
}

#[test]
fn parse_accepts_empty_and_whitespace_input() {
    let program = parser::parse("").expect("empty input is a valid program");
    assert!(script_body(&program).is_empty());

    let program = parser::parse("  \n\t ").expect("whitespace input is a valid program");
    assert!(script_body(&program).is_empty());
}

#[test]
fn parse_rejects_malformed_input() {
    assert!(parser::parse("for (let i = 0 i < 10; i++) {}").is_err());
    assert!(parser::parse("while (").is_err());
}

#[test]
fn classify_covers_all_loop_statements() {
    let cases = [
        ("for (let i = 0; i < 3; i++) { a(); }", LoopKind::For),
        ("while (ready()) { a(); }", LoopKind::While),
        ("do { a(); } while (ready());", LoopKind::DoWhile),
        ("for (const item of items) { a(item); }", LoopKind::ForOf),
        ("for (const key in table) { a(key); }", LoopKind::ForIn),
    ];
    for (source, expected) in cases {
        let program = parser::parse(source).expect("valid loop");
        let kind = locate::classify(&script_body(&program)[0]);
        assert_eq!(kind, Some(expected), "classifying {source}");
    }

    let program = parser::parse("const x = f();").expect("valid statement");
    assert_eq!(locate::classify(&script_body(&program)[0]), None);
}

#[test]
fn locate_numbers_loops_in_preorder() {
    let source = "while (a) { for (;;) { b(); } } do { c(); } while (d);";
    let program = parser::parse(source).expect("valid source");
    let sites = locate::locate(&program, &LoopKindSet::all());
    assert_eq!(
        sites,
        vec![
            LoopSite { order: 1, kind: LoopKind::While },
            LoopSite { order: 2, kind: LoopKind::For },
            LoopSite { order: 3, kind: LoopKind::DoWhile },
        ]
    );
}

#[test]
fn locate_descends_through_functions_and_classes() {
    let source = r#"
        function outer() {
            for (const x of xs) {
                const inner = () => { while (x) { tick(); } };
            }
        }
        class Worker {
            run() { do { step(); } while (busy()); }
        }
    "#;
    let program = parser::parse(source).expect("valid source");
    let sites = locate::locate(&program, &LoopKindSet::all());
    let kinds: Vec<_> = sites.iter().map(|site| site.kind).collect();
    assert_eq!(kinds, vec![LoopKind::ForOf, LoopKind::While, LoopKind::DoWhile]);
    assert_eq!(sites[0].order, 1);
    assert_eq!(sites[2].order, 3);
}

#[test]
fn locate_classifies_for_await_separately() {
    let source = "async function drain(s) { for await (const chunk of s) { use(chunk); } }";
    let program = parser::parse(source).expect("valid source");
    let sites = locate::locate(&program, &LoopKindSet::all());
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].kind, LoopKind::ForAwaitOf);

    // A plain for-of set does not match for-await-of.
    let only_for_of = LoopKindSet::of([LoopKind::ForOf]);
    assert!(locate::locate(&program, &only_for_of).is_empty());
}

#[test]
fn locate_skips_disabled_kinds_but_still_descends() {
    let source = "for (;;) { while (a) { b(); } }";
    let program = parser::parse(source).expect("valid source");
    let sites = locate::locate(&program, &LoopKindSet::of([LoopKind::While]));
    assert_eq!(
        sites,
        vec![LoopSite { order: 1, kind: LoopKind::While }]
    );
}

#[test]
fn single_statement_while_body_becomes_a_block() {
    let code = guarded_code("while (flag) step();");
    let program = reparse(&code);
    let body = script_body(&program);
    assert!(matches!(body[0], Stmt::Decl(_)), "counter declared first");
    let Stmt::While(while_stmt) = &body[1] else {
        panic!("expected the while loop second");
    };
    let Stmt::Block(block) = &*while_stmt.body else {
        panic!("expected block-wrapped body");
    };
    // increment, threshold check, original statement
    assert_eq!(block.stmts.len(), 3);
}

#[test]
fn empty_loop_body_becomes_two_statement_block() {
    let code = guarded_code("while (poll());");
    let program = reparse(&code);
    let Stmt::While(while_stmt) = &script_body(&program)[1] else {
        panic!("expected the while loop second");
    };
    let Stmt::Block(block) = &*while_stmt.body else {
        panic!("expected block-wrapped body");
    };
    assert_eq!(block.stmts.len(), 2);
}

#[test]
fn labels_stay_attached_to_their_loop() {
    let code = guarded_code("outer: for (;;) { break outer; }");
    assert!(code.contains("loopGuard_1"));
    let program = reparse(&code);
    let body = script_body(&program);
    assert!(matches!(body[0], Stmt::Decl(_)), "counter declared before the label");
    let Stmt::Labeled(labeled) = &body[1] else {
        panic!("expected labeled statement to survive");
    };
    assert_eq!(&*labeled.label.sym, "outer");
    assert!(matches!(&*labeled.body, Stmt::For(_)));
}

#[test]
fn loop_as_if_branch_is_wrapped_with_its_counter() {
    let code = guarded_code("if (cond) while (flag) tick();");
    let program = reparse(&code);
    let Stmt::If(if_stmt) = &script_body(&program)[0] else {
        panic!("expected if statement");
    };
    let Stmt::Block(cons) = &*if_stmt.cons else {
        panic!("expected block-wrapped consequent");
    };
    assert_eq!(cons.stmts.len(), 2);
    assert!(matches!(cons.stmts[0], Stmt::Decl(_)));
    assert!(matches!(cons.stmts[1], Stmt::While(_)));
}

#[test]
fn module_input_is_guarded_too() {
    let code = guarded_code("export function f(xs) { for (const x of xs) { g(x); } }");
    assert!(code.contains("loopGuard_1++"));
    assert!(code.contains("loopGuard_1 > 1000"));
}

#[test]
fn arrow_bodies_are_visited() {
    let code = guarded_code("const spin = () => { while (a) { b(); } };");
    assert!(code.contains("loopGuard_1++"));
}
