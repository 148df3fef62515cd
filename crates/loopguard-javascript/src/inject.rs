use loopguard_core::{GuardConfig, LoopKind, LoopKindSet, LoopSite};
use swc_ecma_ast::{
    BinExpr, BinaryOp, BindingIdent, BlockStmt, BlockStmtOrExpr, Callee, Class, ClassMember, Decl,
    DefaultDecl, EmptyStmt, Expr, ExprOrSpread, ExprStmt, Function, Ident, IfStmt, Lit,
    MemberProp, ModuleDecl, ModuleItem, NewExpr, Number, OptChainBase, Pat, Program, Prop,
    PropName, PropOrSpread, Stmt, Str, ThrowStmt, UpdateExpr, UpdateOp, VarDecl, VarDeclKind,
    VarDeclOrExpr, VarDeclarator,
};
use swc_ecma_quote::swc_common::DUMMY_SP;

use crate::locate::classify;

/// Inject a guard into every enabled loop, in place, and report the
/// guarded sites in discovery order.
///
/// For each loop this declares `var loopGuard_<n> = 0;` immediately
/// before the loop in its enclosing scope, normalizes a non-block body
/// to a block, and prepends the counter increment plus the threshold
/// check so they run before any original body logic on every iteration.
/// Already-guarded input is not detected: a fresh, independently
/// numbered set of guards is always added.
pub fn inject(program: &mut Program, config: &GuardConfig) -> Vec<LoopSite> {
    let mut walker = GuardWalker::new(config.loops.clone(), Some(config.max));
    walker.walk_program(program);
    walker.sites
}

/// Locate-only walk over the same traversal: records sites, edits nothing.
pub(crate) fn scan(program: &mut Program, kinds: &LoopKindSet) -> Vec<LoopSite> {
    let mut walker = GuardWalker::new(kinds.clone(), None);
    walker.walk_program(program);
    walker.sites
}

struct Guard {
    ident: Ident,
    max: u32,
}

/// Per-invocation walk context. The discovery-order counter lives here,
/// never in module state, so concurrent invocations cannot interleave.
struct GuardWalker {
    enabled: LoopKindSet,
    // None puts the walker in locate-only mode.
    max: Option<u32>,
    next_order: u32,
    sites: Vec<LoopSite>,
}

impl GuardWalker {
    fn new(enabled: LoopKindSet, max: Option<u32>) -> Self {
        Self {
            enabled,
            max,
            next_order: 1,
            sites: Vec::new(),
        }
    }

    fn walk_program(&mut self, program: &mut Program) {
        match program {
            Program::Module(module) => self.walk_module_items(&mut module.body),
            Program::Script(script) => self.walk_stmts(&mut script.body),
        }
    }

    fn walk_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        let mut i = 0;
        while i < items.len() {
            let counter = match &mut items[i] {
                ModuleItem::Stmt(stmt) => self.walk_list_entry(stmt),
                ModuleItem::ModuleDecl(decl) => {
                    self.walk_module_decl(decl);
                    None
                }
            };
            if let Some(decl) = counter {
                items.insert(i, ModuleItem::Stmt(decl));
                i += 1;
            }
            i += 1;
        }
    }

    fn walk_module_decl(&mut self, decl: &mut ModuleDecl) {
        match decl {
            ModuleDecl::ExportDecl(export) => self.walk_decl(&mut export.decl),
            ModuleDecl::ExportDefaultDecl(export) => match &mut export.decl {
                DefaultDecl::Fn(fn_expr) => self.walk_function(&mut fn_expr.function),
                DefaultDecl::Class(class_expr) => self.walk_class(&mut class_expr.class),
                DefaultDecl::TsInterfaceDecl(_) => {}
            },
            ModuleDecl::ExportDefaultExpr(export) => self.walk_expr(&mut export.expr),
            _ => {}
        }
    }

    fn walk_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        let mut i = 0;
        while i < stmts.len() {
            if let Some(decl) = self.walk_list_entry(&mut stmts[i]) {
                stmts.insert(i, decl);
                i += 1;
            }
            i += 1;
        }
    }

    /// Walk one statement-list entry. Returns the counter declaration to
    /// insert before the entry when it is (possibly behind a label chain)
    /// a loop that received a guard. Labels stay attached to the loop so
    /// `continue label` keeps working.
    fn walk_list_entry(&mut self, stmt: &mut Stmt) -> Option<Stmt> {
        if let Stmt::Labeled(labeled) = stmt {
            return self.walk_list_entry(&mut labeled.body);
        }
        match classify(stmt) {
            Some(kind) => self.walk_loop(stmt, kind),
            None => {
                self.walk_stmt(stmt);
                None
            }
        }
    }

    /// Walk a statement in a non-list position (an `if` branch, the
    /// single-statement body of an excluded loop). A guarded loop here
    /// has no enclosing list to hold its counter declaration, so loop
    /// and declaration are wrapped together in a block.
    fn walk_child_stmt(&mut self, stmt: &mut Stmt) {
        if let Some(decl) = self.walk_list_entry(stmt) {
            let guarded = std::mem::replace(stmt, Stmt::Empty(EmptyStmt { span: DUMMY_SP }));
            *stmt = Stmt::Block(BlockStmt {
                span: DUMMY_SP,
                stmts: vec![decl, guarded],
            });
        }
    }

    /// Visit one loop. Discovery order is allocated before descending,
    /// so an outer loop is always numbered ahead of the loops inside it.
    fn walk_loop(&mut self, stmt: &mut Stmt, kind: LoopKind) -> Option<Stmt> {
        let site = if self.enabled.contains(kind) {
            let site = LoopSite {
                order: self.next_order,
                kind,
            };
            self.next_order += 1;
            self.sites.push(site);
            Some(site)
        } else {
            None
        };
        let guard = match (site, self.max) {
            (Some(site), Some(max)) => Some(Guard {
                ident: new_ident(&site.guard_name()),
                max,
            }),
            _ => None,
        };

        match stmt {
            Stmt::While(s) => {
                self.walk_expr(&mut s.test);
                self.walk_loop_body(&mut s.body, guard.as_ref());
            }
            Stmt::DoWhile(s) => {
                self.walk_expr(&mut s.test);
                self.walk_loop_body(&mut s.body, guard.as_ref());
            }
            Stmt::For(s) => {
                match &mut s.init {
                    Some(VarDeclOrExpr::VarDecl(var)) => self.walk_var_decl(var),
                    Some(VarDeclOrExpr::Expr(expr)) => self.walk_expr(expr),
                    None => {}
                }
                if let Some(test) = &mut s.test {
                    self.walk_expr(test);
                }
                if let Some(update) = &mut s.update {
                    self.walk_expr(update);
                }
                self.walk_loop_body(&mut s.body, guard.as_ref());
            }
            Stmt::ForIn(s) => {
                self.walk_expr(&mut s.right);
                self.walk_loop_body(&mut s.body, guard.as_ref());
            }
            Stmt::ForOf(s) => {
                self.walk_expr(&mut s.right);
                self.walk_loop_body(&mut s.body, guard.as_ref());
            }
            _ => {}
        }

        guard.map(|guard| counter_decl(&guard.ident))
    }

    fn walk_loop_body(&mut self, body: &mut Box<Stmt>, guard: Option<&Guard>) {
        if guard.is_some() {
            ensure_block(body);
        }
        match &mut **body {
            Stmt::Block(block) => {
                self.walk_stmts(&mut block.stmts);
                if let Some(guard) = guard {
                    // Prepended after the descent so the walk only ever
                    // sees original body statements.
                    block.stmts.insert(0, threshold_check(&guard.ident, guard.max));
                    block.stmts.insert(0, counter_increment(&guard.ident));
                }
            }
            other => self.walk_child_stmt(other),
        }
    }

    fn walk_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Block(block) => self.walk_stmts(&mut block.stmts),
            Stmt::If(s) => {
                self.walk_expr(&mut s.test);
                self.walk_child_stmt(&mut s.cons);
                if let Some(alt) = &mut s.alt {
                    self.walk_child_stmt(alt);
                }
            }
            Stmt::Switch(s) => {
                self.walk_expr(&mut s.discriminant);
                for case in &mut s.cases {
                    if let Some(test) = &mut case.test {
                        self.walk_expr(test);
                    }
                    self.walk_stmts(&mut case.cons);
                }
            }
            Stmt::Try(s) => {
                self.walk_stmts(&mut s.block.stmts);
                if let Some(handler) = &mut s.handler {
                    self.walk_stmts(&mut handler.body.stmts);
                }
                if let Some(finalizer) = &mut s.finalizer {
                    self.walk_stmts(&mut finalizer.stmts);
                }
            }
            Stmt::With(s) => {
                self.walk_expr(&mut s.obj);
                self.walk_child_stmt(&mut s.body);
            }
            Stmt::Return(s) => {
                if let Some(arg) = &mut s.arg {
                    self.walk_expr(arg);
                }
            }
            Stmt::Throw(s) => self.walk_expr(&mut s.arg),
            Stmt::Expr(s) => self.walk_expr(&mut s.expr),
            Stmt::Decl(decl) => self.walk_decl(decl),
            _ => {}
        }
    }

    fn walk_decl(&mut self, decl: &mut Decl) {
        match decl {
            Decl::Fn(fn_decl) => self.walk_function(&mut fn_decl.function),
            Decl::Class(class_decl) => self.walk_class(&mut class_decl.class),
            Decl::Var(var) => self.walk_var_decl(var),
            _ => {}
        }
    }

    fn walk_var_decl(&mut self, var: &mut VarDecl) {
        for decl in &mut var.decls {
            if let Some(init) = &mut decl.init {
                self.walk_expr(init);
            }
        }
    }

    fn walk_function(&mut self, function: &mut Function) {
        if let Some(body) = &mut function.body {
            self.walk_stmts(&mut body.stmts);
        }
    }

    fn walk_class(&mut self, class: &mut Class) {
        if let Some(super_class) = &mut class.super_class {
            self.walk_expr(super_class);
        }
        for member in &mut class.body {
            match member {
                ClassMember::Constructor(ctor) => {
                    if let Some(body) = &mut ctor.body {
                        self.walk_stmts(&mut body.stmts);
                    }
                }
                ClassMember::Method(method) => self.walk_function(&mut method.function),
                ClassMember::PrivateMethod(method) => self.walk_function(&mut method.function),
                ClassMember::ClassProp(prop) => {
                    if let Some(value) = &mut prop.value {
                        self.walk_expr(value);
                    }
                }
                ClassMember::PrivateProp(prop) => {
                    if let Some(value) = &mut prop.value {
                        self.walk_expr(value);
                    }
                }
                ClassMember::StaticBlock(block) => self.walk_stmts(&mut block.body.stmts),
                _ => {}
            }
        }
    }

    /// Descend through the expression positions that can carry loops
    /// (function and arrow bodies, class members) or reach them. Exotic
    /// forms fall through the catch-all and are left alone.
    fn walk_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Fn(fn_expr) => self.walk_function(&mut fn_expr.function),
            Expr::Arrow(arrow) => match &mut *arrow.body {
                BlockStmtOrExpr::BlockStmt(block) => self.walk_stmts(&mut block.stmts),
                BlockStmtOrExpr::Expr(expr) => self.walk_expr(expr),
            },
            Expr::Class(class_expr) => self.walk_class(&mut class_expr.class),
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &mut call.callee {
                    self.walk_expr(callee);
                }
                for arg in &mut call.args {
                    self.walk_expr(&mut arg.expr);
                }
            }
            Expr::New(new) => {
                self.walk_expr(&mut new.callee);
                if let Some(args) = &mut new.args {
                    for arg in args {
                        self.walk_expr(&mut arg.expr);
                    }
                }
            }
            Expr::Member(member) => {
                self.walk_expr(&mut member.obj);
                if let MemberProp::Computed(computed) = &mut member.prop {
                    self.walk_expr(&mut computed.expr);
                }
            }
            Expr::OptChain(chain) => match &mut *chain.base {
                OptChainBase::Member(member) => {
                    self.walk_expr(&mut member.obj);
                    if let MemberProp::Computed(computed) = &mut member.prop {
                        self.walk_expr(&mut computed.expr);
                    }
                }
                OptChainBase::Call(call) => {
                    self.walk_expr(&mut call.callee);
                    for arg in &mut call.args {
                        self.walk_expr(&mut arg.expr);
                    }
                }
            },
            Expr::Bin(bin) => {
                self.walk_expr(&mut bin.left);
                self.walk_expr(&mut bin.right);
            }
            Expr::Unary(unary) => self.walk_expr(&mut unary.arg),
            Expr::Update(update) => self.walk_expr(&mut update.arg),
            Expr::Assign(assign) => self.walk_expr(&mut assign.right),
            Expr::Cond(cond) => {
                self.walk_expr(&mut cond.test);
                self.walk_expr(&mut cond.cons);
                self.walk_expr(&mut cond.alt);
            }
            Expr::Seq(seq) => {
                for expr in &mut seq.exprs {
                    self.walk_expr(expr);
                }
            }
            Expr::Paren(paren) => self.walk_expr(&mut paren.expr),
            Expr::Await(await_expr) => self.walk_expr(&mut await_expr.arg),
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &mut yield_expr.arg {
                    self.walk_expr(arg);
                }
            }
            Expr::Array(array) => {
                for elem in array.elems.iter_mut().flatten() {
                    self.walk_expr(&mut elem.expr);
                }
            }
            Expr::Object(object) => {
                for prop in &mut object.props {
                    self.walk_prop(prop);
                }
            }
            Expr::Tpl(tpl) => {
                for expr in &mut tpl.exprs {
                    self.walk_expr(expr);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.walk_expr(&mut tagged.tag);
                for expr in &mut tagged.tpl.exprs {
                    self.walk_expr(expr);
                }
            }
            _ => {}
        }
    }

    fn walk_prop(&mut self, prop: &mut PropOrSpread) {
        match prop {
            PropOrSpread::Spread(spread) => self.walk_expr(&mut spread.expr),
            PropOrSpread::Prop(prop) => match &mut **prop {
                Prop::KeyValue(kv) => {
                    if let PropName::Computed(computed) = &mut kv.key {
                        self.walk_expr(&mut computed.expr);
                    }
                    self.walk_expr(&mut kv.value);
                }
                Prop::Getter(getter) => {
                    if let Some(body) = &mut getter.body {
                        self.walk_stmts(&mut body.stmts);
                    }
                }
                Prop::Setter(setter) => {
                    if let Some(body) = &mut setter.body {
                        self.walk_stmts(&mut body.stmts);
                    }
                }
                Prop::Method(method) => self.walk_function(&mut method.function),
                Prop::Assign(assign) => self.walk_expr(&mut assign.value),
                Prop::Shorthand(_) => {}
            },
        }
    }
}

/// Normalize a single-statement or empty loop body into a block body so
/// the injected statements have a home.
fn ensure_block(body: &mut Box<Stmt>) {
    if matches!(&**body, Stmt::Block(_)) {
        return;
    }
    let original = std::mem::replace(&mut **body, Stmt::Empty(EmptyStmt { span: DUMMY_SP }));
    let stmts = match original {
        Stmt::Empty(_) => Vec::new(),
        other => vec![other],
    };
    **body = Stmt::Block(BlockStmt {
        span: DUMMY_SP,
        stmts,
    });
}

fn new_ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP)
}

fn number(value: f64) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    }))
}

/// `var loopGuard_<n> = 0;` — `var`, not `let`, so that re-guarding
/// already-guarded output never redeclares a binding in the same scope.
fn counter_decl(ident: &Ident) -> Stmt {
    Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        kind: VarDeclKind::Var,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: ident.clone(),
                type_ann: None,
            }),
            init: Some(Box::new(number(0.0))),
            definite: false,
        }],
    })))
}

/// `loopGuard_<n>++;`
fn counter_increment(ident: &Ident) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Update(UpdateExpr {
            span: DUMMY_SP,
            op: UpdateOp::PlusPlus,
            prefix: false,
            arg: Box::new(Expr::Ident(ident.clone())),
        })),
    })
}

/// `if (loopGuard_<n> > <max>) { throw new RangeError("..."); }`
fn threshold_check(ident: &Ident, max: u32) -> Stmt {
    let message = format!("{} is greater than {}", ident.sym, max);
    let throw = Stmt::Throw(ThrowStmt {
        span: DUMMY_SP,
        arg: Box::new(Expr::New(NewExpr {
            span: DUMMY_SP,
            callee: Box::new(Expr::Ident(new_ident("RangeError"))),
            args: Some(vec![ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Lit(Lit::Str(Str {
                    span: DUMMY_SP,
                    value: message.into(),
                    raw: None,
                }))),
            }]),
            type_args: None,
        })),
    });
    Stmt::If(IfStmt {
        span: DUMMY_SP,
        test: Box::new(Expr::Bin(BinExpr {
            span: DUMMY_SP,
            op: BinaryOp::Gt,
            left: Box::new(Expr::Ident(ident.clone())),
            right: Box::new(number(f64::from(max))),
        })),
        cons: Box::new(Stmt::Block(BlockStmt {
            span: DUMMY_SP,
            stmts: vec![throw],
        })),
        alt: None,
    })
}
