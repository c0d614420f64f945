//! Sema phase - name resolution and type checking.

use std::collections::HashSet;

use eyre::Result;
use indexmap::IndexMap;
use strata_core::SourceFile;
use strata_syntax::{
    BinaryOp, Expr, ExprKind, FnDecl, Ident, Item, LetDecl, SourceUnit, TypeExpr, UnaryOp,
};

use crate::{
    CompilerInstance, Diagnostic, DiagnosticLocation, Phase,
    decl::{Decl, DeclKind, TypedExpr, TypedExprKind},
    phase::fail_on_errors,
    types::{Type, TypeId, TypeTable},
};

const PHASE: &str = "sema";

/// Phase that checks the parsed units and fills the declaration table.
///
/// Declarations are collected first, so functions may call functions declared
/// later in any file. Globals are checked in source order and may only read
/// globals declared before them.
pub struct SemaPhase;

impl Phase for SemaPhase {
    fn name(&self) -> &'static str {
        PHASE
    }

    fn description(&self) -> &'static str {
        "Resolve names and check types"
    }

    fn run(&self, instance: &mut CompilerInstance) -> Result<()> {
        let ctx = &mut *instance.context;

        let mut checker = Checker {
            sources: &ctx.sources,
            types: &mut ctx.types,
            decls: IndexMap::new(),
            diagnostics: Vec::new(),
            pending: HashSet::new(),
            poisoned: HashSet::new(),
        };
        checker.check_units(&ctx.units);

        let Checker {
            mut decls,
            diagnostics,
            ..
        } = checker;
        decls.sort_by(|_, a, _, b| a.order.cmp(&b.order));
        ctx.decls = decls;
        ctx.diagnostics.extend(diagnostics);

        fail_on_errors(PHASE, ctx)
    }
}

enum Scope<'s> {
    Global,
    Function(&'s [(String, TypeId)]),
}

struct Checker<'a> {
    sources: &'a [SourceFile],
    types: &'a mut TypeTable,
    decls: IndexMap<String, Decl>,
    diagnostics: Vec<Diagnostic>,
    /// Globals declared but not checked yet.
    pending: HashSet<String>,
    /// Declarations that failed; their uses are not reported again.
    poisoned: HashSet<String>,
}

struct Signature<'u> {
    file: usize,
    decl: &'u FnDecl,
    params: Vec<(String, TypeId)>,
    ret: TypeId,
}

impl Checker<'_> {
    fn check_units(&mut self, units: &[SourceUnit]) {
        let mut seen = HashSet::new();
        let mut globals = Vec::new();
        let mut functions = Vec::new();
        let items = units
            .iter()
            .enumerate()
            .flat_map(|(file, unit)| unit.items.iter().map(move |item| (file, item)));

        for (order, (file, item)) in items.enumerate() {
            let name = item.name();
            if !seen.insert(name.name.as_str()) {
                self.error(
                    file,
                    name.span.start,
                    format!("invalid redeclaration of '{}'", name.name),
                );
                continue;
            }
            match item {
                Item::Let(decl) => {
                    self.pending.insert(name.name.clone());
                    globals.push((file, order, decl));
                }
                Item::Fn(decl) => {
                    if let Some(signature) = self.declare_function(file, order, decl) {
                        functions.push(signature);
                    }
                }
            }
        }

        for (file, order, decl) in globals {
            self.check_global(file, order, decl);
        }
        for signature in &functions {
            self.check_function(signature);
        }
    }

    fn declare_function<'u>(
        &mut self,
        file: usize,
        order: usize,
        decl: &'u FnDecl,
    ) -> Option<Signature<'u>> {
        let mut params: Vec<(String, TypeId)> = Vec::with_capacity(decl.params.len());
        let mut valid = true;

        for param in &decl.params {
            let name = &param.name;
            if params.iter().any(|(existing, _)| existing == &name.name) {
                self.error(
                    file,
                    name.span.start,
                    format!("duplicate parameter '{}'", name.name),
                );
                valid = false;
                continue;
            }
            match self.resolve_type(file, &param.ty) {
                Some(ty) => params.push((name.name.clone(), ty)),
                None => valid = false,
            }
        }
        let ret = self.resolve_type(file, &decl.ret);

        let (true, Some(ret)) = (valid, ret) else {
            self.poisoned.insert(decl.name.name.clone());
            return None;
        };

        let ty = self.types.intern(Type::Function {
            params: params.iter().map(|(_, ty)| *ty).collect(),
            ret,
        });
        self.declare(
            file,
            order,
            &decl.name,
            DeclKind::Function,
            ty,
            params.iter().map(|(name, _)| name.clone()).collect(),
            None,
        );

        Some(Signature {
            file,
            decl,
            params,
            ret,
        })
    }

    fn check_global(&mut self, file: usize, order: usize, decl: &LetDecl) {
        let name = &decl.name.name;
        let annotation = decl.ty.as_ref().map(|ty| self.resolve_type(file, ty));
        let value = self.check_expr(file, &decl.value, &Scope::Global);
        self.pending.remove(name);

        let ty = match (annotation, &value) {
            (Some(None), _) => None,
            (Some(Some(expected)), Some(value)) if value.ty != expected => {
                let message = format!(
                    "global '{}' has type {}, expected {}",
                    name,
                    self.types.display(value.ty),
                    self.types.display(expected)
                );
                self.error(file, decl.value.span.start, message);
                Some(expected)
            }
            (Some(Some(expected)), _) => Some(expected),
            (None, Some(value)) => Some(value.ty),
            (None, None) => None,
        };

        match ty {
            Some(ty) => self.declare(
                file,
                order,
                &decl.name,
                DeclKind::Global,
                ty,
                Vec::new(),
                value,
            ),
            None => {
                self.poisoned.insert(name.clone());
            }
        }
    }

    fn check_function(&mut self, signature: &Signature<'_>) {
        let Signature {
            file,
            decl,
            params,
            ret,
        } = signature;

        let scope = Scope::Function(params.as_slice());
        let Some(body) = self.check_expr(*file, &decl.body, &scope) else {
            return;
        };
        if body.ty != *ret {
            let message = format!(
                "function '{}' returns {}, expected {}",
                decl.name.name,
                self.types.display(body.ty),
                self.types.display(*ret)
            );
            self.error(*file, decl.body.span.start, message);
            return;
        }
        if let Some(entry) = self.decls.get_mut(&decl.name.name) {
            entry.body = Some(body);
        }
    }

    fn check_expr(&mut self, file: usize, expr: &Expr, scope: &Scope<'_>) -> Option<TypedExpr> {
        match &expr.kind {
            ExprKind::Int(value) => Some(TypedExpr::new(TypedExprKind::Int(*value), TypeTable::INT)),
            ExprKind::Bool(value) => {
                Some(TypedExpr::new(TypedExprKind::Bool(*value), TypeTable::BOOL))
            }
            ExprKind::Str(value) => Some(TypedExpr::new(
                TypedExprKind::Str(value.clone()),
                TypeTable::STR,
            )),
            ExprKind::Name(name) => self.check_name(file, expr.span.start, name, scope),
            ExprKind::Call { callee, args } => self.check_call(file, callee, args, scope),
            ExprKind::Unary { op, operand } => {
                let operand = self.check_expr(file, operand, scope)?;
                let expected = match op {
                    UnaryOp::Neg => TypeTable::INT,
                    UnaryOp::Not => TypeTable::BOOL,
                };
                if operand.ty != expected {
                    let message = format!(
                        "operator '{}' cannot be applied to {}",
                        op,
                        self.types.display(operand.ty)
                    );
                    self.error(file, expr.span.start, message);
                    return None;
                }
                Some(TypedExpr::new(
                    TypedExprKind::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                    expected,
                ))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.check_expr(file, lhs, scope);
                let rhs = self.check_expr(file, rhs, scope);
                let (lhs, rhs) = (lhs?, rhs?);

                let Some(ty) = binary_result(*op, lhs.ty, rhs.ty) else {
                    let message = format!(
                        "binary operator '{}' cannot be applied to {} and {}",
                        op,
                        self.types.display(lhs.ty),
                        self.types.display(rhs.ty)
                    );
                    self.error(file, expr.span.start, message);
                    return None;
                };
                Some(TypedExpr::new(
                    TypedExprKind::Binary {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    ty,
                ))
            }
            ExprKind::If {
                cond: cond_expr,
                then_branch,
                else_branch,
            } => {
                let cond = self.check_expr(file, cond_expr, scope);
                let then_branch = self.check_expr(file, then_branch, scope);
                let else_branch = self.check_expr(file, else_branch, scope);

                let cond = cond?;
                let cond_is_bool = cond.ty == TypeTable::BOOL;
                if !cond_is_bool {
                    let message = format!(
                        "if condition must be bool, found {}",
                        self.types.display(cond.ty)
                    );
                    self.error(file, cond_expr.span.start, message);
                }

                let (then_branch, else_branch) = (then_branch?, else_branch?);
                if then_branch.ty != else_branch.ty {
                    let message = format!(
                        "if branches have mismatched types {} and {}",
                        self.types.display(then_branch.ty),
                        self.types.display(else_branch.ty)
                    );
                    self.error(file, expr.span.start, message);
                    return None;
                }
                if !cond_is_bool {
                    return None;
                }

                let ty = then_branch.ty;
                Some(TypedExpr::new(
                    TypedExprKind::If {
                        cond: Box::new(cond),
                        then_branch: Box::new(then_branch),
                        else_branch: Box::new(else_branch),
                    },
                    ty,
                ))
            }
        }
    }

    fn check_name(
        &mut self,
        file: usize,
        offset: usize,
        name: &str,
        scope: &Scope<'_>,
    ) -> Option<TypedExpr> {
        if let Scope::Function(params) = scope {
            if let Some(index) = params.iter().position(|(param, _)| param == name) {
                return Some(TypedExpr::new(
                    TypedExprKind::Local(index as u32),
                    params[index].1,
                ));
            }
        }

        match self.decls.get(name).map(|d| (d.kind, d.ty)) {
            Some((DeclKind::Global, ty)) => {
                Some(TypedExpr::new(TypedExprKind::Global(name.to_string()), ty))
            }
            Some((DeclKind::Function, _)) => {
                self.error(
                    file,
                    offset,
                    format!("function '{}' must be called", name),
                );
                None
            }
            None => {
                self.report_unresolved(file, offset, name);
                None
            }
        }
    }

    fn check_call(
        &mut self,
        file: usize,
        callee: &Ident,
        arg_exprs: &[Expr],
        scope: &Scope<'_>,
    ) -> Option<TypedExpr> {
        let args: Vec<Option<TypedExpr>> = arg_exprs
            .iter()
            .map(|arg| self.check_expr(file, arg, scope))
            .collect();
        let name = &callee.name;

        let is_param = match scope {
            Scope::Function(params) => params.iter().any(|(param, _)| param == name),
            Scope::Global => false,
        };
        let found = self.decls.get(name).map(|d| (d.kind, d.ty));

        let ty = match found {
            Some((DeclKind::Function, ty)) if !is_param => ty,
            Some(_) => {
                self.error(
                    file,
                    callee.span.start,
                    format!("'{}' is not a function", name),
                );
                return None;
            }
            None if is_param || self.pending.contains(name) => {
                self.error(
                    file,
                    callee.span.start,
                    format!("'{}' is not a function", name),
                );
                return None;
            }
            None => {
                self.report_unresolved(file, callee.span.start, name);
                return None;
            }
        };

        let Type::Function { params, ret } = self.types.get(ty).clone() else {
            return None;
        };
        if args.len() != params.len() {
            self.error(
                file,
                callee.span.start,
                format!(
                    "function '{}' expects {} argument(s), found {}",
                    name,
                    params.len(),
                    args.len()
                ),
            );
            return None;
        }

        let mut typed = Vec::with_capacity(args.len());
        let mut valid = true;
        for (index, ((arg, expr), expected)) in
            args.into_iter().zip(arg_exprs).zip(&params).enumerate()
        {
            match arg {
                Some(arg) if arg.ty == *expected => typed.push(arg),
                Some(arg) => {
                    let message = format!(
                        "argument {} of '{}' has type {}, expected {}",
                        index + 1,
                        name,
                        self.types.display(arg.ty),
                        self.types.display(*expected)
                    );
                    self.error(file, expr.span.start, message);
                    valid = false;
                }
                None => valid = false,
            }
        }

        valid.then(|| {
            TypedExpr::new(
                TypedExprKind::Call {
                    func: name.clone(),
                    args: typed,
                },
                ret,
            )
        })
    }

    fn report_unresolved(&mut self, file: usize, offset: usize, name: &str) {
        if self.pending.contains(name) {
            self.error(
                file,
                offset,
                format!("global '{}' is used before its declaration", name),
            );
        } else if !self.poisoned.contains(name) {
            self.error(file, offset, format!("cannot find '{}' in scope", name));
        }
    }

    fn resolve_type(&mut self, file: usize, ty: &TypeExpr) -> Option<TypeId> {
        let resolved = TypeTable::resolve_name(&ty.name);
        if resolved.is_none() {
            self.error(file, ty.span.start, format!("unknown type '{}'", ty.name));
        }
        resolved
    }

    #[allow(clippy::too_many_arguments)]
    fn declare(
        &mut self,
        file: usize,
        order: usize,
        name: &Ident,
        kind: DeclKind,
        ty: TypeId,
        params: Vec<String>,
        body: Option<TypedExpr>,
    ) {
        let location = self.location(file, name.span.start);
        self.decls.insert(
            name.name.clone(),
            Decl {
                name: name.name.clone(),
                kind,
                ty,
                location,
                params,
                body,
                order,
            },
        );
    }

    fn location(&self, file: usize, offset: usize) -> String {
        self.sources
            .get(file)
            .map(|source| source.describe(offset))
            .unwrap_or_default()
    }

    fn error(&mut self, file: usize, offset: usize, message: String) {
        let diagnostic = Diagnostic::error(PHASE, message);
        let diagnostic = match self.sources.get(file) {
            Some(source) => diagnostic.at(DiagnosticLocation::in_source(source, offset)),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }
}

fn binary_result(op: BinaryOp, lhs: TypeId, rhs: TypeId) -> Option<TypeId> {
    let ints = lhs == TypeTable::INT && rhs == TypeTable::INT;
    let bools = lhs == TypeTable::BOOL && rhs == TypeTable::BOOL;
    match op {
        BinaryOp::Add if ints => Some(TypeTable::INT),
        BinaryOp::Add if lhs == TypeTable::STR && rhs == TypeTable::STR => Some(TypeTable::STR),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div if ints => Some(TypeTable::INT),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge if ints => Some(TypeTable::BOOL),
        BinaryOp::Eq | BinaryOp::Ne if lhs == rhs => Some(TypeTable::BOOL),
        BinaryOp::And | BinaryOp::Or if bools => Some(TypeTable::BOOL),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use strata_config::FrontendOptions;

    use super::*;
    use crate::{StageFailure, phases::ParsePhase};

    fn check_sources(sources: Vec<SourceFile>) -> std::result::Result<CompilerInstance, Vec<String>> {
        let mut instance = CompilerInstance::setup(FrontendOptions::default(), sources).unwrap();
        ParsePhase.run(&mut instance).unwrap();
        match SemaPhase.run(&mut instance) {
            Ok(()) => Ok(instance),
            Err(err) => {
                let failure = err.downcast_ref::<StageFailure>().unwrap();
                Err(failure.errors().map(|d| d.message.clone()).collect())
            }
        }
    }

    fn check(src: &str) -> std::result::Result<CompilerInstance, Vec<String>> {
        check_sources(vec![SourceFile::new("main.st", src)])
    }

    #[test]
    fn test_declarations_are_typed() {
        let instance = check(
            "let answer = 40 + 2;\n\
             let greeting: string = \"hi\" + \"!\";\n\
             fn add(a: int, b: int) -> int = a + b;\n\
             fn main() -> bool = add(answer, 1) > 0;",
        )
        .unwrap();
        let ctx = instance.context();

        assert_eq!(ctx.type_of("answer").as_deref(), Some("int"));
        assert_eq!(ctx.type_of("greeting").as_deref(), Some("string"));
        assert_eq!(ctx.type_of("add").as_deref(), Some("fn(int, int) -> int"));
        assert_eq!(ctx.decl("add").unwrap().params, vec!["a", "b"]);
        assert!(ctx.decl("main").unwrap().body.is_some());

        let names: Vec<_> = ctx.decls.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["answer", "greeting", "add", "main"]);
    }

    #[test]
    fn test_functions_may_call_later_functions() {
        let instance = check(
            "fn is_even(n: int) -> bool = if n == 0 { true } else { is_odd(n - 1) };\n\
             fn is_odd(n: int) -> bool = if n == 0 { false } else { is_even(n - 1) };",
        )
        .unwrap();
        assert_eq!(instance.context().functions().count(), 2);
    }

    #[test]
    fn test_redeclaration() {
        let errors = check("let x = 1;\nfn x() -> int = 2;").unwrap_err();
        assert_eq!(errors, vec!["invalid redeclaration of 'x'"]);
    }

    #[test]
    fn test_redeclaration_across_files() {
        let errors = check_sources(vec![
            SourceFile::new("a.st", "let x = 1;"),
            SourceFile::new("b.st", "let x = 2;"),
        ])
        .unwrap_err();
        assert_eq!(errors, vec!["invalid redeclaration of 'x'"]);
    }

    #[test]
    fn test_unknown_name_and_type() {
        let errors = check("let a = b;\nfn f(x: float) -> int = 1;").unwrap_err();
        assert_eq!(
            errors,
            vec!["unknown type 'float'", "cannot find 'b' in scope"]
        );
    }

    #[test]
    fn test_global_used_before_declaration() {
        let errors = check("let a = b + 1;\nlet b = 2;").unwrap_err();
        assert_eq!(errors, vec!["global 'b' is used before its declaration"]);
    }

    #[test]
    fn test_function_must_be_called() {
        let errors = check("fn f() -> int = 1;\nlet g = f;").unwrap_err();
        assert_eq!(errors, vec!["function 'f' must be called"]);
    }

    #[test]
    fn test_calls_are_checked() {
        let errors = check(
            "let n = 1;\n\
             fn f(a: int) -> int = a;\n\
             let x = n(1);\n\
             let y = f(1, 2);\n\
             let z = f(\"one\");",
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "'n' is not a function",
                "function 'f' expects 1 argument(s), found 2",
                "argument 1 of 'f' has type string, expected int",
            ]
        );
    }

    #[test]
    fn test_operator_and_branch_types() {
        let errors = check(
            "let a = 1 + \"x\";\n\
             let b = !1;\n\
             let c = if 1 { 2 } else { 3 };\n\
             let d = if true { 2 } else { \"3\" };",
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "binary operator '+' cannot be applied to int and string",
                "operator '!' cannot be applied to int",
                "if condition must be bool, found int",
                "if branches have mismatched types int and string",
            ]
        );
    }

    #[test]
    fn test_declared_types_must_match() {
        let errors = check("let a: bool = 1;\nfn f() -> string = 1;").unwrap_err();
        assert_eq!(
            errors,
            vec![
                "global 'a' has type int, expected bool",
                "function 'f' returns int, expected string",
            ]
        );
    }

    #[test]
    fn test_errors_are_not_cascaded() {
        let errors = check("let a = missing;\nlet b = a + 1;").unwrap_err();
        assert_eq!(errors, vec!["cannot find 'missing' in scope"]);
    }

    #[test]
    fn test_error_location() {
        let mut instance = CompilerInstance::setup(
            FrontendOptions::default(),
            vec![SourceFile::new("main.st", "let a = 1;\nlet b = c;")],
        )
        .unwrap();
        ParsePhase.run(&mut instance).unwrap();
        assert!(SemaPhase.run(&mut instance).is_err());
        assert_eq!(
            instance.context().diagnostics[0].location,
            Some(DiagnosticLocation::Source {
                file: "main.st".to_string(),
                line: 2,
                column: 9,
            })
        );
    }
}
