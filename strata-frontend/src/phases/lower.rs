//! Lower phase - transforms checked declarations into the IR module.

use eyre::{Result, eyre};
use strata_ir::{Instr, IrFunction, IrGlobal, IrModule, IrType};
use strata_syntax::{BinaryOp, UnaryOp};

use crate::{
    CompilerInstance, Phase,
    context::CompilationContext,
    decl::{Decl, DeclKind, TypedExpr, TypedExprKind},
    types::{Type, TypeId, TypeTable},
};

/// Phase that lowers every declaration to stack-machine code.
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Lower checked declarations to IR"
    }

    fn run(&self, instance: &mut CompilerInstance) -> Result<()> {
        let module = lower_module(&instance.context)?;
        instance.module = Some(module);
        Ok(())
    }
}

fn lower_module(ctx: &CompilationContext) -> Result<IrModule> {
    let mut module = IrModule::new(&ctx.module_name);
    let lowerer = Lowerer { types: &ctx.types };

    for decl in ctx.decls.values() {
        match decl.kind {
            DeclKind::Global => module.globals.push(IrGlobal {
                name: decl.name.clone(),
                ty: lowerer.value_type(decl.ty)?,
                init: lowerer.body(decl)?,
            }),
            DeclKind::Function => {
                let Type::Function { params, ret } = ctx.types.get(decl.ty) else {
                    return Err(eyre!("'{}' does not have a function type", decl.name));
                };
                module.functions.push(IrFunction {
                    name: decl.name.clone(),
                    params: params
                        .iter()
                        .map(|ty| lowerer.value_type(*ty))
                        .collect::<Result<_>>()?,
                    ret: lowerer.value_type(*ret)?,
                    body: lowerer.body(decl)?,
                });
            }
        }
    }

    Ok(module)
}

struct Lowerer<'a> {
    types: &'a TypeTable,
}

impl Lowerer<'_> {
    fn value_type(&self, ty: TypeId) -> Result<IrType> {
        self.types
            .ir_type(ty)
            .ok_or_else(|| eyre!("type {} has no IR representation", self.types.display(ty)))
    }

    fn body(&self, decl: &Decl) -> Result<Vec<Instr>> {
        let body = decl
            .body
            .as_ref()
            .ok_or_else(|| eyre!("'{}' was not type-checked", decl.name))?;
        let mut code = Vec::new();
        self.expr(body, &mut code)?;
        code.push(Instr::Return);
        Ok(code)
    }

    fn expr(&self, expr: &TypedExpr, code: &mut Vec<Instr>) -> Result<()> {
        match &expr.kind {
            TypedExprKind::Int(value) => code.push(Instr::ConstInt(*value)),
            TypedExprKind::Bool(value) => code.push(Instr::ConstBool(*value)),
            TypedExprKind::Str(value) => code.push(Instr::ConstStr(value.clone())),
            TypedExprKind::Local(index) => code.push(Instr::LoadLocal(*index)),
            TypedExprKind::Global(name) => code.push(Instr::LoadGlobal(name.clone())),
            TypedExprKind::Call { func, args } => {
                for arg in args {
                    self.expr(arg, code)?;
                }
                code.push(Instr::Call {
                    func: func.clone(),
                    argc: args.len() as u32,
                });
            }
            TypedExprKind::Unary { op, operand } => {
                self.expr(operand, code)?;
                code.push(match op {
                    UnaryOp::Neg => Instr::Neg,
                    UnaryOp::Not => Instr::Not,
                });
            }
            TypedExprKind::Binary {
                op: BinaryOp::And,
                lhs,
                rhs,
            } => {
                // lhs ? rhs : false
                self.expr(lhs, code)?;
                let to_false = emit_placeholder(code);
                self.expr(rhs, code)?;
                let to_end = emit_placeholder(code);
                code[to_false] = Instr::JumpIfFalse(code.len());
                code.push(Instr::ConstBool(false));
                code[to_end] = Instr::Jump(code.len());
            }
            TypedExprKind::Binary {
                op: BinaryOp::Or,
                lhs,
                rhs,
            } => {
                // lhs ? true : rhs
                self.expr(lhs, code)?;
                let to_rhs = emit_placeholder(code);
                code.push(Instr::ConstBool(true));
                let to_end = emit_placeholder(code);
                code[to_rhs] = Instr::JumpIfFalse(code.len());
                self.expr(rhs, code)?;
                code[to_end] = Instr::Jump(code.len());
            }
            TypedExprKind::Binary { op, lhs, rhs } => {
                self.expr(lhs, code)?;
                self.expr(rhs, code)?;
                let operand = self.value_type(lhs.ty)?;
                let instr = strict_binary(*op, operand)
                    .ok_or_else(|| eyre!("operator '{}' has no single instruction", op))?;
                code.push(instr);
            }
            TypedExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond, code)?;
                let to_else = emit_placeholder(code);
                self.expr(then_branch, code)?;
                let to_end = emit_placeholder(code);
                code[to_else] = Instr::JumpIfFalse(code.len());
                self.expr(else_branch, code)?;
                code[to_end] = Instr::Jump(code.len());
            }
        }
        Ok(())
    }
}

/// Instruction of a binary operator that evaluates both operands.
fn strict_binary(op: BinaryOp, operand: IrType) -> Option<Instr> {
    let instr = match op {
        BinaryOp::Add if operand == IrType::Str => Instr::Concat,
        BinaryOp::Add => Instr::Add,
        BinaryOp::Sub => Instr::Sub,
        BinaryOp::Mul => Instr::Mul,
        BinaryOp::Div => Instr::Div,
        BinaryOp::Eq => Instr::Eq(operand),
        BinaryOp::Ne => Instr::Ne(operand),
        BinaryOp::Lt => Instr::Lt,
        BinaryOp::Le => Instr::Le,
        BinaryOp::Gt => Instr::Gt,
        BinaryOp::Ge => Instr::Ge,
        BinaryOp::And | BinaryOp::Or => return None,
    };
    Some(instr)
}

/// Reserve a jump slot, patched once its target is known.
fn emit_placeholder(code: &mut Vec<Instr>) -> usize {
    code.push(Instr::Jump(usize::MAX));
    code.len() - 1
}
