use super::ExprError;
use super::ast::{BinaryOp, Expr, Function};

const INLINE_STACK: usize = 32;
const MAX_INTEGER_EXPONENT: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Const(f64),
    Load(usize),
    Neg,
    Binary(BinaryOp),
    PowInt(i32),
    Call(Function),
}

/// An expression lowered to a flat postfix program over indexed inputs.
///
/// Compiling resolves every variable name to a slot in the input slice once,
/// so repeated evaluation inside the integration loop does no lookups and no
/// allocation for expressions of ordinary depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ops: Vec<Op>,
    arity: usize,
    max_depth: usize,
}

impl Program {
    /// Compiles `expr` with inputs ordered as in `inputs`.
    pub fn compile(expr: &Expr, inputs: &[&str]) -> Result<Self, ExprError> {
        let mut ops = Vec::new();
        emit(expr, inputs, &mut ops)?;

        let mut depth = 0usize;
        let mut max_depth = 0usize;
        for op in &ops {
            match op {
                Op::Const(_) | Op::Load(_) => depth += 1,
                Op::Binary(_) => depth -= 1,
                Op::Neg | Op::PowInt(_) | Op::Call(_) => {}
            }
            max_depth = max_depth.max(depth);
        }

        Ok(Self {
            ops,
            arity: inputs.len(),
            max_depth,
        })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Evaluates the program. `inputs` must hold at least `arity()` values.
    #[inline]
    pub fn evaluate(&self, inputs: &[f64]) -> f64 {
        debug_assert!(inputs.len() >= self.arity);
        if self.max_depth <= INLINE_STACK {
            let mut stack = [0.0f64; INLINE_STACK];
            self.run(inputs, &mut stack)
        } else {
            let mut stack = vec![0.0f64; self.max_depth];
            self.run(inputs, &mut stack)
        }
    }

    fn run(&self, inputs: &[f64], stack: &mut [f64]) -> f64 {
        let mut sp = 0usize;
        for op in &self.ops {
            match *op {
                Op::Const(c) => {
                    stack[sp] = c;
                    sp += 1;
                }
                Op::Load(slot) => {
                    stack[sp] = inputs[slot];
                    sp += 1;
                }
                Op::Neg => stack[sp - 1] = -stack[sp - 1],
                Op::Binary(bin) => {
                    sp -= 1;
                    stack[sp - 1] = bin.apply(stack[sp - 1], stack[sp]);
                }
                Op::PowInt(n) => stack[sp - 1] = stack[sp - 1].powi(n),
                Op::Call(function) => stack[sp - 1] = function.apply(stack[sp - 1]),
            }
        }
        stack[0]
    }
}

fn emit(expr: &Expr, inputs: &[&str], ops: &mut Vec<Op>) -> Result<(), ExprError> {
    match expr {
        Expr::Constant(c) => ops.push(Op::Const(*c)),
        Expr::Variable(name) => {
            let slot = inputs
                .iter()
                .position(|input| input == name)
                .ok_or_else(|| ExprError::UnknownVariable { name: name.clone() })?;
            ops.push(Op::Load(slot));
        }
        Expr::Negate(inner) => {
            emit(inner, inputs, ops)?;
            ops.push(Op::Neg);
        }
        Expr::Binary {
            op: BinaryOp::Pow,
            lhs,
            rhs,
        } if is_small_integer(rhs) => {
            emit(lhs, inputs, ops)?;
            ops.push(Op::PowInt(rhs.as_constant().unwrap_or(1.0) as i32));
        }
        Expr::Binary { op, lhs, rhs } => {
            emit(lhs, inputs, ops)?;
            emit(rhs, inputs, ops)?;
            ops.push(Op::Binary(*op));
        }
        Expr::Call { function, arg } => {
            emit(arg, inputs, ops)?;
            ops.push(Op::Call(*function));
        }
    }
    Ok(())
}

fn is_small_integer(expr: &Expr) -> bool {
    expr.as_constant()
        .is_some_and(|c| c.fract() == 0.0 && c.abs() <= MAX_INTEGER_EXPONENT)
}
