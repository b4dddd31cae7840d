use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// Chain-rule product `outer * inner` that is zero whenever `inner` is.
    ///
    /// Keeps a derivative finite where the outer factor diverges but the
    /// inner one vanishes, e.g. `d sqrt(x^2+y^2)/dx` at the origin. Prints
    /// as `*`; the parser never produces it.
    Chain,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
            BinaryOp::Chain if rhs == 0.0 => 0.0,
            BinaryOp::Chain => lhs * rhs,
        }
    }

    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul | BinaryOp::Chain => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Chain => 2,
            BinaryOp::Pow => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Function::Sqrt),
            "exp" => Some(Function::Exp),
            "log" => Some(Function::Log),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sin => "sin",
            Function::Cos => "cos",
        }
    }

    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Function::Sqrt => value.sqrt(),
            Function::Exp => value.exp(),
            Function::Log => value.ln(),
            Function::Sin => value.sin(),
            Function::Cos => value.cos(),
        }
    }
}

/// A real-valued algebraic expression over named variables.
///
/// Nodes are built through the associated constructors (`Expr::add`,
/// `Expr::mul`, ...) which fold constants and drop additive/multiplicative
/// identities, so derivatives stay compact.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        arg: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Expr::Constant(c) => Some(*c),
            _ => None,
        }
    }

    fn is_constant(&self, value: f64) -> bool {
        self.as_constant() == Some(value)
    }

    pub fn negate(operand: Expr) -> Self {
        match operand {
            Expr::Constant(c) => Expr::Constant(-c),
            Expr::Negate(inner) => *inner,
            other => Expr::Negate(Box::new(other)),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        if let (Some(a), Some(b)) = (lhs.as_constant(), rhs.as_constant()) {
            return Expr::Constant(op.apply(a, b));
        }
        match op {
            BinaryOp::Add if lhs.is_constant(0.0) => rhs,
            BinaryOp::Add | BinaryOp::Sub if rhs.is_constant(0.0) => lhs,
            BinaryOp::Sub if lhs.is_constant(0.0) => Expr::negate(rhs),
            BinaryOp::Mul | BinaryOp::Chain if lhs.is_constant(0.0) || rhs.is_constant(0.0) => {
                Expr::Constant(0.0)
            }
            BinaryOp::Mul | BinaryOp::Chain if lhs.is_constant(1.0) => rhs,
            BinaryOp::Mul | BinaryOp::Chain | BinaryOp::Div if rhs.is_constant(1.0) => lhs,
            BinaryOp::Mul | BinaryOp::Chain if lhs.is_constant(-1.0) => Expr::negate(rhs),
            BinaryOp::Div if lhs.is_constant(0.0) => Expr::Constant(0.0),
            BinaryOp::Pow if rhs.is_constant(0.0) => Expr::Constant(1.0),
            BinaryOp::Pow if rhs.is_constant(1.0) => lhs,
            _ => Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn chain(outer: Expr, inner: Expr) -> Self {
        Expr::binary(BinaryOp::Chain, outer, inner)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Div, lhs, rhs)
    }

    pub fn pow(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Pow, lhs, rhs)
    }

    pub fn call(function: Function, arg: Expr) -> Self {
        match arg {
            Expr::Constant(c) => Expr::Constant(function.apply(c)),
            other => Expr::Call {
                function,
                arg: Box::new(other),
            },
        }
    }

    /// Evaluates the expression, resolving variables through `lookup`.
    ///
    /// Returns `None` if a variable cannot be resolved.
    pub fn evaluate_with<F>(&self, lookup: &F) -> Option<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        Some(match self {
            Expr::Constant(c) => *c,
            Expr::Variable(name) => lookup(name)?,
            Expr::Negate(inner) => -inner.evaluate_with(lookup)?,
            Expr::Binary { op, lhs, rhs } => {
                op.apply(lhs.evaluate_with(lookup)?, rhs.evaluate_with(lookup)?)
            }
            Expr::Call { function, arg } => function.apply(arg.evaluate_with(lookup)?),
        })
    }

    /// Evaluates the expression with variables bound by name.
    pub fn evaluate(&self, bindings: &[(&str, f64)]) -> Option<f64> {
        self.evaluate_with(&|name: &str| {
            bindings
                .iter()
                .find(|(bound, _)| *bound == name)
                .map(|&(_, value)| value)
        })
    }

    pub fn depends_on(&self, name: &str) -> bool {
        match self {
            Expr::Constant(_) => false,
            Expr::Variable(v) => v == name,
            Expr::Negate(inner) => inner.depends_on(name),
            Expr::Binary { lhs, rhs, .. } => lhs.depends_on(name) || rhs.depends_on(name),
            Expr::Call { arg, .. } => arg.depends_on(name),
        }
    }

    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Variable(v) => {
                out.insert(v.clone());
            }
            Expr::Negate(inner) => inner.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Expr::Call { arg, .. } => arg.collect_variables(out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Constant(c) if c.is_sign_negative() => 3,
            Expr::Constant(_) | Expr::Variable(_) | Expr::Call { .. } => 5,
            Expr::Negate(_) => 3,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(c) => write!(f, "{}", c),
            Expr::Variable(name) => f.write_str(name),
            Expr::Negate(inner) => {
                f.write_str("-")?;
                write_operand(f, inner, inner.precedence() <= 3)
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                // `^` is right-associative, everything else groups to the left.
                let (lhs_parens, rhs_parens) = match op {
                    BinaryOp::Pow => (lhs.precedence() <= prec, rhs.precedence() < prec),
                    _ => (lhs.precedence() < prec, rhs.precedence() <= prec),
                };
                write_operand(f, lhs, lhs_parens)?;
                write!(f, "{}", op.symbol())?;
                write_operand(f, rhs, rhs_parens)
            }
            Expr::Call { function, arg } => write!(f, "{}({})", function.name(), arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::variable("x")
    }

    #[test]
    fn binary_constructor_folds_constants() {
        let e = Expr::add(Expr::constant(2.0), Expr::constant(3.0));
        assert_eq!(e, Expr::Constant(5.0));
    }

    #[test]
    fn binary_constructor_drops_identities() {
        assert_eq!(Expr::add(Expr::constant(0.0), x()), x());
        assert_eq!(Expr::mul(x(), Expr::constant(1.0)), x());
        assert_eq!(Expr::mul(Expr::constant(0.0), x()), Expr::Constant(0.0));
        assert_eq!(Expr::pow(x(), Expr::constant(1.0)), x());
        assert_eq!(Expr::pow(x(), Expr::constant(0.0)), Expr::Constant(1.0));
        assert_eq!(Expr::sub(Expr::constant(0.0), x()), Expr::negate(x()));
    }

    #[test]
    fn double_negation_collapses() {
        assert_eq!(Expr::negate(Expr::negate(x())), x());
    }

    #[test]
    fn call_on_constant_is_folded() {
        assert_eq!(Expr::call(Function::Cos, Expr::constant(0.0)), Expr::Constant(1.0));
    }

    #[test]
    fn evaluate_resolves_bound_variables() {
        let e = Expr::add(Expr::mul(Expr::constant(3.0), x()), Expr::variable("y"));
        assert_eq!(e.evaluate(&[("x", 2.0), ("y", 1.0)]), Some(7.0));
    }

    #[test]
    fn evaluate_returns_none_for_unbound_variable() {
        assert_eq!(x().evaluate(&[("y", 1.0)]), None);
    }

    #[test]
    fn variables_are_collected_in_sorted_order() {
        let e = Expr::add(Expr::variable("z"), Expr::mul(x(), Expr::variable("y")));
        let vars: Vec<_> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["x", "y", "z"]);
    }

    #[test]
    fn display_inserts_parentheses_only_where_needed() {
        let e = Expr::mul(
            Expr::add(x(), Expr::constant(1.0)),
            Expr::pow(Expr::variable("y"), Expr::constant(2.0)),
        );
        assert_eq!(e.to_string(), "(x+1)*y^2");
    }

    #[test]
    fn display_keeps_right_operand_of_subtraction_grouped() {
        let e = Expr::sub(x(), Expr::sub(Expr::variable("y"), Expr::variable("z")));
        assert_eq!(e.to_string(), "x-(y-z)");
    }

    #[test]
    fn display_groups_negated_power_base() {
        let e = Expr::pow(Expr::negate(x()), Expr::constant(2.0));
        assert_eq!(e.to_string(), "(-x)^2");
    }
}
