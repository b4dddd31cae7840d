use super::ast::{BinaryOp, Expr, Function};

impl Expr {
    /// Symbolic partial derivative with respect to the variable `var`.
    pub fn derivative(&self, var: &str) -> Expr {
        match self {
            Expr::Constant(_) => Expr::constant(0.0),
            Expr::Variable(name) => Expr::constant(if name == var { 1.0 } else { 0.0 }),
            Expr::Negate(inner) => Expr::negate(inner.derivative(var)),
            Expr::Binary { op, lhs, rhs } => binary_derivative(*op, lhs, rhs, var),
            Expr::Call { function, arg } => {
                let inner = arg.derivative(var);
                if inner.as_constant() == Some(0.0) {
                    return Expr::constant(0.0);
                }
                let a = (**arg).clone();
                let outer = match function {
                    Function::Sqrt => Expr::div(
                        Expr::constant(0.5),
                        Expr::call(Function::Sqrt, a),
                    ),
                    Function::Exp => Expr::call(Function::Exp, a),
                    Function::Log => Expr::div(Expr::constant(1.0), a),
                    Function::Sin => Expr::call(Function::Cos, a),
                    Function::Cos => Expr::negate(Expr::call(Function::Sin, a)),
                };
                Expr::chain(outer, inner)
            }
        }
    }

    /// Gradient with respect to each variable in `vars`, in order.
    pub fn gradient(&self, vars: &[&str]) -> Vec<Expr> {
        vars.iter().map(|v| self.derivative(v)).collect()
    }
}

fn binary_derivative(op: BinaryOp, lhs: &Expr, rhs: &Expr, var: &str) -> Expr {
    let da = lhs.derivative(var);
    let db = rhs.derivative(var);
    let a = lhs.clone();
    let b = rhs.clone();
    match op {
        BinaryOp::Add => Expr::add(da, db),
        BinaryOp::Sub => Expr::sub(da, db),
        BinaryOp::Mul => Expr::add(Expr::mul(da, b), Expr::mul(a, db)),
        BinaryOp::Chain => Expr::add(Expr::chain(da, b), Expr::mul(a, db)),
        BinaryOp::Div => {
            if !rhs.depends_on(var) {
                return Expr::div(da, b);
            }
            Expr::div(
                Expr::sub(Expr::mul(da, b.clone()), Expr::mul(a, db)),
                Expr::pow(b, Expr::constant(2.0)),
            )
        }
        BinaryOp::Pow => {
            if !rhs.depends_on(var) {
                // d(a^c) = c * a^(c-1) * da
                let reduced = Expr::sub(b.clone(), Expr::constant(1.0));
                return Expr::chain(Expr::mul(b, Expr::pow(a, reduced)), da);
            }
            let power = Expr::pow(a.clone(), b.clone());
            if !lhs.depends_on(var) {
                return Expr::mul(
                    Expr::mul(power, Expr::call(Function::Log, a)),
                    db,
                );
            }
            Expr::mul(
                power,
                Expr::add(
                    Expr::mul(db, Expr::call(Function::Log, a.clone())),
                    Expr::div(Expr::mul(b, da), a),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::expr::Expr;

    const TOLERANCE: f64 = 1e-6;

    fn finite_difference(expr: &Expr, var: &str, point: &[(&str, f64)]) -> f64 {
        let h = 1e-6;
        let shifted = |delta: f64| {
            let bindings: Vec<(&str, f64)> = point
                .iter()
                .map(|&(name, value)| (name, if name == var { value + delta } else { value }))
                .collect();
            expr.evaluate(&bindings).unwrap()
        };
        (shifted(h) - shifted(-h)) / (2.0 * h)
    }

    fn assert_matches_finite_difference(source: &str, point: &[(&str, f64)]) {
        let expr = Expr::parse(source).unwrap();
        for &(var, _) in point {
            let analytic = expr.derivative(var).evaluate(point).unwrap();
            let numeric = finite_difference(&expr, var, point);
            assert!(
                (analytic - numeric).abs() < TOLERANCE * (1.0 + numeric.abs()),
                "d/d{} of {}: analytic {} vs numeric {}",
                var,
                source,
                analytic,
                numeric
            );
        }
    }

    #[test]
    fn derivative_of_constant_and_unrelated_variable_is_zero() {
        let expr = Expr::parse("3*y+2").unwrap();
        assert_eq!(expr.derivative("x"), Expr::constant(0.0));
    }

    #[test]
    fn derivative_of_polynomial_is_simplified() {
        let expr = Expr::parse("x^2").unwrap();
        assert_eq!(expr.derivative("x").to_string(), "2*x");
    }

    #[test]
    fn elementary_functions_match_finite_differences() {
        let point = [("x", 0.7), ("y", -1.3)];
        for source in [
            "sqrt(x^2+y^2)",
            "exp(-(x^2+y^2))",
            "log(x^2+1)*y",
            "sin(x*y)/cos(y)",
            "x^y",
            "2^x",
            "x/(1+y^2)",
        ] {
            assert_matches_finite_difference(source, &point);
        }
    }

    #[test]
    fn funnel_energy_gradient_matches_finite_differences() {
        let source = "2*cos(2*sqrt(x^2+y^2))-8*exp(-(x^2+y^2))+0.2*((x/8)^2+(y/8)^2)^3+1000.0*z^2";
        assert_matches_finite_difference(source, &[("x", 1.1), ("y", -0.4), ("z", 0.01)]);
        assert_matches_finite_difference(source, &[("x", -7.5), ("y", 6.2), ("z", -0.002)]);
    }

    #[test]
    fn sqrt_chain_vanishes_where_its_argument_is_stationary() {
        let origin = [("x", 0.0), ("y", 0.0)];
        for source in ["2*cos(2*sqrt(x^2+y^2))", "(x^2+y^2)^0.5*x"] {
            let expr = Expr::parse(source).unwrap();
            for var in ["x", "y"] {
                assert_eq!(expr.derivative(var).evaluate(&origin), Some(0.0), "d/d{} of {}", var, source);
            }
        }
    }

    #[test]
    fn funnel_energy_gradient_is_smooth_through_the_origin() {
        let source = "2*cos(2*sqrt(x^2+y^2))-8*exp(-(x^2+y^2))+0.2*((x/8)^2+(y/8)^2)^3";
        assert_matches_finite_difference(source, &[("x", 1e-3), ("y", -2e-3)]);
        let expr = Expr::parse(source).unwrap();
        let near = expr.derivative("x").evaluate(&[("x", 1e-12), ("y", 0.0)]).unwrap();
        assert!(near.is_finite() && near.abs() < 1e-9);
    }

    #[test]
    fn gradient_returns_one_component_per_variable() {
        let expr = Expr::parse("x*y+z").unwrap();
        let grad = expr.gradient(&["x", "y", "z"]);
        assert_eq!(grad.len(), 3);
        assert_eq!(grad[0], Expr::variable("y"));
        assert_eq!(grad[1], Expr::variable("x"));
        assert_eq!(grad[2], Expr::constant(1.0));
    }
}
