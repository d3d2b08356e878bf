//! Property-based tests for parsing, rendering, and solving.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::ast::{BinOp, Expr, Func};
    use crate::eval::Bindings;
    use crate::{parse_equation, parse_expr};
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = Expr> {
        prop_oneof![
            (0u32..4000).prop_map(|n| Expr::Num(f64::from(n) / 4.0)),
            prop::sample::select(vec!["a", "b", "TIA", "theta_fc", "x1"]).prop_map(Expr::var),
        ]
    }

    fn expr() -> impl Strategy<Value = Expr> {
        leaf().prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(Expr::neg),
                (prop::sample::select(Func::ALL.to_vec()), inner.clone())
                    .prop_map(|(f, arg)| Expr::call(f, arg)),
                (
                    prop::sample::select(vec![
                        BinOp::Add,
                        BinOp::Sub,
                        BinOp::Mul,
                        BinOp::Div,
                        BinOp::Pow
                    ]),
                    inner.clone(),
                    inner
                )
                    .prop_map(|(op, l, r)| Expr::binary(op, l, r)),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_display_parse_roundtrip(e in expr()) {
            let text = e.to_string();
            let parsed = parse_expr(&text).unwrap();
            prop_assert_eq!(parsed, e, "rendered as {}", text);
        }

        #[test]
        fn test_variables_are_unique(e in expr()) {
            let vars = e.variables();
            let mut sorted = vars.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), vars.len());
            for v in &vars {
                prop_assert!(e.contains_var(v));
            }
        }

        #[test]
        fn test_linear_solve_recovers_value(
            slope in 0.5f64..50.0,
            intercept in -100.0f64..100.0,
            x in -1000.0f64..1000.0,
        ) {
            let eq = parse_equation("y = m * x + c").unwrap();
            let y = slope * x + intercept;
            let known: Bindings = [("y", y), ("m", slope), ("c", intercept)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            let solved = eq.solve_for("x", &known).unwrap();
            prop_assert!((solved - x).abs() <= 1e-6 * x.abs().max(1.0));
        }

        #[test]
        fn test_solved_value_satisfies_equation(
            a in 1.0f64..100.0,
            b in 1.0f64..100.0,
            target in 1.0f64..1000.0,
        ) {
            // Two occurrences of x force the numeric path.
            let eq = parse_equation("t = a * x + b * x").unwrap();
            let known: Bindings = [("t", target), ("a", a), ("b", b)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            let x = eq.solve_for("x", &known).unwrap();
            prop_assert!((a * x + b * x - target).abs() <= 1e-6 * target);
        }
    }
}
