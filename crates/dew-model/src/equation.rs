//! Equation definitions.

use crate::units::{DIMENSIONLESS, UnitRegistry};
use dew_core::{Error, Result};
use dew_expr::{Bindings, Equation};
use serde::Serialize;
use std::collections::BTreeSet;

/// A variable as declared by an equation definition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableDef {
    pub name: String,
    pub description: String,
    /// Unit id in the registry.
    pub unit: String,
}

impl VariableDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit: DIMENSIONLESS.to_string(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// A named equation with declared variables and units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EquationDef {
    pub id: String,
    pub name: String,
    /// Domain the equation belongs to.
    pub domain: String,
    /// Source text, e.g. `TCSPY = TPCPY + TWPCPY`.
    pub expression: String,
    #[serde(skip)]
    pub parsed: Equation,
    pub latex: String,
    pub variables: Vec<VariableDef>,
    /// Ids of equations whose results feed this one.
    pub dependencies: Vec<String>,
}

impl EquationDef {
    /// Parse `expression` and create a definition with no declared variables.
    ///
    /// The LaTeX form defaults to the rendered expression.
    pub fn parse(
        id: impl Into<String>,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        let expression = expression.into();
        let parsed = dew_expr::parse_equation(&expression).map_err(|e| {
            Error::validation_field(format!("equations.{id}.expression"), e.to_string())
        })?;
        let latex = parsed.to_latex();
        Ok(Self {
            id,
            name: name.into(),
            domain: String::new(),
            expression,
            parsed,
            latex,
            variables: Vec::new(),
            dependencies: Vec::new(),
        })
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_latex(mut self, latex: impl Into<String>) -> Self {
        self.latex = latex.into();
        self
    }

    pub fn with_variable(mut self, variable: VariableDef) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Declared variable names, in declaration order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDef> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Check that declared variables match the expression and that every
    /// unit exists.
    pub fn validate(&self, units: &UnitRegistry) -> Result<()> {
        let field = |suffix: &str| format!("equations.{}.{suffix}", self.id);

        let mut declared = BTreeSet::new();
        for var in &self.variables {
            if !declared.insert(var.name.as_str()) {
                return Err(Error::validation_field(
                    field("variables"),
                    format!("variable {} declared twice", var.name),
                ));
            }
            if !units.contains(&var.unit) {
                return Err(Error::validation_field(
                    field("variables"),
                    format!("unit {} not defined for variable {}", var.unit, var.name),
                ));
            }
        }

        let used = self.parsed.variables();
        if let Some(missing) = used.iter().find(|v| !declared.contains(v.as_str())) {
            return Err(Error::validation_field(
                field("variables"),
                format!("variable {missing} appears in the expression but is not declared"),
            ));
        }
        if let Some(extra) = declared.iter().find(|v| !used.iter().any(|u| u == *v)) {
            return Err(Error::validation_field(
                field("variables"),
                format!("variable {extra} is declared but not used in the expression"),
            ));
        }
        Ok(())
    }

    /// Solve for `target` using the known values that belong to this
    /// equation; unrelated entries in `known` are ignored.
    pub fn solve_for(&self, target: &str, known: &Bindings) -> Result<f64> {
        if !self.has_variable(target) {
            return Err(Error::unsolvable(
                target,
                format!("not a variable of equation {}", self.id),
            ));
        }
        let relevant = self.relevant_values(known);
        self.parsed.solve_for(target, &relevant)
    }

    /// The subset of `known` that names variables of this equation.
    pub fn relevant_values(&self, known: &Bindings) -> Bindings {
        known
            .iter()
            .filter(|(name, _)| self.has_variable(name))
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn total_cost_savings() -> EquationDef {
        EquationDef::parse(
            "eq_total_cost_savings_per_year_based_on_water_and_pumping",
            "Total Cost Savings per Year",
            "TCSPY = TPCPY + TWPCPY",
        )
        .unwrap()
        .with_domain("irrigation_system_evaluation_procedures")
        .with_variable(VariableDef::new("TCSPY", "Total cost savings per year").with_unit("dollar"))
        .with_variable(VariableDef::new("TPCPY", "Total pumping cost per year").with_unit("dollar"))
        .with_variable(
            VariableDef::new("TWPCPY", "Total water purchase cost per year").with_unit("dollar"),
        )
    }

    #[test]
    fn test_parse_defaults_latex() {
        let eq = total_cost_savings();
        assert_eq!(eq.latex, "TCSPY = TPCPY + TWPCPY");
        assert_eq!(eq.variable_names(), vec!["TCSPY", "TPCPY", "TWPCPY"]);
    }

    #[test]
    fn test_parse_error_names_field() {
        let err = EquationDef::parse("eq_bad", "Bad", "x = (y").unwrap_err();
        let Error::Validation { field, .. } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field.as_deref(), Some("equations.eq_bad.expression"));
    }

    #[test]
    fn test_validate_ok() {
        let units = UnitRegistry::builtin();
        total_cost_savings().validate(&units).unwrap();
    }

    #[test]
    fn test_validate_undeclared_variable() {
        let units = UnitRegistry::builtin();
        let eq = EquationDef::parse("eq", "Eq", "a = b + c")
            .unwrap()
            .with_variable(VariableDef::new("a", ""))
            .with_variable(VariableDef::new("b", ""));
        let err = eq.validate(&units).unwrap_err();
        assert!(err.to_string().contains("variable c appears in the expression"));
    }

    #[test]
    fn test_validate_unused_variable() {
        let units = UnitRegistry::builtin();
        let eq = EquationDef::parse("eq", "Eq", "a = b")
            .unwrap()
            .with_variable(VariableDef::new("a", ""))
            .with_variable(VariableDef::new("b", ""))
            .with_variable(VariableDef::new("z", ""));
        let err = eq.validate(&units).unwrap_err();
        assert!(err.to_string().contains("variable z is declared but not used"));
    }

    #[test]
    fn test_validate_unknown_unit() {
        let units = UnitRegistry::builtin();
        let eq = EquationDef::parse("eq", "Eq", "a = b")
            .unwrap()
            .with_variable(VariableDef::new("a", "").with_unit("furlong"))
            .with_variable(VariableDef::new("b", ""));
        let err = eq.validate(&units).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: equations.eq.variables: unit furlong not defined for variable a"
        );
    }

    #[test]
    fn test_solve_filters_known_values() {
        let eq = total_cost_savings();
        let known = Bindings::from([
            ("TPCPY".to_string(), 1500.0),
            ("TWPCPY".to_string(), 2500.0),
            ("UNRELATED".to_string(), 1.0),
        ]);
        assert_eq!(eq.relevant_values(&known).len(), 2);
        assert_eq!(eq.solve_for("TCSPY", &known).unwrap(), 4000.0);
    }

    #[test]
    fn test_solve_for_foreign_variable() {
        let eq = total_cost_savings();
        let err = eq.solve_for("AFSPY", &Bindings::new()).unwrap_err();
        assert!(err.is_instance_level());
    }
}
