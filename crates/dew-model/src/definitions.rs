//! Domain definition documents.
//!
//! Each domain (a chapter or section of a reference book) is one YAML
//! document listing its glossary terms and equations:
//!
//! ```yaml
//! domain: economic_evaluations
//! source: usda-nrcs-irrigation-guide
//! terms:
//!   - name: seasonal_energy_savings
//!     display_name: Seasonal Energy Savings
//!     symbol: SES
//!     definition: Electrical energy saved over an irrigation season.
//!     common_unit_id: kWh/yr
//!     related_terms: [overall_pumping_plant_efficiency]
//! equations:
//!   - id: eq_seasonal_energy_savings
//!     name: Seasonal Energy Savings
//!     expression: "SES = (TIA * SGIA * (PRASC - PRASA) * 0.2) / (OPPE / 100)"
//!     variables:
//!       - {name: SES, description: Seasonal energy savings, unit_id: kWh/yr}
//!     dependencies: []
//! ```

use crate::equation::{EquationDef, VariableDef};
use crate::term::Term;
use crate::units::{DIMENSIONLESS, UnitRegistry};
use dew_core::{Error, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DomainDoc {
    domain: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    terms: Vec<TermDoc>,
    #[serde(default)]
    equations: Vec<EquationDoc>,
}

#[derive(Debug, Deserialize)]
struct TermDoc {
    name: String,
    display_name: String,
    symbol: String,
    definition: String,
    #[serde(default)]
    common_unit_id: Option<String>,
    #[serde(default)]
    related_terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EquationDoc {
    id: String,
    name: String,
    expression: String,
    #[serde(default)]
    latex: Option<String>,
    #[serde(default)]
    variables: Vec<VariableDoc>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VariableDoc {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    unit_id: Option<String>,
}

/// Terms and equations of one domain, validated against a unit registry.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainDefinition {
    pub domain: String,
    /// Reference-book id the domain is adapted from.
    pub source: Option<String>,
    pub terms: Vec<Term>,
    pub equations: Vec<EquationDef>,
}

impl DomainDefinition {
    /// Parse and validate a domain document.
    pub fn from_yaml_str(yaml: &str, units: &UnitRegistry) -> Result<Self> {
        let doc: DomainDoc = serde_yaml::from_str(yaml)?;
        if doc.domain.trim().is_empty() {
            return Err(Error::validation_field("domain", "domain name must not be empty"));
        }

        let terms = doc
            .terms
            .into_iter()
            .map(|t| resolve_term(t, &doc.domain, units))
            .collect::<Result<Vec<_>>>()?;

        let equations = doc
            .equations
            .into_iter()
            .map(|e| resolve_equation(e, &doc.domain, units))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Loaded {} terms and {} equations for domain '{}'",
            terms.len(),
            equations.len(),
            doc.domain
        );

        Ok(Self {
            domain: doc.domain,
            source: doc.source,
            terms,
            equations,
        })
    }

    /// Read and parse a domain document from disk.
    pub fn from_file(path: &Path, units: &UnitRegistry) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_yaml_str(&yaml, units).map_err(|e| match e {
            Error::Yaml(inner) => Error::parse(format!("{}: {inner}", path.display())),
            other => other,
        })
    }
}

fn resolve_term(doc: TermDoc, domain: &str, units: &UnitRegistry) -> Result<Term> {
    let common_unit = match &doc.common_unit_id {
        Some(id) if !units.contains(id) => {
            return Err(Error::validation_field(
                format!("{domain}.terms.{}", doc.name),
                format!("unit {id} not defined"),
            ));
        }
        Some(id) => Some(units.display(id)),
        None => None,
    };
    Ok(Term {
        name: doc.name,
        display_name: doc.display_name,
        symbol: doc.symbol,
        definition: doc.definition,
        common_unit_id: doc.common_unit_id,
        common_unit,
        related_terms: doc.related_terms,
    })
}

fn resolve_equation(doc: EquationDoc, domain: &str, units: &UnitRegistry) -> Result<EquationDef> {
    let mut eq = EquationDef::parse(doc.id, doc.name, doc.expression)?.with_domain(domain);
    if let Some(latex) = doc.latex {
        eq = eq.with_latex(latex);
    }
    for var in doc.variables {
        let unit = var.unit_id.unwrap_or_else(|| DIMENSIONLESS.to_string());
        eq = eq.with_variable(VariableDef::new(var.name, var.description).with_unit(unit));
    }
    for dep in doc.dependencies {
        eq = eq.with_dependency(dep);
    }
    eq.validate(units)?;
    Ok(eq)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DOC: &str = r#"
domain: test_domain
source: usda-nrcs-irrigation-guide
terms:
  - name: total_water_purchase_cost_per_year
    display_name: Total Water Purchase Cost per Year
    symbol: TWPCPY
    definition: Cost of purchased water per year.
    common_unit_id: dollar
    related_terms: [cost_per_acre_foot]
equations:
  - id: eq_total_water_purchase_cost_per_year
    name: Total Water Purchase Cost per Year
    expression: TWPCPY = CPAF * AFSPY
    variables:
      - {name: TWPCPY, description: Total water purchase cost per year, unit_id: dollar}
      - {name: CPAF, description: Cost per acre-foot, unit_id: dollar}
      - {name: AFSPY, description: Acre-feet saved per year, unit_id: acreft_per_year}
    dependencies: [eq_total_annual_water_saved]
"#;

    #[test]
    fn test_load_domain() {
        let units = UnitRegistry::builtin();
        let def = DomainDefinition::from_yaml_str(DOC, &units).unwrap();
        assert_eq!(def.domain, "test_domain");
        assert_eq!(def.source.as_deref(), Some("usda-nrcs-irrigation-guide"));
        assert_eq!(def.terms[0].common_unit.as_deref(), Some("$"));
        let eq = &def.equations[0];
        assert_eq!(eq.domain, "test_domain");
        assert_eq!(eq.latex, r"TWPCPY = CPAF \cdot AFSPY");
        assert_eq!(eq.dependencies, vec!["eq_total_annual_water_saved"]);
        assert_eq!(eq.variable("AFSPY").unwrap().unit, "acreft_per_year");
    }

    #[test]
    fn test_missing_unit_id_is_dimensionless() {
        let units = UnitRegistry::builtin();
        let yaml = r#"
domain: d
equations:
  - id: eq_ratio
    name: Ratio
    expression: r = a / b
    variables:
      - {name: r}
      - {name: a}
      - {name: b}
"#;
        let def = DomainDefinition::from_yaml_str(yaml, &units).unwrap();
        assert_eq!(def.equations[0].variables[0].unit, DIMENSIONLESS);
    }

    #[test]
    fn test_unknown_term_unit() {
        let units = UnitRegistry::builtin();
        let yaml = r#"
domain: d
terms:
  - {name: t, display_name: T, symbol: T, definition: x, common_unit_id: furlong}
"#;
        let err = DomainDefinition::from_yaml_str(yaml, &units).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: d.terms.t: unit furlong not defined");
    }

    #[test]
    fn test_bad_expression() {
        let units = UnitRegistry::builtin();
        let yaml = r#"
domain: d
equations:
  - {id: eq_x, name: X, expression: "x = * y", variables: []}
"#;
        let err = DomainDefinition::from_yaml_str(yaml, &units).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "domain: [unclosed").unwrap();
        let units = UnitRegistry::builtin();
        let err = DomainDefinition::from_file(&path, &units).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));

        let err = DomainDefinition::from_file(&dir.path().join("absent.yaml"), &units).unwrap_err();
        assert!(matches!(err, Error::Io { path: Some(_), .. }));
    }
}
