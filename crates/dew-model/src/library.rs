//! The equation library: every loaded domain with lookups across them.

use crate::definitions::DomainDefinition;
use crate::equation::EquationDef;
use crate::term::Term;
use crate::units::UnitRegistry;
use dew_core::{Error, Result, find_yaml_files};
use std::collections::HashMap;
use std::path::Path;

/// Domain documents compiled into the binary.
const BUILTIN_DOMAINS: &[(&str, &str)] = &[
    (
        "economic_evaluations",
        include_str!("data/economic_evaluations.yaml"),
    ),
    (
        "irrigation_system_evaluation_procedures",
        include_str!("data/irrigation_system_evaluation_procedures.yaml"),
    ),
];

/// Terms, equations, and units of all loaded domains.
#[derive(Clone, Debug)]
pub struct EquationLibrary {
    units: UnitRegistry,
    domains: Vec<DomainDefinition>,
    terms: HashMap<String, (usize, usize)>,
    equations: HashMap<String, (usize, usize)>,
}

impl EquationLibrary {
    /// The built-in domains with the built-in unit registry.
    pub fn builtin() -> Result<Self> {
        let units = UnitRegistry::builtin();
        let domains = builtin_domains(&units)?;
        Self::from_domains(units, domains)
    }

    /// The built-in domains plus every YAML document in `dir`.
    pub fn with_definitions_dir(dir: &Path) -> Result<Self> {
        let units = UnitRegistry::builtin();
        let mut domains = builtin_domains(&units)?;
        for path in find_yaml_files(dir)? {
            log::info!("Loading domain definitions from {}", path.display());
            domains.push(DomainDefinition::from_file(&path, &units)?);
        }
        Self::from_domains(units, domains)
    }

    /// Build a library from already-parsed domains.
    ///
    /// Domain names and equation ids must be unique, and every equation
    /// dependency must name a loaded equation. A repeated term name
    /// replaces the earlier term in lookups.
    pub fn from_domains(units: UnitRegistry, domains: Vec<DomainDefinition>) -> Result<Self> {
        let mut terms = HashMap::new();
        let mut equations = HashMap::new();

        for (d, domain) in domains.iter().enumerate() {
            if domains[..d].iter().any(|other| other.domain == domain.domain) {
                return Err(Error::validation_field(
                    "domain",
                    format!("domain {} defined twice", domain.domain),
                ));
            }
            for (t, term) in domain.terms.iter().enumerate() {
                if terms.insert(term.name.clone(), (d, t)).is_some() {
                    log::warn!(
                        "Term {} redefined by domain {}; using the later definition",
                        term.name,
                        domain.domain
                    );
                }
            }
            for (e, eq) in domain.equations.iter().enumerate() {
                if equations.insert(eq.id.clone(), (d, e)).is_some() {
                    return Err(Error::validation_field(
                        format!("{}.equations", domain.domain),
                        format!("duplicate equation id {}", eq.id),
                    ));
                }
            }
        }

        for domain in &domains {
            for eq in &domain.equations {
                if let Some(dep) = eq.dependencies.iter().find(|d| !equations.contains_key(*d)) {
                    return Err(Error::validation_field(
                        format!("equations.{}.dependencies", eq.id),
                        format!("unknown equation {dep}"),
                    ));
                }
            }
        }

        for domain in &domains {
            log::info!(
                "Loaded {} terms and {} equations for domain '{}'",
                domain.terms.len(),
                domain.equations.len(),
                domain.domain
            );
        }

        Ok(Self {
            units,
            domains,
            terms,
            equations,
        })
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn domains(&self) -> &[DomainDefinition] {
        &self.domains
    }

    /// Domain names in load order.
    pub fn available_domains(&self) -> Vec<&str> {
        self.domains.iter().map(|d| d.domain.as_str()).collect()
    }

    pub fn all_terms(&self) -> impl Iterator<Item = &Term> {
        self.domains.iter().flat_map(|d| d.terms.iter())
    }

    pub fn all_equations(&self) -> impl Iterator<Item = &EquationDef> {
        self.domains.iter().flat_map(|d| d.equations.iter())
    }

    /// Terms of one domain; empty for an unknown domain.
    pub fn domain_terms(&self, domain: &str) -> &[Term] {
        self.domain(domain).map(|d| d.terms.as_slice()).unwrap_or(&[])
    }

    /// Equations of one domain; empty for an unknown domain.
    pub fn domain_equations(&self, domain: &str) -> &[EquationDef] {
        self.domain(domain)
            .map(|d| d.equations.as_slice())
            .unwrap_or(&[])
    }

    fn domain(&self, name: &str) -> Option<&DomainDefinition> {
        self.domains.iter().find(|d| d.domain == name)
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms
            .get(name)
            .map(|&(d, t)| &self.domains[d].terms[t])
    }

    pub fn equation(&self, id: &str) -> Option<&EquationDef> {
        self.equations
            .get(id)
            .map(|&(d, e)| &self.domains[d].equations[e])
    }

    /// Look up an equation, failing with `NotFound`.
    pub fn require_equation(&self, id: &str) -> Result<&EquationDef> {
        self.equation(id)
            .ok_or_else(|| Error::not_found("equation", id))
    }
}

fn builtin_domains(units: &UnitRegistry) -> Result<Vec<DomainDefinition>> {
    BUILTIN_DOMAINS
        .iter()
        .map(|(name, yaml)| {
            DomainDefinition::from_yaml_str(yaml, units)
                .map_err(|e| Error::config(format!("built-in domain {name}: {e}")))
        })
        .collect()
}
