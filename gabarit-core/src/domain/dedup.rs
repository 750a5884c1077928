// gabarit-core/src/domain/dedup.rs

// Collapses per-scope coded value lists into the minimal set of named
// domains. The canonical key is the concatenated label list: two scopes with
// byte-identical lists share one domain, whatever class or code they belong
// to.

use crate::domain::catalog::{Attribute, CodedValue, DataType};
use serde::Serialize;
use std::collections::HashMap;

/// Granularity at which value-sets are collected and deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// One domain per distinct attribute name across all selected classes.
    /// Coarsest: the first value-set seen for an attribute wins.
    ByAttribute,
    /// One domain per distinct (attribute, value-set) pair, shared across
    /// classes when the sets are identical.
    ByClassAttribute,
    /// Same as by-class-attribute but at specific-code granularity; tracks
    /// which codes share a domain so one binding call covers them all.
    ByCodeAttribute,
}

/// How value lists are canonicalized into the dedup key.
///
/// `CatalogOrder` reproduces the historical behaviour: labels concatenated in
/// catalog display order, so two sets that differ only in ordering stay
/// separate domains. `Sorted` merges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    #[default]
    CatalogOrder,
    Sorted,
}

/// A (table, field) the domain must be bound to. `codes` is empty for
/// class-level strategies; for by-code it carries every subtype sharing the
/// domain so the emitter issues a single binding call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainAssignment {
    pub class: String,
    pub field: String,
    pub codes: Vec<i64>,
}

/// A canonical, deduplicated domain and everywhere it must be bound.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedDomain {
    pub name: String,
    pub attribute: String,
    pub field_type: DataType,
    pub description: String,
    pub values: Vec<CodedValue>,
    pub assignments: Vec<DomainAssignment>,
}

/// Accumulator for one run. Insertion order of first occurrences is the
/// emission order.
pub struct DomainSet {
    prefix: String,
    strategy: GenerationStrategy,
    order: KeyOrder,
    domains: Vec<DerivedDomain>,
    index: HashMap<String, usize>,
    seq: HashMap<String, u32>,
}

impl DomainSet {
    pub fn new(prefix: &str, strategy: GenerationStrategy, order: KeyOrder) -> Self {
        Self {
            prefix: prefix.to_uppercase(),
            strategy,
            order,
            domains: Vec::new(),
            index: HashMap::new(),
            seq: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> GenerationStrategy {
        self.strategy
    }

    /// Registers one (scope, attribute, value-list) observation. Returns the
    /// index of the domain the scope was attached to.
    pub fn insert(
        &mut self,
        class: &str,
        code: Option<i64>,
        attribute: &Attribute,
        values: &[CodedValue],
    ) -> usize {
        let key = self.dedup_key(&attribute.name, values);

        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let seq = self.seq.entry(attribute.name.clone()).or_insert(0);
                *seq += 1;
                let name = format!("{}_{}_{}", self.prefix, attribute.name, seq);
                let domain = DerivedDomain {
                    name,
                    attribute: attribute.name.clone(),
                    field_type: attribute.data_type,
                    description: format!("Valeurs permises pour {}", attribute.name),
                    values: values.to_vec(),
                    assignments: Vec::new(),
                };
                self.domains.push(domain);
                let idx = self.domains.len() - 1;
                self.index.insert(key, idx);
                idx
            }
        };

        self.attach(idx, class, code, &attribute.name);
        idx
    }

    fn attach(&mut self, idx: usize, class: &str, code: Option<i64>, field: &str) {
        let domain = &mut self.domains[idx];
        match (self.strategy, code) {
            (GenerationStrategy::ByCodeAttribute, Some(code)) => {
                if let Some(existing) = domain
                    .assignments
                    .iter_mut()
                    .find(|a| a.class == class && a.field == field)
                {
                    if !existing.codes.contains(&code) {
                        existing.codes.push(code);
                    }
                } else {
                    domain.assignments.push(DomainAssignment {
                        class: class.to_string(),
                        field: field.to_string(),
                        codes: vec![code],
                    });
                }
            }
            _ => {
                let already = domain
                    .assignments
                    .iter()
                    .any(|a| a.class == class && a.field == field);
                if !already {
                    domain.assignments.push(DomainAssignment {
                        class: class.to_string(),
                        field: field.to_string(),
                        codes: Vec::new(),
                    });
                }
            }
        }
    }

    fn dedup_key(&self, attribute: &str, values: &[CodedValue]) -> String {
        match self.strategy {
            GenerationStrategy::ByAttribute => attribute.to_string(),
            _ => {
                let mut labels: Vec<&str> =
                    values.iter().map(|v| v.label_fr.as_str()).collect();
                if self.order == KeyOrder::Sorted {
                    labels.sort_unstable();
                }
                format!("{}\u{1}{}", attribute, labels.join(", "))
            }
        }
    }

    pub fn domains(&self) -> &[DerivedDomain] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
