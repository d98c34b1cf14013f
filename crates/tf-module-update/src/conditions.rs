//! predicates over [ModuleSource]s
//!
//! A [Condition] answers one question: does this module source match? Conditions are built
//! from the fields of a filter source and combined with [all] and [any]. Comparisons are exact
//! and case-sensitive, no normalization takes place.
use crate::source::{ModuleSource, Revision};

/// Decides whether a module source matches
pub trait Condition: Send + Sync {
    fn matches(&self, source: &ModuleSource) -> bool;
}

// blanket impl for Fn
impl<F> Condition for F
where
    F: Fn(&ModuleSource) -> bool + Send + Sync,
{
    fn matches(&self, source: &ModuleSource) -> bool {
        self(source)
    }
}

pub type BoxedCondition = Box<dyn Condition>;

pub fn scheme_matches(scheme: impl Into<String>) -> impl Condition {
    let scheme = scheme.into();
    move |source: &ModuleSource| source.scheme == scheme
}

pub fn host_matches(host: impl Into<String>) -> impl Condition {
    let host = host.into();
    move |source: &ModuleSource| source.host == host
}

pub fn module_matches(module: impl Into<String>) -> impl Condition {
    let module = module.into();
    move |source: &ModuleSource| source.module == module
}

pub fn submodule_matches(submodule: impl Into<String>) -> impl Condition {
    let submodule = submodule.into();
    move |source: &ModuleSource| source.submodule == submodule
}

pub fn revision_matches(revision: impl Into<Revision>) -> impl Condition {
    let revision = revision.into();
    move |source: &ModuleSource| source.revision == revision
}

/// Matches when every condition matches, stops at the first miss
///
/// Without conditions this always matches.
pub fn all(conditions: Vec<BoxedCondition>) -> impl Condition {
    move |source: &ModuleSource| conditions.iter().all(|c| c.matches(source))
}

/// Matches when at least one condition matches, stops at the first hit
///
/// Without conditions this never matches.
pub fn any(conditions: Vec<BoxedCondition>) -> impl Condition {
    move |source: &ModuleSource| conditions.iter().any(|c| c.matches(source))
}

/// Never matches
pub fn never() -> impl Condition {
    |_: &ModuleSource| false
}

/// Build a condition from every non-empty field of `filter`
///
/// A filter without any field would match everything, so it is refused.
pub fn from_source(filter: &ModuleSource) -> Result<impl Condition, FilterError> {
    let mut conditions: Vec<BoxedCondition> = vec![];

    if !filter.scheme.is_empty() {
        conditions.push(Box::new(scheme_matches(filter.scheme.clone())));
    }

    if !filter.host.is_empty() {
        conditions.push(Box::new(host_matches(filter.host.clone())));
    }

    if !filter.module.is_empty() {
        conditions.push(Box::new(module_matches(filter.module.clone())));
    }

    if !filter.submodule.is_empty() {
        conditions.push(Box::new(submodule_matches(filter.submodule.clone())));
    }

    if !filter.revision.is_empty() {
        conditions.push(Box::new(revision_matches(filter.revision.clone())));
    }

    if conditions.is_empty() {
        return Err(FilterError::NoConditions);
    }

    tracing::debug!(count = conditions.len(), %filter, "conditions built from filter");
    Ok(all(conditions))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("no conditions provided")]
    NoConditions,
}
