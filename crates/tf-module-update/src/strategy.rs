//! update strategies
//!
//! A [Strategy] couples a decision ("should this source change?") with a mutation ("what does
//! it become?").
use crate::conditions::{BoxedCondition, Condition};
use crate::source::ModuleSource;

pub trait Strategy: Send + Sync {
    /// Whether `source` should be updated
    fn decide(&self, source: &ModuleSource) -> bool;

    /// The updated source
    ///
    /// Only meaningful after [Strategy::decide] returned `true`, no re-check happens here.
    fn apply(&self, source: &ModuleSource) -> ModuleSource;
}

type Mutator = Box<dyn Fn(&ModuleSource) -> ModuleSource + Send + Sync>;

/// Requires every condition to hold
///
/// A strategy without conditions never decides to update anything.
pub struct Strict {
    conditions: Vec<BoxedCondition>,
    mutator: Mutator,
}

impl Strict {
    pub fn new(mutator: impl Fn(&ModuleSource) -> ModuleSource + Send + Sync + 'static) -> Self {
        Self {
            conditions: vec![],
            mutator: Box::new(mutator),
        }
    }

    /// Merges `replacement` into every source it is applied to
    pub fn merging(replacement: ModuleSource) -> Self {
        Self::new(move |source| source.merge(&replacement))
    }

    pub fn with_condition(mut self, condition: impl Condition + 'static) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = BoxedCondition>) -> Self {
        self.conditions.extend(conditions);
        self
    }
}

impl Strategy for Strict {
    fn decide(&self, source: &ModuleSource) -> bool {
        if self.conditions.is_empty() {
            return false;
        }

        self.conditions.iter().all(|c| c.matches(source))
    }

    fn apply(&self, source: &ModuleSource) -> ModuleSource {
        (self.mutator)(source)
    }
}

impl std::fmt::Debug for Strict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strict")
            .field("conditions", &self.conditions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conditions;
    use pretty_assertions::assert_eq;

    fn vpc() -> ModuleSource {
        ModuleSource {
            scheme: "https".into(),
            host: "example.com".into(),
            module: "/aws/vpc".into(),
            revision: "v1.2.3".into(),
            ..Default::default()
        }
    }

    fn constant(value: bool) -> BoxedCondition {
        Box::new(move |_: &ModuleSource| value)
    }

    #[test]
    fn no_conditions_is_a_negative_decision() {
        let strategy = Strict::new(|source| source.clone());
        assert!(!strategy.decide(&vpc()));
        assert!(!strategy.decide(&ModuleSource::default()));

        let strategy = Strict::new(|source| source.clone()).with_conditions(vec![]);
        assert!(!strategy.decide(&vpc()));
    }

    #[test]
    fn one_failed_condition_fails_the_chain() {
        let strategy = Strict::new(|source| source.clone()).with_conditions([
            constant(true),
            constant(true),
            constant(false),
            constant(true),
        ]);
        assert!(!strategy.decide(&vpc()));
    }

    #[test]
    fn all_conditions_true() {
        let strategy = Strict::new(|source| source.clone())
            .with_conditions([constant(true), constant(true)])
            .with_condition(conditions::host_matches("example.com"));
        assert!(strategy.decide(&vpc()));
    }

    #[test]
    fn merging_applies_replacement() {
        let strategy = Strict::merging(ModuleSource {
            revision: "v2.0.0".into(),
            ..Default::default()
        })
        .with_condition(conditions::module_matches("/aws/vpc"));

        let source = vpc();
        assert!(strategy.decide(&source));

        let updated = strategy.apply(&source);
        assert_eq!(updated.to_string(), "https://example.com/aws/vpc?ref=v2.0.0");

        // apply trusts the caller and does not re-check
        let unrelated = ModuleSource {
            module: "/aws/eks".into(),
            ..vpc()
        };
        assert!(!strategy.decide(&unrelated));
        assert_eq!(strategy.apply(&unrelated).revision.as_str(), "v2.0.0");
    }

    #[test]
    fn updated_source_no_longer_matches_revision_filter() {
        let strategy = Strict::merging(ModuleSource {
            revision: "v2.0.0".into(),
            ..Default::default()
        })
        .with_condition(conditions::revision_matches("v1.2.3"));

        let updated = strategy.apply(&vpc());
        assert!(!strategy.decide(&updated));
    }
}
