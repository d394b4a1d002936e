//! Entity identification

use darmogen_core::{CoreError, EntityIdentifier, EntityRule};

use crate::syntax::ClassDecl;

/// Decides whether a class is an entity under the run's single rule.
///
/// Heritage matches are direct: a class extending `BaseEntity` through an
/// intermediate class is not matched by `extends = "BaseEntity"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityClassifier {
    rule: EntityRule,
}

impl EntityClassifier {
    pub fn new(rule: EntityRule) -> Self {
        Self { rule }
    }

    pub fn from_identifier(identifier: &EntityIdentifier) -> Result<Self, CoreError> {
        Ok(Self::new(identifier.rule()?))
    }

    pub fn rule(&self) -> &EntityRule {
        &self.rule
    }

    pub fn is_entity(&self, class: &ClassDecl) -> bool {
        match &self.rule {
            EntityRule::Decorator(name) => class.has_decorator(name),
            EntityRule::Extends(name) => class.extends.as_deref() == Some(name.as_str()),
            EntityRule::Implements(name) => class.implements.iter().any(|i| i == name),
        }
    }
}
