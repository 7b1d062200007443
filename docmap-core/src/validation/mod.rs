//! The validation engine.
//!
//! A [`Validator`] runs an ordered list of [`Rule`]s against a freshly built model. Every rule
//! runs, and every violation is collected; only then does any [`Severity::Fatal`] violation
//! abort the build with a [`ValidationFailure`] that lists all of them. Non-fatal violations are
//! logged and otherwise ignored.
//!
//! Rules come in two shapes:
//!
//! - [`ClassConstraint`] inspects the whole model
//! - [`PropertyConstraint`] inspects one property at a time
//!
//! The default catalog lives in [`rules`].

pub mod rules;

use std::fmt;
use std::sync::Arc;

use crate::error::{MappingError, MappingResult};
use crate::mapper::Mapper;
use crate::metadata::AnnotationKind;
use crate::model::EntityModel;
use crate::property::PropertyDescriptor;
use crate::types::TypeKey;

/// How serious a violation is, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Minor,
    Info,
    Warning,
    Severe,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Severe => "SEVERE",
            Severity::Fatal => "FATAL",
        };
        write!(f, "{label}")
    }
}

/// One problem found by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    severity: Severity,
    entity: String,
    entity_type: TypeKey,
    property: Option<String>,
    rule: &'static str,
    message: String,
}

impl ConstraintViolation {
    /// A violation concerning the whole model.
    pub fn new(severity: Severity, model: &EntityModel, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            entity: model.name().to_string(),
            entity_type: model.type_key(),
            property: None,
            rule,
            message: message.into(),
        }
    }

    /// A violation concerning one property of the model.
    pub fn for_property(
        severity: Severity,
        model: &EntityModel,
        property: &PropertyDescriptor,
        rule: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            property: Some(property.name().to_string()),
            ..Self::new(severity, model, rule, message)
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The name of the model's type.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn entity_type(&self) -> TypeKey {
        self.entity_type
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// The identifier of the rule that reported this violation.
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `Type` or `Type.property`.
    pub fn prefix(&self) -> String {
        match &self.property {
            Some(property) => format!("{}.{property}", self.entity),
            None => self.entity.clone(),
        }
    }

    /// A single-line, human readable description.
    pub fn render(&self) -> String {
        format!("{} complained about {} : {}", self.rule, self.prefix(), self.message)
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Every violation collected while validating a model that had at least one fatal violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    entity: String,
    violations: Vec<ConstraintViolation>,
}

impl ValidationFailure {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn fatal(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations
            .iter()
            .filter(|violation| violation.severity == Severity::Fatal)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mapping validation failed for {}:", self.entity)?;
        for violation in &self.violations {
            write!(f, "\n  [{}] {}", violation.severity, violation.render())?;
        }
        Ok(())
    }
}

/// A rule inspecting a whole model.
pub trait ClassConstraint: fmt::Debug + Send + Sync {
    fn check(&self, mapper: &Mapper, model: &EntityModel, violations: &mut Vec<ConstraintViolation>);
}

/// A rule inspecting one property at a time.
pub trait PropertyConstraint: fmt::Debug + Send + Sync {
    fn check(
        &self,
        mapper: &Mapper,
        model: &EntityModel,
        property: &PropertyDescriptor,
        violations: &mut Vec<ConstraintViolation>,
    );
}

/// A validation rule of either shape.
#[derive(Debug, Clone)]
pub enum Rule {
    Class(Arc<dyn ClassConstraint>),
    Property(Arc<dyn PropertyConstraint>),
}

impl Rule {
    pub fn class(constraint: impl ClassConstraint + 'static) -> Self {
        Rule::Class(Arc::new(constraint))
    }

    pub fn property(constraint: impl PropertyConstraint + 'static) -> Self {
        Rule::Property(Arc::new(constraint))
    }
}

/// Runs an ordered list of rules against entity models.
///
/// [`Validator::default`] carries the standard catalog; [`Validator::empty`] carries none.
///
/// # Example
///
/// ```ignore
/// use docmap::validation::{Validator, Rule, rules::ContradictingMetadata};
/// use docmap::metadata::AnnotationKind;
///
/// let validator = Validator::default().with_rule(Rule::property(ContradictingMetadata::new(
///     AnnotationKind::Version,
///     AnnotationKind::Reference,
/// )));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    rules: Vec<Rule>,
}

impl Validator {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule and returns every violation, in rule order.
    pub fn validate(&self, mapper: &Mapper, model: &EntityModel) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            match rule {
                Rule::Class(constraint) => constraint.check(mapper, model, &mut violations),
                Rule::Property(constraint) => {
                    for property in model.properties() {
                        constraint.check(mapper, model, property, &mut violations);
                    }
                }
            }
        }
        violations
    }

    /// Validates `model`, logging non-fatal violations.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Validation`] carrying every violation if any is fatal.
    pub fn check(&self, mapper: &Mapper, model: &EntityModel) -> MappingResult<()> {
        let violations = self.validate(mapper, model);
        let fatal = violations
            .iter()
            .any(|violation| violation.severity == Severity::Fatal);

        for violation in &violations {
            match violation.severity {
                Severity::Minor | Severity::Info => log::info!("{violation}"),
                Severity::Warning | Severity::Severe => log::warn!("{violation}"),
                Severity::Fatal => log::error!("{violation}"),
            }
        }

        if fatal {
            return Err(MappingError::Validation(ValidationFailure {
                entity: model.name().to_string(),
                violations,
            }));
        }

        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        use rules::*;

        Self::new(vec![
            Rule::class(ConstructorParameterNames),
            Rule::class(MultipleId),
            Rule::class(MultipleVersions),
            Rule::class(MissingIdentity),
            Rule::property(ContradictingMetadata::new(AnnotationKind::Reference, AnnotationKind::Property)),
            Rule::property(ContradictingMetadata::new(AnnotationKind::Reference, AnnotationKind::Embedded)),
            Rule::property(ContradictingMetadata::new(AnnotationKind::Id, AnnotationKind::Transient)),
            Rule::property(LazyReferenceOnArray),
            Rule::property(ReferenceToUnidentifiable),
            Rule::property(VersionType),
        ])
    }
}
