//! Naming strategies for mapped field names, collection names and discriminators.

use std::fmt;
use std::sync::Arc;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

/// Transforms a logical name into a stored name.
#[derive(Clone, Default)]
pub enum NamingStrategy {
    /// Keeps the name unchanged.
    #[default]
    Identity,
    /// `firstName` becomes `firstname`.
    LowerCase,
    /// `firstName` becomes `first_name`.
    SnakeCase,
    /// `firstName` becomes `first-name`.
    KebabCase,
    /// `first_name` becomes `firstName`.
    CamelCase,
    /// Applies a user-supplied function.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NamingStrategy {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        NamingStrategy::Custom(Arc::new(f))
    }

    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingStrategy::Identity => name.to_string(),
            NamingStrategy::LowerCase => name.to_lowercase(),
            NamingStrategy::SnakeCase => name.to_case(Case::Snake),
            NamingStrategy::KebabCase => name.to_case(Case::Kebab),
            NamingStrategy::CamelCase => name.to_case(Case::Camel),
            NamingStrategy::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Identity => write!(f, "Identity"),
            NamingStrategy::LowerCase => write!(f, "LowerCase"),
            NamingStrategy::SnakeCase => write!(f, "SnakeCase"),
            NamingStrategy::KebabCase => write!(f, "KebabCase"),
            NamingStrategy::CamelCase => write!(f, "CamelCase"),
            NamingStrategy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// The serializable subset of [`NamingStrategy`], used by configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    #[default]
    Identity,
    LowerCase,
    SnakeCase,
    KebabCase,
    CamelCase,
}

impl From<NamingConvention> for NamingStrategy {
    fn from(convention: NamingConvention) -> Self {
        match convention {
            NamingConvention::Identity => NamingStrategy::Identity,
            NamingConvention::LowerCase => NamingStrategy::LowerCase,
            NamingConvention::SnakeCase => NamingStrategy::SnakeCase,
            NamingConvention::KebabCase => NamingStrategy::KebabCase,
            NamingConvention::CamelCase => NamingStrategy::CamelCase,
        }
    }
}
