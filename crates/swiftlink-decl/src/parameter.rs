//! Declared-parameter records.

use serde::{Deserialize, Serialize};

use swiftlink_typespec::{parse_type_spec, TypeSpec};

use crate::error::{DeclError, Result};

/// One declared parameter of a function, constructor, or accessor.
///
/// The `inout` marker lives on the type spec; [`ParameterItem::is_inout`]
/// reads it from there so the two can never disagree. The struct is
/// `Clone` because matching logic sometimes recasts a parameter as
/// reference-passing without touching the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterItem {
    /// External call-site label. Empty means positional.
    pub public_name: String,
    /// Internal binding name.
    pub private_name: String,
    pub type_spec: TypeSpec,
    pub is_variadic: bool,
}

impl ParameterItem {
    pub fn new(
        public_name: impl Into<String>,
        private_name: impl Into<String>,
        type_spec: TypeSpec,
    ) -> Self {
        ParameterItem {
            public_name: public_name.into(),
            private_name: private_name.into(),
            type_spec,
            is_variadic: false,
        }
    }

    /// Build a parameter from a textual type spec.
    pub fn parse(
        public_name: impl Into<String>,
        private_name: impl Into<String>,
        type_name: &str,
    ) -> Result<Self> {
        let type_spec = parse_type_spec(type_name).map_err(|source| DeclError::BadTypeName {
            type_name: type_name.to_string(),
            source,
        })?;
        Ok(ParameterItem::new(public_name, private_name, type_spec))
    }

    /// Whether the call site must spell out the label.
    pub fn name_is_required(&self) -> bool {
        !self.public_name.is_empty()
    }

    pub fn is_inout(&self) -> bool {
        self.type_spec.is_inout
    }

    /// The canonical textual form of the parameter's type.
    pub fn type_name(&self) -> String {
        self.type_spec.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_type_name_in_sync() {
        let param = ParameterItem::parse("count", "count", "Swift.Int").unwrap();
        assert_eq!(param.type_name(), "Swift.Int");
        assert!(param.name_is_required());
        assert!(!param.is_inout());
    }

    #[test]
    fn inout_is_read_from_the_spec() {
        let param = ParameterItem::parse("value", "value", "inout Swift.Int").unwrap();
        assert!(param.is_inout());
    }

    #[test]
    fn empty_public_name_means_positional() {
        let param = ParameterItem::parse("", "x", "Swift.Bool").unwrap();
        assert!(!param.name_is_required());
    }

    #[test]
    fn bad_type_name_is_an_error() {
        let err = ParameterItem::parse("a", "a", "Swift.Int Swift.Bool").unwrap_err();
        assert!(matches!(err, DeclError::BadTypeName { .. }));
    }
}
