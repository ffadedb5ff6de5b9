//! Collection targets and the provisioning configuration document.
//!
//! A `CollectionTarget` is constructed once from static configuration at
//! process start and read-only thereafter. Cross-cutting invariants (index
//! name uniqueness, unique indexes over required fields) are enforced at
//! construction; deserialization routes through the same checks.

use serde::{Deserialize, Serialize};

use crate::index::{IndexDefinition, IndexPlan};
use crate::schema::SchemaDescriptor;
use crate::validation::ValidationMode;

use super::errors::{ConfigError, ConfigResult};

/// Application credential to provision alongside a collection.
///
/// `password_ref` is an opaque reference (typically an environment variable
/// name) resolved on the engine side; configuration never carries a literal
/// secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSpec {
    /// Credential user name
    pub user: String,
    /// Opaque reference to the secret material
    pub password_ref: String,
    /// Roles granted to the credential
    pub roles: Vec<String>,
}

impl CredentialSpec {
    /// Create a credential spec.
    pub fn new(
        user: impl Into<String>,
        password_ref: impl Into<String>,
        roles: Vec<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password_ref: password_ref.into(),
            roles,
        }
    }
}

#[derive(Deserialize)]
struct RawCollectionTarget {
    name: String,
    schema: SchemaDescriptor,
    mode: ValidationMode,
    #[serde(default)]
    indexes: IndexPlan,
    #[serde(default)]
    credential: Option<CredentialSpec>,
}

/// Declared target state for one collection: schema, validation mode, index
/// set, and optional application credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCollectionTarget")]
pub struct CollectionTarget {
    name: String,
    schema: SchemaDescriptor,
    mode: ValidationMode,
    indexes: IndexPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential: Option<CredentialSpec>,
}

impl CollectionTarget {
    /// Build a target, rejecting invalid static configuration.
    pub fn new(
        name: impl Into<String>,
        schema: SchemaDescriptor,
        mode: ValidationMode,
        indexes: Vec<IndexDefinition>,
        credential: Option<CredentialSpec>,
    ) -> ConfigResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyCollectionName);
        }

        let mut seen = std::collections::HashSet::new();
        for index in &indexes {
            if !seen.insert(index.name.as_str()) {
                return Err(ConfigError::DuplicateIndex {
                    collection: name,
                    index: index.name.clone(),
                });
            }
            if index.keys.is_empty() {
                return Err(ConfigError::EmptyKeySpec {
                    collection: name,
                    index: index.name.clone(),
                });
            }
            if index.unique {
                // A unique constraint over a field that may be absent cannot
                // hold; unique keys must be required fields.
                for field in index.fields() {
                    if !schema.is_required(field) {
                        return Err(ConfigError::UniqueIndexField {
                            collection: name,
                            index: index.name.clone(),
                            field: field.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            name,
            schema,
            mode,
            indexes: IndexPlan::new(indexes),
            credential,
        })
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared schema descriptor.
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Declared validation mode.
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Declared index plan.
    pub fn index_plan(&self) -> &IndexPlan {
        &self.indexes
    }

    /// Declared application credential, if any.
    pub fn credential(&self) -> Option<&CredentialSpec> {
        self.credential.as_ref()
    }
}

impl TryFrom<RawCollectionTarget> for CollectionTarget {
    type Error = ConfigError;

    fn try_from(raw: RawCollectionTarget) -> ConfigResult<Self> {
        Self::new(
            raw.name,
            raw.schema,
            raw.mode,
            raw.indexes.indexes().to_vec(),
            raw.credential,
        )
    }
}

#[derive(Deserialize)]
struct RawProvisioningConfig {
    targets: Vec<CollectionTarget>,
}

/// The operator-facing configuration document: one or more collection
/// targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawProvisioningConfig")]
pub struct ProvisioningConfig {
    targets: Vec<CollectionTarget>,
}

impl ProvisioningConfig {
    /// Build a configuration, rejecting empty or ambiguous target sets.
    pub fn new(targets: Vec<CollectionTarget>) -> ConfigResult<Self> {
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        let mut seen = std::collections::HashSet::new();
        for target in &targets {
            if !seen.insert(target.name()) {
                return Err(ConfigError::DuplicateTarget(target.name().to_string()));
            }
        }
        Ok(Self { targets })
    }

    /// Declared targets in declaration order.
    pub fn targets(&self) -> &[CollectionTarget] {
        &self.targets
    }

    /// Look up a target by collection name.
    pub fn target(&self, name: &str) -> Option<&CollectionTarget> {
        self.targets.iter().find(|t| t.name() == name)
    }
}

impl TryFrom<RawProvisioningConfig> for ProvisioningConfig {
    type Error = ConfigError;

    fn try_from(raw: RawProvisioningConfig) -> ConfigResult<Self> {
        Self::new(raw.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDomain, FieldSpec};

    fn movie_schema() -> SchemaDescriptor {
        SchemaDescriptor::new(vec![
            FieldSpec::required("id", FieldDomain::Integer),
            FieldSpec::required("title", FieldDomain::String),
            FieldSpec::optional("vote_average", FieldDomain::Double),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_target() {
        let target = CollectionTarget::new(
            "tmdb_movies",
            movie_schema(),
            ValidationMode::Warn,
            vec![
                IndexDefinition::ascending("idx_tmdb_id", "id").into_unique(),
                IndexDefinition::descending("idx_vote_avg", "vote_average"),
            ],
            Some(CredentialSpec::new(
                "movies_user",
                "MOVIES_DB_PASSWORD",
                vec!["readWrite".into()],
            )),
        )
        .unwrap();

        assert_eq!(target.name(), "tmdb_movies");
        assert_eq!(target.mode(), ValidationMode::Warn);
        assert_eq!(target.index_plan().len(), 2);
        assert_eq!(target.credential().unwrap().user, "movies_user");
    }

    #[test]
    fn test_empty_name_rejected() {
        let result =
            CollectionTarget::new("", movie_schema(), ValidationMode::Enforce, vec![], None);
        assert!(matches!(result, Err(ConfigError::EmptyCollectionName)));
    }

    #[test]
    fn test_duplicate_index_name_rejected() {
        let result = CollectionTarget::new(
            "movies",
            movie_schema(),
            ValidationMode::Enforce,
            vec![
                IndexDefinition::ascending("idx", "id"),
                IndexDefinition::ascending("idx", "title"),
            ],
            None,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateIndex { .. })));
    }

    #[test]
    fn test_empty_key_spec_rejected() {
        let result = CollectionTarget::new(
            "movies",
            movie_schema(),
            ValidationMode::Enforce,
            vec![IndexDefinition::new("idx_empty", vec![])],
            None,
        );
        assert!(matches!(result, Err(ConfigError::EmptyKeySpec { .. })));
    }

    #[test]
    fn test_unique_index_requires_required_field() {
        // vote_average is optional
        let result = CollectionTarget::new(
            "movies",
            movie_schema(),
            ValidationMode::Enforce,
            vec![IndexDefinition::ascending("idx_vote", "vote_average").into_unique()],
            None,
        );
        assert!(matches!(
            result,
            Err(ConfigError::UniqueIndexField { ref field, .. }) if field == "vote_average"
        ));

        // undeclared field
        let result = CollectionTarget::new(
            "movies",
            movie_schema(),
            ValidationMode::Enforce,
            vec![IndexDefinition::ascending("idx_x", "undeclared").into_unique()],
            None,
        );
        assert!(matches!(result, Err(ConfigError::UniqueIndexField { .. })));
    }

    #[test]
    fn test_non_unique_index_may_cover_optional_field() {
        let result = CollectionTarget::new(
            "movies",
            movie_schema(),
            ValidationMode::Enforce,
            vec![IndexDefinition::descending("idx_vote", "vote_average")],
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_rejects_empty_and_duplicate_targets() {
        assert!(matches!(
            ProvisioningConfig::new(vec![]),
            Err(ConfigError::NoTargets)
        ));

        let target = CollectionTarget::new(
            "movies",
            movie_schema(),
            ValidationMode::Warn,
            vec![],
            None,
        )
        .unwrap();
        let result = ProvisioningConfig::new(vec![target.clone(), target]);
        assert!(matches!(result, Err(ConfigError::DuplicateTarget(_))));
    }

    #[test]
    fn test_deserialization_enforces_invariants() {
        // Unique index over an optional field must fail even via serde
        let doc = r#"{
            "name": "movies",
            "mode": "enforce",
            "schema": [
                {"name": "id", "type": "integer", "required": true},
                {"name": "vote_average", "type": "double"}
            ],
            "indexes": [
                {"name": "idx_vote", "unique": true,
                 "keys": [{"field": "vote_average", "order": "ascending"}]}
            ]
        }"#;
        assert!(serde_json::from_str::<CollectionTarget>(doc).is_err());
    }

    #[test]
    fn test_mode_must_be_declared_explicitly() {
        // No implicit default: omitting mode is a parse error
        let doc = r#"{
            "name": "movies",
            "schema": [{"name": "id", "type": "integer", "required": true}]
        }"#;
        assert!(serde_json::from_str::<CollectionTarget>(doc).is_err());
    }
}
