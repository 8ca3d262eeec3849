// crates/fhir-bridge-mcp/src/validation.rs
// ============================================================================
// Module: Argument Validation
// Description: JSON Schema validation of tool arguments before dispatch.
// Purpose: Reject malformed invocations before any remote call.
// Dependencies: fhir-bridge-contract, jsonschema
// ============================================================================

//! ## Overview
//! Every catalog entry's input schema is compiled once at router
//! construction; incoming arguments are validated before any handler runs.
//! Validation is pure and never touches the remote store. Enum violations
//! at a tool's declared discriminant pointer are classified separately so
//! dispatch can answer with the uniform unknown-action envelope; every
//! other violation rejects the invocation at the transport boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use fhir_bridge_contract::Discriminant;
use fhir_bridge_contract::ToolCatalog;
use jsonschema::Draft;
use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Argument validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Arguments violate the tool's schema.
    #[error("invalid arguments for {tool}: {}", .violations.join("; "))]
    Invalid {
        /// Tool the arguments were supplied for.
        tool: String,
        /// Human-readable violation list.
        violations: Vec<String>,
    },
    /// The discriminant value is outside the tool's enumeration.
    #[error("unknown {field}: {value}")]
    UnknownDiscriminant {
        /// Discriminant field name.
        field: String,
        /// Offending value.
        value: String,
        /// Comma-joined list of accepted values.
        valid: String,
    },
    /// A catalog schema failed to compile.
    #[error("schema compilation failed for {tool}: {message}")]
    Compile {
        /// Tool whose schema is broken.
        tool: String,
        /// Compiler diagnostic.
        message: String,
    },
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Compiled schema and discriminant declaration for one tool.
struct CompiledTool {
    /// Compiled input schema.
    validator: Validator,
    /// Discriminant declaration, for consolidated tools.
    discriminant: Option<Discriminant>,
}

/// Validates invocation arguments against compiled catalog schemas.
pub struct SchemaValidator {
    /// Compiled tools keyed by name.
    tools: BTreeMap<String, CompiledTool>,
}

impl SchemaValidator {
    /// Compiles every catalog schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Compile`] when a schema is invalid.
    pub fn compile(catalog: &ToolCatalog) -> Result<Self, ValidationError> {
        let mut tools = BTreeMap::new();
        for entry in catalog.entries() {
            let validator = jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(&entry.definition.input_schema)
                .map_err(|err| ValidationError::Compile {
                    tool: entry.definition.name.clone(),
                    message: err.to_string(),
                })?;
            tools.insert(
                entry.definition.name.clone(),
                CompiledTool {
                    validator,
                    discriminant: entry.discriminant.clone(),
                },
            );
        }
        Ok(Self {
            tools,
        })
    }

    /// Validates raw arguments for a tool.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownDiscriminant`] for enum violations
    /// at the declared discriminant pointer and
    /// [`ValidationError::Invalid`] for every other violation.
    pub fn validate(&self, tool: &str, args: &Value) -> Result<(), ValidationError> {
        let Some(compiled) = self.tools.get(tool) else {
            return Err(ValidationError::Invalid {
                tool: tool.to_string(),
                violations: vec!["tool schema not compiled".to_string()],
            });
        };
        let mut violations = Vec::new();
        for error in compiled.validator.iter_errors(args) {
            if let Some(discriminant) = &compiled.discriminant {
                let pointer = format!("/{}", discriminant.field);
                if error.instance_path().to_string() == pointer
                    && matches!(&error.kind(), ValidationErrorKind::Enum { .. })
                {
                    let value = args
                        .get(discriminant.field)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    return Err(ValidationError::UnknownDiscriminant {
                        field: discriminant.field.to_string(),
                        value,
                        valid: discriminant.valid_list(),
                    });
                }
            }
            violations.push(format_violation(&error));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid {
                tool: tool.to_string(),
                violations,
            })
        }
    }
}

/// Renders one schema violation with its instance location.
fn format_violation(error: &jsonschema::ValidationError<'_>) -> String {
    let path = error.instance_path().to_string();
    if path.is_empty() {
        error.to_string()
    } else {
        format!("{path}: {error}")
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::json;

    use super::SchemaValidator;
    use super::ValidationError;
    use crate::tools::build_catalog;

    /// Compiles the full catalog once per test.
    fn validator() -> SchemaValidator {
        let catalog = build_catalog().unwrap();
        SchemaValidator::compile(&catalog).unwrap()
    }

    #[test]
    fn valid_arguments_pass() {
        let validator = validator();
        let args = json!({
            "action": "read",
            "resourceType": "Patient",
            "id": "p1"
        });
        validator.validate("manageResource", &args).unwrap();
    }

    #[test]
    fn missing_required_field_is_a_violation() {
        let validator = validator();
        let args = json!({"action": "read"});
        let error = validator.validate("manageResource", &args).unwrap_err();
        let ValidationError::Invalid { tool, violations } = error else {
            panic!("expected Invalid, got {error}");
        };
        assert_eq!(tool, "manageResource");
        assert!(
            violations.iter().any(|violation| violation.contains("resourceType")),
            "violations do not mention the missing field: {violations:?}"
        );
    }

    #[test]
    fn wrong_primitive_type_is_a_violation() {
        let validator = validator();
        let args = json!({"action": "read", "resourceType": 42, "id": "p1"});
        let error = validator.validate("manageResource", &args).unwrap_err();
        assert!(matches!(error, ValidationError::Invalid { .. }));
    }

    #[test]
    fn discriminant_enum_violation_is_classified() {
        let validator = validator();
        let args = json!({"action": "fly", "resourceType": "Patient"});
        let error = validator.validate("manageResource", &args).unwrap_err();
        let ValidationError::UnknownDiscriminant { field, value, valid } = error else {
            panic!("expected UnknownDiscriminant, got {error}");
        };
        assert_eq!(field, "action");
        assert_eq!(value, "fly");
        assert_eq!(valid, "create, read, update, delete, search, patch, upsert");
    }

    #[test]
    fn non_discriminant_enum_violation_stays_invalid() {
        let validator = validator();
        let args = json!({
            "action": "read",
            "resourceType": "Observation",
            "id": "o1"
        });
        let error = validator.validate("manageClinicalReport", &args).unwrap_err();
        assert!(matches!(error, ValidationError::Invalid { .. }));
    }

    #[test]
    fn generated_tools_are_compiled() {
        let validator = validator();
        validator.validate("getPatient", &json!({"id": "p1"})).unwrap();
        let error = validator.validate("getPatient", &json!({})).unwrap_err();
        assert!(matches!(error, ValidationError::Invalid { .. }));
    }
}
