//! Schema validation helpers.
//!
//! Checks a resource or data source configuration (a `serde_json::Value`)
//! against its [`Schema`] before any handler logic runs.
//!
//! # Example
//!
//! ```
//! use hw_provider::schema::{Attribute, Schema};
//! use hw_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("style", Attribute::required_string())
//!     .with_attribute("quantity", Attribute::required_int64());
//!
//! assert!(validate(&schema, &json!({"style": "premium", "quantity": 25})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"style": "premium", "quantity": "lots"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("quantity".to_string()));
//! ```

use crate::schema::{
    Attribute, AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema,
};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics; an empty list means the value is valid.
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped, the provider owns them
/// - Attribute types must match the schema
/// - Nested blocks are validated recursively with min/max item constraints
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Like [`validate`], but returns `Err` with the diagnostics when invalid.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

/// Check that a quantity attribute is not negative.
pub fn non_negative(path: &str, quantity: i64) -> Option<Diagnostic> {
    (quantity < 0).then(|| {
        Diagnostic::error(format!("Invalid value for '{}'", path))
            .with_detail(format!("Quantity must be zero or more, got {}", quantity))
            .with_attribute(path)
    })
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        _ => {
            let diag = Diagnostic::error("Expected object")
                .with_detail(format!("Got {}", value_type_name(value)));
            diagnostics.push(if path.is_empty() {
                diag
            } else {
                diag.with_attribute(path)
            });
            return;
        },
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.is_computed_only() {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !value.is_i64() && !value.is_u64() {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Number => {
            if !value.is_number() {
                diagnostics.push(type_error(path, "number", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) => match value.as_array() {
            Some(arr) => {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            },
            None => diagnostics.push(type_error(path, "list", value)),
        },
        AttributeType::Object(attrs) => match value.as_object() {
            Some(obj) => {
                // Members of an object type carry no flags, so presence is
                // not enforced.
                for (name, attr_type) in attrs {
                    if let Some(member) = obj.get(name) {
                        let member_path = join_path(path, name);
                        validate_attribute_type(attr_type, member, &member_path, diagnostics);
                    }
                }
            },
            None => diagnostics.push(type_error(path, "object", value)),
        },
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let items: Vec<&Value> = match (nested.nesting_mode, value) {
        (_, None | Some(Value::Null)) => Vec::new(),
        (BlockNestingMode::Single, Some(v)) => vec![v],
        (BlockNestingMode::List, Some(Value::Array(arr))) => arr.iter().collect(),
        (BlockNestingMode::List, Some(v)) => {
            diagnostics.push(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", value_type_name(v)))
                    .with_attribute(path),
            );
            return;
        },
    };

    let len = items.len() as u32;
    if len < nested.min_items {
        diagnostics.push(
            Diagnostic::error(format!(
                "Block '{}' requires at least {} item(s), got {}",
                path, nested.min_items, len
            ))
            .with_attribute(path),
        );
    }
    if nested.max_items > 0 && len > nested.max_items {
        diagnostics.push(
            Diagnostic::error(format!(
                "Block '{}' allows at most {} item(s), got {}",
                path, nested.max_items, len
            ))
            .with_attribute(path),
        );
    }

    match nested.nesting_mode {
        BlockNestingMode::Single => {
            for item in items {
                validate_block(&nested.block, item, path, diagnostics);
            }
        },
        BlockNestingMode::List => {
            for (i, item) in items.into_iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                validate_block(&nested.block, item, &item_path, diagnostics);
            }
        },
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}
