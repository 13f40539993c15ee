//! Provider configuration.
//!
//! The provider block has a single setting, `upcharge`: a flat dollar amount
//! added to every computed price and cost. When the block leaves it unset
//! the `HW_UPCHARGE` environment variable is consulted, and when that is
//! unset too the upcharge is zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// Environment variable read when the provider block has no `upcharge`.
pub const UPCHARGE_ENV: &str = "HW_UPCHARGE";

/// Largest accepted upcharge, in dollars.
///
/// Keeps every price (a rate times a `u32` quantity plus the upcharge)
/// far inside the range of [`Decimal`].
pub const MAX_UPCHARGE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Settings shared read-only by every handler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderConfig {
    /// Flat amount added to every price and cost.
    pub upcharge: Decimal,
}

impl ProviderConfig {
    /// Config with the given upcharge.
    pub fn with_upcharge(upcharge: Decimal) -> Self {
        Self { upcharge }
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Configuration for the hw sandwich shop provider")
            .with_attribute(
                "upcharge",
                Attribute::new(AttributeType::Number, AttributeFlags::optional())
                    .with_description(format!(
                        "Flat amount added to every price. Falls back to ${} when unset",
                        UPCHARGE_ENV
                    )),
            )
    }

    /// Build the config from the provider block, consulting the environment.
    pub fn from_value(config: &Value) -> Result<Self, ProviderError> {
        let env = std::env::var(UPCHARGE_ENV).ok();
        Self::from_sources(config, env.as_deref())
    }

    /// Build the config from the provider block and an optional env value.
    pub fn from_sources(config: &Value, env_upcharge: Option<&str>) -> Result<Self, ProviderError> {
        let from_block = match config.get("upcharge") {
            None | Some(Value::Null) => None,
            // Number text is kept verbatim (arbitrary_precision), never an f64.
            Some(Value::Number(n)) => Some(parse_upcharge(&n.to_string(), "upcharge")?),
            Some(other) => {
                return Err(ProviderError::Configuration(format!(
                    "upcharge must be a number, got {}",
                    other
                )))
            },
        };

        let upcharge = match (from_block, env_upcharge) {
            (Some(upcharge), _) => upcharge,
            (None, Some(raw)) if !raw.trim().is_empty() => parse_upcharge(raw, UPCHARGE_ENV)?,
            _ => Decimal::ZERO,
        };

        Ok(Self { upcharge })
    }
}

fn parse_upcharge(raw: &str, source: &str) -> Result<Decimal, ProviderError> {
    let raw = raw.trim();
    let upcharge = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| {
            ProviderError::Configuration(format!("{} '{}' is not a decimal: {}", source, raw, e))
        })?;

    if upcharge.is_sign_negative() && !upcharge.is_zero() {
        return Err(ProviderError::Configuration(format!(
            "{} must not be negative, got {}",
            source, upcharge
        )));
    }

    if upcharge > MAX_UPCHARGE {
        return Err(ProviderError::Configuration(format!(
            "{} must be at most {}, got {}",
            source, MAX_UPCHARGE, upcharge
        )));
    }

    Ok(upcharge)
}
