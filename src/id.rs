//! Identifier generation and parsing.
//!
//! Simple resources are identified as `"{tag}-{discriminator}-{len}"`, where
//! `len` is the byte length of the discriminator, e.g. `bread-rye-3`.
//! Composite resources concatenate the ids of their parts.
//!
//! Composite resources only keep the ids of what they reference, so the kind
//! of a referenced resource has to be parsed back out of its id with
//! [`extract_kind`]. That parse is tied to the id format above.

use thiserror::Error;

use crate::error::ProviderError;

/// Errors raised while parsing an identifier back apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The id does not start with the expected tag.
    #[error("'{id}' is not a {tag} identifier")]
    WrongTag {
        /// Expected tag.
        tag: String,
        /// Offending id.
        id: String,
    },

    /// The id has no trailing `-{number}` suffix.
    #[error("'{0}' has no length suffix")]
    MissingLength(String),

    /// The suffix disagrees with the recovered discriminator.
    ///
    /// Happens when a discriminator itself ends in `-{digits}` and the id was
    /// not produced by [`compute_id`], or when the id was edited by hand.
    #[error("'{id}' is ambiguous: suffix says {declared} bytes but '{kind}' is {actual}")]
    LengthMismatch {
        /// Offending id.
        id: String,
        /// Discriminator recovered from the id.
        kind: String,
        /// Length declared by the suffix.
        declared: usize,
        /// Actual byte length of the recovered discriminator.
        actual: usize,
    },
}

impl From<IdError> for ProviderError {
    fn from(err: IdError) -> Self {
        ProviderError::Validation(err.to_string())
    }
}

/// Build the identifier of a simple resource.
///
/// ```
/// use hw_provider::id::compute_id;
///
/// assert_eq!(compute_id("bread", "rye"), "bread-rye-3");
/// assert_eq!(compute_id("tables", "premium"), "tables-premium-7");
/// ```
pub fn compute_id(tag: &str, discriminator: &str) -> String {
    format!("{}-{}-{}", tag, discriminator, discriminator.len())
}

/// Build the identifier of a composite resource from its parts, in order.
pub fn composite_id<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts.into_iter().fold(String::new(), |mut id, part| {
        id.push_str(part.as_ref());
        id
    })
}

/// Recover the discriminator from an id built by [`compute_id`].
///
/// ```
/// use hw_provider::id::extract_kind;
///
/// assert_eq!(extract_kind("bread", "bread-sour-dough-10").unwrap(), "sour-dough");
/// assert!(extract_kind("meat", "bread-rye-3").is_err());
/// ```
pub fn extract_kind(tag: &str, id: &str) -> Result<String, IdError> {
    let rest = id
        .strip_prefix(tag)
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or_else(|| IdError::WrongTag {
            tag: tag.to_string(),
            id: id.to_string(),
        })?;

    let (kind, suffix) = rest
        .rsplit_once('-')
        .ok_or_else(|| IdError::MissingLength(id.to_string()))?;
    let declared: usize = suffix
        .parse()
        .map_err(|_| IdError::MissingLength(id.to_string()))?;

    if kind.len() != declared {
        return Err(IdError::LengthMismatch {
            id: id.to_string(),
            kind: kind.to_string(),
            declared,
            actual: kind.len(),
        });
    }

    Ok(kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_id() {
        assert_eq!(compute_id("bread", "rye"), "bread-rye-3");
        assert_eq!(compute_id("drink", "iced_tea"), "drink-iced_tea-8");
        assert_eq!(compute_id("meat", ""), "meat--0");
    }

    #[test]
    fn test_compute_id_counts_bytes() {
        assert_eq!(compute_id("bread", "brötchen"), "bread-brötchen-9");
    }

    #[test]
    fn test_composite_id() {
        assert_eq!(
            composite_id(["bread-rye-3", "meat-ham-3"]),
            "bread-rye-3meat-ham-3"
        );
        assert_eq!(composite_id(Vec::<String>::new()), "");
    }

    #[test]
    fn test_extract_kind_inverts_compute_id() {
        for kind in ["rye", "sour-dough", "whole-wheat-2", "brötchen", ""] {
            let id = compute_id("bread", kind);
            assert_eq!(extract_kind("bread", &id).unwrap(), kind);
        }
    }

    #[test]
    fn test_extract_kind_wrong_tag() {
        assert_eq!(
            extract_kind("meat", "bread-rye-3"),
            Err(IdError::WrongTag {
                tag: "meat".to_string(),
                id: "bread-rye-3".to_string(),
            })
        );
        // A tag that is only a prefix of another tag must not match.
        assert!(extract_kind("bread", "breadstick-rye-3").is_err());
    }

    #[test]
    fn test_extract_kind_missing_length() {
        assert_eq!(
            extract_kind("bread", "bread-rye"),
            Err(IdError::MissingLength("bread-rye".to_string()))
        );
        assert!(matches!(
            extract_kind("bread", "bread-rye-x"),
            Err(IdError::MissingLength(_))
        ));
    }

    #[test]
    fn test_extract_kind_flags_ambiguous_ids() {
        // "whole-2" was truncated by hand: the suffix no longer matches.
        let err = extract_kind("bread", "bread-whole-2").unwrap_err();
        assert_eq!(
            err,
            IdError::LengthMismatch {
                id: "bread-whole-2".to_string(),
                kind: "whole".to_string(),
                declared: 2,
                actual: 5,
            }
        );
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_id_error_into_provider_error() {
        let err: ProviderError = IdError::MissingLength("oven".to_string()).into();
        assert!(matches!(err, ProviderError::Validation(_)));
    }
}
