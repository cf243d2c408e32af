//! Slug normalization shared by directory lookups and route matching.
//!
//! Slugs are compared in their normalized form: lowercase ASCII with accents
//! folded (`slug` crate) and every run of non-alphanumerics collapsed to `-`,
//! so `Corte Clásico` and `corte-clasico` address the same service.

use slug::slugify;
use thiserror::Error;

/// Errors that can occur while deriving a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Normalize free text or an existing slug; unrepresentable input yields an empty string.
pub fn normalize_slug(input: &str) -> String {
    derive_slug(input).unwrap_or_default()
}

/// Whether a stored slug (or the text it is derived from) addresses `requested`.
///
/// Empty normalizations never match, so a blank request cannot select a record
/// whose name happens to be unrepresentable.
pub fn slug_matches(stored: &str, requested: &str) -> bool {
    let requested = normalize_slug(requested);
    !requested.is_empty() && normalize_slug(stored) == requested
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_folds_accents() {
        assert_eq!(derive_slug("Mi Negocio Café").expect("slug"), "mi-negocio-cafe");
        assert_eq!(
            derive_slug("Restaurante El Ñandú").expect("slug"),
            "restaurante-el-nandu"
        );
        assert_eq!(derive_slug("  Tienda 123!!!  ").expect("slug"), "tienda-123");
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn derive_slug_rejects_punctuation_only() {
        assert_eq!(
            derive_slug("!!!"),
            Err(SlugError::Unrepresentable {
                input: "!!!".to_string()
            })
        );
    }

    #[test]
    fn slug_matches_normalizes_both_sides() {
        assert!(slug_matches("Corte Clásico", "corte-clasico"));
        assert!(slug_matches("corte-clasico", "CORTE-CLASICO"));
        assert!(!slug_matches("corte-clasico", "barba"));
        assert!(!slug_matches("!!!", "???"));
    }
}
