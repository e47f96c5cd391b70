//! # Search Clause Builder
//!
//! Free-text search runs against the whole collection, so its stage is
//! always emitted first.

use super::stage::Stage;

/// Builds the optional text-search stage
pub struct SearchClause;

impl SearchClause {
    /// Emit a search stage for non-blank text, nothing otherwise
    pub fn build(text: Option<&str>) -> Option<Stage> {
        let text = text?;
        if text.trim().is_empty() {
            return None;
        }

        Some(Stage::Search {
            query: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_or_blank_emits_nothing() {
        assert_eq!(SearchClause::build(None), None);
        assert_eq!(SearchClause::build(Some("")), None);
        assert_eq!(SearchClause::build(Some("  ")), None);
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        assert_eq!(
            SearchClause::build(Some("iPhone 15")),
            Some(Stage::Search {
                query: "iPhone 15".to_string()
            })
        );
    }
}
