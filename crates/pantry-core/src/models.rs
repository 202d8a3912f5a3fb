//! Core data models shared by the store, the index, and the advisor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PantryError, PantryResult};
use crate::freshness::{classify, Freshness};

/// A persisted ingredient row.
///
/// `id` is assigned by the store on creation and never changes. Dates are
/// kept as the free text the user typed; only [`crate::freshness`] parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub quantity: Option<String>,
    pub purchase_date: Option<String>,
    pub expiry_date: Option<String>,
}

impl Ingredient {
    /// Build a row from an id and a set of fields.
    pub fn from_fields(id: i64, fields: IngredientFields) -> Self {
        Self {
            id,
            name: fields.name,
            quantity: fields.quantity,
            purchase_date: fields.purchase_date,
            expiry_date: fields.expiry_date,
        }
    }

    /// Freshness of this row relative to `today`.
    pub fn freshness(&self, today: NaiveDate) -> Freshness {
        classify(self.expiry_date.as_deref().unwrap_or(""), today)
    }
}

/// The mutable fields of an ingredient, used for both `add` and `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientFields {
    pub name: String,
    pub quantity: Option<String>,
    pub purchase_date: Option<String>,
    pub expiry_date: Option<String>,
}

impl IngredientFields {
    /// Build fields from raw user input. Blank optional values become `None`;
    /// nothing is parsed or rejected here.
    pub fn new(
        name: impl Into<String>,
        quantity: Option<String>,
        purchase_date: Option<String>,
        expiry_date: Option<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            quantity: non_blank(quantity),
            purchase_date: non_blank(purchase_date),
            expiry_date: non_blank(expiry_date),
        }
    }

    /// Reject input without a name. The store itself does not enforce this.
    pub fn validate(&self) -> PantryResult<()> {
        if self.name.trim().is_empty() {
            return Err(PantryError::Validation(
                "ingredient name is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A passage returned by the vector index for one advisory request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    /// Corpus-relative path of the originating document.
    pub source: String,
    pub text: String,
    /// Cosine similarity to the query embedding.
    pub score: f64,
}

/// A chunk of a corpus document, produced while building the index.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_optionals_become_none() {
        let f = IngredientFields::new(
            "  eggs ",
            Some("".into()),
            Some("   ".into()),
            Some("2024-01-20".into()),
        );
        assert_eq!(f.name, "eggs");
        assert_eq!(f.quantity, None);
        assert_eq!(f.purchase_date, None);
        assert_eq!(f.expiry_date.as_deref(), Some("2024-01-20"));
    }

    #[test]
    fn test_validate_requires_name() {
        let f = IngredientFields::new("", None, None, None);
        assert!(matches!(f.validate(), Err(PantryError::Validation(_))));
        assert!(IngredientFields::new("milk", None, None, None)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_unvalidated_dates_are_kept_verbatim() {
        let f = IngredientFields::new("tofu", None, Some("next week".into()), None);
        assert_eq!(f.purchase_date.as_deref(), Some("next week"));
        assert!(f.validate().is_ok());
    }
}
