//! Grocery Item Entity
//!
//! A single list entry owned by one user.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};
use super::id::{ItemId, OwnerId};

/// Minimum item name length, in characters
pub const MIN_NAME_LEN: usize = 2;

/// A grocery list entry as stored in the `items` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    /// Store-assigned identifier
    pub id: ItemId,
    /// Owning user, immutable after creation
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    pub name: String,
    /// Free-form amount, unit left to the user
    pub quantity: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub purchased: bool,
    pub created_at: DateTime<Utc>,
}

impl GroceryItem {
    /// Creation time rendered in local time for list display
    pub fn created_label(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%b %-d, %H:%M")
            .to_string()
    }
}

impl Entity for GroceryItem {
    type Id = ItemId;
    type Draft = NewItem;
    type Patch = ItemPatch;

    const TABLE: &'static str = "items";
    const ORDER_BY: Option<&'static str> = Some("created_at.desc");

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.owner_id
    }

    fn from_draft(owner: &OwnerId, draft: &NewItem, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(uuid::Uuid::new_v4().to_string()),
            owner_id: owner.clone(),
            name: draft.name.clone(),
            quantity: draft.quantity.clone(),
            note: draft.note.clone(),
            purchased: draft.purchased,
            created_at,
        }
    }

    fn apply(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(quantity) = &patch.quantity {
            self.quantity = quantity.clone();
        }
        if let Some(purchased) = patch.purchased {
            self.purchased = purchased;
        }
    }
}

/// Validated insert payload for a new item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: String,
    pub note: Option<String>,
    /// Always false for a freshly added item
    pub purchased: bool,
}

/// Columns to change on an existing item; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
}

impl ItemPatch {
    pub fn purchased(purchased: bool) -> Self {
        Self {
            purchased: Some(purchased),
            ..Self::default()
        }
    }
}

/// Raw add-item form input. Missing fields read as empty so that
/// `validate` reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub name: String,
    pub quantity: String,
    pub note: Option<String>,
}

impl ItemForm {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Trim and check the form, producing the insert payload.
    pub fn validate(&self) -> DomainResult<NewItem> {
        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(DomainError::Validation(format!(
                "name must be at least {} characters",
                MIN_NAME_LEN
            )));
        }

        let quantity = self.quantity.trim();
        if quantity.is_empty() {
            return Err(DomainError::Validation("quantity is required".to_string()));
        }

        let note = self
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(NewItem {
            name: name.to_string(),
            quantity: quantity.to_string(),
            note,
            purchased: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_validation() {
        let item = ItemForm::new("  Milk ", "2L").with_note("   ").validate().unwrap();
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, "2L");
        assert!(item.note.is_none());
        assert!(!item.purchased);
    }

    #[test]
    fn test_short_name_rejected() {
        let err = ItemForm::new("M", "1").validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Whitespace does not count towards the minimum
        assert!(ItemForm::new(" M ", "1").validate().is_err());
        // Characters, not bytes
        assert!(ItemForm::new("é", "1").validate().is_err());
        assert!(ItemForm::new("éé", "1").validate().is_ok());
    }

    #[test]
    fn test_empty_quantity_rejected() {
        let err = ItemForm::new("Bread", "  ").validate().unwrap_err();
        assert_eq!(err, DomainError::Validation("quantity is required".to_string()));
    }

    #[test]
    fn test_row_deserialization() {
        let json = r#"{
            "id": 7,
            "user_id": "u-1",
            "name": "Eggs",
            "quantity": "12",
            "note": null,
            "purchased": true,
            "created_at": "2024-05-01T10:00:00+00:00"
        }"#;
        let item: GroceryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "7");
        assert_eq!(item.owner_id.as_str(), "u-1");
        assert!(item.purchased);
    }

    #[test]
    fn test_from_draft_defaults() {
        let owner = OwnerId::new("u-1");
        let draft = ItemForm::new("Milk", "2L").validate().unwrap();
        let item = GroceryItem::from_draft(&owner, &draft, Utc::now());
        assert_eq!(item.owner(), &owner);
        assert!(!item.purchased);
        assert!(!item.id.as_str().is_empty());
    }

    #[test]
    fn test_incomplete_form_fails_validation() {
        let form: ItemForm = serde_json::from_str(r#"{"name":"Milk"}"#).unwrap();
        assert_eq!(form.quantity, "");
        assert_eq!(
            form.validate().unwrap_err(),
            DomainError::Validation("quantity is required".to_string())
        );
    }

    #[test]
    fn test_patch_writes_only_given_columns() {
        let body = serde_json::to_value(ItemPatch::purchased(true)).unwrap();
        assert_eq!(body, serde_json::json!({"purchased": true}));

        let owner = OwnerId::new("u-1");
        let draft = ItemForm::new("Milk", "2L").validate().unwrap();
        let mut item = GroceryItem::from_draft(&owner, &draft, Utc::now());
        item.apply(&ItemPatch::purchased(true));
        assert!(item.purchased);
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, "2L");
    }

    #[test]
    fn test_created_label_uses_local_time() {
        let owner = OwnerId::new("u-1");
        let draft = ItemForm::new("Milk", "2L").validate().unwrap();
        let created_at = DateTime::parse_from_rfc3339("2024-05-01T10:30:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        let item = GroceryItem::from_draft(&owner, &draft, created_at);
        let expected = created_at.with_timezone(&Local).format("%b %-d, %H:%M").to_string();
        assert_eq!(item.created_label(), expected);
        assert!(item.created_label().contains(':'));
    }
}
