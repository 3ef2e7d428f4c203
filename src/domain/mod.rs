//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod id;
mod identity;
mod item;
mod profile;

pub use entity::{DomainError, DomainResult, Entity};
pub use id::{ItemId, OwnerId};
pub use identity::{Credentials, Identity, Session, SignUpForm};
pub use item::{GroceryItem, ItemForm, ItemPatch, NewItem, MIN_NAME_LEN};
pub use profile::{NewProfile, Profile};
