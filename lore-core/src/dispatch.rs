//! Generic create/update/remove over entity collections.
//!
//! Every operation takes the current collection by reference and returns a
//! replacement; nothing is mutated in place, so callers can detect changes
//! by comparing collections.

use crate::world::{Collection, Entity, EntityId};
use thiserror::Error;

/// Errors from collection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrudError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("No {collection} record with id {id}")]
    NotFound { collection: Collection, id: EntityId },
}

/// User-correctable input problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
}

/// Check a record before it is written.
pub fn validate<E: Entity>(data: &E) -> Result<(), ValidationError> {
    if data.name().trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(())
}

/// Append a new record with a fresh id and timestamps.
pub fn create<E: Entity>(items: &[E], mut data: E) -> Result<(Vec<E>, EntityId), CrudError> {
    validate(&data)?;

    let generated_by = std::mem::take(&mut data.meta_mut().generated_by);
    let meta = data.meta_mut();
    *meta = Default::default();
    meta.generated_by = generated_by;
    let id = meta.id;

    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(data);

    tracing::info!(collection = %E::COLLECTION, %id, "created record");
    Ok((next, id))
}

/// Replace the fields of record `id` with `data`.
///
/// `id` and `created_at` are kept; `updated_at` advances. AI provenance is
/// the union of what the record had and what `data` carries.
pub fn update<E: Entity>(items: &[E], id: EntityId, mut data: E) -> Result<Vec<E>, CrudError> {
    let Some(index) = items.iter().position(|r| r.id() == id) else {
        return Err(CrudError::NotFound {
            collection: E::COLLECTION,
            id,
        });
    };
    validate(&data)?;

    let mut meta = items[index].meta().clone();
    for key in &data.meta().generated_by {
        meta.mark_generated(key);
    }
    meta.touch();
    *data.meta_mut() = meta;

    let mut next = items.to_vec();
    next[index] = data;

    tracing::info!(collection = %E::COLLECTION, %id, "updated record");
    Ok(next)
}

/// Remove record `id`. Removing an absent id returns an unchanged copy.
pub fn remove<E: Entity>(items: &[E], id: EntityId) -> Vec<E> {
    let next: Vec<E> = items.iter().filter(|r| r.id() != id).cloned().collect();
    if next.len() != items.len() {
        tracing::info!(collection = %E::COLLECTION, %id, "removed record");
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Fields, Location, MagicSystem};

    fn named(name: &str) -> Location {
        Location {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_assigns_fresh_identity() {
        let draft = named("Cidade da Lua");
        let draft_id = draft.meta.id;

        let (items, id) = create(&[], draft).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), id);
        assert_ne!(id, draft_id);
        assert_eq!(items[0].meta.created_at, items[0].meta.updated_at);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let (items, _) = create(&[], named("Existing")).unwrap();
        for name in ["", "   ", "\t\n"] {
            let err = create(&items, named(name)).unwrap_err();
            assert_eq!(err, CrudError::Validation(ValidationError::MissingName));
        }
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_create_keeps_ai_provenance() {
        let mut draft = MagicSystem {
            name: "Runecraft".to_string(),
            ..Default::default()
        };
        draft.meta.mark_generated("rules");

        let (items, _) = create(&[], draft).unwrap();
        assert_eq!(items[0].meta.generated_by, vec!["rules"]);
    }

    #[test]
    fn test_update_preserves_identity_and_advances_updated_at() {
        let (items, id) = create(&[], named("Porto")).unwrap();
        let original = items[0].clone();

        let mut data = original.clone();
        data.climate = "humid".to_string();
        let items = update(&items, id, data).unwrap();

        assert_eq!(items[0].id(), id);
        assert_eq!(items[0].meta.created_at, original.meta.created_at);
        assert!(items[0].meta.updated_at > original.meta.updated_at);
        assert_eq!(items[0].climate, "humid");
    }

    #[test]
    fn test_update_with_foreign_meta_keeps_stored_identity() {
        let (items, id) = create(&[], named("Porto")).unwrap();
        let stranger = named("Porto Novo");
        let items = update(&items, id, stranger).unwrap();
        assert_eq!(items[0].id(), id);
        assert_eq!(items[0].name(), "Porto Novo");
    }

    #[test]
    fn test_update_missing_id() {
        let (items, _) = create(&[], named("Porto")).unwrap();
        let missing = EntityId::new();
        let err = update(&items, missing, named("x")).unwrap_err();
        assert_eq!(
            err,
            CrudError::NotFound {
                collection: Collection::Locations,
                id: missing
            }
        );
    }

    #[test]
    fn test_update_validates_name() {
        let (items, id) = create(&[], named("Porto")).unwrap();
        let err = update(&items, id, named(" ")).unwrap_err();
        assert!(matches!(err, CrudError::Validation(_)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (items, a) = create(&[], named("A")).unwrap();
        let (items, _) = create(&items, named("B")).unwrap();

        let once = remove(&items, a);
        let twice = remove(&once, a);
        assert_eq!(once.len(), 1);
        assert_eq!(once, twice);
        // Input untouched.
        assert_eq!(items.len(), 2);
    }
}
