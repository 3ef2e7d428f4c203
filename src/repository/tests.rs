//! Repository Integration Tests
//!
//! Tests for ItemRepository over the in-memory store, plus the toggle
//! request shape against a mocked REST store.

#[cfg(test)]
mod tests {
    use crate::context::{SessionContext, SessionGuard};
    use crate::domain::{DomainError, GroceryItem, Identity, ItemForm, ItemId, Session};
    use crate::repository::{ItemRepository, MemoryRepository};
    use std::sync::Arc;

    fn session_for(user: &str) -> Session {
        Session::new(format!("jwt-{user}"), Identity::new(user))
    }

    fn setup_repo(
        store: &Arc<MemoryRepository<GroceryItem>>,
        ctx: SessionContext,
    ) -> ItemRepository {
        ItemRepository::new(store.clone(), Arc::new(ctx))
    }

    fn setup_signed_in(user: &str) -> (Arc<MemoryRepository<GroceryItem>>, ItemRepository) {
        let store = Arc::new(MemoryRepository::new());
        let repo = setup_repo(&store, SessionContext::signed_in(session_for(user)));
        (store, repo)
    }

    #[tokio::test]
    async fn test_add_item() {
        let (_store, repo) = setup_signed_in("u-1");

        let item = repo.add(&ItemForm::new("Milk", "2L")).await.expect("Failed to add");

        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, "2L");
        assert!(!item.purchased);
        assert_eq!(item.owner_id.as_str(), "u-1");
    }

    #[tokio::test]
    async fn test_add_owner_matches_current_user() {
        let store = Arc::new(MemoryRepository::new());
        let ctx = SessionContext::signed_in(session_for("u-7"));
        let repo = setup_repo(&store, ctx.clone());

        for (name, quantity) in [("Milk", "2L"), ("Eggs", "12"), ("Rice", "1 kg")] {
            let item = repo.add(&ItemForm::new(name, quantity)).await.unwrap();
            assert_eq!(item.owner_id, ctx.current_user().await.unwrap().id);
            assert!(!item.purchased);
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_store, repo) = setup_signed_in("u-1");

        repo.add(&ItemForm::new("Item 1", "1")).await.unwrap();
        repo.add(&ItemForm::new("Item 2", "1")).await.unwrap();
        repo.add(&ItemForm::new("Item 3", "1")).await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Item 3", "Item 2", "Item 1"]);
    }

    #[tokio::test]
    async fn test_double_toggle_restores() {
        let (_store, repo) = setup_signed_in("u-1");
        let item = repo.add(&ItemForm::new("Bread", "1 loaf")).await.unwrap();

        let once = repo.toggle_purchased(&item.id).await.unwrap();
        assert!(once.purchased);

        let twice = repo.toggle_purchased(&item.id).await.unwrap();
        assert_eq!(twice.purchased, item.purchased);
    }

    #[tokio::test]
    async fn test_remove_then_list() {
        let (_store, repo) = setup_signed_in("u-1");
        let keep = repo.add(&ItemForm::new("Apples", "6")).await.unwrap();
        let gone = repo.add(&ItemForm::new("Pears", "4")).await.unwrap();

        repo.remove(&gone.id).await.expect("Remove failed");

        let ids: Vec<ItemId> = repo.list().await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![keep.id]);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let (store, repo) = setup_signed_in("u-1");

        let err = repo.add(&ItemForm::new("M", "1")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = repo.add(&ItemForm::new("Milk", "")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_never_reaches_store() {
        let store = Arc::new(MemoryRepository::new());
        let repo = setup_repo(&store, SessionContext::new());
        let id = ItemId::from("1");

        assert_eq!(repo.list().await.unwrap_err(), DomainError::Unauthenticated);
        assert_eq!(
            repo.add(&ItemForm::new("Milk", "2L")).await.unwrap_err(),
            DomainError::Unauthenticated
        );
        assert_eq!(repo.toggle_purchased(&id).await.unwrap_err(), DomainError::Unauthenticated);
        assert_eq!(repo.remove(&id).await.unwrap_err(), DomainError::Unauthenticated);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_other_owners_items_are_invisible() {
        let store = Arc::new(MemoryRepository::new());
        let alice = setup_repo(&store, SessionContext::signed_in(session_for("alice")));
        let bob = setup_repo(&store, SessionContext::signed_in(session_for("bob")));

        let item = alice.add(&ItemForm::new("Coffee", "250g")).await.unwrap();

        assert!(bob.list().await.unwrap().is_empty());
        assert!(matches!(
            bob.toggle_purchased(&item.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(bob.remove(&item.id).await, Err(DomainError::NotFound(_))));

        // Alice's row is untouched
        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].purchased);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (store, repo) = setup_signed_in("u-1");
        store.fail_next(DomainError::Store("connection reset".to_string())).await;

        assert_eq!(
            repo.list().await.unwrap_err(),
            DomainError::Store("connection reset".to_string())
        );
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_writes_only_purchased_column() {
        use crate::config::StoreConfig;
        use crate::repository::RestRepository;
        use serde_json::json;
        use wiremock::matchers::{body_json, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let row = |purchased: bool| {
            json!({
                "id": 1,
                "user_id": "u-1",
                "name": "Milk",
                "quantity": "2L",
                "note": null,
                "purchased": purchased,
                "created_at": "2024-05-01T10:00:00+00:00"
            })
        };

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", "eq.1"))
            .and(query_param("user_id", "eq.u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(false)])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", "eq.1"))
            .and(query_param("user_id", "eq.u-1"))
            .and(body_json(json!({"purchased": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(true)])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestRepository::new(
            reqwest::Client::new(),
            StoreConfig::new(server.uri(), "anon"),
        );
        let repo = ItemRepository::new(
            Arc::new(store),
            Arc::new(SessionContext::signed_in(session_for("u-1"))),
        );

        let toggled = repo.toggle_purchased(&ItemId::from("1")).await.unwrap();
        assert!(toggled.purchased);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
