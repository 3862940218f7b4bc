use std::sync::Arc;

use serde_json::{json, Value};

use super::model::{Book, BookStatus, NewBook};
use super::BOOKS_TABLE;
use crate::store::{Filter, Order, StoreClient, StoreError};

/// Owner-scoped data access for book records. Every call filters by the
/// authenticated user's id, so crossing owners is impossible by
/// construction and a foreign-owned id reads as a plain miss.
pub struct BookRepository {
    store: Arc<dyn StoreClient>,
}

impl BookRepository {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Inserts a new book for the owner. Returns None when the store
    /// reports no row written.
    pub async fn insert(
        &self,
        owner_id: &str,
        book: &NewBook,
    ) -> Result<Option<Book>, StoreError> {
        let fields = json!({
            "title": book.title,
            "author": book.author,
            "status": book.status.as_str(),
            "user_id": owner_id,
        });

        let rows = self.store.insert(BOOKS_TABLE, fields).await?;
        rows.into_iter().next().map(book_from_row).transpose()
    }

    /// All books owned by the caller, newest first, optionally narrowed
    /// by status.
    pub async fn list(
        &self,
        owner_id: &str,
        status: Option<BookStatus>,
    ) -> Result<Vec<Book>, StoreError> {
        let mut filters = vec![Filter::eq("user_id", owner_id)];
        if let Some(status) = status {
            filters.push(Filter::eq("status", status.as_str()));
        }

        let rows = self
            .store
            .select(BOOKS_TABLE, &filters, Some(Order::desc("created_at")))
            .await?;
        rows.into_iter().map(book_from_row).collect()
    }

    /// Looks up a single book by id, scoped to the owner. A miss covers
    /// both an unknown id and a book owned by someone else.
    pub async fn find_owned(&self, id: &str, owner_id: &str) -> Result<Option<Book>, StoreError> {
        let filters = [Filter::eq("id", id), Filter::eq("user_id", owner_id)];
        let rows = self.store.select(BOOKS_TABLE, &filters, None).await?;
        rows.into_iter().next().map(book_from_row).transpose()
    }

    /// Applies the supplied changes to an owned book. Returns None when
    /// zero rows were affected.
    pub async fn update_owned(
        &self,
        id: &str,
        owner_id: &str,
        changes: Value,
    ) -> Result<Option<Book>, StoreError> {
        let filters = [Filter::eq("id", id), Filter::eq("user_id", owner_id)];
        let rows = self.store.update(BOOKS_TABLE, changes, &filters).await?;
        rows.into_iter().next().map(book_from_row).transpose()
    }

    /// Deletes an owned book.
    pub async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let filters = [Filter::eq("id", id), Filter::eq("user_id", owner_id)];
        self.store.delete(BOOKS_TABLE, &filters).await
    }
}

fn book_from_row(row: Value) -> Result<Book, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn repo_with_store() -> (BookRepository, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (BookRepository::new(store.clone()), store)
    }

    fn new_book(title: &str, status: BookStatus) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Author".to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn insert_assigns_owner_and_returns_record() {
        let (repo, _store) = repo_with_store();
        let book = repo
            .insert("u-1", &new_book("Dune", BookStatus::Reading))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(book.user_id, "u-1");
        assert_eq!(book.title, "Dune");
        assert!(!book.id.is_empty());
    }

    #[tokio::test]
    async fn find_owned_misses_foreign_books() {
        let (repo, _store) = repo_with_store();
        let book = repo
            .insert("u-1", &new_book("Dune", BookStatus::Reading))
            .await
            .unwrap()
            .unwrap();

        assert!(repo.find_owned(&book.id, "u-2").await.unwrap().is_none());
        assert!(repo.find_owned(&book.id, "u-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_narrows_by_status() {
        let (repo, _store) = repo_with_store();
        repo.insert("u-1", &new_book("A", BookStatus::Reading))
            .await
            .unwrap();
        repo.insert("u-1", &new_book("B", BookStatus::Completed))
            .await
            .unwrap();

        let completed = repo
            .list("u-1", Some(BookStatus::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "B");

        let all = repo.list("u-1", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn update_owned_reports_zero_rows_as_none() {
        let (repo, _store) = repo_with_store();
        let changes = serde_json::json!({ "title": "X" });
        let updated = repo.update_owned("missing", "u-1", changes).await.unwrap();
        assert!(updated.is_none());
    }
}
