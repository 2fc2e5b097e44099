//! Document repository for the upload catalog.
//!
//! Rows carry the `(storage_type, storage_key)` pair produced at upload
//! time. Both values are persisted verbatim so retrieval can resolve the
//! same backend later regardless of the environment it runs in.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::documents;

/// Error types for document catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording an uploaded document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Account the document belongs to.
    pub account_id: String,
    /// Business that performed the upload.
    pub business_id: i32,
    /// Original filename as submitted.
    pub filename: String,
    /// MIME type as submitted.
    pub content_type: String,
    /// Storage kind tag, e.g. `local` or `object_store`.
    pub storage_type: String,
    /// Backend-specific key for retrieval.
    pub storage_key: String,
}

/// Document repository for catalog reads and writes.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an uploaded document.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(&self, input: NewDocument) -> Result<documents::Model, DocumentError> {
        let document = documents::ActiveModel {
            account_id: Set(input.account_id),
            business_id: Set(input.business_id),
            filename: Set(input.filename),
            content_type: Set(input.content_type),
            storage_type: Set(input.storage_type),
            storage_key: Set(input.storage_key),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let document = document.insert(&self.db).await?;
        Ok(document)
    }

    /// Finds a document by id, scoped to an account. A matching id under a
    /// different account resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: i32,
        account_id: &str,
    ) -> Result<Option<documents::Model>, DocumentError> {
        let document = documents::Entity::find_by_id(id)
            .filter(documents::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?;

        Ok(document)
    }

    /// Lists documents for an account, newest first, with a total count for
    /// pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_account(
        &self,
        account_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<documents::Model>, u64), DocumentError> {
        let filter = documents::Column::AccountId.eq(account_id);

        let total = documents::Entity::find()
            .filter(filter.clone())
            .count(&self.db)
            .await?;

        let page = documents::Entity::find()
            .filter(filter)
            .order_by_desc(documents::Column::CreatedAt)
            .order_by_desc(documents::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((page, total))
    }

    /// Lists every document for an account, oldest first. Used when bundling
    /// an account's files into an archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all_by_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<documents::Model>, DocumentError> {
        let documents = documents::Entity::find()
            .filter(documents::Column::AccountId.eq(account_id))
            .order_by_asc(documents::Column::Id)
            .all(&self.db)
            .await?;

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{Migrator, MigratorTrait};
    use crate::repositories::BusinessRepository;

    async fn setup() -> (DatabaseConnection, i32) {
        let db = crate::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        Migrator::up(&db, None).await.expect("migrations");
        let business = BusinessRepository::new(db.clone())
            .register("Acme Corp")
            .await
            .expect("seed business");
        (db, business.id)
    }

    fn new_doc(business_id: i32, account_id: &str, filename: &str) -> NewDocument {
        NewDocument {
            account_id: account_id.to_string(),
            business_id,
            filename: filename.to_string(),
            content_type: "text/plain".to_string(),
            storage_type: "local".to_string(),
            storage_key: format!("uploads/{account_id}/{filename}"),
        }
    }

    #[tokio::test]
    async fn create_persists_storage_reference() {
        let (db, business_id) = setup().await;
        let repo = DocumentRepository::new(db);

        let doc = repo
            .create(new_doc(business_id, "acct-1", "report.txt"))
            .await
            .unwrap();

        assert_eq!(doc.account_id, "acct-1");
        assert_eq!(doc.storage_type, "local");
        assert_eq!(doc.storage_key, "uploads/acct-1/report.txt");
    }

    #[tokio::test]
    async fn find_by_id_is_scoped_to_account() {
        let (db, business_id) = setup().await;
        let repo = DocumentRepository::new(db);
        let doc = repo
            .create(new_doc(business_id, "acct-1", "report.txt"))
            .await
            .unwrap();

        let found = repo.find_by_id(doc.id, "acct-1").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(doc.id));

        // Same id under another account must not leak across tenants.
        let other = repo.find_by_id(doc.id, "acct-2").await.unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn list_by_account_paginates_with_total() {
        let (db, business_id) = setup().await;
        let repo = DocumentRepository::new(db);
        for i in 0..5 {
            repo.create(new_doc(business_id, "acct-1", &format!("f{i}.txt")))
                .await
                .unwrap();
        }
        repo.create(new_doc(business_id, "acct-2", "other.txt"))
            .await
            .unwrap();

        let (page, total) = repo.list_by_account("acct-1", 0, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        // Newest first: identical timestamps fall back to id order.
        assert_eq!(page[0].filename, "f4.txt");

        let (last, total) = repo.list_by_account("acct-1", 4, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].filename, "f0.txt");
    }

    #[tokio::test]
    async fn list_by_account_empty_for_unknown_account() {
        let (db, _) = setup().await;
        let repo = DocumentRepository::new(db);

        let (page, total) = repo.list_by_account("nobody", 0, 20).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn list_all_by_account_returns_everything_in_upload_order() {
        let (db, business_id) = setup().await;
        let repo = DocumentRepository::new(db);
        for name in ["a.txt", "b.txt", "c.txt"] {
            repo.create(new_doc(business_id, "acct-1", name))
                .await
                .unwrap();
        }

        let all = repo.list_all_by_account("acct-1").await.unwrap();

        let names: Vec<_> = all.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "c.txt"]);
    }
}
