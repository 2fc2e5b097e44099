//! Business repository for tenant registration and API key lookup.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::businesses;

/// Error types for business operations.
#[derive(Debug, thiserror::Error)]
pub enum BusinessError {
    /// Business name already registered.
    #[error("Business '{0}' is already registered")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Business repository for registration and authentication lookups.
#[derive(Debug, Clone)]
pub struct BusinessRepository {
    db: DatabaseConnection,
}

impl BusinessRepository {
    /// Creates a new business repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a new business and issues it an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered or the insert fails.
    pub async fn register(&self, name: &str) -> Result<businesses::Model, BusinessError> {
        let existing = businesses::Entity::find()
            .filter(businesses::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(BusinessError::DuplicateName(name.to_string()));
        }

        let business = businesses::ActiveModel {
            name: Set(name.to_string()),
            api_key: Set(generate_api_key()),
            ..Default::default()
        };

        let business = business.insert(&self.db).await?;
        Ok(business)
    }

    /// Looks up a business by its API key. Returns `None` when the key is
    /// unknown; the caller decides how to reject the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<businesses::Model>, BusinessError> {
        let business = businesses::Entity::find()
            .filter(businesses::Column::ApiKey.eq(api_key))
            .one(&self.db)
            .await?;

        Ok(business)
    }

    /// Lists all registered businesses.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<businesses::Model>, BusinessError> {
        let businesses = businesses::Entity::find()
            .order_by_asc(businesses::Column::Id)
            .all(&self.db)
            .await?;

        Ok(businesses)
    }
}

/// Generates a random 32-character hex API key.
fn generate_api_key() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}
