use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use super::{Product, ProductFields, ProductRepository, RepositoryError};
use crate::entity::product;

/// `updated_at` never moves backwards and never repeats, even for two updates
/// landing in the same microsecond.
const BUMP_UPDATED_AT: &str = "GREATEST(?, \"updated_at\" + INTERVAL '1 microsecond')";

/// [`ProductRepository`] over a pooled sea-orm connection.
#[derive(Clone)]
pub struct SeaOrmProductRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    async fn create(&self, fields: ProductFields) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let model = product::ActiveModel {
            id: Set(id),
            name: Set(fields.name),
            description: Set(fields.description),
            price: Set(fields.price),
            image_url: Set(fields.image_url),
            image_key: Set(fields.image_key),
            created_at: Set(now),
            updated_at: Set(now),
        };

        product::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Product, RepositoryError> {
        product::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Product::from)
            .ok_or(RepositoryError::NotFound(id))
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        id: Uuid,
        fields: ProductFields,
    ) -> Result<Option<String>, RepositoryError> {
        let txn = self.db.begin().await?;

        let Some(current) = product::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound(id));
        };

        let (image_url, image_key, replaced) = match fields.image_key {
            Some(key) => {
                let replaced = current.image_key.filter(|old| *old != key);
                (fields.image_url, Some(key), replaced)
            }
            None => (current.image_url, current.image_key, None),
        };

        let result = product::Entity::update_many()
            .col_expr(product::Column::Name, Expr::value(fields.name))
            .col_expr(product::Column::Description, Expr::value(fields.description))
            .col_expr(product::Column::Price, Expr::value(fields.price))
            .col_expr(product::Column::ImageUrl, Expr::value(image_url))
            .col_expr(product::Column::ImageKey, Expr::value(image_key))
            .col_expr(
                product::Column::UpdatedAt,
                Expr::cust_with_values(BUMP_UPDATED_AT, [Utc::now()]),
            )
            .filter(product::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound(id));
        }

        txn.commit().await?;
        Ok(replaced)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        product::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
