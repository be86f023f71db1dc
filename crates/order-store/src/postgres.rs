use std::collections::HashMap;

use async_trait::async_trait;
use common::{ItemId, OrderId, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::catalog::{CatalogStore, Item};
use crate::error::StoreError;
use crate::order::{Order, OrderLine, StatusTransition};
use crate::query::OrderQuery;
use crate::store::OrderStore;
use crate::Result;

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status_text: String = row.try_get("status")?;
        let status: OrderStatus = status_text
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("{e}")))?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            created_at: row.try_get("created_at")?,
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            room_number: row.try_get("room_number")?,
            status,
            admin_comment: row.try_get("admin_comment")?,
            confirmed_at: row.try_get("confirmed_at")?,
            deleted_at: row.try_get("deleted_at")?,
            items: Vec::new(),
        })
    }

    /// Loads and attaches the lines for a batch of orders in one query.
    async fn attach_lines(&self, orders: &mut [Order]) -> Result<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT order_id, item_name, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id: Uuid = row.try_get("order_id")?;
            let quantity: i32 = row.try_get("quantity")?;
            by_order.entry(order_id).or_default().push(OrderLine {
                item_name: row.try_get("item_name")?,
                quantity: quantity as u32,
            });
        }

        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id.as_uuid()).unwrap_or_default();
        }
        Ok(())
    }

    async fn insert_lines(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: OrderId,
        lines: &[OrderLine],
    ) -> Result<()> {
        for (position, line) in lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, item_name, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order_id.as_uuid())
            .bind(position as i32)
            .bind(&line.item_name)
            .bind(line.quantity as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert(&self, order: Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, created_at, customer_name, customer_phone, room_number,
                 status, admin_comment, confirmed_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.created_at)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.room_number)
        .bind(order.status.as_str())
        .bind(&order.admin_comment)
        .bind(order.confirmed_at)
        .bind(order.deleted_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_lines(&mut tx, order.id, &order.items).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut orders = vec![Self::row_to_order(row)?];
                self.attach_lines(&mut orders).await?;
                Ok(orders.pop())
            }
            None => Ok(None),
        }
    }

    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let mut sql = String::from("SELECT * FROM orders");
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_index = 0usize;
        let mut placeholder = |column: &str, op: &str| {
            bind_index += 1;
            format!("{column} {op} ${bind_index}")
        };

        if query.status.is_some() {
            conditions.push(placeholder("status", "="));
        }
        if query.confirmed_from.is_some() {
            conditions.push(placeholder("confirmed_at", ">="));
        }
        if query.confirmed_to.is_some() {
            conditions.push(placeholder("confirmed_at", "<="));
        }
        if query.created_from.is_some() {
            conditions.push(placeholder("created_at", ">="));
        }
        if query.created_to.is_some() {
            conditions.push(placeholder("created_at", "<="));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(&format!(
            " ORDER BY {} DESC NULLS LAST",
            query.sort.column_name()
        ));
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let mut q = sqlx::query(&sql);
        if let Some(status) = query.status {
            q = q.bind(status.as_str());
        }
        for bound in [
            query.confirmed_from,
            query.confirmed_to,
            query.created_from,
            query.created_to,
        ]
        .into_iter()
        .flatten()
        {
            q = q.bind(bound);
        }

        let rows = q.fetch_all(&self.pool).await?;
        let mut orders = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        self.attach_lines(&mut orders).await?;
        Ok(orders)
    }

    #[tracing::instrument(skip(self, transition))]
    async fn apply_transition(&self, id: OrderId, transition: StatusTransition) -> Result<bool> {
        // One conditional update; the WHERE clause is the whole guard
        // against concurrent double-processing.
        let timestamp_column = match transition.to {
            OrderStatus::Confirmed => "confirmed_at",
            OrderStatus::Deleted => "deleted_at",
            OrderStatus::Pending => {
                return Err(StoreError::Corrupt(
                    "transition back to pending is not representable".to_string(),
                ));
            }
        };

        let sql = format!(
            r#"
            UPDATE orders
            SET status = $2, admin_comment = $3, {timestamp_column} = $4
            WHERE id = $1 AND status = 'pending'
            "#
        );

        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(transition.to.as_str())
            .bind(&transition.comment)
            .bind(transition.at)
            .execute(&self.pool)
            .await?;

        let applied = result.rows_affected() > 0;
        tracing::debug!(order_id = %id, applied, "conditional transition");
        Ok(applied)
    }

    #[tracing::instrument(skip(self, lines))]
    async fn replace_items(&self, id: OrderId, lines: Vec<OrderLine>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        if status.as_deref() != Some(OrderStatus::Confirmed.as_str()) {
            return Ok(false);
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;
        Self::insert_lines(&mut tx, id, &lines).await?;

        tx.commit().await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn purge(&self, status: OrderStatus) -> Result<u64> {
        // order_items rows go with the parent via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM orders WHERE status = $1")
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected();
        tracing::debug!(removed, "purged orders");
        Ok(removed)
    }
}

/// PostgreSQL-backed catalog store.
///
/// Name uniqueness is enforced by the `items_name_lower_key` unique index
/// on `LOWER(name)`.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn normalized(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyItemName);
        }
        Ok(trimmed.to_string())
    }

    fn map_unique_violation(e: sqlx::Error, name: &str) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.constraint() == Some("items_name_lower_key")
        {
            return StoreError::DuplicateItem {
                name: name.to_string(),
            };
        }
        StoreError::Database(e)
    }

    fn row_to_item(row: PgRow) -> Result<Item> {
        Ok(Item {
            id: ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn add(&self, name: &str) -> Result<Item> {
        let name = Self::normalized(name)?;
        let item = Item::new(name);

        sqlx::query("INSERT INTO items (id, name) VALUES ($1, $2)")
            .bind(item.id.as_uuid())
            .bind(&item.name)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_unique_violation(e, &item.name))?;

        Ok(item)
    }

    async fn add_bulk(&self, names: &[String]) -> Result<Vec<Item>> {
        let mut created = Vec::new();
        for name in names {
            match self.add(name).await {
                Ok(item) => created.push(item),
                Err(StoreError::DuplicateItem { .. } | StoreError::EmptyItemName) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    async fn rename(&self, id: ItemId, name: &str) -> Result<bool> {
        let name = Self::normalized(name)?;
        let result = sqlx::query("UPDATE items SET name = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(&name)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_unique_violation(e, &name))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: ItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query("SELECT id, name FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_item).transpose()
    }

    async fn search(&self, query: &str) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name FROM items
            WHERE strpos(LOWER(name), LOWER($1)) > 0
            ORDER BY LOWER(name)
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query("SELECT id, name FROM items ORDER BY LOWER(name)")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_item).collect()
    }
}
