use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::{new_document_id, DocumentStore, StoreError};
use crate::document::{CollectionPath, DocPath, Document, DocumentData, DocumentRow};

/// Document store backed by the `documents` PostgreSQL table.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(&self, path: &DocPath, data: DocumentData) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (path, parent, doc_id, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (path)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(path.to_string())
        .bind(path.parent().to_string())
        .bind(path.id())
        .bind(Json(Value::Object(data)))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<DocumentRow, StoreError> {
    let Json(data): Json<Value> = row.try_get("data")?;
    Ok(DocumentRow {
        doc_id: row.try_get("doc_id")?,
        data,
    })
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT doc_id, data
            FROM documents
            WHERE path = $1
            "#,
        )
        .bind(path.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(|r| row_to_document(r).map(DocumentRow::into_document))
            .transpose()
    }

    async fn set(&self, path: &DocPath, data: DocumentData) -> Result<(), StoreError> {
        tracing::debug!(path = %path, "set document");
        self.upsert(path, data).await
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        data: DocumentData,
    ) -> Result<String, StoreError> {
        let id = new_document_id();
        let path = collection.doc(&id);
        tracing::debug!(path = %path, "add document");
        self.upsert(&path, data).await?;
        Ok(id)
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        tracing::debug!(path = %path, "delete document");
        sqlx::query("DELETE FROM documents WHERE path = $1")
            .bind(path.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT doc_id, data
            FROM documents
            WHERE parent = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(collection.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| row_to_document(r).map(DocumentRow::into_document))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
