//! Id-list lookups split into store-sized chunks.
//!
//! Lookups by long id lists are split into chunks of at most `id_chunk_size`
//! ids, issued concurrently and merged in memory.

use futures::future::try_join_all;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

/// Fetches every row whose `column` is in `ids`.
///
/// Duplicate ids are collapsed first; an empty list issues no query.
pub async fn fetch_by_ids<E, C>(
    db: &C,
    column: E::Column,
    ids: &[Uuid],
    chunk_size: usize,
) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let queries = unique.chunks(chunk_size.max(1)).map(|chunk| {
        E::find()
            .filter(column.is_in(chunk.iter().copied()))
            .all(db)
    });
    let pages = try_join_all(queries).await?;
    Ok(pages.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::finance_categories;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn category(id: Uuid) -> finance_categories::Model {
        finance_categories::Model {
            id,
            name: "Tours".to_string(),
            is_agent_commission: false,
        }
    }

    #[tokio::test]
    async fn test_issues_one_query_per_chunk() {
        let ids: Vec<Uuid> = (0..25).map(|_| Uuid::now_v7()).collect();
        let pages: Vec<Vec<finance_categories::Model>> = ids
            .chunks(10)
            .map(|chunk| chunk.iter().copied().map(category).collect())
            .collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(pages)
            .into_connection();

        let rows = fetch_by_ids::<finance_categories::Entity, _>(
            &db,
            finance_categories::Column::Id,
            &ids,
            10,
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 25);
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicates_collapse_before_chunking() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category(id)]])
            .into_connection();

        let rows = fetch_by_ids::<finance_categories::Entity, _>(
            &db,
            finance_categories::Column::Id,
            &[id, id, id],
            2,
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_list_issues_no_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let rows = fetch_by_ids::<finance_categories::Entity, _>(
            &db,
            finance_categories::Column::Id,
            &[],
            10,
        )
        .await
        .unwrap();
        assert!(rows.is_empty());
        assert!(db.into_transaction_log().is_empty());
    }
}
