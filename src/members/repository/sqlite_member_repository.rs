use std::collections::HashMap;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::members::domain::model::MemberEntity;
use crate::members::repository::MemberRepository;
use crate::utils::db::{page_offset, push_page, push_predicate, to_paginated};

const FILTER_COLUMNS: &[(&str, &str)] = &[("name", "name"), ("contact", "contact"), ("category", "category")];
const SEARCH_COLUMNS: &[&str] = &["name", "contact"];

#[derive(Debug)]
pub struct SqliteMemberRepository {
    pool: SqlitePool,
}

impl SqliteMemberRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl Repository<MemberEntity> for SqliteMemberRepository {
    async fn create(&self, entity: &MemberEntity) -> LibraryResult<usize> {
        let res = sqlx::query(
            "INSERT INTO members (member_id, version, name, contact, category, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)")
            .bind(&entity.member_id)
            .bind(entity.version)
            .bind(&entity.name)
            .bind(&entity.contact)
            .bind(&entity.category)
            .bind(entity.created_at)
            .bind(entity.updated_at)
            .execute(&self.pool)
            .await?;
        debug!(member_id = %entity.member_id, "inserted member");
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: &str) -> LibraryResult<MemberEntity> {
        sqlx::query_as::<_, MemberEntity>("SELECT * FROM members WHERE member_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("member not found for {}", id).as_str()))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<MemberEntity>> {
        let offset = page_offset(page)?;
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM members WHERE 1 = 1");
        push_predicate(&mut builder, predicate, FILTER_COLUMNS, SEARCH_COLUMNS)?;
        builder.push(" ORDER BY name, member_id");
        push_page(&mut builder, offset, page_size);
        let records = builder.build_query_as::<MemberEntity>().fetch_all(&self.pool).await?;
        Ok(to_paginated(page, offset, page_size, records))
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn choices(&self) -> LibraryResult<Vec<(String, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT member_id, name FROM members ORDER BY name, member_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn categories(&self) -> LibraryResult<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM members ORDER BY category")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
