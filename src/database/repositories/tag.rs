//! Tag link tables shared by restaurants and baropots

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use crate::utils::errors::BaropotError;

/// Which tag/link table pair to operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    Restaurant,
    Baropot,
}

impl TagScope {
    fn tag_table(self) -> &'static str {
        match self {
            TagScope::Restaurant => "restaurant_tags",
            TagScope::Baropot => "baropot_tags",
        }
    }

    fn link_table(self) -> &'static str {
        match self {
            TagScope::Restaurant => "restaurant_tag_links",
            TagScope::Baropot => "baropot_tag_links",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            TagScope::Restaurant => "restaurant_id",
            TagScope::Baropot => "baropot_id",
        }
    }
}

#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
    scope: TagScope,
}

impl TagRepository {
    pub fn new(pool: PgPool, scope: TagScope) -> Self {
        Self { pool, scope }
    }

    /// Replace the owner's tag set, creating missing tags by name
    pub async fn replace(&self, conn: &mut PgConnection, owner_id: i64, names: &[String]) -> Result<(), BaropotError> {
        let scope = self.scope;

        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1",
            scope.link_table(),
            scope.owner_column()
        ))
        .bind(owner_id)
        .execute(&mut *conn)
        .await?;

        if names.is_empty() {
            return Ok(());
        }

        sqlx::query(&format!(
            "INSERT INTO {} (name) SELECT UNNEST($1::text[]) ON CONFLICT (name) DO NOTHING",
            scope.tag_table()
        ))
        .bind(names)
        .execute(&mut *conn)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO {links} ({owner}, tag_id) SELECT $1, id FROM {tags} WHERE name = ANY($2) ON CONFLICT DO NOTHING",
            links = scope.link_table(),
            owner = scope.owner_column(),
            tags = scope.tag_table()
        ))
        .bind(owner_id)
        .bind(names)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Tag names grouped by owner id
    pub async fn names_for(&self, owner_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>, BaropotError> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let scope = self.scope;
        let rows = sqlx::query_as::<_, (i64, String)>(&format!(
            "SELECT l.{owner}, t.name FROM {links} l JOIN {tags} t ON t.id = l.tag_id WHERE l.{owner} = ANY($1) ORDER BY t.name",
            owner = scope.owner_column(),
            links = scope.link_table(),
            tags = scope.tag_table()
        ))
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for (owner_id, name) in rows {
            grouped.entry(owner_id).or_default().push(name);
        }
        Ok(grouped)
    }
}
