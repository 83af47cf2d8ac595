use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::entity::{Drink, NewDrink, Recipe};
use crate::domain::repository::DrinkRepository;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS drinks (\
     id SERIAL PRIMARY KEY, \
     title VARCHAR(80) NOT NULL UNIQUE, \
     recipe JSONB NOT NULL)";

/// DrinkPostgresRepository は PostgreSQL を使ったドリンクリポジトリ。
pub struct DrinkPostgresRepository {
    pool: Arc<PgPool>,
}

impl DrinkPostgresRepository {
    /// 新しい DrinkPostgresRepository を作成する。
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// drinks テーブルが無ければ作成する。
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}

/// PostgreSQL の行をマッピングするための内部構造体。
#[derive(sqlx::FromRow)]
struct DrinkRow {
    id: i32,
    title: String,
    recipe: serde_json::Value,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = anyhow::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe: Recipe = serde_json::from_value(row.recipe)
            .map_err(|e| anyhow::anyhow!("corrupt recipe for drink {}: {}", row.id, e))?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

#[async_trait]
impl DrinkRepository for DrinkPostgresRepository {
    async fn find_all(&self) -> anyhow::Result<Vec<Drink>> {
        let rows: Vec<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
                .fetch_all(self.pool.as_ref())
                .await?;

        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Drink>> {
        let row: Option<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        row.map(Drink::try_from).transpose()
    }

    async fn exists_by_title(&self, title: &str, exclude_id: Option<i32>) -> anyhow::Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM drinks WHERE title = $1 AND ($2::INT IS NULL OR id <> $2))",
        )
        .bind(title)
        .bind(exclude_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists.0)
    }

    async fn create(&self, drink: &NewDrink) -> anyhow::Result<Drink> {
        let row: DrinkRow = sqlx::query_as(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(Json(&drink.recipe))
        .fetch_one(self.pool.as_ref())
        .await?;

        Drink::try_from(row)
    }

    async fn update(&self, drink: &Drink) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE drinks SET title = $2, recipe = $3 WHERE id = $1")
            .bind(drink.id)
            .bind(&drink.title)
            .bind(Json(&drink.recipe))
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset(&self) -> anyhow::Result<()> {
        let sample = NewDrink::sample();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE_SQL).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(&sample.title)
            .bind(Json(&sample.recipe))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_conversion() {
        let row = DrinkRow {
            id: 7,
            title: "cortado".to_string(),
            recipe: json!([
                {"color": "brown", "name": "espresso", "parts": 1},
                {"color": "white", "name": "milk", "parts": 1}
            ]),
        };

        let drink = Drink::try_from(row).unwrap();
        assert_eq!(drink.id, 7);
        assert_eq!(drink.title, "cortado");
        assert_eq!(drink.recipe.ingredients().len(), 2);
        assert_eq!(drink.recipe.ingredients()[0].name, "espresso");
    }

    #[test]
    fn test_row_conversion_single_object_recipe() {
        let row = DrinkRow {
            id: 1,
            title: "water".to_string(),
            recipe: json!({"color": "blue", "name": "water", "parts": 1}),
        };

        let drink = Drink::try_from(row).unwrap();
        assert_eq!(drink.recipe, NewDrink::sample().recipe);
    }

    #[test]
    fn test_row_conversion_corrupt_recipe() {
        let row = DrinkRow {
            id: 3,
            title: "broken".to_string(),
            recipe: json!("not a recipe"),
        };

        let err = Drink::try_from(row).unwrap_err();
        assert!(err.to_string().contains("drink 3"));
    }

    #[test]
    fn test_recipe_serializes_as_jsonb_array() {
        let value = serde_json::to_value(&NewDrink::sample().recipe).unwrap();
        assert_eq!(value, json!([{"color": "blue", "name": "water", "parts": 1}]));
    }
}
