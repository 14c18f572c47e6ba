use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{BakingInfo, IngredientInfo, IngredientRecord, RecipeStats, StoredRow, marker};

const ROW_COLUMNS: &str = "id, recipe_name, ingredient_group, ingredient_name, weight_g, percentage,
     description, steps, created_at, upper_temp, lower_temp, bake_time, convection, steam";

/// Per-recipe columns written alongside every ingredient row of a save.
pub struct RecipeHeader<'a> {
    pub title: &'a str,
    pub steps: Option<&'a str>,
    pub timestamp: &'a str,
    pub baking: &'a BakingInfo,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS recipe_rows (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    recipe_name TEXT NOT NULL,
                    ingredient_group TEXT,
                    ingredient_name TEXT NOT NULL,
                    weight_g REAL,
                    percentage REAL,
                    description TEXT,
                    steps TEXT,
                    created_at TEXT,
                    upper_temp INTEGER,
                    lower_temp INTEGER,
                    bake_time INTEGER,
                    convection TEXT,
                    steam TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_recipe_rows_name ON recipe_rows(recipe_name);

                CREATE TABLE IF NOT EXISTS ingredients (
                    name TEXT PRIMARY KEY,
                    hydration REAL NOT NULL DEFAULT 0
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn stored_row_from_row(row: &rusqlite::Row) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            title: row.get(1)?,
            ingredient: IngredientRecord {
                group: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                name: row.get(3)?,
                weight: row.get(4)?,
                percent: row.get(5)?,
                description: row.get(6)?,
            },
            steps: row.get(7)?,
            timestamp: row.get(8)?,
            upper_temp: row.get(9)?,
            lower_temp: row.get(10)?,
            bake_time: row.get(11)?,
            convection: row.get(12)?,
            steam: row.get(13)?,
        })
    }

    // --- Recipes ---

    /// Insert every ingredient row of a recipe in one transaction.
    pub fn insert_recipe(
        &mut self,
        header: &RecipeHeader<'_>,
        ingredients: &[IngredientRecord],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        Self::insert_rows(&tx, header, ingredients)?;
        tx.commit()?;
        Ok(ingredients.len())
    }

    /// Replace all rows of a recipe: delete by title, then insert, atomically.
    pub fn replace_recipe(
        &mut self,
        header: &RecipeHeader<'_>,
        ingredients: &[IngredientRecord],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM recipe_rows WHERE recipe_name = ?1",
            params![header.title],
        )?;
        Self::insert_rows(&tx, header, ingredients)?;
        tx.commit()?;
        Ok(ingredients.len())
    }

    fn insert_rows(
        conn: &Connection,
        header: &RecipeHeader<'_>,
        ingredients: &[IngredientRecord],
    ) -> Result<()> {
        let mut stmt = conn.prepare(
            "INSERT INTO recipe_rows (recipe_name, ingredient_group, ingredient_name, weight_g,
                percentage, description, steps, created_at, upper_temp, lower_temp, bake_time,
                convection, steam)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;
        for ing in ingredients {
            stmt.execute(params![
                header.title,
                ing.group,
                ing.name,
                ing.weight,
                ing.percent,
                ing.description,
                header.steps,
                header.timestamp,
                header.baking.top_heat,
                header.baking.bottom_heat,
                header.baking.time,
                marker(header.baking.convection),
                marker(header.baking.steam),
            ])
            .with_context(|| format!("Failed to insert ingredient '{}'", ing.name))?;
        }
        Ok(())
    }

    pub fn delete_recipe(&self, title: &str) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM recipe_rows WHERE recipe_name = ?1",
            params![title],
        )?;
        Ok(rows > 0)
    }

    pub fn recipe_exists(&self, title: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM recipe_rows WHERE recipe_name = ?1 LIMIT 1",
                params![title],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get_recipe_rows(&self, title: &str) -> Result<Vec<StoredRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROW_COLUMNS} FROM recipe_rows WHERE recipe_name = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![title], Self::stored_row_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn all_recipe_rows(&self) -> Result<Vec<StoredRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROW_COLUMNS} FROM recipe_rows ORDER BY recipe_name, id"
        ))?;
        let rows = stmt
            .query_map([], Self::stored_row_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_titles(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT recipe_name FROM recipe_rows ORDER BY recipe_name")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    // --- Ingredient hydration table ---

    pub fn list_ingredient_infos(&self) -> Result<Vec<IngredientInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, hydration FROM ingredients ORDER BY name")?;
        let infos = stmt
            .query_map([], |row| {
                Ok(IngredientInfo {
                    name: row.get(0)?,
                    hydration: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(infos)
    }

    pub fn get_ingredient_info(&self, name: &str) -> Result<Option<IngredientInfo>> {
        self.conn
            .query_row(
                "SELECT name, hydration FROM ingredients WHERE name = ?1",
                params![name],
                |row| {
                    Ok(IngredientInfo {
                        name: row.get(0)?,
                        hydration: row.get(1)?,
                    })
                },
            )
            .optional()
            .context("Failed to look up ingredient")
    }

    pub fn upsert_ingredient_info(&self, name: &str, hydration: f64) -> Result<IngredientInfo> {
        self.conn.execute(
            "INSERT INTO ingredients (name, hydration) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET hydration = excluded.hydration",
            params![name, hydration],
        )?;
        Ok(IngredientInfo {
            name: name.to_string(),
            hydration,
        })
    }

    pub fn delete_ingredient_info(&self, name: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ingredients WHERE name = ?1", params![name])?;
        Ok(rows > 0)
    }

    // --- Stats ---

    pub fn count_stats(&self) -> Result<RecipeStats> {
        let (recipe_count, ingredient_rows, distinct_ingredients): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(DISTINCT recipe_name), COUNT(*), COUNT(DISTINCT ingredient_name)
             FROM recipe_rows",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let known_ingredients: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(RecipeStats {
            recipe_count,
            ingredient_rows,
            distinct_ingredients,
            known_ingredients,
        })
    }
}
