//! One-shot inventory commands and the ingredient table renderer.
//!
//! `pantry init`, `add`, `list`, `update`, and `delete` each open the
//! database, make sure the `ingredients` table exists, run one store call,
//! and exit. The shell in [`crate::app`] reuses [`render_table`].

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::error;

use pantry_core::freshness::{parse_date, Freshness};
use pantry_core::models::{Ingredient, IngredientFields};
use pantry_core::store::IngredientStore;
use pantry_core::PantryError;

use crate::config::Config;
use crate::sqlite_store::SqliteIngredientStore;

/// Today's date in local time.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Open the configured database and create the table if needed.
pub async fn open_store(config: &Config) -> Result<SqliteIngredientStore> {
    let store = SqliteIngredientStore::open(&config.db.path)
        .await
        .map_err(log_persistence)?;
    store.initialize().await.map_err(log_persistence)?;
    Ok(store)
}

fn log_persistence(err: PantryError) -> PantryError {
    if matches!(err, PantryError::Persistence(_)) {
        error!(error = %err, "inventory operation abandoned");
    }
    err
}

pub async fn run_init(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    store.close().await;
    println!("initialized {}", config.db.path.display());
    Ok(())
}

pub async fn run_add(config: &Config, fields: IngredientFields) -> Result<()> {
    fields.validate()?;
    let store = open_store(config).await?;
    let ingredient = store.add(&fields).await.map_err(log_persistence)?;
    store.close().await;
    println!("added [{}] {}", ingredient.id, ingredient.name);
    Ok(())
}

pub async fn run_list(config: &Config, today: Option<&str>, json: bool) -> Result<()> {
    let today = match today {
        Some(text) => match parse_date(text) {
            Some(date) => date,
            None => bail!("invalid --today date '{}': expected YYYY-MM-DD", text),
        },
        None => local_today(),
    };

    let store = open_store(config).await?;
    let ingredients = store.list_all().await.map_err(log_persistence)?;
    store.close().await;

    if json {
        let rows: Vec<JsonRow<'_>> = ingredients
            .iter()
            .map(|ingredient| JsonRow {
                ingredient,
                freshness: ingredient.freshness(today),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_table(&ingredients, today));
    }
    Ok(())
}

pub async fn run_update(config: &Config, id: i64, fields: IngredientFields) -> Result<()> {
    fields.validate()?;
    let store = open_store(config).await?;
    let exists = contains(&store, id).await?;
    store.update(id, &fields).await.map_err(log_persistence)?;
    store.close().await;

    if exists {
        println!("updated [{}] {}", id, fields.name);
    } else {
        println!("no ingredient with id {}; nothing changed", id);
    }
    Ok(())
}

pub async fn run_delete(config: &Config, id: i64) -> Result<()> {
    let store = open_store(config).await?;
    let exists = contains(&store, id).await?;
    store.delete(id).await.map_err(log_persistence)?;
    store.close().await;

    if exists {
        println!("deleted [{}]", id);
    } else {
        println!("no ingredient with id {}; nothing deleted", id);
    }
    Ok(())
}

async fn contains(store: &SqliteIngredientStore, id: i64) -> Result<bool> {
    let rows = store.list_all().await.map_err(log_persistence)?;
    Ok(rows.iter().any(|row| row.id == id))
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    ingredient: &'a Ingredient,
    freshness: Freshness,
}

const HEADERS: [&str; 6] = ["id", "name", "quantity", "purchased", "expires", "status"];

/// Row marker drawn in the leftmost column.
pub fn marker(freshness: Freshness) -> &'static str {
    if !freshness.is_highlighted() {
        return "  ";
    }
    match freshness {
        Freshness::Expired => "!!",
        _ => "! ",
    }
}

/// Render the inventory as an aligned text table with freshness markers.
///
/// Expired rows are prefixed with `!!`, rows expiring within a week with
/// `!`. An empty inventory renders as a single hint line.
pub fn render_table(ingredients: &[Ingredient], today: NaiveDate) -> String {
    if ingredients.is_empty() {
        return "(no ingredients yet)\n".to_string();
    }

    let rows: Vec<(Freshness, [String; 6])> = ingredients
        .iter()
        .map(|i| {
            let freshness = i.freshness(today);
            (
                freshness,
                [
                    i.id.to_string(),
                    i.name.clone(),
                    i.quantity.clone().unwrap_or_default(),
                    i.purchase_date.clone().unwrap_or_default(),
                    i.expiry_date.clone().unwrap_or_default(),
                    freshness.label().to_string(),
                ],
            )
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for (_, cells) in &rows {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_line("  ", &HEADERS.map(str::to_string), &widths));
    for (freshness, cells) in &rows {
        out.push_str(&format_line(marker(*freshness), cells, &widths));
    }
    out
}

fn format_line(marker: &str, cells: &[String; 6], widths: &[usize; 6]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    format!("{} {}\n", marker, padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, expiry: Option<&str>) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            quantity: Some("1".to_string()),
            purchase_date: None,
            expiry_date: expiry.map(str::to_string),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[], today()), "(no ingredients yet)\n");
    }

    #[test]
    fn test_table_marks_rows_by_freshness() {
        let table = render_table(
            &[
                row(1, "milk", Some("2024-01-01")),
                row(2, "eggs", Some("2024-01-20")),
                row(3, "rice", Some("2024-06-01")),
                row(4, "salt", None),
            ],
            today(),
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("status"));
        assert!(lines[1].starts_with("!! 1"));
        assert!(lines[1].ends_with("expired"));
        assert!(lines[2].starts_with("!  2"));
        assert!(lines[2].ends_with("expiring soon"));
        assert!(lines[3].starts_with("   3"));
        assert!(lines[3].ends_with("fresh"));
        assert!(lines[4].ends_with("-"));
    }

    #[test]
    fn test_columns_align() {
        let table = render_table(
            &[row(1, "egg", None), row(22, "green onion", None)],
            today(),
        );
        let header = table.lines().next().unwrap();
        let qty_col = header.find("quantity").unwrap();
        for line in table.lines().skip(1) {
            assert_eq!(&line[qty_col..qty_col + 1], "1");
        }
    }

    #[test]
    fn test_json_row_flattens_ingredient() {
        let ingredient = row(7, "tofu", Some("2024-01-16"));
        let json = serde_json::to_value(JsonRow {
            ingredient: &ingredient,
            freshness: ingredient.freshness(today()),
        })
        .unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "tofu");
        assert_eq!(json["freshness"], "expiring_soon");
    }
}
