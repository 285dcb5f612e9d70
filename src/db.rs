use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS mobile_gadgets (
            id             INTEGER PRIMARY KEY,
            full_name      TEXT,
            color          TEXT,
            memory_volume  TEXT,
            price_use      TEXT,
            price_action   TEXT,
            pic_links      TEXT,   -- JSON: string or array of strings
            product_code   TEXT,
            review_count   INTEGER,
            series         TEXT,
            display_size   TEXT,
            resolution     TEXT,
            specifications TEXT NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_gadgets_code ON mobile_gadgets(product_code);
        ",
    )?;
    Ok(())
}

// ── Get-or-create ──

/// One persisted product. Every column here is part of the natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct GadgetRow {
    pub full_name: Option<String>,
    pub color: Option<String>,
    pub memory_volume: Option<String>,
    pub price_use: Option<String>,
    pub price_action: Option<String>,
    pub pic_links: Option<String>,
    pub product_code: Option<String>,
    pub review_count: Option<i64>,
    pub series: Option<String>,
    pub display_size: Option<String>,
    pub resolution: Option<String>,
    pub specifications: String,
}

/// Return the id of the row matching all key columns, inserting it first if
/// absent. `IS` makes NULL match NULL. The bool is true when a row was created.
pub fn get_or_create(conn: &Connection, row: &GadgetRow) -> Result<(i64, bool)> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let key: [&dyn rusqlite::ToSql; 12] = [
        &row.full_name, &row.color, &row.memory_volume, &row.price_use, &row.price_action,
        &row.pic_links, &row.product_code, &row.review_count, &row.series, &row.display_size,
        &row.resolution, &row.specifications,
    ];

    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM mobile_gadgets
             WHERE full_name IS ?1 AND color IS ?2 AND memory_volume IS ?3
               AND price_use IS ?4 AND price_action IS ?5 AND pic_links IS ?6
               AND product_code IS ?7 AND review_count IS ?8 AND series IS ?9
               AND display_size IS ?10 AND resolution IS ?11 AND specifications IS ?12
             ORDER BY id LIMIT 1",
            &key[..],
            |r| r.get(0),
        )
        .optional()?;

    let result = match existing {
        Some(id) => (id, false),
        None => {
            tx.execute(
                "INSERT INTO mobile_gadgets
                 (full_name, color, memory_volume, price_use, price_action, pic_links,
                  product_code, review_count, series, display_size, resolution, specifications)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                &key[..],
            )?;
            (tx.last_insert_rowid(), true)
        }
    };

    tx.commit()?;
    Ok(result)
}

// ── Overview ──

pub struct OverviewRow {
    pub id: i64,
    pub full_name: String,
    pub product_code: String,
    pub price_use: String,
    pub color: String,
    pub memory_volume: String,
    pub review_count: Option<i64>,
    pub created_at: String,
}

pub fn fetch_overview(conn: &Connection, limit: usize) -> Result<Vec<OverviewRow>> {
    let sql = format!(
        "SELECT id, COALESCE(full_name,''), COALESCE(product_code,''), COALESCE(price_use,''),
                COALESCE(color,''), COALESCE(memory_volume,''), review_count, created_at
         FROM mobile_gadgets
         ORDER BY id DESC
         LIMIT {}",
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(OverviewRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                product_code: row.get(2)?,
                price_use: row.get(3)?,
                color: row.get(4)?,
                memory_volume: row.get(5)?,
                review_count: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub distinct_codes: usize,
    pub without_code: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM mobile_gadgets", [], |r| r.get(0))?;
    let distinct_codes: usize = conn.query_row(
        "SELECT COUNT(DISTINCT product_code) FROM mobile_gadgets",
        [],
        |r| r.get(0),
    )?;
    let without_code: usize = conn.query_row(
        "SELECT COUNT(*) FROM mobile_gadgets WHERE product_code IS NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        total,
        distinct_codes,
        without_code,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn sample() -> GadgetRow {
        GadgetRow {
            full_name: Some("Apple iPhone 16 Pro Max".into()),
            color: Some("Black Titanium".into()),
            memory_volume: Some("256 ГБ".into()),
            price_use: Some("57999".into()),
            price_action: None,
            pic_links: Some("[\"a.jpg\",\"b.jpg\"]".into()),
            product_code: Some("U0941111".into()),
            review_count: Some(12),
            series: Some("iPhone 16 Pro Max".into()),
            display_size: Some("6.9\"".into()),
            resolution: None,
            specifications: "{}".into(),
        }
    }

    #[test]
    fn identical_record_is_stored_once() {
        let conn = memory_db();
        let (id1, created1) = get_or_create(&conn, &sample()).unwrap();
        let (id2, created2) = get_or_create(&conn, &sample()).unwrap();
        assert!(created1);
        assert!(!created2);
        assert_eq!(id1, id2);
        assert_eq!(get_stats(&conn).unwrap().total, 1);
    }

    #[test]
    fn null_columns_match_null() {
        let conn = memory_db();
        let row = GadgetRow {
            full_name: None,
            color: None,
            memory_volume: None,
            price_use: None,
            price_action: None,
            pic_links: None,
            product_code: None,
            review_count: None,
            series: None,
            display_size: None,
            resolution: None,
            specifications: "{}".into(),
        };
        assert!(get_or_create(&conn, &row).unwrap().1);
        assert!(!get_or_create(&conn, &row).unwrap().1);
        let s = get_stats(&conn).unwrap();
        assert_eq!(s.total, 1);
        assert_eq!(s.without_code, 1);
    }

    #[test]
    fn any_changed_column_creates_new_row() {
        let conn = memory_db();
        get_or_create(&conn, &sample()).unwrap();
        let cheaper = GadgetRow {
            price_use: Some("54999".into()),
            ..sample()
        };
        let (_, created) = get_or_create(&conn, &cheaper).unwrap();
        assert!(created);
        let s = get_stats(&conn).unwrap();
        assert_eq!(s.total, 2);
        assert_eq!(s.distinct_codes, 1);
    }

    #[test]
    fn overview_newest_first() {
        let conn = memory_db();
        get_or_create(&conn, &sample()).unwrap();
        get_or_create(
            &conn,
            &GadgetRow {
                full_name: Some("Samsung Galaxy S24".into()),
                product_code: None,
                ..sample()
            },
        )
        .unwrap();
        let rows = fetch_overview(&conn, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].full_name, "Samsung Galaxy S24");
        assert_eq!(rows[0].product_code, "");
        assert_eq!(rows[1].review_count, Some(12));
        assert_eq!(fetch_overview(&conn, 1).unwrap().len(), 1);
    }

    #[test]
    fn connect_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("gadget_scraper_test_{}", std::process::id()));
        let path = dir.join("nested").join("g.sqlite");
        let conn = connect(path.to_str().unwrap()).unwrap();
        assert!(get_or_create(&conn, &sample()).unwrap().1);
        drop(conn);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
