//! SQLite persistence.
//!
//! One store wrapper owning the pool. The schema is created idempotently
//! at open, dates are stored as `YYYY-MM-DD` text, and the work-log/ledger
//! dual write runs inside a single transaction so a work entry and its
//! ledger credit land together or not at all.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use std::path::Path;

use salon_core::admin::Admin;
use salon_core::collaborator::Collaborator;
use salon_core::inventory::{Product, Valuation, valuation};
use salon_core::ledger::{EntryKind, LedgerEntry, LedgerTotals, totals};
use salon_core::reports::{ReportRow, ReportWindow, aggregate};
use salon_core::service::{Service, default_catalog};
use salon_core::split::split;
use salon_core::state::AppState;
use salon_core::worklog::WorkLogEntry;

/// Database wrapper
pub struct Store {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct CollaboratorRow {
    id: i64,
    name: String,
    share_percent: f64,
}

#[derive(FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    price: f64,
}

#[derive(FromRow)]
struct WorkLogRow {
    id: i64,
    work_date: String,
    collaborator_id: i64,
    service_id: i64,
    service_name: String,
    share_percent: f64,
    gross_amount: f64,
    collaborator_share: f64,
    owner_share: f64,
    notes: Option<String>,
}

#[derive(FromRow)]
struct LedgerRow {
    id: i64,
    entry_date: String,
    description: String,
    kind: String,
    amount: f64,
}

#[derive(FromRow)]
struct AdminRow {
    id: i64,
    name: String,
    present: i64,
    last_check: Option<String>,
}

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    cost_price: f64,
    sale_price: f64,
    stock: i64,
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .with_context(|| format!("invalid date in database: '{s}'"))
}

/// Storage format for attendance check timestamps
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl TryFrom<AdminRow> for Admin {
    type Error = anyhow::Error;

    fn try_from(row: AdminRow) -> Result<Self> {
        let last_check = row
            .last_check
            .map(|s| {
                NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
                    .with_context(|| format!("invalid datetime in database: '{s}'"))
            })
            .transpose()?;
        Ok(Admin {
            id: Some(row.id),
            name: row.name,
            present: row.present != 0,
            last_check,
        })
    }
}

impl TryFrom<WorkLogRow> for WorkLogEntry {
    type Error = anyhow::Error;

    fn try_from(row: WorkLogRow) -> Result<Self> {
        Ok(WorkLogEntry {
            id: Some(row.id),
            date: parse_date(&row.work_date)?,
            collaborator_id: row.collaborator_id,
            service_id: row.service_id,
            service_name: row.service_name,
            share_percent: row.share_percent,
            gross_amount: row.gross_amount,
            collaborator_share: row.collaborator_share,
            owner_share: row.owner_share,
            notes: row.notes,
        })
    }
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = anyhow::Error;

    fn try_from(row: LedgerRow) -> Result<Self> {
        Ok(LedgerEntry {
            id: Some(row.id),
            date: parse_date(&row.entry_date)?,
            description: row.description,
            kind: EntryKind::parse(&row.kind)?,
            amount: row.amount,
        })
    }
}

impl Store {
    /// Open or create the database file
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // SQLx requires the file to exist for SQLite
        if !path.exists() {
            std::fs::File::create(path)?;
        }

        let url = format!("sqlite:{}", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to open database")?;

        // WAL mode and a busy timeout so a second process sharing the file
        // does not hit SQLITE_BUSY immediately
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA busy_timeout=5000")
            .execute(&pool)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        store.seed_catalog().await?;

        Ok(store)
    }

    /// In-memory database for tests.
    ///
    /// Every connection to `sqlite::memory:` is its own database, so the
    /// pool is pinned to one connection that never gets recycled.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        store.seed_catalog().await?;
        Ok(store)
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS collaborators (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                share_percent REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                price REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            -- Append-only; percent, shares and service name are snapshotted
            -- so collaborator/service edits never rewrite history
            CREATE TABLE IF NOT EXISTS work_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                work_date TEXT NOT NULL,
                collaborator_id INTEGER NOT NULL,
                service_id INTEGER NOT NULL,
                service_name TEXT NOT NULL,
                share_percent REAL NOT NULL,
                gross_amount REAL NOT NULL,
                collaborator_share REAL NOT NULL,
                owner_share REAL NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_work_logs_date ON work_logs(work_date)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS ledger_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_date TEXT NOT NULL,
                description TEXT NOT NULL,
                kind TEXT NOT NULL CHECK(kind IN ('debit', 'credit')),
                amount REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                present INTEGER NOT NULL DEFAULT 0,
                last_check TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                cost_price REAL NOT NULL,
                sale_price REAL NOT NULL,
                stock INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Seed the default service catalog into an empty services table
    async fn seed_catalog(&self) -> Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }
        for service in default_catalog() {
            sqlx::query("INSERT INTO services(name, price) VALUES(?, ?)")
                .bind(&service.name)
                .bind(service.price)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    // ---- Collaborators ----

    pub async fn add_collaborator(&self, collaborator: &Collaborator) -> Result<i64> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM collaborators WHERE name = ?")
            .bind(&collaborator.name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            bail!("collaborator '{}' already exists", collaborator.name);
        }

        let result = sqlx::query("INSERT INTO collaborators(name, share_percent) VALUES(?, ?)")
            .bind(&collaborator.name)
            .bind(collaborator.share_percent)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_collaborators(&self) -> Result<Vec<Collaborator>> {
        let rows: Vec<CollaboratorRow> =
            sqlx::query_as("SELECT id, name, share_percent FROM collaborators ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|r| Collaborator {
                id: Some(r.id),
                name: r.name,
                share_percent: r.share_percent,
            })
            .collect())
    }

    pub async fn get_collaborator(&self, id: i64) -> Result<Option<Collaborator>> {
        let row: Option<CollaboratorRow> =
            sqlx::query_as("SELECT id, name, share_percent FROM collaborators WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| Collaborator {
            id: Some(r.id),
            name: r.name,
            share_percent: r.share_percent,
        }))
    }

    pub async fn rename_collaborator(&self, id: i64, name: &str) -> Result<bool> {
        let taken: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM collaborators WHERE name = ? AND id != ?")
                .bind(name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        if taken.is_some() {
            bail!("collaborator '{name}' already exists");
        }
        let result = sqlx::query("UPDATE collaborators SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a collaborator's share percent. Refused once the collaborator
    /// appears in the work log: historical splits must not move.
    pub async fn set_collaborator_percent(&self, id: i64, share_percent: f64) -> Result<bool> {
        let (references,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM work_logs WHERE collaborator_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if references > 0 {
            bail!("share percent is locked once the collaborator has logged work");
        }
        let result = sqlx::query("UPDATE collaborators SET share_percent = ? WHERE id = ?")
            .bind(share_percent)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a collaborator. Work logs referencing it are left intact;
    /// their name resolution degrades to a placeholder.
    pub async fn delete_collaborator(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM collaborators WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Services ----

    pub async fn add_service(&self, service: &Service) -> Result<i64> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM services WHERE name = ?")
            .bind(&service.name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            bail!("service '{}' already exists", service.name);
        }
        let result = sqlx::query("INSERT INTO services(name, price) VALUES(?, ?)")
            .bind(&service.name)
            .bind(service.price)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_services(&self) -> Result<Vec<Service>> {
        let rows: Vec<ServiceRow> =
            sqlx::query_as("SELECT id, name, price FROM services ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|r| Service {
                id: Some(r.id),
                name: r.name,
                price: r.price,
            })
            .collect())
    }

    pub async fn get_service(&self, id: i64) -> Result<Option<Service>> {
        let row: Option<ServiceRow> =
            sqlx::query_as("SELECT id, name, price FROM services WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| Service {
            id: Some(r.id),
            name: r.name,
            price: r.price,
        }))
    }

    pub async fn update_service(&self, id: i64, name: &str, price: f64) -> Result<bool> {
        let taken: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM services WHERE name = ? AND id != ?")
                .bind(name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        if taken.is_some() {
            bail!("service '{name}' already exists");
        }
        let result = sqlx::query("UPDATE services SET name = ?, price = ? WHERE id = ?")
            .bind(name)
            .bind(price)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_service(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Work log + ledger dual write ----

    /// Record a performed service and its ledger credit in one transaction.
    ///
    /// The percent comes from the collaborator row; the gross amount
    /// defaults to the service price unless overridden.
    pub async fn record_work(
        &self,
        date: NaiveDate,
        collaborator_id: i64,
        service_id: i64,
        gross_override: Option<f64>,
        notes: Option<String>,
    ) -> Result<WorkLogEntry> {
        let collaborator = self
            .get_collaborator(collaborator_id)
            .await?
            .ok_or(salon_core::Error::not_found("collaborator", collaborator_id))?;
        let service = self
            .get_service(service_id)
            .await?
            .ok_or(salon_core::Error::not_found("service", service_id))?;

        let gross = gross_override.unwrap_or(service.price);
        let computed = split(gross, collaborator.share_percent)?;

        let mut entry = WorkLogEntry::from_split(
            date,
            collaborator_id,
            service_id,
            service.name,
            collaborator.share_percent,
            gross,
            computed,
            notes,
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO work_logs(
                work_date, collaborator_id, service_id, service_name, share_percent,
                gross_amount, collaborator_share, owner_share, notes
            ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.date.to_string())
        .bind(entry.collaborator_id)
        .bind(entry.service_id)
        .bind(&entry.service_name)
        .bind(entry.share_percent)
        .bind(entry.gross_amount)
        .bind(entry.collaborator_share)
        .bind(entry.owner_share)
        .bind(&entry.notes)
        .execute(&mut *tx)
        .await?;
        entry.id = Some(result.last_insert_rowid());

        sqlx::query(
            "INSERT INTO ledger_entries(entry_date, description, kind, amount)
             VALUES(?, ?, 'credit', ?)",
        )
        .bind(entry.date.to_string())
        .bind(entry.ledger_description(&collaborator.name))
        .bind(entry.owner_share)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Most recent work entries, newest first
    pub async fn get_work_log(&self, limit: usize) -> Result<Vec<WorkLogEntry>> {
        let rows: Vec<WorkLogRow> = sqlx::query_as(
            "SELECT id, work_date, collaborator_id, service_id, service_name, share_percent,
                    gross_amount, collaborator_share, owner_share, notes
             FROM work_logs ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WorkLogEntry::try_from).collect()
    }

    async fn get_all_work_logs(&self) -> Result<Vec<WorkLogEntry>> {
        let rows: Vec<WorkLogRow> = sqlx::query_as(
            "SELECT id, work_date, collaborator_id, service_id, service_name, share_percent,
                    gross_amount, collaborator_share, owner_share, notes
             FROM work_logs ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WorkLogEntry::try_from).collect()
    }

    /// Work entries whose date falls inside the window (inclusive)
    async fn get_work_in_window(&self, window: ReportWindow) -> Result<Vec<WorkLogEntry>> {
        let rows: Vec<WorkLogRow> = sqlx::query_as(
            "SELECT id, work_date, collaborator_id, service_id, service_name, share_percent,
                    gross_amount, collaborator_share, owner_share, notes
             FROM work_logs WHERE work_date >= ? AND work_date <= ? ORDER BY id DESC",
        )
        .bind(window.start.to_string())
        .bind(window.end.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WorkLogEntry::try_from).collect()
    }

    // ---- Ledger ----

    pub async fn add_ledger_entry(&self, entry: &LedgerEntry) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO ledger_entries(entry_date, description, kind, amount) VALUES(?, ?, ?, ?)",
        )
        .bind(entry.date.to_string())
        .bind(&entry.description)
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Most recent ledger entries, newest first
    pub async fn get_ledger(&self, limit: usize) -> Result<Vec<LedgerEntry>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(
            "SELECT id, entry_date, description, kind, amount
             FROM ledger_entries ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    /// Every ledger entry, newest first (for totals and CSV export; the
    /// totals row must be reproducible from the exported rows)
    pub async fn get_all_ledger(&self) -> Result<Vec<LedgerEntry>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(
            "SELECT id, entry_date, description, kind, amount
             FROM ledger_entries ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    /// Totals over every ledger entry, recomputed on each call
    pub async fn ledger_totals(&self) -> Result<LedgerTotals> {
        let entries = self.get_all_ledger().await?;
        Ok(totals(&entries))
    }

    // ---- Products ----

    pub async fn add_product(&self, product: &Product) -> Result<i64> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE name = ?")
            .bind(&product.name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            bail!("product '{}' already exists", product.name);
        }
        let result = sqlx::query(
            "INSERT INTO products(name, description, cost_price, sale_price, stock)
             VALUES(?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost_price)
        .bind(product.sale_price)
        .bind(product.stock)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_products(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, cost_price, sale_price, stock
             FROM products ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Product {
                id: Some(r.id),
                name: r.name,
                description: r.description,
                cost_price: r.cost_price,
                sale_price: r.sale_price,
                stock: r.stock,
            })
            .collect())
    }

    pub async fn update_product(&self, product: &Product, id: i64) -> Result<bool> {
        let taken: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM products WHERE name = ? AND id != ?")
                .bind(&product.name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        if taken.is_some() {
            bail!("product '{}' already exists", product.name);
        }
        let result = sqlx::query(
            "UPDATE products SET name = ?, description = ?, cost_price = ?, sale_price = ?,
                    stock = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost_price)
        .bind(product.sale_price)
        .bind(product.stock)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_product(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Inventory valuation over current stock
    pub async fn inventory_valuation(&self) -> Result<Valuation> {
        let products = self.get_products().await?;
        Ok(valuation(&products))
    }

    // ---- Attendance register ----

    pub async fn add_admin(&self, admin: &Admin) -> Result<i64> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM admins WHERE name = ?")
            .bind(&admin.name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            bail!("admin '{}' already exists", admin.name);
        }
        let result = sqlx::query("INSERT INTO admins(name, present, last_check) VALUES(?, ?, ?)")
            .bind(&admin.name)
            .bind(admin.present as i64)
            .bind(admin.last_check.map(|t| t.format(DATETIME_FORMAT).to_string()))
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_admins(&self) -> Result<Vec<Admin>> {
        let rows: Vec<AdminRow> =
            sqlx::query_as("SELECT id, name, present, last_check FROM admins ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Admin::try_from).collect()
    }

    /// Flip an admin's presence and stamp the check time
    pub async fn toggle_admin(&self, id: i64, now: NaiveDateTime) -> Result<Option<Admin>> {
        let row: Option<AdminRow> =
            sqlx::query_as("SELECT id, name, present, last_check FROM admins WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut admin = Admin::try_from(row)?;
        admin.toggle(now);

        sqlx::query("UPDATE admins SET present = ?, last_check = ? WHERE id = ?")
            .bind(admin.present as i64)
            .bind(admin.last_check.map(|t| t.format(DATETIME_FORMAT).to_string()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(Some(admin))
    }

    pub async fn delete_admin(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Reports ----

    /// Per-collaborator share sums over a window, sorted by name
    pub async fn report(&self, window: ReportWindow) -> Result<Vec<ReportRow>> {
        let entries = self.get_work_in_window(window).await?;
        let names: HashMap<i64, String> = self
            .get_collaborators()
            .await?
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c.name)))
            .collect();
        Ok(aggregate(&entries, window, &names))
    }

    // ---- Backup ----

    /// Read the full database into an in-memory state for backup export
    pub async fn export_state(&self) -> Result<AppState> {
        let collaborators = self.get_collaborators().await?;
        let services = self.get_services().await?;
        let work_log = self.get_all_work_logs().await?;
        let ledger = self.get_all_ledger().await?;
        let products = self.get_products().await?;
        let admins = self.get_admins().await?;
        Ok(AppState::from_records(
            collaborators,
            services,
            work_log,
            ledger,
            products,
            admins,
        ))
    }

    /// Replace the database contents with a previously exported state.
    /// Runs in one transaction; on any failure the old contents survive.
    pub async fn import_state(&self, state: &AppState) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for table in [
            "work_logs",
            "ledger_entries",
            "collaborators",
            "services",
            "products",
            "admins",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        for c in &state.collaborators {
            sqlx::query("INSERT INTO collaborators(id, name, share_percent) VALUES(?, ?, ?)")
                .bind(c.id)
                .bind(&c.name)
                .bind(c.share_percent)
                .execute(&mut *tx)
                .await?;
        }
        for s in &state.services {
            sqlx::query("INSERT INTO services(id, name, price) VALUES(?, ?, ?)")
                .bind(s.id)
                .bind(&s.name)
                .bind(s.price)
                .execute(&mut *tx)
                .await?;
        }
        for w in &state.work_log {
            sqlx::query(
                "INSERT INTO work_logs(
                    id, work_date, collaborator_id, service_id, service_name, share_percent,
                    gross_amount, collaborator_share, owner_share, notes
                ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(w.id)
            .bind(w.date.to_string())
            .bind(w.collaborator_id)
            .bind(w.service_id)
            .bind(&w.service_name)
            .bind(w.share_percent)
            .bind(w.gross_amount)
            .bind(w.collaborator_share)
            .bind(w.owner_share)
            .bind(&w.notes)
            .execute(&mut *tx)
            .await?;
        }
        for e in &state.ledger {
            sqlx::query(
                "INSERT INTO ledger_entries(id, entry_date, description, kind, amount)
                 VALUES(?, ?, ?, ?, ?)",
            )
            .bind(e.id)
            .bind(e.date.to_string())
            .bind(&e.description)
            .bind(e.kind.as_str())
            .bind(e.amount)
            .execute(&mut *tx)
            .await?;
        }
        for p in &state.products {
            sqlx::query(
                "INSERT INTO products(id, name, description, cost_price, sale_price, stock)
                 VALUES(?, ?, ?, ?, ?, ?)",
            )
            .bind(p.id)
            .bind(&p.name)
            .bind(&p.description)
            .bind(p.cost_price)
            .bind(p.sale_price)
            .bind(p.stock)
            .execute(&mut *tx)
            .await?;
        }
        for a in &state.admins {
            sqlx::query("INSERT INTO admins(id, name, present, last_check) VALUES(?, ?, ?, ?)")
                .bind(a.id)
                .bind(&a.name)
                .bind(a.present as i64)
                .bind(a.last_check.map(|t| t.format(DATETIME_FORMAT).to_string()))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
