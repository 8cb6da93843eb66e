//! In-memory application state and its JSON snapshot format.
//!
//! `AppState` is the explicit state container: every mutation goes through
//! one of the documented operations below, which validate first and only
//! then touch the lists, so a rejected call leaves the state exactly as it
//! was. The work-log/ledger dual write happens inside one call between
//! saves, which is the atomicity this single-user app needs.
//!
//! The whole state round-trips through `Snapshot`, a versioned JSON
//! document. Loading an absent or unreadable snapshot falls back to seeded
//! defaults rather than erroring; that is the contract of the local
//! snapshot store, not a silent failure mode.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::admin::Admin;
use crate::collaborator::{Collaborator, validate_name};
use crate::error::{Error, Result};
use crate::inventory::{Product, Valuation, valuation};
use crate::ledger::{EntryKind, LedgerEntry, LedgerTotals, totals};
use crate::reports::{ReportRow, ReportWindow, aggregate};
use crate::service::{Service, default_catalog};
use crate::split::{split, validate_percent};
use crate::worklog::WorkLogEntry;

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full application state.
///
/// Work log and ledger are kept newest-first; paging takes a prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    /// Monotonic row id shared by all entities; never reused after delete.
    next_id: i64,
    pub collaborators: Vec<Collaborator>,
    pub services: Vec<Service>,
    pub work_log: Vec<WorkLogEntry>,
    pub ledger: Vec<LedgerEntry>,
    pub products: Vec<Product>,
    /// Absent from snapshots written before the attendance register existed.
    #[serde(default)]
    pub admins: Vec<Admin>,
}

/// Versioned on-disk document wrapping [`AppState`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(flatten)]
    pub state: AppState,
}

impl AppState {
    /// Fresh state seeded with the default service catalog.
    pub fn seeded() -> Self {
        let mut state = AppState {
            next_id: 1,
            ..AppState::default()
        };
        for mut service in default_catalog() {
            service.id = Some(state.take_id());
            state.services.push(service);
        }
        state
    }

    /// Rebuild a state from persisted records, e.g. when exporting a
    /// relational database into the snapshot format. The id counter resumes
    /// past the highest id seen.
    pub fn from_records(
        collaborators: Vec<Collaborator>,
        services: Vec<Service>,
        work_log: Vec<WorkLogEntry>,
        ledger: Vec<LedgerEntry>,
        products: Vec<Product>,
        admins: Vec<Admin>,
    ) -> Self {
        let max_id = collaborators
            .iter()
            .filter_map(|c| c.id)
            .chain(services.iter().filter_map(|s| s.id))
            .chain(work_log.iter().filter_map(|w| w.id))
            .chain(ledger.iter().filter_map(|e| e.id))
            .chain(products.iter().filter_map(|p| p.id))
            .chain(admins.iter().filter_map(|a| a.id))
            .max()
            .unwrap_or(0);
        AppState {
            next_id: max_id + 1,
            collaborators,
            services,
            work_log,
            ledger,
            products,
            admins,
        }
    }

    /// Load a snapshot file, falling back to seeded defaults when the file
    /// is absent or does not parse.
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return AppState::seeded();
        };
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => snapshot.migrate(),
            Err(_) => AppState::seeded(),
        }
    }

    /// Write the full state as one snapshot document.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            state: self.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---- Collaborators ----

    pub fn add_collaborator(&mut self, name: &str, share_percent: f64) -> Result<&Collaborator> {
        let mut collaborator = Collaborator::new(name, share_percent)?;
        if self.collaborators.iter().any(|c| c.name == collaborator.name) {
            return Err(Error::validation(format!(
                "collaborator '{}' already exists",
                collaborator.name
            )));
        }
        collaborator.id = Some(self.take_id());
        self.collaborators.push(collaborator);
        Ok(self.collaborators.last().unwrap())
    }

    pub fn rename_collaborator(&mut self, id: i64, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        if self
            .collaborators
            .iter()
            .any(|c| c.name == name && c.id != Some(id))
        {
            return Err(Error::validation(format!(
                "collaborator '{name}' already exists"
            )));
        }
        let collaborator = self
            .collaborators
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or(Error::not_found("collaborator", id))?;
        collaborator.name = name;
        Ok(())
    }

    /// Change a collaborator's share percent. Blocked once any work-log
    /// entry references the collaborator, so historical splits stay put.
    pub fn set_collaborator_percent(&mut self, id: i64, share_percent: f64) -> Result<()> {
        validate_percent(share_percent)?;
        if self.work_log.iter().any(|w| w.collaborator_id == id) {
            return Err(Error::validation(
                "share percent is locked once the collaborator has logged work",
            ));
        }
        let collaborator = self
            .collaborators
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or(Error::not_found("collaborator", id))?;
        collaborator.share_percent = share_percent;
        Ok(())
    }

    /// Delete a collaborator. Referencing work logs keep their amounts and
    /// snapshots; only name resolution degrades.
    pub fn delete_collaborator(&mut self, id: i64) -> Result<()> {
        let before = self.collaborators.len();
        self.collaborators.retain(|c| c.id != Some(id));
        if self.collaborators.len() == before {
            return Err(Error::not_found("collaborator", id));
        }
        Ok(())
    }

    pub fn collaborator(&self, id: i64) -> Result<&Collaborator> {
        self.collaborators
            .iter()
            .find(|c| c.id == Some(id))
            .ok_or(Error::not_found("collaborator", id))
    }

    /// Collaborators sorted by name for display.
    pub fn collaborators_by_name(&self) -> Vec<&Collaborator> {
        let mut list: Vec<&Collaborator> = self.collaborators.iter().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    // ---- Services ----

    pub fn add_service(&mut self, name: &str, price: f64) -> Result<&Service> {
        let mut service = Service::new(name, price)?;
        if self.services.iter().any(|s| s.name == service.name) {
            return Err(Error::validation(format!(
                "service '{}' already exists",
                service.name
            )));
        }
        service.id = Some(self.take_id());
        self.services.push(service);
        Ok(self.services.last().unwrap())
    }

    pub fn update_service(&mut self, id: i64, name: &str, price: f64) -> Result<()> {
        let updated = Service::new(name, price)?;
        if self
            .services
            .iter()
            .any(|s| s.name == updated.name && s.id != Some(id))
        {
            return Err(Error::validation(format!(
                "service '{}' already exists",
                updated.name
            )));
        }
        let service = self
            .services
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or(Error::not_found("service", id))?;
        service.name = updated.name;
        service.price = updated.price;
        Ok(())
    }

    pub fn delete_service(&mut self, id: i64) -> Result<()> {
        let before = self.services.len();
        self.services.retain(|s| s.id != Some(id));
        if self.services.len() == before {
            return Err(Error::not_found("service", id));
        }
        Ok(())
    }

    pub fn service(&self, id: i64) -> Result<&Service> {
        self.services
            .iter()
            .find(|s| s.id == Some(id))
            .ok_or(Error::not_found("service", id))
    }

    pub fn services_by_name(&self) -> Vec<&Service> {
        let mut list: Vec<&Service> = self.services.iter().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    // ---- Work log + ledger dual write ----

    /// Record a performed service and the matching ledger credit.
    ///
    /// The percent comes from the collaborator; the gross amount defaults
    /// to the service price unless overridden. Everything is validated
    /// before either list is touched.
    pub fn record_work(
        &mut self,
        date: NaiveDate,
        collaborator_id: i64,
        service_id: i64,
        gross_override: Option<f64>,
        notes: Option<String>,
    ) -> Result<&WorkLogEntry> {
        let collaborator = self.collaborator(collaborator_id)?.clone();
        let service = self.service(service_id)?.clone();
        let gross = gross_override.unwrap_or(service.price);
        let split = split(gross, collaborator.share_percent)?;

        let mut entry = WorkLogEntry::from_split(
            date,
            collaborator_id,
            service_id,
            service.name,
            collaborator.share_percent,
            gross,
            split,
            notes,
        );
        entry.id = Some(self.take_id());

        let credit = LedgerEntry {
            id: Some(self.take_id()),
            date,
            description: entry.ledger_description(&collaborator.name),
            kind: EntryKind::Credit,
            amount: entry.owner_share,
        };

        self.work_log.insert(0, entry);
        self.ledger.insert(0, credit);
        Ok(&self.work_log[0])
    }

    /// Most recent work entries, up to `limit`.
    pub fn work_log_page(&self, limit: usize) -> &[WorkLogEntry] {
        &self.work_log[..self.work_log.len().min(limit)]
    }

    // ---- Ledger ----

    pub fn add_ledger_entry(
        &mut self,
        date: NaiveDate,
        description: &str,
        kind: EntryKind,
        amount: f64,
    ) -> Result<&LedgerEntry> {
        let mut entry = LedgerEntry::new(date, description, kind, amount)?;
        entry.id = Some(self.take_id());
        self.ledger.insert(0, entry);
        Ok(&self.ledger[0])
    }

    /// Most recent ledger entries, up to `limit`.
    pub fn ledger_page(&self, limit: usize) -> &[LedgerEntry] {
        &self.ledger[..self.ledger.len().min(limit)]
    }

    /// Totals over the whole ledger, recomputed on every call.
    pub fn ledger_totals(&self) -> LedgerTotals {
        totals(&self.ledger)
    }

    // ---- Products ----

    pub fn add_product(
        &mut self,
        name: &str,
        description: &str,
        cost_price: f64,
        sale_price: f64,
        stock: i64,
    ) -> Result<&Product> {
        let mut product = Product::new(name, description, cost_price, sale_price, stock)?;
        if self.products.iter().any(|p| p.name == product.name) {
            return Err(Error::validation(format!(
                "product '{}' already exists",
                product.name
            )));
        }
        product.id = Some(self.take_id());
        self.products.push(product);
        Ok(self.products.last().unwrap())
    }

    pub fn update_product(
        &mut self,
        id: i64,
        name: &str,
        description: &str,
        cost_price: f64,
        sale_price: f64,
        stock: i64,
    ) -> Result<()> {
        let updated = Product::new(name, description, cost_price, sale_price, stock)?;
        if self
            .products
            .iter()
            .any(|p| p.name == updated.name && p.id != Some(id))
        {
            return Err(Error::validation(format!(
                "product '{}' already exists",
                updated.name
            )));
        }
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or(Error::not_found("product", id))?;
        product.name = updated.name;
        product.description = updated.description;
        product.cost_price = updated.cost_price;
        product.sale_price = updated.sale_price;
        product.stock = updated.stock;
        Ok(())
    }

    pub fn delete_product(&mut self, id: i64) -> Result<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != Some(id));
        if self.products.len() == before {
            return Err(Error::not_found("product", id));
        }
        Ok(())
    }

    pub fn products_by_name(&self) -> Vec<&Product> {
        let mut list: Vec<&Product> = self.products.iter().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Inventory valuation over current stock.
    pub fn inventory_valuation(&self) -> Valuation {
        valuation(&self.products)
    }

    // ---- Attendance register ----

    pub fn add_admin(&mut self, name: &str) -> Result<&Admin> {
        let mut admin = Admin::new(name)?;
        if self.admins.iter().any(|a| a.name == admin.name) {
            return Err(Error::validation(format!(
                "admin '{}' already exists",
                admin.name
            )));
        }
        admin.id = Some(self.take_id());
        self.admins.push(admin);
        Ok(self.admins.last().unwrap())
    }

    /// Flip an admin's presence and stamp the check time.
    pub fn toggle_admin(&mut self, id: i64, now: NaiveDateTime) -> Result<&Admin> {
        let admin = self
            .admins
            .iter_mut()
            .find(|a| a.id == Some(id))
            .ok_or(Error::not_found("admin", id))?;
        admin.toggle(now);
        Ok(admin)
    }

    pub fn delete_admin(&mut self, id: i64) -> Result<()> {
        let before = self.admins.len();
        self.admins.retain(|a| a.id != Some(id));
        if self.admins.len() == before {
            return Err(Error::not_found("admin", id));
        }
        Ok(())
    }

    pub fn admins_by_name(&self) -> Vec<&Admin> {
        let mut list: Vec<&Admin> = self.admins.iter().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    // ---- Reports ----

    /// Per-collaborator share sums over a window, sorted by name.
    pub fn report(&self, window: ReportWindow) -> Vec<ReportRow> {
        let names: HashMap<i64, String> = self
            .collaborators
            .iter()
            .filter_map(|c| c.id.map(|id| (id, c.name.clone())))
            .collect();
        aggregate(&self.work_log, window, &names)
    }
}

impl Snapshot {
    /// Produce a typed state from the stored document.
    ///
    /// Version 1 is current; anything newer than what we know is treated
    /// like a corrupt file and replaced with seeded defaults.
    pub fn migrate(self) -> AppState {
        if self.version == 0 || self.version > SNAPSHOT_VERSION {
            return AppState::seeded();
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_with_ana() -> (AppState, i64, i64) {
        let mut state = AppState::seeded();
        let ana = state.add_collaborator("Ana", 40.0).unwrap().id.unwrap();
        let service = state.services_by_name()[0].id.unwrap();
        (state, ana, service)
    }

    #[test]
    fn seeded_state_has_default_catalog() {
        let state = AppState::seeded();
        assert_eq!(state.services.len(), 4);
        assert!(state.collaborators.is_empty());
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn record_work_writes_entry_and_matching_credit() {
        let (mut state, ana, _) = state_with_ana();
        let corte = state
            .services
            .iter()
            .find(|s| s.name == "Corte de pelo")
            .unwrap()
            .id
            .unwrap();

        state
            .record_work(ymd(2026, 3, 14), ana, corte, Some(100.0), None)
            .unwrap();

        assert_eq!(state.work_log.len(), 1);
        assert_eq!(state.ledger.len(), 1);
        let work = &state.work_log[0];
        assert_eq!(work.collaborator_share, 40.0);
        assert_eq!(work.owner_share, 60.0);
        let credit = &state.ledger[0];
        assert_eq!(credit.kind, EntryKind::Credit);
        assert_eq!(credit.amount, 60.0);
        assert!(credit.description.contains("Corte de pelo"));
        assert!(credit.description.contains("Ana"));
    }

    #[test]
    fn record_work_defaults_gross_to_service_price() {
        let (mut state, ana, _) = state_with_ana();
        let tinturado = state
            .services
            .iter()
            .find(|s| s.name == "Tinturado")
            .unwrap()
            .id
            .unwrap();
        let entry = state
            .record_work(ymd(2026, 3, 14), ana, tinturado, None, None)
            .unwrap();
        assert_eq!(entry.gross_amount, 45.0);
    }

    #[test]
    fn record_work_rejects_unknown_references_without_partial_state() {
        let (mut state, ana, service) = state_with_ana();
        assert_eq!(
            state
                .record_work(ymd(2026, 3, 14), 999, service, Some(50.0), None)
                .unwrap_err(),
            Error::not_found("collaborator", 999)
        );
        assert_eq!(
            state
                .record_work(ymd(2026, 3, 14), ana, 999, Some(50.0), None)
                .unwrap_err(),
            Error::not_found("service", 999)
        );
        // a validation failure must also leave both logs untouched
        assert!(
            state
                .record_work(ymd(2026, 3, 14), ana, service, Some(-1.0), None)
                .is_err()
        );
        assert!(state.work_log.is_empty());
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn work_log_and_ledger_are_newest_first() {
        let (mut state, ana, service) = state_with_ana();
        state
            .record_work(ymd(2026, 3, 10), ana, service, Some(10.0), None)
            .unwrap();
        state
            .record_work(ymd(2026, 3, 11), ana, service, Some(20.0), None)
            .unwrap();
        assert_eq!(state.work_log[0].gross_amount, 20.0);
        assert_eq!(state.work_log_page(1).len(), 1);
        assert_eq!(state.work_log_page(1)[0].gross_amount, 20.0);
        assert_eq!(state.ledger_page(1)[0].amount, state.ledger[0].amount);
    }

    #[test]
    fn percent_locked_after_first_logged_work() {
        let (mut state, ana, service) = state_with_ana();
        state.set_collaborator_percent(ana, 45.0).unwrap();
        state
            .record_work(ymd(2026, 3, 14), ana, service, Some(50.0), None)
            .unwrap();
        assert!(state.set_collaborator_percent(ana, 50.0).is_err());
        // rename stays allowed
        state.rename_collaborator(ana, "Ana María").unwrap();
    }

    #[test]
    fn deleting_referenced_collaborator_keeps_work_log_intact() {
        let (mut state, ana, service) = state_with_ana();
        state
            .record_work(ymd(2026, 3, 14), ana, service, Some(100.0), None)
            .unwrap();
        state.delete_collaborator(ana).unwrap();

        assert_eq!(state.work_log.len(), 1);
        assert_eq!(state.work_log[0].collaborator_share, 40.0);
        let rows = state.report(ReportWindow::daily(ymd(2026, 3, 14)));
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].collaborator_name,
            crate::collaborator::DELETED_COLLABORATOR
        );
    }

    #[test]
    fn duplicate_names_rejected_per_entity() {
        let (mut state, _, _) = state_with_ana();
        assert!(state.add_collaborator("Ana", 30.0).is_err());
        assert!(state.add_service("Corte de pelo", 10.0).is_err());
        state.add_product("Shampoo", "", 10.0, 15.0, 2).unwrap();
        assert!(state.add_product("Shampoo", "", 1.0, 2.0, 1).is_err());
    }

    #[test]
    fn ledger_totals_recomputed_over_all_entries() {
        let mut state = AppState::seeded();
        let d = ymd(2026, 3, 14);
        state
            .add_ledger_entry(d, "supplies", EntryKind::Debit, 20.0)
            .unwrap();
        state
            .add_ledger_entry(d, "walk-in", EntryKind::Credit, 50.0)
            .unwrap();
        state
            .add_ledger_entry(d, "coffee", EntryKind::Debit, 5.0)
            .unwrap();
        let t = state.ledger_totals();
        assert_eq!(t.total_debit, 25.0);
        assert_eq!(t.total_credit, 50.0);
        assert_eq!(t.balance, 25.0);
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let mut state = AppState::seeded();
        let a = state.add_collaborator("Ana", 40.0).unwrap().id.unwrap();
        state.delete_collaborator(a).unwrap();
        let b = state.add_collaborator("Bea", 35.0).unwrap().id.unwrap();
        assert!(b > a);
    }

    #[test]
    fn attendance_register_toggles_and_deletes() {
        let mut state = AppState::seeded();
        let id = state.add_admin("Marta").unwrap().id.unwrap();
        assert!(state.add_admin("Marta").is_err());

        let now = ymd(2026, 3, 14).and_hms_opt(9, 0, 0).unwrap();
        let admin = state.toggle_admin(id, now).unwrap();
        assert!(admin.present);
        assert_eq!(admin.last_check, Some(now));
        let admin = state.toggle_admin(id, now).unwrap();
        assert!(!admin.present);

        state.delete_admin(id).unwrap();
        assert_eq!(
            state.toggle_admin(id, now).unwrap_err(),
            Error::not_found("admin", id)
        );
    }

    #[test]
    fn snapshot_written_before_the_attendance_register_still_loads() {
        let json = r#"{"version":1,"next_id":1,"collaborators":[],"services":[],"work_log":[],"ledger":[],"products":[]}"#;
        let restored = serde_json::from_str::<Snapshot>(json).unwrap().migrate();
        assert!(restored.admins.is_empty());
        assert_eq!(restored.services.len(), 0);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let (mut state, ana, service) = state_with_ana();
        state
            .record_work(ymd(2026, 3, 14), ana, service, Some(100.0), None)
            .unwrap();

        let json = serde_json::to_string(&Snapshot {
            version: SNAPSHOT_VERSION,
            state: state.clone(),
        })
        .unwrap();
        let restored = serde_json::from_str::<Snapshot>(&json).unwrap().migrate();

        assert_eq!(restored.work_log.len(), 1);
        assert_eq!(restored.ledger.len(), 1);
        assert_eq!(restored.collaborators.len(), 1);
        assert_eq!(
            restored.ledger_totals().balance,
            state.ledger_totals().balance
        );
    }

    #[test]
    fn load_falls_back_to_defaults_for_missing_or_corrupt_files() {
        let dir = std::env::temp_dir().join("salon-core-state-test");
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.json");
        let state = AppState::load(&missing);
        assert_eq!(state.services.len(), 4);

        let corrupt = dir.join("corrupt.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        let state = AppState::load(&corrupt);
        assert_eq!(state.services.len(), 4);

        let future = dir.join("future.json");
        std::fs::write(&future, r#"{"version": 99}"#).unwrap();
        let state = AppState::load(&future);
        assert_eq!(state.services.len(), 4);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join("salon-core-state-test");
        let path = dir.join("snapshot.json");
        let (mut state, ana, service) = state_with_ana();
        state
            .record_work(ymd(2026, 3, 14), ana, service, Some(80.0), None)
            .unwrap();
        state.save(&path).unwrap();

        let restored = AppState::load(&path);
        assert_eq!(restored.work_log.len(), 1);
        assert_eq!(restored.work_log[0].gross_amount, 80.0);
        std::fs::remove_file(&path).unwrap();
    }
}
