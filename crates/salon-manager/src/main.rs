//! Salon Manager
//!
//! Business management for a hair salon: collaborators paid a percentage of
//! service revenue, a service catalog, a work log that feeds the accounting
//! ledger automatically, a product inventory, and time-windowed reports.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use salon_core::admin::Admin;
use salon_core::collaborator::{Collaborator, DELETED_COLLABORATOR};
use salon_core::inventory::Product;
use salon_core::ledger::{EntryKind, LedgerEntry};
use salon_core::reports::{ReportRow, ReportWindow};
use salon_core::service::Service;
use salon_core::state::Snapshot;
use salon_manager::config::FileConfig;
use salon_manager::export;
use salon_manager::store::Store;

/// Default config file path
const CONFIG_FILE: &str = "config.toml";

/// Database filename inside the data directory
const DB_FILENAME: &str = "salon.sqlite";

#[derive(Parser, Debug)]
#[command(name = "salon-manager")]
#[command(about = "Business management for a hair salon")]
struct Args {
    /// Data directory for the database
    #[arg(short, long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Output directory for generated CSV reports
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage collaborators
    Collaborator {
        #[command(subcommand)]
        action: CollaboratorCommand,
    },

    /// Manage the service catalog
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },

    /// Manage the product inventory
    Product {
        #[command(subcommand)]
        action: ProductCommand,
    },

    /// Record and list performed work
    Work {
        #[command(subcommand)]
        action: WorkCommand,
    },

    /// Manage the debit/credit ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerCommand,
    },

    /// Administrator attendance register
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },

    /// Per-collaborator share reports
    Report {
        #[command(subcommand)]
        action: ReportCommand,
    },

    /// Full-state JSON backup
    Backup {
        #[command(subcommand)]
        action: BackupCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CollaboratorCommand {
    /// List collaborators sorted by name
    List,

    /// Register a new collaborator
    Add {
        /// Collaborator name (unique)
        #[arg(long)]
        name: String,

        /// Revenue share percent, between 0 and 100 exclusive
        #[arg(long)]
        percent: f64,
    },

    /// Rename a collaborator
    Rename {
        /// Collaborator ID
        id: i64,

        /// New name
        #[arg(long)]
        name: String,
    },

    /// Change a collaborator's share percent (only before any logged work)
    SetPercent {
        /// Collaborator ID
        id: i64,

        /// New percent, between 0 and 100 exclusive
        #[arg(long)]
        percent: f64,
    },

    /// Delete a collaborator (existing work logs keep their amounts)
    Delete {
        /// Collaborator ID to delete
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    /// List services sorted by name
    List,

    /// Add a service to the catalog
    Add {
        /// Service name (unique)
        #[arg(long)]
        name: String,

        /// List price (default gross amount when recording work)
        #[arg(long)]
        price: f64,
    },

    /// Update a service's name and price
    Update {
        /// Service ID
        id: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        price: f64,
    },

    /// Delete a service
    Delete {
        /// Service ID to delete
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    /// List products sorted by name
    List,

    /// Add a product
    Add {
        /// Product name (unique)
        #[arg(long)]
        name: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// Cost price per unit
        #[arg(long)]
        cost: f64,

        /// Sale price per unit
        #[arg(long)]
        sale: f64,

        /// Units in stock
        #[arg(long)]
        stock: i64,
    },

    /// Update a product
    Update {
        /// Product ID
        id: i64,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        cost: f64,

        #[arg(long)]
        sale: f64,

        #[arg(long)]
        stock: i64,
    },

    /// Delete a product
    Delete {
        /// Product ID to delete
        id: i64,
    },

    /// Inventory valuation at cost and at sale price
    Valuation,
}

#[derive(Subcommand, Debug)]
enum WorkCommand {
    /// List recent work entries, newest first
    List {
        /// Maximum rows to show (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record a performed service (also writes the ledger credit)
    Record {
        /// Collaborator ID
        #[arg(long)]
        collaborator: i64,

        /// Service ID
        #[arg(long)]
        service: i64,

        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Gross amount charged (default: the service's list price)
        #[arg(long)]
        amount: Option<f64>,

        /// Free-form note (client name etc.)
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// List recent ledger entries, newest first
    List {
        /// Maximum rows to show (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Add a manual ledger entry
    Add {
        /// Entry description
        #[arg(long)]
        description: String,

        /// Entry kind: debit or credit
        #[arg(long)]
        kind: String,

        /// Amount (positive)
        #[arg(long)]
        amount: f64,

        /// Date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Total debits, credits, and balance over the whole ledger
    Totals,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List admins sorted by name
    List,

    /// Register an admin
    Add {
        /// Admin name (unique)
        #[arg(long)]
        name: String,
    },

    /// Toggle an admin's attendance for right now
    Toggle {
        /// Admin ID
        id: i64,
    },

    /// Remove an admin
    Delete {
        /// Admin ID to delete
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Today's shares per collaborator
    Daily,

    /// Monday of this week through today
    Weekly,

    /// First of this month through today
    Monthly,

    /// Write the ledger and all three report windows as CSV files
    Export,
}

#[derive(Subcommand, Debug)]
enum BackupCommand {
    /// Export the full database to a JSON snapshot file
    Export {
        /// Path to output JSON file
        file: PathBuf,
    },

    /// Replace the database contents from a JSON snapshot file
    Import {
        /// Path to snapshot file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = FileConfig::load_or_default(std::path::Path::new(CONFIG_FILE))?;
    let store = Store::open(&args.data_dir.join(DB_FILENAME)).await?;

    match args.command {
        Command::Collaborator { action } => handle_collaborator_command(action, &store).await,
        Command::Service { action } => handle_service_command(action, &store, &config).await,
        Command::Product { action } => handle_product_command(action, &store, &config).await,
        Command::Work { action } => handle_work_command(action, &store, &config).await,
        Command::Ledger { action } => handle_ledger_command(action, &store, &config).await,
        Command::Admin { action } => handle_admin_command(action, &store).await,
        Command::Report { action } => {
            handle_report_command(action, &store, &config, &args.output_dir).await
        }
        Command::Backup { action } => handle_backup_command(action, &store).await,
    }
}

/// Shorten long text for column display
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Format an amount with the configured currency symbol
fn money(config: &FileConfig, value: f64) -> String {
    format!("{}{:.2}", config.salon.currency, value)
}

/// Handle collaborator subcommands
async fn handle_collaborator_command(action: CollaboratorCommand, store: &Store) -> Result<()> {
    match action {
        CollaboratorCommand::List => {
            let collaborators = store.get_collaborators().await?;
            if collaborators.is_empty() {
                println!("No collaborators registered.");
                println!("\nUse 'salon-manager collaborator add' to register one");
                return Ok(());
            }
            println!("{:<4} {:<24} {:>9} {:>9}", "ID", "Name", "Percent", "Owner");
            println!("{}", "-".repeat(50));
            for c in &collaborators {
                println!(
                    "{:<4} {:<24} {:>8.2}% {:>8.2}%",
                    c.id.unwrap_or_default(),
                    truncate(&c.name, 23),
                    c.share_percent,
                    100.0 - c.share_percent,
                );
            }
            println!("\n{} collaborator(s)", collaborators.len());
            Ok(())
        }

        CollaboratorCommand::Add { name, percent } => {
            let collaborator = Collaborator::new(&name, percent)?;
            let id = store.add_collaborator(&collaborator).await?;
            println!(
                "Added collaborator #{}: {} at {:.2}%",
                id, collaborator.name, collaborator.share_percent
            );
            Ok(())
        }

        CollaboratorCommand::Rename { id, name } => {
            let name = salon_core::collaborator::validate_name(&name)?;
            if store.rename_collaborator(id, &name).await? {
                println!("Renamed collaborator #{id} to {name}");
            } else {
                println!("Collaborator #{id} not found");
            }
            Ok(())
        }

        CollaboratorCommand::SetPercent { id, percent } => {
            salon_core::split::validate_percent(percent)?;
            if store.set_collaborator_percent(id, percent).await? {
                println!("Collaborator #{id} now at {percent:.2}%");
            } else {
                println!("Collaborator #{id} not found");
            }
            Ok(())
        }

        CollaboratorCommand::Delete { id } => {
            if store.delete_collaborator(id).await? {
                println!("Deleted collaborator #{id} (existing work logs keep their amounts)");
            } else {
                println!("Collaborator #{id} not found");
            }
            Ok(())
        }
    }
}

/// Handle service catalog subcommands
async fn handle_service_command(
    action: ServiceCommand,
    store: &Store,
    config: &FileConfig,
) -> Result<()> {
    match action {
        ServiceCommand::List => {
            let services = store.get_services().await?;
            if services.is_empty() {
                println!("The service catalog is empty.");
                return Ok(());
            }
            println!("{:<4} {:<28} {:>10}", "ID", "Service", "Price");
            println!("{}", "-".repeat(44));
            for s in &services {
                println!(
                    "{:<4} {:<28} {:>10}",
                    s.id.unwrap_or_default(),
                    truncate(&s.name, 27),
                    money(config, s.price),
                );
            }
            println!("\n{} service(s)", services.len());
            Ok(())
        }

        ServiceCommand::Add { name, price } => {
            let service = Service::new(&name, price)?;
            let id = store.add_service(&service).await?;
            println!(
                "Added service #{}: {} at {}",
                id,
                service.name,
                money(config, service.price)
            );
            Ok(())
        }

        ServiceCommand::Update { id, name, price } => {
            let service = Service::new(&name, price)?;
            if store.update_service(id, &service.name, service.price).await? {
                println!("Updated service #{id}");
            } else {
                println!("Service #{id} not found");
            }
            Ok(())
        }

        ServiceCommand::Delete { id } => {
            if store.delete_service(id).await? {
                println!("Deleted service #{id}");
            } else {
                println!("Service #{id} not found");
            }
            Ok(())
        }
    }
}

/// Handle product inventory subcommands
async fn handle_product_command(
    action: ProductCommand,
    store: &Store,
    config: &FileConfig,
) -> Result<()> {
    match action {
        ProductCommand::List => {
            let products = store.get_products().await?;
            if products.is_empty() {
                println!("No products in inventory.");
                return Ok(());
            }
            println!(
                "{:<4} {:<22} {:>6} {:>10} {:>10}  Description",
                "ID", "Product", "Stock", "Cost", "Sale"
            );
            println!("{}", "-".repeat(80));
            for p in &products {
                println!(
                    "{:<4} {:<22} {:>6} {:>10} {:>10}  {}",
                    p.id.unwrap_or_default(),
                    truncate(&p.name, 21),
                    p.stock,
                    money(config, p.cost_price),
                    money(config, p.sale_price),
                    truncate(&p.description, 24),
                );
            }
            println!("\n{} product(s)", products.len());
            Ok(())
        }

        ProductCommand::Add {
            name,
            description,
            cost,
            sale,
            stock,
        } => {
            let product = Product::new(&name, &description, cost, sale, stock)?;
            let id = store.add_product(&product).await?;
            println!("Added product #{}: {}", id, product.name);
            Ok(())
        }

        ProductCommand::Update {
            id,
            name,
            description,
            cost,
            sale,
            stock,
        } => {
            let product = Product::new(&name, &description, cost, sale, stock)?;
            if store.update_product(&product, id).await? {
                println!("Updated product #{id}");
            } else {
                println!("Product #{id} not found");
            }
            Ok(())
        }

        ProductCommand::Delete { id } => {
            if store.delete_product(id).await? {
                println!("Deleted product #{id}");
            } else {
                println!("Product #{id} not found");
            }
            Ok(())
        }

        ProductCommand::Valuation => {
            let v = store.inventory_valuation().await?;
            println!("Inventory valuation");
            println!("{}", "-".repeat(34));
            println!("{:<20} {:>12}", "At cost:", money(config, v.total_cost));
            println!("{:<20} {:>12}", "At sale price:", money(config, v.total_sale));
            println!("{:<20} {:>12}", "Margin:", money(config, v.margin));
            Ok(())
        }
    }
}

/// Handle work log subcommands
async fn handle_work_command(
    action: WorkCommand,
    store: &Store,
    config: &FileConfig,
) -> Result<()> {
    match action {
        WorkCommand::List { limit } => {
            let limit = limit.unwrap_or(config.display.work_log_page);
            let entries = store.get_work_log(limit).await?;
            if entries.is_empty() {
                println!("No work recorded.");
                println!("\nUse 'salon-manager work record' to log a performed service");
                return Ok(());
            }

            let names: std::collections::HashMap<i64, String> = store
                .get_collaborators()
                .await?
                .into_iter()
                .filter_map(|c| c.id.map(|id| (id, c.name)))
                .collect();

            println!(
                "{:<4} {:<12} {:<18} {:<20} {:>10} {:>10} {:>10}",
                "ID", "Date", "Collaborator", "Service", "Gross", "Collab", "Owner"
            );
            println!("{}", "-".repeat(92));
            for e in &entries {
                let who = names
                    .get(&e.collaborator_id)
                    .map(String::as_str)
                    .unwrap_or(DELETED_COLLABORATOR);
                println!(
                    "{:<4} {:<12} {:<18} {:<20} {:>10} {:>10} {:>10}",
                    e.id.unwrap_or_default(),
                    e.date,
                    truncate(who, 17),
                    truncate(&e.service_name, 19),
                    money(config, e.gross_amount),
                    money(config, e.collaborator_share),
                    money(config, e.owner_share),
                );
            }
            println!("\n{} entr(ies) shown", entries.len());
            Ok(())
        }

        WorkCommand::Record {
            collaborator,
            service,
            date,
            amount,
            notes,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let entry = store
                .record_work(date, collaborator, service, amount, notes)
                .await?;
            println!(
                "Recorded work #{}: {} on {} for {}",
                entry.id.unwrap_or_default(),
                entry.service_name,
                entry.date,
                money(config, entry.gross_amount),
            );
            println!(
                "  collaborator share {} ({}%), owner share {} (ledger credit written)",
                money(config, entry.collaborator_share),
                entry.share_percent,
                money(config, entry.owner_share),
            );
            Ok(())
        }
    }
}

/// Handle ledger subcommands
async fn handle_ledger_command(
    action: LedgerCommand,
    store: &Store,
    config: &FileConfig,
) -> Result<()> {
    match action {
        LedgerCommand::List { limit } => {
            let limit = limit.unwrap_or(config.display.ledger_page);
            let entries = store.get_ledger(limit).await?;
            if entries.is_empty() {
                println!("The ledger is empty.");
                return Ok(());
            }
            println!(
                "{:<4} {:<12} {:<40} {:<7} {:>10}",
                "ID", "Date", "Description", "Kind", "Amount"
            );
            println!("{}", "-".repeat(78));
            for e in &entries {
                println!(
                    "{:<4} {:<12} {:<40} {:<7} {:>10}",
                    e.id.unwrap_or_default(),
                    e.date,
                    truncate(&e.description, 39),
                    e.kind,
                    money(config, e.amount),
                );
            }
            println!("\n{} entr(ies) shown", entries.len());
            Ok(())
        }

        LedgerCommand::Add {
            description,
            kind,
            amount,
            date,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let kind = EntryKind::parse(&kind)?;
            let entry = LedgerEntry::new(date, &description, kind, amount)?;
            let id = store.add_ledger_entry(&entry).await?;
            println!(
                "Added ledger entry #{}: {} {} - {}",
                id,
                entry.kind,
                money(config, entry.amount),
                entry.description
            );
            Ok(())
        }

        LedgerCommand::Totals => {
            let t = store.ledger_totals().await?;
            println!("Ledger totals");
            println!("{}", "-".repeat(34));
            println!("{:<20} {:>12}", "Total debit:", money(config, t.total_debit));
            println!("{:<20} {:>12}", "Total credit:", money(config, t.total_credit));
            println!("{:<20} {:>12}", "Balance:", money(config, t.balance));
            Ok(())
        }
    }
}

/// Handle attendance register subcommands
async fn handle_admin_command(action: AdminCommand, store: &Store) -> Result<()> {
    match action {
        AdminCommand::List => {
            let admins = store.get_admins().await?;
            if admins.is_empty() {
                println!("No admins registered.");
                return Ok(());
            }
            println!("{:<4} {:<24} {:<8} Last check", "ID", "Name", "Present");
            println!("{}", "-".repeat(60));
            for a in &admins {
                let last_check = a
                    .last_check
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{:<4} {:<24} {:<8} {}",
                    a.id.unwrap_or_default(),
                    truncate(&a.name, 23),
                    if a.present { "yes" } else { "no" },
                    last_check,
                );
            }
            println!("\n{} admin(s)", admins.len());
            Ok(())
        }

        AdminCommand::Add { name } => {
            let admin = Admin::new(&name)?;
            let id = store.add_admin(&admin).await?;
            println!("Added admin #{}: {}", id, admin.name);
            Ok(())
        }

        AdminCommand::Toggle { id } => {
            let now = Local::now().naive_local();
            match store.toggle_admin(id, now).await? {
                Some(admin) => {
                    println!(
                        "Admin #{} ({}) marked {}",
                        id,
                        admin.name,
                        if admin.present { "present" } else { "absent" },
                    );
                }
                None => println!("Admin #{id} not found"),
            }
            Ok(())
        }

        AdminCommand::Delete { id } => {
            if store.delete_admin(id).await? {
                println!("Deleted admin #{id}");
            } else {
                println!("Admin #{id} not found");
            }
            Ok(())
        }
    }
}

/// Print one report window as a table
fn print_report(title: &str, window: ReportWindow, rows: &[ReportRow], config: &FileConfig) {
    println!(
        "{}: {} report ({} to {})",
        config.salon.name, title, window.start, window.end
    );
    if rows.is_empty() {
        println!("No work recorded in this window.");
        return;
    }
    println!(
        "{:<24} {:>14} {:>14}",
        "Collaborator", "Collab share", "Owner share"
    );
    println!("{}", "-".repeat(54));
    let mut total_collab = 0.0;
    let mut total_owner = 0.0;
    for row in rows {
        println!(
            "{:<24} {:>14} {:>14}",
            truncate(&row.collaborator_name, 23),
            money(config, row.total_collaborator_share),
            money(config, row.total_owner_share),
        );
        total_collab += row.total_collaborator_share;
        total_owner += row.total_owner_share;
    }
    println!("{}", "-".repeat(54));
    println!(
        "{:<24} {:>14} {:>14}",
        "Total",
        money(config, total_collab),
        money(config, total_owner),
    );
}

/// Handle report subcommands
async fn handle_report_command(
    action: ReportCommand,
    store: &Store,
    config: &FileConfig,
    output_dir: &std::path::Path,
) -> Result<()> {
    let today = Local::now().date_naive();

    match action {
        ReportCommand::Daily => {
            let window = ReportWindow::daily(today);
            let rows = store.report(window).await?;
            print_report("daily", window, &rows, config);
            Ok(())
        }

        ReportCommand::Weekly => {
            let window = ReportWindow::weekly(today);
            let rows = store.report(window).await?;
            print_report("weekly", window, &rows, config);
            Ok(())
        }

        ReportCommand::Monthly => {
            let window = ReportWindow::monthly(today);
            let rows = store.report(window).await?;
            print_report("monthly", window, &rows, config);
            Ok(())
        }

        ReportCommand::Export => {
            std::fs::create_dir_all(output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;

            // The CSV gets the whole ledger, not the display page, so the
            // trailing totals row always matches the rows above it
            let ledger = store.get_all_ledger().await?;
            let totals = store.ledger_totals().await?;
            export::write_ledger_csv(output_dir, &ledger, &totals)?;

            for (filename, window) in [
                (export::DAILY_REPORT_FILENAME, ReportWindow::daily(today)),
                (export::WEEKLY_REPORT_FILENAME, ReportWindow::weekly(today)),
                (export::MONTHLY_REPORT_FILENAME, ReportWindow::monthly(today)),
            ] {
                let rows = store.report(window).await?;
                export::write_report_csv(output_dir, filename, &rows)?;
            }

            println!("Reports written to {}/", output_dir.display());
            println!("  - {}", export::LEDGER_FILENAME);
            println!("  - {}", export::DAILY_REPORT_FILENAME);
            println!("  - {}", export::WEEKLY_REPORT_FILENAME);
            println!("  - {}", export::MONTHLY_REPORT_FILENAME);
            Ok(())
        }
    }
}

/// Handle backup subcommands
async fn handle_backup_command(action: BackupCommand, store: &Store) -> Result<()> {
    match action {
        BackupCommand::Export { file } => {
            let state = store.export_state().await?;
            state
                .save(&file)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!(
                "Exported {} collaborator(s), {} service(s), {} work entr(ies), {} ledger entr(ies), {} product(s) to {}",
                state.collaborators.len(),
                state.services.len(),
                state.work_log.len(),
                state.ledger.len(),
                state.products.len(),
                file.display(),
            );
            Ok(())
        }

        BackupCommand::Import { file } => {
            // Unlike startup loading, a corrupt backup must not silently
            // become an empty database, so parse strictly here.
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot: Snapshot = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid snapshot", file.display()))?;
            if snapshot.version > salon_core::state::SNAPSHOT_VERSION {
                anyhow::bail!(
                    "snapshot version {} is newer than this build supports",
                    snapshot.version
                );
            }
            let state = snapshot.migrate();
            store.import_state(&state).await?;
            println!(
                "Imported {} collaborator(s), {} service(s), {} work entr(ies), {} ledger entr(ies), {} product(s)",
                state.collaborators.len(),
                state.services.len(),
                state.work_log.len(),
                state.ledger.len(),
                state.products.len(),
            );
            Ok(())
        }
    }
}
