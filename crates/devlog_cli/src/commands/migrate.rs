//! Schema migrations for the entry store.

use devlog::db;
use devlog::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

#[derive(Debug, tabled::Tabled)]
struct MigrationRow {
    #[tabled(rename = "Migration")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                println!("Database is up to date.");
                return Ok(());
            }
            Migrator::up(&db, None).await?;
            println!("Applied {} migration(s).", pending);
        }
        MigrateAction::Down => {
            Migrator::down(&db, Some(1)).await?;
            println!("Rolled back the last migration.");
        }
        MigrateAction::Status => {
            let applied = Migrator::get_applied_migrations(&db).await?;
            let pending = Migrator::get_pending_migrations(&db).await?;
            let rows: Vec<MigrationRow> = applied
                .iter()
                .map(|m| (m, "applied"))
                .chain(pending.iter().map(|m| (m, "pending")))
                .map(|(m, status)| MigrationRow {
                    name: m.name().to_string(),
                    status,
                })
                .collect();
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
        }
        MigrateAction::Fresh { yes } => {
            if !yes {
                return Err(
                    "`migrate fresh` drops every saved entry; rerun with --yes to confirm".into(),
                );
            }
            Migrator::fresh(&db).await?;
            println!("Dropped all tables and reapplied migrations.");
        }
    }

    Ok(())
}
