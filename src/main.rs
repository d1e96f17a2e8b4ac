mod config;
mod extract;
mod format;
mod ledger;
mod models;
mod run;
mod storage;
mod store;


use anyhow::Result;

use crate::ledger::{Ledger, LoadStatus};
use crate::storage::SqliteStorage;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let data_dir = config::data_dir()?;
    let config = config::load_config(&data_dir)?;
    let today = chrono::Local::now().date_naive();

    let db_path = data_dir.join(config::DB_FILE);
    let storage = match SqliteStorage::open(&db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: {e}; changes will not be saved");
            SqliteStorage::open_in_memory()?
        }
    };

    let (mut ledger, status) = Ledger::open(storage, today);
    match status {
        LoadStatus::Restored => {}
        LoadStatus::Seeded => {
            if let Err(e) = ledger.save() {
                eprintln!("Warning: could not save sample data: {e}");
            }
        }
        LoadStatus::Recovered(e) => {
            eprintln!("Warning: could not load saved transactions ({e}); using sample data");
        }
    }

    let env = run::CliEnv {
        config: &config,
        data_dir: &data_dir,
        today,
    };
    run::as_cli(&args, &mut ledger, &env)
}
