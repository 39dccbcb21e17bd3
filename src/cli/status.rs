use std::path::PathBuf;

use finmon::error::Result;
use finmon::settings::settings_file_exists;
use finmon::store::storage_path;

use super::open_store;

pub fn run() -> Result<()> {
    let (settings, store) = open_store()?;
    let data_dir = PathBuf::from(&settings.data_dir);
    let storage = storage_path(&settings);

    println!("Data dir:      {}", data_dir.display());
    println!("Backend:       {}", settings.backend);
    println!("Storage:       {}", storage.display());
    println!("Match policy:  {}", settings.match_policy);
    match settings.context_limit {
        Some(limit) => println!("Context limit: {limit} most recent rules"),
        None => println!("Context limit: none"),
    }
    println!("Rules:         {}", store.load().len());

    if !settings_file_exists() {
        println!();
        println!("Using default settings. Run `finmon init` to save them.");
    }
    Ok(())
}
