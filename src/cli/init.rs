use std::path::PathBuf;

use finmon::error::Result;
use finmon::settings::{load_settings, save_settings, shellexpand_path, Backend};
use finmon::store;

pub fn run(data_dir: Option<String>, backend: Option<Backend>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(backend) = backend {
        settings.backend = backend;
    }

    save_settings(&settings)?;
    let store = store::open(&settings)?;
    let rules = store.load().len();

    println!(
        "Initialized finmon at {} ({} backend, {rules} learned rules)",
        PathBuf::from(&settings.data_dir).display(),
        settings.backend
    );
    Ok(())
}
