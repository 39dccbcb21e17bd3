use finmon::error::Result;
use finmon::teacher::Teacher;

use super::open_store;

pub fn run() -> Result<()> {
    let (_, store) = open_store()?;
    let count = store.load().len();
    Teacher::new(store.as_ref()).reset()?;
    println!("Learned rules wiped ({count} removed).");
    Ok(())
}
