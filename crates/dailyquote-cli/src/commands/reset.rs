use super::{open_store, CliResult};

pub fn run(yes: bool) -> CliResult {
    if !yes {
        return Err("reset erases all unlocked quotes; pass --yes to confirm".into());
    }
    let mut store = open_store()?;
    store.reset()?;
    println!("progress reset");
    Ok(())
}
