//! The `quizflow status` command.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let (store, tracker) = ctx.tracker(&config);

    let state = if tracker.has_participated() {
        "participated"
    } else {
        "not participated"
    };
    println!("Participation: {state}");
    println!("Key: {}", tracker.key());
    println!("Flag file: {}", store.path().display());

    Ok(())
}
