//! The `quizflow reset` command.

use anyhow::Result;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let (_, tracker) = ctx.tracker(&config);

    if tracker.has_participated() {
        tracker.reset();
        println!("Participation flag cleared.");
    } else {
        println!("Participation flag was not set.");
    }

    Ok(())
}
