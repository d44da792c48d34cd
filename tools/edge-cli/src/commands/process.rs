//! Run the handler over a recorded event.

use std::fs;

use anyhow::{Context as _, Result};
use edge_core::Event;
use edge_security::EdgeHandler;

use super::ProcessArgs;
use crate::context::Context;

/// Run the process command.
pub fn run(args: ProcessArgs, ctx: &Context) -> Result<()> {
    let event_path = ctx.resolve_path(&args.event);
    ctx.output.debug(&format!("Reading event: {}", event_path.display()));

    let content = fs::read_to_string(&event_path)
        .with_context(|| format!("Failed to read event file: {}", event_path.display()))?;
    let event = Event::from_json(&content)
        .with_context(|| format!("Failed to parse event: {}", event_path.display()))?;

    let handler = EdgeHandler::new(ctx.config()?, ctx.logger());
    let response = handler.handle(event)?;

    let rendered = if args.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };

    match args.output {
        Some(path) => {
            let path = ctx.resolve_path(&path);
            fs::write(&path, rendered + "\n")
                .with_context(|| format!("Failed to write response: {}", path.display()))?;
            ctx.output.success(&format!("Wrote: {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
