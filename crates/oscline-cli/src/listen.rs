//! `oscline listen`

use anyhow::{Context, Result};
use colored::Colorize;
use oscline_core::{OscAddress, OscMessage};
use oscline_router::{listener, ListenerHandle, OscDispatcher, OscServer, OscServerConfig};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use crate::args::value_to_json;

/// How often queued datagrams are dispatched
const DISPATCH_INTERVAL: Duration = Duration::from_millis(5);

/// Container depth covered when no pattern is given
const CATCH_ALL_DEPTH: usize = 16;

/// `/*`, `/*/*`, ... up to [`CATCH_ALL_DEPTH`] levels
fn catch_all_patterns() -> Vec<String> {
    (1..=CATCH_ALL_DEPTH).map(|n| "/*".repeat(n)).collect()
}

fn printer(json: bool) -> ListenerHandle {
    listener(move |pattern: &OscAddress, message: &OscMessage| {
        if json {
            let line = json!({
                "pattern": pattern.path(),
                "address": message.address.path(),
                "args": message.arguments.iter().map(value_to_json).collect::<Vec<_>>(),
            });
            println!("{}", line);
        } else {
            let args: Vec<String> = message.arguments.iter().map(ToString::to_string).collect();
            println!(
                "{} {} {} {}",
                "OSC".cyan(),
                message.address.path().yellow(),
                message.type_tags().as_str().dimmed(),
                args.join(" ")
            );
        }
    })
}

pub async fn run_listen(
    config: OscServerConfig,
    patterns: Vec<String>,
    json: bool,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> Result<()> {
    let mut dispatcher = OscDispatcher::new(config.queue_capacity);
    let print = printer(json);

    let patterns = if patterns.is_empty() {
        catch_all_patterns()
    } else {
        patterns
    };
    for p in &patterns {
        let pattern = OscAddress::parse(p).with_context(|| format!("Invalid pattern {}", p))?;
        dispatcher.bind(pattern, print.clone())?;
    }

    let server = OscServer::bind(config, dispatcher.sender()).await?;
    server.spawn();

    if !json {
        println!(
            "{} Listening on {} ({} pattern{})",
            "OK".green().bold(),
            server.local_addr()?,
            patterns.len(),
            if patterns.len() == 1 { "" } else { "s" }
        );
        println!("  Press Ctrl+C to stop");
    }

    let mut tick = tokio::time::interval(DISPATCH_INTERVAL);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                dispatcher.drain_and_dispatch();
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    server.stop().await;
    dispatcher.close();
    // Flush whatever arrived before the socket closed
    dispatcher.drain_and_dispatch();

    let stats = dispatcher.queue_stats();
    info!(
        "Listener stopped: {} datagrams received, {} dropped",
        stats.enqueued(),
        stats.dropped()
    );

    Ok(())
}
