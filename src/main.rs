//! Interactive shell: reads navigation commands from stdin and prints the
//! rendered page after each one.
//!
//! Commands:
//!
//! ```text
//! /                 coin list
//! /<coin-id>        coin detail page
//! open <n>          open the n-th coin of the list (1-based)
//! tab chart|price   switch detail tab
//! back              previous page
//! theme [dark|light]
//! quit
//! ```

use coinview::{CoinView, CoinViewBuilder, CoinViewError, LocationState, Tab};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coinview=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> coinview::Result<()> {
    let mut app = CoinViewBuilder::from_env().build()?;
    println!("{}", app.visit("/", None).await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match execute(&mut app, line).await {
            Ok(true) => println!("{}", app.screen()),
            Ok(false) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

/// Run one shell command. Returns `false` when the shell should exit.
async fn execute(app: &mut CoinView, line: &str) -> coinview::Result<bool> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    match command {
        "quit" | "exit" => return Ok(false),
        "back" => {
            if !app.back() {
                return Err(CoinViewError::InvalidArgument("no previous page".into()));
            }
            app.load().await;
        }
        "tab" => {
            let tab: Tab = words.next().unwrap_or_default().parse()?;
            app.set_tab(tab)?;
        }
        "theme" => match words.next() {
            Some("dark") => app.theme().set_dark(true),
            Some("light") => app.theme().set_dark(false),
            None => {
                app.theme().toggle();
            }
            Some(other) => {
                return Err(CoinViewError::InvalidArgument(format!(
                    "unknown theme: {other}"
                )))
            }
        },
        "open" => {
            let index: usize = words
                .next()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| CoinViewError::InvalidArgument("usage: open <n>".into()))?;
            let (path, state) = app
                .list_view()
                .links()
                .into_iter()
                .nth(index - 1)
                .ok_or_else(|| CoinViewError::NotFound(format!("no coin #{index}")))?;
            app.visit(&path, Some(state)).await?;
        }
        path if path.starts_with('/') => {
            app.visit(path, None::<LocationState>).await?;
        }
        other => {
            return Err(CoinViewError::InvalidArgument(format!(
                "unknown command: {other}"
            )))
        }
    }
    Ok(true)
}
