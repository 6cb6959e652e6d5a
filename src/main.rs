//!
//! appraisal interpreter
//! ---------------------
//! Interactive client for the performance-review backend. Signs in, keeps the
//! session between runs when a state directory is configured, and shows the
//! evaluation and user pages the signed-in role may open.

use std::env;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use appraisal::cli::{parse_command, Reply, Shell};
use appraisal::config::ClientConfig;
use appraisal::identity::SessionStore;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--state-dir <dir>]\n\nFlags:\n  --api <url>          Backend base URL (env APPRAISAL_API_BASE, default http://127.0.0.1:8080/api)\n  --state-dir <dir>    Keep the session in <dir>/session.json (env APPRAISAL_STATE_DIR; in memory when unset)\n  -h, --help           Show this help\n\nEnvironment:\n  APPRAISAL_ME_PATHS         Comma-separated profile endpoints tried after login\n  APPRAISAL_ANONYMOUS_PROBE  Probe profile endpoints without a token (default true)\n  RUST_LOG                   Log filter (default info)\n\nType 'help' inside the interpreter for commands."
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("appraisal");

    let mut config = ClientConfig::from_env()?;
    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                i += 1;
                let url = args.get(i).ok_or_else(|| anyhow!("--api needs a URL"))?;
                config = config.with_api_base(url)?;
            }
            "--state-dir" => {
                i += 1;
                let dir = args.get(i).ok_or_else(|| anyhow!("--state-dir needs a directory"))?;
                config = config.with_state_dir(dir);
            }
            "-h" | "--help" => {
                print_usage(program);
                return Ok(());
            }
            other => {
                print_usage(program);
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }

    let session = match &config.state_dir {
        Some(dir) => SessionStore::open(dir).with_context(|| format!("failed to open session state in {}", dir.display()))?,
        None => SessionStore::in_memory(),
    };
    info!(
        target: "appraisal",
        "appraisal starting: api='{}', state_dir={:?}, signed_in={}",
        config.api_base, config.state_dir, session.is_authenticated()
    );

    let shell = Shell::new(config, Arc::new(session));
    run_repl(&shell).await
}

async fn run_repl(shell: &Shell) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    println!("appraisal interpreter. Type 'help' for commands.");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else { break };
        let cmd = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => { eprintln!("{}", msg); continue; }
        };
        match shell.execute(cmd).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(t)) if t.is_empty() => {}
            Ok(Reply::Text(t)) => println!("{}", t),
            Err(e) => eprintln!("error: {}", e.message()),
        }
    }
    Ok(())
}
