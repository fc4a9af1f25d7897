// src/bin/gen_method_table.rs
//
// Usage: gen_method_table <openapi_path> [--family evm|solana] [--out <file>]

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chain_rpc_mcp::{
    blockchain::ChainFamily,
    codegen::{load_methods, render_method_table},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Args {
    input: PathBuf,
    family: ChainFamily,
    out: Option<PathBuf>,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut input = None;
    let mut family = ChainFamily::Solana;
    let mut out = None;
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--family" => {
                family = match iter.next().map(String::as_str) {
                    Some("evm") => ChainFamily::Evm,
                    Some("solana") => ChainFamily::Solana,
                    other => bail!("--family expects evm or solana, got {:?}", other),
                }
            }
            "--out" => {
                out = Some(PathBuf::from(iter.next().context("--out needs a file path")?));
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => bail!("unexpected argument '{}'", other),
        }
    }
    let input = input.context(
        "usage: gen_method_table <openapi_path> [--family evm|solana] [--out <file>]",
    )?;
    Ok(Args { input, family, out })
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gen_method_table=info,chain_rpc_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&raw)?;

    let methods = load_methods(&args.input)?;
    if methods.is_empty() {
        bail!("no methods found in {}", args.input.display());
    }
    info!(count = methods.len(), source = %args.input.display(), "methods extracted");

    let table = render_method_table(&methods, args.family);
    match args.out {
        Some(path) => {
            fs::write(&path, table).with_context(|| format!("writing {}", path.display()))?;
            info!(out = %path.display(), "method table written");
        }
        None => print!("{}", table),
    }
    Ok(())
}
