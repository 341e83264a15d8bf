use log::LevelFilter;
use std::{str::FromStr, sync::Arc};

use anyhow::Context;
use clap::{self, Parser, Subcommand};

use ncm_plugin_netease::crypto::{
    to_request, EapiEncoder, Framing, ResponseBody, ResponseDecryptor, Secrets, WeapiEncoder,
};

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Key for abroad responses, 16 chars or 32 hex digits
    #[arg(long, env = "NCM_ABROAD_KEY")]
    abroad_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt json params for a /weapi endpoint
    Weapi { json: String },
    /// Encrypt json params for an /eapi endpoint, path in its /api form
    Eapi { path: String, json: String },
    /// Decrypt a hex encoded eapi response
    Decrypt { hex: String },
    /// Decrypt the params field of an eapi request
    DecryptEapiRequest { hex: String },
}

fn secrets(args: &Args) -> anyhow::Result<Arc<Secrets>> {
    let mut secrets = Secrets::default();
    if let Some(key) = &args.abroad_key {
        secrets = secrets.with_abroad_key(Secrets::parse_key(key).context("abroad key")?);
    }
    Ok(Arc::new(secrets))
}

fn parse_params(json: &str) -> anyhow::Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(json).context("params are not json")?;
    Ok(to_request(&value)?)
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(
            args.log_level
                .as_deref()
                .and_then(|l| LevelFilter::from_str(l).ok())
                .unwrap_or(LevelFilter::Warn),
        )
        .init();

    let secrets = secrets(&args)?;

    match &args.command {
        Command::Weapi { json } => {
            let payload = WeapiEncoder::new(secrets).encrypt(&parse_params(json)?)?;
            println!("{}", payload.to_form()?);
        }
        Command::Eapi { path, json } => {
            let payload = EapiEncoder::new(secrets).encrypt(path, &parse_params(json)?)?;
            println!("{}", payload.to_form()?);
        }
        Command::Decrypt { hex } => {
            let body = ResponseDecryptor::new(secrets).decode(hex.as_bytes(), Framing::Hex)?;
            match body {
                ResponseBody::Json(v) => println!("{}", serde_json::to_string_pretty(&v)?),
                ResponseBody::Raw(raw) => {
                    log::info!("body is not json");
                    println!("{}", String::from_utf8_lossy(&raw));
                }
            }
        }
        Command::DecryptEapiRequest { hex } => {
            let req = EapiEncoder::new(secrets).decrypt_params(hex)?;
            println!("path: {}\nbody: {}\nsign: {}", req.path, req.body, req.sign);
        }
    }

    Ok(())
}
