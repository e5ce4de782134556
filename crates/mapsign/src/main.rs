#![forbid(unsafe_code)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mapsign_core::config::MapsConfig;
use mapsign_core::errors::{SignReport, VerifyReport};
use mapsign_core::secret::SigningSecret;
use mapsign_core::staticmap::{MapSize, MapType, StaticMapRequest, DEFAULT_ENDPOINT};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mapsign",
    version,
    about = "Sign map provider request URLs without shipping the secret to clients."
)]
struct Cli {
    /// JSON config file (default: .mapsign/config.json when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Append an HMAC-SHA1 signature parameter to a request URL.
    Sign {
        /// URL to sign (or "-" / omit for stdin).
        #[arg(default_value = "-")]
        url: String,

        /// Base64 signing secret (overrides config and environment).
        #[arg(long)]
        secret: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check the signature on a signed URL.
    Verify {
        /// Signed URL (or "-" / omit for stdin).
        #[arg(default_value = "-")]
        url: String,

        /// Base64 signing secret (overrides config and environment).
        #[arg(long)]
        secret: Option<String>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Build a static map image URL, signed when a secret is configured.
    StaticMap {
        /// "lat,lng" or an address.
        #[arg(long)]
        center: String,

        /// Zoom level 0..=21.
        #[arg(long)]
        zoom: u8,

        /// Image size as WIDTHxHEIGHT.
        #[arg(long, default_value = "600x300")]
        size: MapSize,

        /// Pixel density (1 or 2).
        #[arg(long)]
        scale: Option<u8>,

        /// roadmap, satellite, terrain, hybrid.
        #[arg(long)]
        maptype: Option<MapType>,

        /// Marker spec, repeatable (e.g. "color:red|40.7,-74.0").
        #[arg(long = "marker")]
        markers: Vec<String>,

        /// Provider endpoint.
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// API key (overrides config and environment).
        #[arg(long)]
        key: Option<String>,

        /// Base64 signing secret (overrides config and environment).
        #[arg(long)]
        secret: Option<String>,

        /// Emit the URL without a signature.
        #[arg(long)]
        unsigned: bool,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report whether the API key and signing secret are configured.
    Probe {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();

    match cli.cmd {
        Cmd::Sign { url, secret, json } => cmd_sign(config, &url, secret, json),

        Cmd::Verify { url, secret, json } => cmd_verify(config, &url, secret, json),

        Cmd::StaticMap {
            center,
            zoom,
            size,
            scale,
            maptype,
            markers,
            endpoint,
            key,
            secret,
            unsigned,
            json,
        } => {
            let mut req = StaticMapRequest::new(center, zoom, size).endpoint(endpoint);
            if let Some(scale) = scale {
                req = req.scale(scale);
            }
            if let Some(maptype) = maptype {
                req = req.maptype(maptype);
            }
            for marker in markers {
                req = req.marker(marker);
            }
            cmd_static_map(config, req, key, secret, unsigned, json)
        }

        Cmd::Probe { json } => cmd_probe(&load_config(config)?, json),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_url(url: &str) -> Result<String> {
    if url == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read url from stdin")?;
        let trimmed = buf.trim();
        if trimmed.is_empty() {
            bail!("no url given on stdin");
        }
        Ok(trimmed.to_string())
    } else {
        Ok(url.to_string())
    }
}

/// Config file then environment. Only called when a flag leaves a value unset.
fn load_config(path: Option<&Path>) -> Result<MapsConfig> {
    Ok(MapsConfig::load(path, |k| std::env::var(k).ok())?)
}

/// `--secret` wins over config file and environment.
fn resolve_secret(config: Option<&Path>, flag: Option<String>) -> Result<SigningSecret> {
    let encoded = match flag {
        Some(s) => s,
        None => load_config(config)?.signing_secret()?.to_string(),
    };
    Ok(SigningSecret::from_base64(&encoded)?)
}

fn cmd_sign(
    config: Option<&Path>,
    url: &str,
    secret: Option<String>,
    json_out: bool,
) -> Result<()> {
    let url = read_url(url)?;
    let secret = resolve_secret(config, secret)?;
    let signed = mapsign_sign::sign::sign_with(&url, &secret)
        .with_context(|| format!("cannot sign {url}"))?;

    if json_out {
        let (_, signature) = mapsign_sign::verify::split_signature(&signed)?;
        let report = SignReport {
            signature: signature.to_string(),
            url,
            signed_url: signed.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{signed}");
    }
    Ok(())
}

fn cmd_verify(
    config: Option<&Path>,
    url: &str,
    secret: Option<String>,
    json_out: bool,
) -> Result<()> {
    let url = read_url(url)?;
    let secret = resolve_secret(config, secret)?;
    let valid = mapsign_sign::verify::verify_with(&url, &secret)
        .with_context(|| format!("cannot verify {url}"))?;

    if json_out {
        let report = VerifyReport { url, valid };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if valid {
        eprintln!("  signature valid");
    }

    if !valid {
        bail!("signature verification failed");
    }
    Ok(())
}

fn cmd_static_map(
    config: Option<&Path>,
    req: StaticMapRequest,
    key: Option<String>,
    secret: Option<String>,
    unsigned: bool,
    json_out: bool,
) -> Result<()> {
    let key = match key {
        Some(k) => k,
        None => load_config(config)?.api_key()?.to_string(),
    };
    let url = req.key(key).to_url()?;

    let out = if unsigned {
        url.to_string()
    } else {
        let secret = resolve_secret(config, secret)
            .context("static map urls are signed by default; pass --unsigned to skip")?;
        mapsign_sign::sign::sign_with(url.as_str(), &secret)?
    };
    tracing::info!(signed = !unsigned, "built static map url");

    if json_out {
        let v = serde_json::json!({
            "url": out,
            "signed": !unsigned,
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("{out}");
    }
    Ok(())
}

fn cmd_probe(config: &MapsConfig, json_out: bool) -> Result<()> {
    let probe = config.probe();

    if json_out {
        println!("{}", serde_json::to_string_pretty(&probe)?);
    } else {
        let mark = |ok: bool| if ok { "ok  " } else { "FAIL" };
        eprintln!("  {} api key", mark(probe.api_key_present));
        eprintln!("  {} signing secret", mark(probe.signing_secret_present));
        if probe.signing_secret_present {
            eprintln!("  {} signing secret encoding", mark(probe.signing_secret_valid));
        }
    }

    if !probe.api_key_present {
        bail!("maps api key is not configured");
    }
    if probe.signing_secret_present && !probe.signing_secret_valid {
        bail!("signing secret is not valid base64");
    }
    Ok(())
}
