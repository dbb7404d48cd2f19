//! # Probe
//!
//! Finds the storage root above a resource or WebID.
//!
//! ```sh
//! probe https://alice.example/profile/card#me
//! probe https://pod.example/private/notes.ttl --token "$(cat token)"
//! ```
use anyhow::{Result, bail};
use clap::Parser;
use pod::{PodClient, Url, get_pod_root};
use secrecy::SecretString;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Resource or WebID to start from.
    url: Url,

    /// Bearer token for private resources.
    #[arg(long, env = "POD_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let client = match args.token {
        Some(token) => PodClient::with_token(&SecretString::from(token))?,
        None => PodClient::anonymous()?,
    };

    info!("Probing {}", args.url);

    match get_pod_root(&client, &args.url).await? {
        Some(root) => println!("{root}"),
        None => bail!("no storage root found above {}", args.url),
    }

    Ok(())
}
