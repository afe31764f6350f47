use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::credentials::CredentialStore;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Show the authenticated user and their stores")]
    Whoami {
        #[arg(long, help = "API server base URL")]
        server: String,
        #[arg(long, help = "Store slug whose session to use")]
        store: String,
    },

    #[command(about = "List all tenants (platform admin)")]
    List {
        #[arg(long, help = "API server base URL")]
        server: String,
        #[arg(long, help = "Store slug whose session to use")]
        store: String,
    },
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Whoami { server, store } => {
            get(&server, &store, "/api/auth/whoami", &output_format).await
        }
        TenantCommands::List { server, store } => {
            get(&server, &store, "/api/admin/tenants", &output_format).await
        }
    }
}

async fn get(
    server: &str,
    store: &str,
    path: &str,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    // The token is always selected by store slug, never a global default
    let credentials = CredentialStore::load()?;
    let Some(entry) = credentials.get(store) else {
        output_error(
            output_format,
            &format!("No session for '{}'; run `storehub auth login` first", store),
            None,
        )?;
        anyhow::bail!("missing session");
    };

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}{}", server.trim_end_matches('/'), path))
        .bearer_auth(&entry.token)
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if status.is_success() {
        output_success(output_format, path, Some(json!({ "response": body["data"] })))
    } else {
        let message = body["message"].as_str().unwrap_or("request failed");
        output_error(output_format, message, body["code"].as_str())?;
        anyhow::bail!("request failed with status {}", status);
    }
}
