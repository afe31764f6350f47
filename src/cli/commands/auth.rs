use clap::Subcommand;
use serde_json::{json, Value};
use url::Url;

use crate::cli::credentials::CredentialStore;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::handoff;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and capture the session for a store")]
    Login {
        #[arg(long, help = "API server base URL, e.g. https://storehub.io")]
        server: String,
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password")]
        password: String,
        #[arg(long, help = "Store slug to hand off to (defaults to first owned)")]
        store: Option<String>,
    },

    #[command(about = "Drop the stored session for a store")]
    Logout {
        #[arg(help = "Store slug")]
        store: String,
    },

    #[command(about = "List stores with a stored session")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login {
            server,
            email,
            password,
            store,
        } => login(&server, &email, &password, store.as_deref(), &output_format).await,
        AuthCommands::Logout { store } => {
            let mut credentials = CredentialStore::load()?;
            if credentials.clear(&store) {
                credentials.save()?;
                output_success(&output_format, &format!("Logged out of '{}'", store), None)
            } else {
                output_error(&output_format, &format!("No session for '{}'", store), None)
            }
        }
        AuthCommands::Status => {
            let credentials = CredentialStore::load()?;
            let slugs = credentials.slugs();
            output_success(
                &output_format,
                &format!("{} active session(s)", slugs.len()),
                Some(json!({ "stores": slugs })),
            )
        }
    }
}

async fn login(
    server: &str,
    email: &str,
    password: &str,
    store: Option<&str>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/auth/login", server.trim_end_matches('/')))
        .json(&json!({
            "email": email,
            "password": password,
            "subdomain": store,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("login failed");
        output_error(output_format, message, body["code"].as_str())?;
        anyhow::bail!("login failed with status {}", status);
    }

    let Some(handoff_url) = body["data"]["handoff_url"].as_str() else {
        return output_success(output_format, "Logged in (no store owned yet)", None);
    };

    // Receiving side of the cross-domain handoff: the token travels in
    // the URL fragment, is captured into the per-store credential store,
    // and the fragment is dropped from anything we display or persist.
    let url = Url::parse(handoff_url)?;
    let token = handoff::extract_token(&url)
        .ok_or_else(|| anyhow::anyhow!("handoff URL carried no token fragment"))?;
    let visible_url = handoff::strip_fragment(&url);

    let slug = match store {
        Some(slug) => slug.to_string(),
        None => body["data"]["stores"][0]["subdomain"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("login response carried no stores"))?
            .to_string(),
    };

    let mut credentials = CredentialStore::load()?;
    credentials.set(&slug, token);
    credentials.save()?;

    output_success(
        output_format,
        &format!("Logged into '{}'", slug),
        Some(json!({ "dashboard": visible_url.as_str() })),
    )
}
