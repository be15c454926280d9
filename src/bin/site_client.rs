//! Command-line front end for the content client
//!
//! ```text
//! site_client [BASE_URL] load
//! site_client [BASE_URL] contact <nombre> <email> <mensaje>
//! ```
//!
//! `BASE_URL` defaults to `http://localhost:3000` (or `AIPMA_BASE_URL` when set).

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use aipma_gateway::client::{Section, ViewState};
use aipma_gateway::core::types::ContactPayload;
use aipma_gateway::ContentClient;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let base_url = match args.first() {
        Some(first) if first.starts_with("http://") || first.starts_with("https://") => args.remove(0),
        _ => std::env::var("AIPMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
    };

    let client = ContentClient::new(&base_url).context("failed to build content client")?;
    let mut view = ViewState::new();

    match args.first().map(String::as_str).unwrap_or("load") {
        "load" => {
            view.hydrate(&client).await;
            print_sections(&view);
        }
        "contact" => {
            let [_, name, email, message] = args.as_slice() else {
                bail!("usage: site_client [BASE_URL] contact <nombre> <email> <mensaje>");
            };
            view.select(Section::Contacto);
            let form = ContactPayload::new(name.as_str(), email.as_str(), message.as_str());
            let outcome = view.submit_contact(&client, &form).await;
            println!("{}", outcome.message());
            if !outcome.is_sent() {
                std::process::exit(1);
            }
        }
        other => bail!("unknown command: {}", other),
    }

    Ok(())
}

fn print_sections(view: &ViewState) {
    let Some(content) = view.content() else {
        return;
    };

    println!("# {}", Section::Noticias);
    if let Some(error) = content.news.error() {
        println!("  (no disponible: {})", error);
    }
    for item in view.news() {
        println!("  {} | {} | {}", item.publish_date.format("%Y-%m-%d"), item.category, item.title);
    }

    println!("# {}", Section::Eventos);
    if let Some(error) = content.events.error() {
        println!("  (no disponible: {})", error);
    }
    for event in view.events() {
        println!("  {} | {} | {}", event.date.format("%Y-%m-%d"), event.location, event.title);
    }

    println!("# {}", Section::Miembros);
    if let Some(error) = content.members.error() {
        println!("  (no disponible: {})", error);
    }
    for member in view.members() {
        println!("  {} | {} | {}", member.name, member.organization, member.country);
    }
}
