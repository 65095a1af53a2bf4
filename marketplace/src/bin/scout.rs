//! Scout - terminal front end for the CryptoTasks marketplace desk.
//!
//! Lines typed at the prompt go to Scout; slash commands reach the
//! freelancer directory and direct chat.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace::payment::explorer_links;
use marketplace::{ChatOutcome, MarketplaceConfig, MarketplaceDesk, Role};

#[derive(Parser, Debug, Clone)]
#[command(name = "scout")]
#[command(about = "Find freelancers and send project proposals from the terminal")]
struct Args {
    /// YAML config file; defaults apply when absent
    #[arg(long, env = "SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Account (wallet address) you are acting as
    #[arg(long, env = "SCOUT_ORIGINATOR")]
    originator: Option<String>,

    /// Side of the marketplace you are on
    #[arg(long, value_enum, default_value_t = RoleArg::Client)]
    role: RoleArg,

    /// Log level (overrides the config file)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Client,
    Freelancer,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Client => Role::Client,
            RoleArg::Freelancer => Role::Freelancer,
        }
    }
}

const HELP: &str = "\
Commands:
  <text>                 ask Scout, or \"send project proposal to @user\"
  /search [query]        filter the freelancer directory
  /chat <to> <message>   send a direct message
  /history <peer>        show a conversation
  /inbox                 find the client who contacted you
  /help                  show this help
  /quit                  exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MarketplaceConfig::from_path(path)?,
        None => MarketplaceConfig::default(),
    }
    .with_env_overrides();

    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("marketplace={},scout_agent={},warn", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let desk = match MarketplaceDesk::from_config(&config) {
        Ok(desk) => desk,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let originator = args
        .originator
        .clone()
        .unwrap_or_else(|| config.general.originator.clone());
    let role = Role::from(args.role);
    info!(%originator, ?role, "Scout session started");

    println!("Scout: {}", desk.greeting());
    println!("(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/search" => {
                for record in desk.search(rest) {
                    println!(
                        "  {:<14} @{:<8} {:<22} {:.1}★ {}%",
                        record.name, record.username, record.role, record.stars, record.perfection
                    );
                }
            }
            "/chat" => {
                let Some((to, text)) = rest.split_once(' ') else {
                    println!("usage: /chat <to> <message>");
                    continue;
                };
                match desk.chat_turn(role, &originator, to, text).await {
                    ChatOutcome::Ignored => {}
                    ChatOutcome::Sent(_) => println!("(sent)"),
                    ChatOutcome::Release { notice, .. } => {
                        println!("{notice}");
                        for link in explorer_links(&notice, &config.payments.explorer_base_url) {
                            println!("  {link}");
                        }
                    }
                    ChatOutcome::Failed(e) => println!("(not sent: {e})"),
                }
            }
            "/history" => {
                let messages = desk.history(&originator, rest.trim()).await;
                if messages.is_empty() {
                    println!("(no messages)");
                }
                for message in messages {
                    let marker = if message.is_proposal() { "📄" } else { " " };
                    let sender = desk
                        .freelancer_for(&message.sender)
                        .map_or(message.sender.as_str(), |f| f.name.as_str());
                    println!("{marker} {sender}: {}", message.text);
                    for link in explorer_links(&message.text, &config.payments.explorer_base_url) {
                        println!("    {link}");
                    }
                }
            }
            "/inbox" => match desk.discover_client(&originator).await {
                Some(client) => println!("Client: {client}"),
                None => println!("(no client has contacted you yet)"),
            },
            _ => {
                let turn = desk.scout_turn(&originator, line).await;
                for reply in &turn.replies {
                    println!("Scout: {reply}");
                }
                for pick in &turn.shortlist {
                    println!(
                        "  • {} ({}) {:.1}★ {}%",
                        pick.name, pick.role, pick.stars, pick.perfection
                    );
                }
            }
        }
    }

    Ok(())
}
