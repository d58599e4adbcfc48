use anyhow::Context;
use clap::{Parser, Subcommand};
use hackathon::{
    AnthropicClient, Card, ChatSession, ClaudeProxy, FormData, Home, Length, ProxyClient, SimpleForm,
    Style, View, anthropic, cards, server::run_server,
};
use oracle_common::{LogLevel, logger};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// `hackathon`: Claude proxy server and terminal shells for it.
#[derive(Parser, Debug)]
#[command(name = "hackathon", version)]
struct Cli {
    /// Logging verbosity when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /api/claude
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
        #[arg(long, default_value = anthropic::DEFAULT_BASE_URL)]
        anthropic_url: String,
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        api_key: String,
    },
    /// Interactive chat through a running proxy, one message per line
    Chat {
        #[arg(long, default_value = "http://localhost:3000")]
        proxy_url: String,
    },
    /// Generate content from a topic and show it as a card
    Generate {
        #[arg(long, default_value = "http://localhost:3000")]
        proxy_url: String,
        #[arg(long)]
        topic: String,
        #[arg(long, value_enum, default_value_t = Style::Professional)]
        style: Style,
        #[arg(long, value_enum, default_value_t = Length::Medium)]
        length: Length,
    },
    /// Show cards from a JSON array file, or the sample cards
    Cards {
        #[arg(long)]
        items: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.log_level);

    match cli.command {
        Command::Serve {
            host,
            port,
            anthropic_url,
            api_key,
        } => {
            let addr: SocketAddr = format!("{host}:{port}").parse()?;
            let api = Arc::new(AnthropicClient::new(anthropic_url, api_key));
            run_server(Arc::new(ClaudeProxy::new(api)), addr).await?;
        }
        Command::Chat { proxy_url } => {
            let client = ProxyClient::new(proxy_url);
            let mut chat = ChatSession::new();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            println!("Start a conversation with Claude...");
            while let Some(line) = lines.next_line().await? {
                chat.set_input(line);
                let appended = chat.send(&client).await;
                let start = chat.messages().len() - appended;
                for msg in &chat.messages()[start..] {
                    if msg.role != hackathon::Role::User {
                        println!("{}: {}", msg.role, msg.content);
                    }
                }
            }
        }
        Command::Generate {
            proxy_url,
            topic,
            style,
            length,
        } => {
            let client = ProxyClient::new(proxy_url);
            let mut home = Home::default();
            home.select(View::Form);
            let mut form = SimpleForm::new(FormData {
                topic,
                style,
                length,
            });
            if let Some(result) = form.submit(&client).await {
                home.set_results(vec![result]);
                home.select(View::Cards);
                for card in home.cards() {
                    println!("{}\n", cards::render(&card));
                }
            } else if let Some(text) = form.result() {
                eprintln!("{text}");
            }
        }
        Command::Cards { items } => {
            let items: Vec<Card> = match items {
                Some(path) => {
                    let raw = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str(&raw)?
                }
                None => Vec::new(),
            };
            for card in cards::cards_to_show(&items) {
                println!("{}\n", cards::render(&card));
            }
        }
    }
    Ok(())
}
