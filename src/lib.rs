pub mod cli;
pub mod config;
pub mod gateway;
pub mod llm;
pub mod models;
pub mod server;
pub mod widget;

use cli::{ Args, ChatArgs, Command };
use config::GatewayConfig;
use gateway::ChatGateway;
use log::info;
use server::Server;
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use widget::{ ChatWidget, WidgetSettings };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command.clone() {
        Some(Command::Chat(chat)) => run_chat(chat).await,
        Some(Command::Serve) | None => serve(args).await,
    }
}

async fn serve(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Gemini: {} (model {})", args.gemini_base_url, args.gemini_model);
    info!("OpenAI: {} (model {})", args.openai_base_url, args.openai_model);
    info!("Anthropic: {} (model {})", args.anthropic_base_url, args.anthropic_model);
    info!("Upstream Timeout: {}s", args.upstream_timeout_secs);
    info!("Mock Delay: {}-{}ms", args.mock_delay_min_ms, args.mock_delay_max_ms);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let config = GatewayConfig::from_args(&args)?;
    let gateway = Arc::new(ChatGateway::from_config(&config)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, gateway, args);
    server.run().await?;

    Ok(())
}

async fn run_chat(chat: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = WidgetSettings {
        endpoint: chat.endpoint,
        provider: chat.provider,
        api_key: chat.api_key,
        welcome_message: chat.welcome_message,
    };
    let mut widget = ChatWidget::new(settings)?;
    let mut stdout = std::io::stdout();

    match chat.message {
        Some(message) => {
            if let Some(reply) = widget.send(&message).await {
                writeln!(stdout, "{}", reply.render())?;
            }
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            widget::converse(&mut widget, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
