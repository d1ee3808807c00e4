pub mod agent;
pub mod classifier;
pub mod cli;
pub mod client;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;

use agent::ProxyAgent;
use cli::{ Args, ChatArgs, Command, ServeArgs, TranscriptArgs };
use client::transport::ProxyTransport;
use client::view::{ HtmlView, TerminalView };
use client::{ render, ChatController };
use config::prompt::resolve_prompts;
use history::{ create_store, ConversationStore, FileStore };
use log::{ info, warn };
use server::Server;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve) => run_server(serve).await,
        Command::Chat(chat) => run_chat(chat).await,
        Command::Transcript(transcript) => run_transcript(transcript).await,
    }
}

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Proxy Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Upstream URL: {}", args.upstream_url);
    info!("Completion Model: {} (max {} tokens)", args.completion_model, args.completion_max_tokens);
    info!("Classifier Model: {} (max {} tokens)", args.classifier_model, args.classifier_max_tokens);
    info!("Upstream Timeout: {}s", args.upstream_timeout_secs);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let prompts = resolve_prompts(args.prompts_path.as_deref())?;
    let agent = ProxyAgent::new(&args, &prompts)?;
    let server = Server::new(args.server_addr.clone(), agent, args);
    server.run().await?;

    Ok(())
}

async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    if args.worker_url.is_none() {
        warn!("WORKER_URL is not set; every message will fail until it is configured.");
    }
    let prompts = resolve_prompts(args.prompts_path.as_deref())?;
    let backend = create_store(&args.storage_type, &args.storage_path)?;
    let transport = Arc::new(ProxyTransport::new(args.worker_url.clone()));

    let mut controller = ChatController::load(
        ConversationStore::new(backend),
        TerminalView::new(std::io::stdout()),
        transport,
        &prompts
    ).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        controller.submit(&line).await;
    }

    Ok(())
}

async fn run_transcript(args: TranscriptArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let store = ConversationStore::new(Arc::new(FileStore::new(&args.storage_path)));
    match store.load_conversation().await {
        Some(conversation) => {
            let mut view = HtmlView::default();
            render(&mut view, &conversation);
            println!("{}", view.render());
        }
        None => info!("No stored conversation at {}", args.storage_path),
    }
    Ok(())
}
