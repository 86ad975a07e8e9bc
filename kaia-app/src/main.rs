use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use kaia_app::config::Config;
use kaia_app::interface::TerminalConfirmer;
use kaia_app::readiness;
use kaia_app::repl::{load_persona, Repl};
use kaia_app::ui::{BLUE, GREEN, RED, RESET, YELLOW};

use kaia_core::prompts::KAIA_SYSTEM_PROMPT;
use kaia_core::{ActionPlanner, ConfirmationGate, ModelCommandProposer};
use kaia_executor::CommandExecutor;
use kaia_policy::CommandPolicy;
use kaia_providers::{ChatKnowledge, ChatModel, KnowledgeBackend, ModelResolver, OllamaClient};
use kaia_store::AssistantStore;

const CONFIG_PATH: &str = "kaia.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(Path::new(CONFIG_PATH))?;
    config.apply_env();

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("doctor") {
        let healthy = readiness::doctor(&config).await;
        std::process::exit(if healthy { 0 } else { 1 });
    }

    println!("{}", BLUE);
    println!("██╗  ██╗ █████╗ ██╗ █████╗ ");
    println!("██║ ██╔╝██╔══██╗██║██╔══██╗");
    println!("█████╔╝ ███████║██║███████║");
    println!("██╔═██╗ ██╔══██║██║██╔══██║");
    println!("██║  ██╗██║  ██║██║██║  ██║");
    println!("╚═╝  ╚═╝╚═╝  ╚═╝╚═╝╚═╝  ╚═╝");
    println!("{}", RESET);
    println!("Kaia (Personal AI Assistant)\n");

    // Model daemon is a hard requirement; exit code 1 when it cannot be
    // confirmed.
    println!("{}Checking model daemon...{}", BLUE, RESET);
    if let Err(e) = readiness::await_model_daemon(&config).await {
        eprintln!("{}{}{}", RED, e, RESET);
        std::process::exit(1);
    }
    println!("{}Model daemon is up.{}", GREEN, RESET);

    if !readiness::vector_store_reachable(&config).await {
        println!(
            "{}Warning: vector-store server not reachable; knowledge answers may degrade.{}",
            YELLOW, RESET
        );
    }

    std::fs::create_dir_all(&config.data_dir)?;
    let store = Arc::new(AssistantStore::open(config.db_path())?);
    store.seed_persona_defaults()?;

    let timeout = Duration::from_secs(config.timeout_secs);
    let backend: Arc<dyn ChatModel> = Arc::new(OllamaClient::new(config.ollama_url.clone(), timeout));
    let resolver = Arc::new(ModelResolver::new());

    let persona = load_persona(&config);
    let knowledge: Arc<dyn KnowledgeBackend> = Arc::new(ChatKnowledge::new(
        backend.clone(),
        resolver.clone(),
        config.chat_model.clone(),
        Some(config.command_model.clone()),
        format!("{}\n\n{}", KAIA_SYSTEM_PROMPT, persona),
        config.transcript_char_budget,
    ));

    let planner = ActionPlanner::new(
        backend.clone(),
        resolver.clone(),
        config.command_model.clone(),
        Some(config.chat_model.clone()),
    );

    let proposer = ModelCommandProposer::new(
        backend.clone(),
        resolver.clone(),
        config.command_model.clone(),
        Some(config.chat_model.clone()),
        CommandPolicy::new(config.command_allowlist.clone()),
    );
    let gate = ConfirmationGate::new(proposer, TerminalConfirmer, CommandExecutor::new(timeout));

    let repl = Repl::new(config, gate, planner, knowledge, store, persona);
    repl.run().await
}
