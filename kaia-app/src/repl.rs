//! Interactive REPL: classify each request, route it, log the turn.

use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};

use kaia_core::prompts::KAIA_SYSTEM_PROMPT;
use kaia_core::{
    Action, ActionPlan, ActionPlanner, ConfirmationGate, GateOutcome, ModelCommandProposer,
};
use kaia_executor::CommandExecutor;
use kaia_providers::KnowledgeBackend;
use kaia_store::{handle_data_retrieval, handle_memory_storage, AssistantStore};

use crate::config::Config;
use crate::interface::TerminalConfirmer;
use crate::status;
use crate::ui::{boxed_footer, boxed_heading, BLUE, GREEN, RED, RESET, YELLOW};

pub struct Repl {
    config: Config,
    gate: ConfirmationGate<ModelCommandProposer, TerminalConfirmer, CommandExecutor>,
    planner: ActionPlanner,
    knowledge: Arc<dyn KnowledgeBackend>,
    store: Arc<AssistantStore>,
    persona: String,
}

/// Persona document, falling back to the built-in prompt when the file
/// is absent or unreadable.
pub fn load_persona(config: &Config) -> String {
    match std::fs::read_to_string(&config.persona_path) {
        Ok(content) => {
            info!(path = %config.persona_path.display(), "persona loaded");
            content.replace('\0', "")
        }
        Err(e) => {
            tracing::warn!(
                path = %config.persona_path.display(),
                error = %e,
                "persona file not available, using built-in prompt"
            );
            KAIA_SYSTEM_PROMPT.to_string()
        }
    }
}

impl Repl {
    pub fn new(
        config: Config,
        gate: ConfirmationGate<ModelCommandProposer, TerminalConfirmer, CommandExecutor>,
        planner: ActionPlanner,
        knowledge: Arc<dyn KnowledgeBackend>,
        store: Arc<AssistantStore>,
        persona: String,
    ) -> Self {
        Self {
            config,
            gate,
            planner,
            knowledge,
            store,
            persona,
        }
    }

    pub async fn run(&self) -> Result<()> {
        println!("{}Welcome to Kaia, your AI assistant.{}", GREEN, RESET);
        println!("Type 'exit' or 'quit' to end the session. '/help' lists commands.");

        loop {
            print!("\nYou: ");
            io::stdout().flush()?;

            let mut input = String::new();
            let bytes = io::stdin().read_line(&mut input)?;
            if bytes == 0 {
                // EOF: leave like an explicit exit.
                println!("\n{}Kaia: Session ended. Until next time!{}", BLUE, RESET);
                break;
            }
            let query = input.trim().to_string();
            if query.is_empty() {
                continue;
            }

            match query.to_lowercase().as_str() {
                "exit" | "quit" | "/exit" | "/quit" => {
                    println!("{}Kaia: Session ended. Until next time!{}", BLUE, RESET);
                    break;
                }
                "/help" => {
                    self.print_help();
                    continue;
                }
                "/status" => {
                    let (response, response_type) = self.show_status().await;
                    self.log_turn(&query, &response, response_type);
                    continue;
                }
                _ => {}
            }

            // '!cmd' skips the planner but never the confirmation gate.
            let plan = if let Some(direct) = query.strip_prefix('!') {
                ActionPlan {
                    action: Action::Command,
                    content: direct.trim().to_string(),
                }
            } else {
                self.planner.plan(&query).await
            };

            let (response, response_type) = self.dispatch(&plan).await;
            self.log_turn(&query, &response, response_type);
        }

        Ok(())
    }

    async fn dispatch(&self, plan: &ActionPlan) -> (String, &'static str) {
        match plan.action {
            Action::Command => self.run_command(&plan.content).await,
            Action::StoreData => self.store_data(&plan.content),
            Action::RetrieveData => self.retrieve_data(&plan.content),
            Action::SystemStatus => self.show_status().await,
            Action::PersonaContent => self.show_persona(),
            Action::KnowledgeQuery => self.ask_knowledge(&plan.content, "knowledge_query").await,
            Action::Chat => self.ask_knowledge(&plan.content, "chat").await,
        }
    }

    async fn run_command(&self, request: &str) -> (String, &'static str) {
        println!("\n{}Kaia (Command Mode):{}", BLUE, RESET);

        match self.gate.handle(request).await {
            Ok(GateOutcome::Executed { result, .. }) => {
                let response = if result.success() {
                    println!("{}Command executed successfully.{}", GREEN, RESET);
                    if !result.stdout.is_empty() {
                        println!("{}", result.stdout);
                    }
                    if !result.stderr.is_empty() {
                        println!("{}Stderr:\n{}{}", YELLOW, result.stderr, RESET);
                    }
                    format!("Command executed successfully. Output:\n{}", result.stdout)
                } else {
                    let exit = result
                        .exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "none".to_string());
                    println!("{}Command failed (exit status: {}).{}", RED, exit, RESET);
                    if !result.stderr.is_empty() {
                        println!("{}{}{}", RED, result.stderr, RESET);
                    }
                    if !result.stdout.is_empty() {
                        println!("{}", result.stdout);
                    }
                    format!(
                        "Command failed. Exit status: {}\nStderr:\n{}\nStdout:\n{}",
                        exit, result.stderr, result.stdout
                    )
                };
                (response, "command")
            }
            Ok(GateOutcome::Declined { command }) => {
                let response = format!("Command cancelled: {}", command);
                println!("{}{}{}", BLUE, response, RESET);
                (response, "command")
            }
            Err(e) => {
                let response = format!("Command generation failed: {}", e);
                println!("{}{}{}", RED, response, RESET);
                (response, "command")
            }
        }
    }

    fn store_data(&self, content: &str) -> (String, &'static str) {
        let response = match handle_memory_storage(&self.store, &self.config.user_id, content) {
            Ok(Some(message)) => message,
            Ok(None) => "I couldn't find a storable fact or preference in that.".to_string(),
            Err(e) => {
                error!(error = %e, "memory storage failed");
                format!("Failed to store that: {}", e)
            }
        };
        println!("\n{}Kaia: {}{}", BLUE, response, RESET);
        (response, "store_data")
    }

    fn retrieve_data(&self, content: &str) -> (String, &'static str) {
        match handle_data_retrieval(&self.store, &self.config.user_id, content) {
            Ok(reply) => {
                println!("\n{}Kaia:{}", BLUE, RESET);
                if reply.items.is_empty() {
                    println!("{}", reply.message);
                } else {
                    println!("{}{}{}", GREEN, boxed_heading(&reply.message), RESET);
                    for item in &reply.items {
                        println!("• {}", item);
                    }
                    println!("{}{}{}", GREEN, boxed_footer(&reply.message), RESET);
                }
                (reply.message, reply.response_type)
            }
            Err(e) => {
                let response = format!("Data retrieval failed: {}", e);
                println!("{}{}{}", RED, response, RESET);
                (response, "data_retrieval_failed")
            }
        }
    }

    async fn show_status(&self) -> (String, &'static str) {
        let report = status::collect(&self.config, &self.store).await;
        let rendered = status::render(&report);
        println!("\n{}Kaia:{}", BLUE, RESET);
        println!("{}{}{}", GREEN, boxed_heading("System Status"), RESET);
        println!("{}", rendered);
        println!("{}{}{}", GREEN, boxed_footer("System Status"), RESET);
        (rendered, "system_status")
    }

    fn show_persona(&self) -> (String, &'static str) {
        println!("\n{}Kaia:{}", BLUE, RESET);
        println!("{}{}{}", GREEN, boxed_heading("Kaia's Persona"), RESET);
        println!("{}", self.persona);
        println!("{}{}{}", GREEN, boxed_footer("Kaia's Persona"), RESET);
        (self.persona.clone(), "persona_retrieved")
    }

    async fn ask_knowledge(&self, query: &str, response_type: &'static str) -> (String, &'static str) {
        print!("\n{}Kaia:{} ", BLUE, RESET);
        let _ = io::stdout().flush();

        match self.knowledge.answer(query).await {
            Ok(answer) => {
                println!("{}", answer);
                (answer, response_type)
            }
            Err(e) => {
                error!(error = %e, "knowledge backend failed");
                let response = "Error retrieving information from my knowledge base.".to_string();
                println!("{}{}{}", RED, response, RESET);
                (response, response_type)
            }
        }
    }

    fn log_turn(&self, query: &str, response: &str, response_type: &str) {
        if let Err(e) = self.store.log_interaction(query, response, response_type) {
            // Logging must never take the session down.
            error!(error = %e, "failed to log interaction");
        }
    }

    fn print_help(&self) {
        println!("\n{}Commands:{}", BLUE, RESET);
        println!("  exit, quit     end the session");
        println!("  /help          this message");
        println!("  /status        system status report");
        println!("  !<request>     propose a command for <request> directly");
        println!("\nEverything else is classified automatically:");
        println!("  'remember that ...' stores a fact");
        println!("  'list my preferences' retrieves stored data");
        println!("  natural-language tasks propose a shell command (confirmed before running)");
    }
}
