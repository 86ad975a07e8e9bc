//! Terminal confirmation prompt for the command gate.

use async_trait::async_trait;
use kaia_core::{is_affirmative, Confirmer};
use std::io::{self, Write};

use crate::ui::{BLUE, RESET, YELLOW};

/// Shows the exact candidate command and blocks on a yes/no answer.
/// EOF or a read error counts as a decline.
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, command: &str) -> bool {
        println!("\n{}┌── Proposed Command ──┐{}", YELLOW, RESET);
        println!("{}{}{}", BLUE, command, RESET);
        println!("{}└──────────────────────┘{}", YELLOW, RESET);
        print!("{}Execute? (y/N): {}", YELLOW, RESET);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }
}
