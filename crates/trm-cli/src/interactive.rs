//! Interactive CLI mode

use crate::commands::{Cli, CommandExecutor, CommandResult};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};

/// Parse one shell line into CLI arguments, program name implied
pub fn parse_command_line(line: &str) -> Result<Cli> {
    let args = shell_words::split(line)?;
    let cli = Cli::try_parse_from(std::iter::once("trm".to_string()).chain(args))?;
    Ok(cli)
}

/// Interactive CLI session over one executor, so the dataset survives between commands
pub struct InteractiveSession {
    executor: CommandExecutor,
}

impl InteractiveSession {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Start interactive session
    pub async fn run(&mut self) -> Result<()> {
        println!("TRM inventory shell");
        println!("Type 'help' for available commands, 'quit' to exit");
        println!("{}", "=".repeat(50));

        loop {
            print!("trm> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match input {
                "quit" | "exit" | "q" => {
                    println!("Goodbye!");
                    break;
                }
                "help" | "h" => {
                    self.show_help();
                }
                "clear" => {
                    print!("\x1B[2J\x1B[1;1H");
                }
                _ => match self.execute_line(input).await {
                    Ok(Some(result)) if !result.message.is_empty() => println!("{}", result.message),
                    Ok(_) => {}
                    Err(e) => eprintln!("Error: {:#}", e),
                },
            }
        }

        Ok(())
    }

    /// Run one command line; `None` when the line names no command
    pub async fn execute_line(&mut self, line: &str) -> Result<Option<CommandResult>> {
        let cli = parse_command_line(line)?;
        match cli.command {
            Some(command) => Ok(Some(self.executor.execute(command).await?)),
            None => {
                self.show_help();
                Ok(None)
            }
        }
    }

    fn show_help(&self) {
        println!("Available commands:");
        println!("  classify -i <file> [-s strategy]...  Classify and score an inventory");
        println!("  metrics [-i <file>]                  Risk metrics and statistics");
        println!("  filter [--search] [--domain] [--status] [--risk]");
        println!("                                       Filter the session dataset");
        println!("  taxonomy                             Show the active taxonomy");
        println!("  info                                 Show system information");
        println!("  help                                 Show this help");
        println!("  clear                                Clear screen");
        println!("  quit                                 Exit interactive mode");
        println!();
        println!("Use '<command> --help' for detailed help on each command");
    }
}

/// Start interactive mode
pub async fn start_interactive(executor: CommandExecutor) -> Result<()> {
    let mut session = InteractiveSession::new(executor);
    session.run().await
}
