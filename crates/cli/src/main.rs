use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use yatra_agents::YatraAgent;
use yatra_core::NewDestination;
use yatra_observability::{init_tracing, AppMetrics};
use yatra_storage::{DestinationRepository, Store};

#[derive(Debug, Parser)]
#[command(name = "yatra")]
#[command(about = "DivyaYatra pilgrimage-planning assistant CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive devotional chat.
    Chat,
    /// Administer the destination store.
    Destinations {
        #[command(subcommand)]
        command: DestinationCommand,
    },
    /// Show recent audit rows from the conversation history.
    History {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DestinationCommand {
    List,
    Get {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        deity: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("yatra_cli");
    let cli = Cli::parse();

    let agent = build_agent().await?;

    match cli.command {
        Command::Chat => run_chat(agent).await?,
        Command::Destinations { command } => match command {
            DestinationCommand::List => {
                let destinations = agent.store().list_destinations().await?;
                println!("{}", serde_json::to_string_pretty(&destinations)?);
            }
            DestinationCommand::Get { id } => match agent.store().get_destination(id).await? {
                Some(destination) => println!("{}", serde_json::to_string_pretty(&destination)?),
                None => println!("destination {id} not found"),
            },
            DestinationCommand::Add {
                name,
                city,
                state,
                deity,
                description,
            } => {
                let destination = agent
                    .store()
                    .insert_destination(NewDestination {
                        name,
                        city,
                        state,
                        deity,
                        description,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&destination)?);
            }
        },
        Command::History { limit } => {
            let turns = agent.recent_history(limit).await?;
            println!("{}", serde_json::to_string_pretty(&turns)?);
        }
    }

    Ok(())
}

async fn run_chat(agent: YatraAgent<Store>) -> Result<()> {
    println!("DivyaYatra chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent.process_message(message).await?;

        println!("\n{}\n", reply.reply);

        if !reply.suggested_destinations.is_empty() {
            println!("Suggested destinations:");
            for destination in &reply.suggested_destinations {
                println!(
                    "- {} ({}, {})",
                    destination.name, destination.city, destination.state
                );
            }
            println!();
        }

        println!("{}\n", reply.next_question);
    }

    Ok(())
}

async fn build_agent() -> Result<YatraAgent<Store>> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("YATRA_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    Ok(YatraAgent::new(Arc::new(store), metrics))
}
