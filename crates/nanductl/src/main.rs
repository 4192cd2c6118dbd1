//! Nandu Control - terminal client for the Nandu library helpdesk.
//!
//! One-shot `ask` for scripting, `chat` for an interactive session.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Term;
use nandu_core::respond::{plain_text, Seeder};
use nandu_core::{Resolver, ResolverConfig, Response};
use owo_colors::OwoColorize;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nanductl")]
#[command(about = "Nandu - library helpdesk assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Remote knowledge base URL
    #[arg(long)]
    kb_url: Option<String>,

    /// Catalogue search endpoint
    #[arg(long)]
    catalogue_url: Option<String>,

    /// Disable delegated catalogue searches
    #[arg(long)]
    no_book_search: bool,

    /// Pin phrase picks for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single query and print the answer
    Ask {
        /// The question, as free text
        query: Vec<String>,
    },

    /// Interactive chat session
    Chat,
}

fn build_resolver(cli: &Cli) -> Resolver {
    let mut config = ResolverConfig::default();
    if let Some(url) = &cli.kb_url {
        config.kb_url = url.clone();
    }
    if let Some(url) = &cli.catalogue_url {
        config.catalogue_url = url.clone();
    }
    if cli.no_book_search {
        config.book_search_enabled = false;
    }

    let resolver = Resolver::new(config);
    match cli.seed {
        Some(seed) => resolver.with_seeder(Seeder::fixed(seed)),
        None => resolver,
    }
}

fn print_response(response: &Response) {
    println!("{}", plain_text(&response.text));

    let mut status = format!("{:?} · {}ms", response.kind, response.processing_time_ms);
    if response.from_cache {
        status.push_str(" · cached");
    }
    if let Some(score) = response.match_score {
        status.push_str(&format!(" · score {:.2}", score));
    }
    eprintln!("{}", status.dimmed());
}

async fn ask(cli: &Cli, query: &str) -> Result<()> {
    let resolver = build_resolver(cli);
    let response = resolver.resolve(query).await;
    print_response(&response);
    Ok(())
}

async fn chat(cli: &Cli) -> Result<()> {
    let resolver = build_resolver(cli);
    let term = Term::stdout();

    println!(
        "{}",
        "📚 Nandu library helpdesk. Ask me anything, or type 'quit' to leave."
            .green()
    );

    loop {
        print!("{} ", "you>".cyan());
        std::io::stdout().flush()?;

        let line = term.read_line()?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "quit" | "exit" | "bye") {
            println!("{}", "👋 Bye! Happy reading.".green());
            break;
        }

        let response = resolver.resolve(query).await;
        println!("{} {}", "nandu>".magenta(), plain_text(&response.text));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Ask { query } => ask(&cli, &query.join(" ")).await,
        Commands::Chat => chat(&cli).await,
    }
}
