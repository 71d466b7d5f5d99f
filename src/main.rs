use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use ideas_miner::config::AppConfig;
use ideas_miner::import::import_file;
use ideas_miner::logging::{init_logging, OperationTimer};
use ideas_miner::models::{Message, Source};
use ideas_miner::validation::InputValidator;
use ideas_miner::{AnalysisService, ConversationStore, SqliteStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an exported chat history
    Import {
        /// Assistant the export came from (chatgpt, claude, gemini, other)
        #[arg(short, long, default_value = "chatgpt")]
        source: String,

        /// JSON export file
        file: PathBuf,
    },
    /// List conversations, most recently active first
    Conversations {
        /// Only conversations whose title or a topic contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Print the messages of a conversation
    Show {
        /// Conversation id
        conversation_id: String,
    },
    /// Analyze a conversation and store topics, summary and sentiment
    Analyze {
        /// Conversation id
        conversation_id: String,
    },
    /// Show ranked topics of a conversation
    Topics {
        /// Conversation id
        conversation_id: String,
    },
    /// Summarize a conversation
    Summary {
        /// Conversation id
        conversation_id: String,
    },
    /// List extracted ideas
    Ideas {
        /// Only ideas from this conversation
        #[arg(long)]
        conversation: Option<String>,

        /// Only ideas whose content, category or a tag contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Search all messages
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List messages from one assistant
    BySource {
        /// chatgpt, claude, gemini or other
        source: String,
    },
    /// List messages within a date range (end exclusive)
    ByDate {
        /// Start date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        start: String,

        /// End date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        end: String,
    },
    /// Show corpus statistics
    Stats,
    /// Delete all conversations, messages and ideas
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    // Keep the guard alive so file logs are flushed on exit
    let _guard = init_logging(&config.logging)?;

    info!("Starting ideas-miner");

    let store = SqliteStore::open(&config.database.path, config.database.max_connections)
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    let service = AnalysisService::new(store, &config)?;

    run(&service, cli.command, cli.json).await
}

async fn run(service: &AnalysisService<SqliteStore>, command: Commands, json: bool) -> Result<()> {
    let timer = OperationTimer::new("command");

    match command {
        Commands::Import { source, file } => {
            InputValidator::validate_import_path(&file)?;
            let source: Source = source.parse()?;
            let summary = import_file(service.store(), &file, source).await?;
            emit(json, &summary, || {
                println!(
                    "Imported {} conversations ({} messages)",
                    summary.conversations, summary.messages
                );
            })?;
        }
        Commands::Conversations { filter } => {
            let conversations = service.list_conversations(filter.as_deref()).await?;
            emit(json, &conversations, || {
                for conversation in &conversations {
                    println!(
                        "{}  {:<8} {}  {:>4}  {}",
                        conversation.id,
                        conversation.source,
                        conversation.end_date.format("%Y-%m-%d"),
                        conversation.message_count,
                        conversation.title
                    );
                }
            })?;
        }
        Commands::Show { conversation_id } => {
            InputValidator::validate_conversation_id(&conversation_id)?;
            let messages = service.conversation_messages(&conversation_id).await?;
            emit(json, &messages, || print_messages(&messages))?;
        }
        Commands::Analyze { conversation_id } => {
            InputValidator::validate_conversation_id(&conversation_id)?;
            let analysis = service.analyze_conversation(&conversation_id).await?;
            emit(json, &analysis, || {
                println!("{}", analysis.summary);
                println!(
                    "Sentiment: {} ({:.2})",
                    analysis.sentiment.label, analysis.sentiment.score
                );
                for topic in &analysis.topics {
                    println!("  {:<30} {:>4} {:>6.1}%", topic.topic, topic.count, topic.percentage);
                }
                println!("{} ideas extracted", analysis.ideas.len());
            })?;
        }
        Commands::Topics { conversation_id } => {
            InputValidator::validate_conversation_id(&conversation_id)?;
            let topics = service.analyze_conversation_topics(&conversation_id).await?;
            emit(json, &topics, || {
                for topic in &topics {
                    println!("{:<30} {:>4} {:>6.1}%", topic.topic, topic.count, topic.percentage);
                }
            })?;
        }
        Commands::Summary { conversation_id } => {
            InputValidator::validate_conversation_id(&conversation_id)?;
            let summary = service.generate_conversation_summary(&conversation_id).await?;
            emit(json, &summary, || println!("{summary}"))?;
        }
        Commands::Ideas {
            conversation,
            filter,
        } => {
            if let Some(id) = &conversation {
                InputValidator::validate_conversation_id(id)?;
            }
            let ideas = service
                .list_ideas(conversation.as_deref(), filter.as_deref())
                .await?;
            emit(json, &ideas, || {
                for idea in &ideas {
                    println!("[{}] {}", idea.conversation_id, idea.content);
                }
            })?;
        }
        Commands::Search { query, limit } => {
            InputValidator::validate_search_query(&query)?;
            if let Some(limit) = limit {
                InputValidator::validate_limit(limit)?;
            }
            let results = service.search_messages(&query, limit).await?;
            emit(json, &results, || {
                for result in &results {
                    println!(
                        "{:.2}  {}  {}",
                        result.relevance_score,
                        result.message.timestamp.format("%Y-%m-%d %H:%M"),
                        result.message.conversation_id
                    );
                    for highlight in &result.highlights {
                        println!("      {highlight}");
                    }
                }
            })?;
        }
        Commands::BySource { source } => {
            let messages = service.search_by_source(source.parse()?).await?;
            emit(json, &messages, || print_messages(&messages))?;
        }
        Commands::ByDate { start, end } => {
            let range = InputValidator::validate_date_range(
                InputValidator::parse_date(&start)?,
                InputValidator::parse_date(&end)?,
            )?;
            let messages = service.search_by_date_range(range).await?;
            emit(json, &messages, || print_messages(&messages))?;
        }
        Commands::Stats => {
            let stats = service.corpus_stats().await?;
            emit(json, &stats, || {
                println!("Conversations: {}", stats.total_conversations);
                println!("Messages:      {}", stats.total_messages);
                println!("Ideas:         {}", stats.total_ideas);
                for (source, count) in &stats.sources {
                    println!("  {source:<10} {count}");
                }
                if let (Some(first), Some(last)) = (stats.earliest_message, stats.latest_message) {
                    println!("Range:         {} .. {}", first.date_naive(), last.date_naive());
                }
            })?;
        }
        Commands::Clear => {
            warn!("Clearing all stored data");
            service.store().clear().await?;
            emit(json, &"cleared", || println!("All data cleared"))?;
        }
    }

    timer.finish();
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        println!("{}", message_line(message));
    }
}

fn message_line(message: &Message) -> String {
    format!(
        "{}  {}  {:<9} {}",
        message.timestamp.format("%Y-%m-%d %H:%M"),
        message.conversation_id,
        message.role.as_str(),
        message.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ideas_miner::models::Role;

    #[test]
    fn test_message_line_names_conversation() {
        let message = Message {
            id: 1,
            conversation_id: "3f2a-garden".to_string(),
            source: Source::Claude,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap(),
            role: Role::User,
            content: "plant tomatoes".to_string(),
        };
        assert_eq!(
            message_line(&message),
            "2024-03-01 09:05  3f2a-garden  user      plant tomatoes"
        );
    }
}
