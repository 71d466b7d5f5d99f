use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::config::{AnalysisConfig, AppConfig};
use crate::error::{MinerError, Result};
use crate::ideas::IdeaExtractor;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{
    Conversation, ConversationAnalysis, ConversationUpdate, CorpusStats, DateRange, Idea, Message, NewIdea,
    SearchResult, SentimentScore, Source, TopicAnalysis,
};
use crate::repository::ConversationStore;
use crate::search::search_corpus;
use crate::sentiment::SentimentScorer;
use crate::summary::summarize;
use crate::text::TextProcessor;
use crate::topics::analyze_topics;

/// Analytics entry points over a [`ConversationStore`].
///
/// Each call fetches what it needs from the store, computes in memory and
/// writes back at most once. Store errors are returned unchanged.
pub struct AnalysisService<S> {
    store: S,
    processor: TextProcessor,
    scorer: SentimentScorer,
    extractor: IdeaExtractor,
    config: AnalysisConfig,
    metrics: MetricsCollector,
}

impl<S: ConversationStore> AnalysisService<S> {
    /// Build a service using the analysis limits and lexicon from `config`
    pub fn new(store: S, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            store,
            processor: TextProcessor::new()?,
            scorer: SentimentScorer::new(&config.sentiment),
            extractor: IdeaExtractor::new()?.with_min_length(config.analysis.min_idea_length),
            config: config.analysis.clone(),
            metrics: MetricsCollector,
        })
    }

    /// Build a service with default configuration
    pub fn with_defaults(store: S) -> Result<Self> {
        Self::new(store, &AppConfig::default())
    }

    /// The underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Rank the keywords of a conversation by how many messages mention them
    #[instrument(skip(self))]
    pub async fn analyze_conversation_topics(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<TopicAnalysis>> {
        let timer = OperationTimer::new("analyze_topics");
        let messages = self.fetch_conversation_messages(conversation_id).await?;

        let topics = analyze_topics(
            &self.processor,
            &messages,
            self.config.topic_keyword_limit,
            self.config.max_topics,
        );

        self.metrics.record_analysis("topics", timer.elapsed());
        debug!(conversation_id, topics = topics.len(), "Topics ranked");
        Ok(topics)
    }

    /// Run idea extraction over every message of a conversation and append
    /// the results. Repeated calls append again.
    #[instrument(skip(self))]
    pub async fn extract_conversation_ideas(&self, conversation_id: &str) -> Result<Vec<Idea>> {
        let timer = OperationTimer::new("extract_ideas");
        let messages = self.fetch_conversation_messages(conversation_id).await?;
        let extracted_at = Utc::now();

        let new_ideas: Vec<NewIdea> = messages
            .iter()
            .flat_map(|message| {
                self.extractor
                    .extract(&message.content)
                    .into_iter()
                    .map(move |content| NewIdea {
                        conversation_id: message.conversation_id.clone(),
                        message_id: message.id,
                        content,
                        extracted_at,
                        category: None,
                        tags: None,
                    })
            })
            .collect();

        if new_ideas.is_empty() {
            debug!(conversation_id, "No ideas found");
            return Ok(Vec::new());
        }

        let ideas = self
            .store
            .append_ideas(new_ideas)
            .await
            .inspect_err(|_| self.metrics.record_error("extract_ideas"))?;

        self.metrics.record_ideas_extracted(ideas.len());
        self.metrics.record_analysis("ideas", timer.elapsed());
        info!(conversation_id, ideas = ideas.len(), "Ideas extracted");
        Ok(ideas)
    }

    /// One-line summary of a conversation
    #[instrument(skip(self))]
    pub async fn generate_conversation_summary(&self, conversation_id: &str) -> Result<String> {
        let messages = self.fetch_conversation_messages(conversation_id).await?;
        let (summary, _) = summarize(
            &self.processor,
            &self.scorer,
            &messages,
            self.config.summary_keyword_limit,
        );
        Ok(summary)
    }

    /// Full analysis of one conversation.
    ///
    /// Ranks topics, renders the summary, appends extracted ideas and then
    /// overwrites the conversation's `topics`, `summary` and `sentiment`.
    #[instrument(skip(self))]
    pub async fn analyze_conversation(&self, conversation_id: &str) -> Result<ConversationAnalysis> {
        let timer = OperationTimer::new("analyze_conversation");

        if self.store.get_conversation(conversation_id).await?.is_none() {
            return Err(MinerError::ConversationNotFound(conversation_id.to_string()));
        }

        let messages = self.fetch_conversation_messages(conversation_id).await?;
        let topics = analyze_topics(
            &self.processor,
            &messages,
            self.config.topic_keyword_limit,
            self.config.max_topics,
        );
        let (summary, sentiment) = summarize(
            &self.processor,
            &self.scorer,
            &messages,
            self.config.summary_keyword_limit,
        );
        let sentiment: SentimentScore = sentiment.unwrap_or_else(|| self.scorer.analyze(""));

        let ideas = self.extract_conversation_ideas(conversation_id).await?;

        let update = ConversationUpdate {
            topics: Some(
                topics
                    .iter()
                    .take(self.config.stored_topic_count)
                    .map(|t| t.topic.clone())
                    .collect(),
            ),
            sentiment: Some(sentiment.score),
            summary: Some(summary.clone()),
        };
        self.store
            .update_conversation(conversation_id, update)
            .await
            .inspect_err(|_| self.metrics.record_error("analyze_conversation"))?;

        self.metrics.record_conversation_analyzed(sentiment.score);
        info!(
            conversation_id,
            messages = messages.len(),
            topics = topics.len(),
            ideas = ideas.len(),
            sentiment = sentiment.score,
            duration_ms = timer.elapsed().as_millis(),
            "Conversation analyzed"
        );

        Ok(ConversationAnalysis {
            topics,
            summary,
            sentiment,
            ideas,
        })
    }

    /// Relevance search across the whole corpus.
    /// `limit` falls back to the configured search limit.
    #[instrument(skip(self))]
    pub async fn search_messages(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let timer = OperationTimer::new("search_messages");
        let limit = limit.unwrap_or(self.config.search_limit);

        if query.trim().is_empty() {
            debug!("Blank query, nothing to search");
            return Ok(Vec::new());
        }

        let corpus = self
            .store
            .get_all_messages()
            .await
            .inspect_err(|_| self.metrics.record_error("search_messages"))?;
        let corpus_size = corpus.len();

        let results = search_corpus(
            &self.processor,
            query,
            corpus,
            limit,
            &self.config.highlight_options(),
        );

        self.metrics.record_search(results.len(), timer.elapsed());
        info!(
            corpus_size,
            results = results.len(),
            limit,
            "Search completed"
        );
        Ok(results)
    }

    /// Messages whose timestamp falls in `range`, oldest first
    #[instrument(skip(self))]
    pub async fn search_by_date_range(&self, range: DateRange) -> Result<Vec<Message>> {
        let messages = self.store.query_messages_by_timestamp_range(range).await?;
        debug!(count = messages.len(), "Date range lookup");
        Ok(messages)
    }

    /// Messages imported from `source`
    #[instrument(skip(self))]
    pub async fn search_by_source(&self, source: Source) -> Result<Vec<Message>> {
        let messages = self.store.query_messages_by_source(source).await?;
        debug!(count = messages.len(), "Source lookup");
        Ok(messages)
    }

    /// Conversations, most recently active first. `filter` keeps those whose
    /// title or any stored topic contains it, ignoring case.
    #[instrument(skip(self))]
    pub async fn list_conversations(&self, filter: Option<&str>) -> Result<Vec<Conversation>> {
        let mut conversations = self.store.list_conversations().await?;
        conversations.sort_by(|a, b| b.end_date.cmp(&a.end_date).then_with(|| a.id.cmp(&b.id)));

        if let Some(needle) = filter.map(str::to_lowercase).filter(|f| !f.trim().is_empty()) {
            conversations.retain(|conversation| {
                conversation.title.to_lowercase().contains(&needle)
                    || conversation
                        .topics
                        .iter()
                        .flatten()
                        .any(|topic| topic.to_lowercase().contains(&needle))
            });
        }

        debug!(count = conversations.len(), "Conversations listed");
        Ok(conversations)
    }

    /// Messages of one conversation in timestamp order
    #[instrument(skip(self))]
    pub async fn conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        if self.store.get_conversation(conversation_id).await?.is_none() {
            return Err(MinerError::ConversationNotFound(conversation_id.to_string()));
        }

        let mut messages = self.fetch_conversation_messages(conversation_id).await?;
        messages.sort_by_key(|message| message.timestamp);
        Ok(messages)
    }

    /// Stored ideas, newest first, optionally restricted to one conversation.
    /// `filter` keeps ideas whose content, category or any tag contains it,
    /// ignoring case.
    #[instrument(skip(self))]
    pub async fn list_ideas(
        &self,
        conversation_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<Idea>> {
        let mut ideas = match conversation_id {
            Some(id) => self.store.get_ideas_by_conversation(id).await?,
            None => self.store.get_all_ideas().await?,
        };
        ideas.sort_by(|a, b| b.extracted_at.cmp(&a.extracted_at).then_with(|| b.id.cmp(&a.id)));

        if let Some(needle) = filter.map(str::to_lowercase).filter(|f| !f.trim().is_empty()) {
            ideas.retain(|idea| {
                idea.content.to_lowercase().contains(&needle)
                    || idea
                        .category
                        .as_ref()
                        .is_some_and(|category| category.to_lowercase().contains(&needle))
                    || idea
                        .tags
                        .iter()
                        .flatten()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            });
        }

        Ok(ideas)
    }

    /// Corpus-wide totals
    #[instrument(skip(self))]
    pub async fn corpus_stats(&self) -> Result<CorpusStats> {
        let conversations = self.store.list_conversations().await?;
        let messages = self.store.get_all_messages().await?;
        let ideas = self.store.get_all_ideas().await?;

        let mut stats = CorpusStats {
            total_conversations: conversations.len(),
            total_messages: messages.len(),
            total_ideas: ideas.len(),
            ..CorpusStats::default()
        };

        for conversation in &conversations {
            *stats.sources.entry(conversation.source).or_insert(0) += 1;
        }
        stats.earliest_message = messages.iter().map(|m| m.timestamp).min();
        stats.latest_message = messages.iter().map(|m| m.timestamp).max();

        self.metrics.set_corpus_size(stats.total_messages);
        Ok(stats)
    }

    async fn fetch_conversation_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.store
            .get_messages_by_conversation(conversation_id)
            .await
            .inspect_err(|e| {
                self.metrics.record_error("fetch_messages");
                tracing::warn!(conversation_id, error = %e, "Failed to fetch messages");
            })
    }
}
