//! Complete RAG pipeline: Classify -> Retrieve -> Rerank -> Generate

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::classify::classify_intent;
use crate::classify::classify_visa;
use crate::classify::QuestionType;
use crate::classify::VisaClassification;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::errors::Result;
use crate::knowledge::KnowledgeBase;
use crate::llm::LlmService;
use crate::rag::prompts::ImmigrationPrompts;
use crate::rag::ContextAssembler;
use crate::rag::HybridReranker;
use crate::rag::Retriever;
use crate::rag::SourceRef;
use crate::store::DocumentStore;
use crate::store::GENERAL_KEY;

/// Fixed answer for greetings and unscoped queries with no retrievable context
const WELCOME_MESSAGE: &str = "Hello! I'm your Immigration Guardian. I can help you with \
    questions about F-1, F-2, H-1B, H-4, J-1, and J-2 visa laws and regulations. What would \
    you like to know?";

/// Fixed answer when a visa-scoped query retrieves nothing usable
const NO_INFORMATION_MESSAGE: &str = "I don't have enough information to answer that question \
    accurately. Please try rephrasing or ask about a different immigration topic.";

/// Number of sources cited back to the caller
const MAX_CITED_SOURCES: usize = 5;

/// Complete RAG service
pub struct RagService {
    retriever: Retriever,
    reranker: HybridReranker,
    knowledge: KnowledgeBase,
    assembler: ContextAssembler,
    llm: LlmService,
}

impl RagService {
    /// Create a new RAG service from configuration.
    ///
    /// Loads the document store once; the service can then be shared across
    /// concurrent requests, since nothing in the pipeline mutates state.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(DocumentStore::load(config.data_dir())?);
        let embeddings = Arc::new(EmbeddingClient::new(
            config.embedding_endpoint(),
            config.embedding_model(),
            config.embedding_dimension(),
        )?);
        let llm = LlmService::new(&config.llm)?;
        Ok(Self::from_services(
            store,
            embeddings,
            llm,
            config.score_threshold(),
        ))
    }

    /// Create from existing services
    #[must_use]
    pub fn from_services(
        store: Arc<DocumentStore>,
        embeddings: Arc<EmbeddingClient>,
        llm: LlmService,
        score_threshold: f32,
    ) -> Self {
        Self {
            retriever: Retriever::new(store, embeddings, score_threshold),
            reranker: HybridReranker::default(),
            knowledge: KnowledgeBase::default(),
            assembler: ContextAssembler::default(),
            llm,
        }
    }

    /// Answer a query end to end.
    ///
    /// Always produces a complete response: classification never fails,
    /// retrieval against a missing index degrades to the fixed fallback
    /// answers, and a generation failure is folded into the answer text.
    /// Only embedding/search errors propagate as `Err`.
    pub async fn chat(&self, query: &str) -> Result<ChatResponse> {
        info!("Processing query: {}", query);

        let visa_class = classify_visa(query);
        if let VisaClassification::NeedsClarification(suggestions) = &visa_class {
            debug!("Typo clarification requested: {suggestions:?}");
            return Ok(ChatResponse {
                query: query.to_string(),
                visa_type: visa_class.label().to_string(),
                question_type: "clarification".to_string(),
                answer: clarification_message(suggestions),
                sources: Vec::new(),
                num_sources: 0,
            });
        }

        let intent = classify_intent(query);
        let visa = match visa_class {
            VisaClassification::Visa(visa) => Some(visa),
            _ => None,
        };
        let visa_key = visa.map_or(GENERAL_KEY, |v| v.tag());
        debug!("Classified visa={visa_key}, intent={}", intent.as_str());

        // Wide pool in, reranked top-k out
        let pool = self
            .retriever
            .retrieve(query, visa_key, self.reranker.policy().pool_size)
            .await?;
        let k = Retriever::depth(intent);
        let candidates = self.reranker.rerank(query, visa, &pool, k);
        debug!("Reranked {} -> {} candidates", pool.len(), candidates.len());

        let answer = if candidates.is_empty() {
            if visa.is_none() {
                WELCOME_MESSAGE.to_string()
            } else {
                NO_INFORMATION_MESSAGE.to_string()
            }
        } else {
            let mut context = self.assembler.assemble(&candidates);
            if intent == QuestionType::Technical {
                if let Some(visa) = visa {
                    context = self.knowledge.augment(query, &context, visa);
                }
            }
            let prompt = ImmigrationPrompts::compose(query, &context, visa.is_none(), intent);
            match self.llm.generate(&prompt).await {
                Ok(answer) => answer,
                // Availability over correctness: a failed generation call
                // becomes an error-describing answer, never a fault
                Err(e) => {
                    warn!("Generation failed: {e}");
                    format!("Error generating answer: {e}")
                }
            }
        };

        let sources: Vec<SourceRef> = candidates
            .iter()
            .take(MAX_CITED_SOURCES)
            .map(SourceRef::from)
            .collect();

        info!("Query completed with {} sources", candidates.len());
        Ok(ChatResponse {
            query: query.to_string(),
            visa_type: visa_key.to_string(),
            question_type: intent.as_str().to_string(),
            answer,
            num_sources: candidates.len(),
            sources,
        })
    }
}

/// Render the clarification answer for suspected visa-code typos
fn clarification_message(suggestions: &[String]) -> String {
    let mut message = String::from(
        "I noticed you might have a typo in your question. Did you mean one of these visa types?\n\n",
    );
    for suggestion in suggestions {
        message.push_str(&format!("• {suggestion}\n"));
    }
    message.push_str("\nPlease clarify which visa type you're asking about, and I'll be happy to help!");
    message
}

/// Caller-facing response shape
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub query: String,
    pub visa_type: String,
    pub question_type: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub num_sources: usize,
}

impl ChatResponse {
    /// Get a formatted string representation
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Query: {}\n\n", self.query));
        output.push_str(&format!("Answer:\n{}\n\n", self.answer));
        output.push_str(&format!("Sources ({}):\n", self.num_sources));

        for (idx, source) in self.sources.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} (Score: {:.2})\n",
                idx + 1,
                source.title,
                source.score
            ));
        }

        output
    }
}
