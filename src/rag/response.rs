//! Question answering pipeline.

use super::{build_context, collection_name, select_state, ContextChunk};
use crate::config::AssistantSettings;
use crate::error::Result;
use crate::llm::WildlifeAssistant;
use crate::vector_store::KnowledgeBase;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Routes questions to a state's collection and answers from it.
#[derive(Clone)]
pub struct ResponseOrchestrator {
    assistant: WildlifeAssistant,
    knowledge_base: KnowledgeBase,
    states: Vec<String>,
    fallback_state: String,
    top_k: usize,
    no_results_message: String,
}

impl ResponseOrchestrator {
    /// Create an orchestrator using the routing settings in `settings`.
    pub fn new(
        assistant: WildlifeAssistant,
        knowledge_base: KnowledgeBase,
        settings: &AssistantSettings,
    ) -> Self {
        Self {
            assistant,
            knowledge_base,
            states: settings.states.iter().map(|s| s.to_lowercase()).collect(),
            fallback_state: settings.fallback_state.to_lowercase(),
            top_k: settings.top_k,
            no_results_message: settings.no_results_message.clone(),
        }
    }

    /// Answer a question.
    ///
    /// An empty retrieval is a normal outcome: the configured "no relevant
    /// information" message is returned and the answer prompt is never sent.
    #[instrument(skip(self))]
    pub async fn get_response(&self, query: &str) -> Result<AssistantResponse> {
        let candidate = self.assistant.extract_state(query).await?.to_lowercase();
        let state = select_state(candidate.trim(), &self.states, &self.fallback_state).to_string();
        let collection = collection_name(&state);
        info!("Routing question to {}", collection);

        let results = self
            .knowledge_base
            .create_or_open(&collection)
            .await?
            .query(query, self.top_k)
            .await?;

        if results.is_empty() {
            debug!("No chunks retrieved from {}", collection);
            return Ok(AssistantResponse {
                state,
                collection,
                answer: self.no_results_message.clone(),
                sources: Vec::new(),
                found: false,
            });
        }

        let sources: Vec<ContextChunk> = results.into_iter().map(ContextChunk::from).collect();
        let context = build_context(&sources);
        debug!("Context from {} chunks ({} chars)", sources.len(), context.len());

        let answer = self.assistant.answer(query, &context).await?;

        Ok(AssistantResponse {
            state,
            collection,
            answer,
            sources,
            found: true,
        })
    }
}

/// An answer and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantResponse {
    /// State the question was routed to.
    pub state: String,
    /// Collection that was queried.
    pub collection: String,
    pub answer: String,
    /// Chunks the answer was grounded on, best first.
    pub sources: Vec<ContextChunk>,
    /// False when nothing relevant was retrieved.
    pub found: bool,
}

impl AssistantResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str(&format!("\n\n--- Sources ({}) ---\n", self.collection));
            for source in &self.sources {
                output.push_str(&format!(
                    "\n{} p.{} (score: {:.2})",
                    source.source, source.page, source.score
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;
    use crate::testing::{KeywordEmbedder, ScriptedChat};
    use crate::vector_store::MemoryVectorStore;
    use std::sync::Arc;

    fn setup(replies: Vec<&str>) -> (ResponseOrchestrator, KnowledgeBase, Arc<ScriptedChat>) {
        let chat = Arc::new(ScriptedChat::new(replies));
        let kb = KnowledgeBase::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::new()),
        );
        let orchestrator = ResponseOrchestrator::new(
            WildlifeAssistant::new(chat.clone()),
            kb.clone(),
            &AssistantSettings::default(),
        );
        (orchestrator, kb, chat)
    }

    #[tokio::test]
    async fn test_mysore_elephant_question_end_to_end() {
        let (orchestrator, kb, chat) =
            setup(vec!["**Karnataka**", "**Step 1:** File a *crop loss* claim for Rs 25,000"]);

        let collection = kb.create_or_open("karnataka_knowledge_base").await.unwrap();
        let chunks: Vec<TextChunk> = (0..12)
            .map(|i| TextChunk::new(format!("Elephant crop damage rule {}", i), 1, "karnataka.pdf", i))
            .collect();
        collection.add_documents(&chunks).await.unwrap();

        let query = "farmer in Mysore lost crops to elephants";
        let response = orchestrator.get_response(query).await.unwrap();

        assert_eq!(response.state, "karnataka");
        assert_eq!(response.collection, "karnataka_knowledge_base");
        assert!(response.found);
        assert_eq!(response.sources.len(), 10);
        assert!(!response.answer.contains('*'));
        assert_eq!(response.answer, "Step 1: File a crop loss claim for Rs 25,000");

        let calls = chat.calls();
        assert_eq!(calls.len(), 2);
        let expected_context = build_context(&response.sources);
        assert!(calls[1][0].content.contains(&expected_context));
        assert_eq!(calls[1][1].content, query);
    }

    #[tokio::test]
    async fn test_empty_retrieval_skips_answer_prompt() {
        let (orchestrator, _, chat) = setup(vec!["Kerala"]);

        let response = orchestrator.get_response("snake in my house in Kochi").await.unwrap();

        assert_eq!(response.state, "kerala");
        assert!(!response.found);
        assert_eq!(response.answer, "No relevant information found in the database.");
        assert!(response.sources.is_empty());
        assert_eq!(chat.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognised_state_falls_back() {
        let (orchestrator, kb, _) = setup(vec!["None", "Answer"]);
        kb.create_or_open("karnataka_knowledge_base")
            .await
            .unwrap()
            .add_documents(&[TextChunk::new("Leopard sightings must be reported", 3, "k.pdf", 0)])
            .await
            .unwrap();

        let response = orchestrator.get_response("leopard near my village").await.unwrap();
        assert_eq!(response.collection, "karnataka_knowledge_base");
        assert!(response.found);
    }

    #[tokio::test]
    async fn test_routing_ignores_other_states_collections() {
        let (orchestrator, kb, _) = setup(vec!["Telangana"]);
        kb.create_or_open("karnataka_knowledge_base")
            .await
            .unwrap()
            .add_documents(&[TextChunk::new("Elephant crop damage", 1, "k.pdf", 0)])
            .await
            .unwrap();

        let response = orchestrator.get_response("elephant crop damage").await.unwrap();
        assert_eq!(response.collection, "telangana_knowledge_base");
        assert!(!response.found);
    }

    #[tokio::test]
    async fn test_multi_word_state_routes_to_underscored_collection() {
        let chat = Arc::new(ScriptedChat::new(vec!["Tamil Nadu", "Report to the range officer"]));
        let kb = KnowledgeBase::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::new()),
        );
        let settings = AssistantSettings {
            states: vec!["Tamil Nadu".to_string(), "karnataka".to_string()],
            ..AssistantSettings::default()
        };
        let orchestrator =
            ResponseOrchestrator::new(WildlifeAssistant::new(chat.clone()), kb.clone(), &settings);

        kb.create_or_open("tamil_nadu_knowledge_base")
            .await
            .unwrap()
            .add_documents(&[TextChunk::new("Snake bite compensation", 2, "tn.pdf", 0)])
            .await
            .unwrap();

        let response = orchestrator.get_response("snake bite near Coimbatore").await.unwrap();
        assert_eq!(response.state, "tamil nadu");
        assert_eq!(response.collection, "tamil_nadu_knowledge_base");
        assert!(response.found);
    }

    #[test]
    fn test_format_for_display_lists_sources() {
        let response = AssistantResponse {
            state: "kerala".into(),
            collection: "kerala_knowledge_base".into(),
            answer: "Call the forest office.".into(),
            sources: vec![ContextChunk {
                content: "x".into(),
                source: "kerala.pdf".into(),
                page: 4,
                score: 0.91,
            }],
            found: true,
        };
        let text = response.format_for_display();
        assert!(text.starts_with("Call the forest office."));
        assert!(text.contains("kerala.pdf p.4 (score: 0.91)"));
    }
}
