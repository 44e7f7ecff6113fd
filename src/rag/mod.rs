//! Retrieval-augmented answers over the per-state knowledge bases.
//!
//! A question is routed to one state's collection, the best-matching chunks
//! become the context, and the assistant answers from that context alone.

mod context;
mod response;

pub use context::{build_context, ContextChunk};
pub use response::{AssistantResponse, ResponseOrchestrator};

/// Name of the collection holding a state's documents.
///
/// Runs of whitespace become `_` so multi-word states (`tamil nadu`) stay valid names.
pub fn collection_name(state: &str) -> String {
    let state: Vec<&str> = state.split_whitespace().collect();
    format!("{}_knowledge_base", state.join("_"))
}

/// Pick the state a candidate string refers to.
///
/// The whitelist is scanned in order and the first entry contained in the
/// (already lower-cased) candidate wins. No match selects `fallback`.
pub fn select_state<'a>(candidate: &str, whitelist: &'a [String], fallback: &'a str) -> &'a str {
    whitelist
        .iter()
        .find(|state| candidate.contains(state.as_str()))
        .map(String::as_str)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitelist() -> Vec<String> {
        vec!["kerala".into(), "karnataka".into(), "telangana".into()]
    }

    #[test]
    fn test_each_state_is_selected_when_present() {
        let states = whitelist();
        for state in &states {
            for candidate in [
                state.clone(),
                format!("{}.", state),
                format!("the state is {}", state),
                format!("  {}\n", state),
            ] {
                assert_eq!(select_state(&candidate, &states, "karnataka"), state);
            }
        }
    }

    #[test]
    fn test_unmatched_candidates_fall_back() {
        let states = whitelist();
        for candidate in ["none", "", "tamil nadu", "goa", "maharashtra", "kerla"] {
            assert_eq!(select_state(candidate, &states, "karnataka"), "karnataka");
        }
    }

    #[test]
    fn test_first_whitelist_entry_wins() {
        let states = whitelist();
        assert_eq!(select_state("keralanataka", &states, "karnataka"), "kerala");
        assert_eq!(select_state("telangana or kerala", &states, "karnataka"), "kerala");
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(collection_name("karnataka"), "karnataka_knowledge_base");
    }

    #[test]
    fn test_multi_word_state_gives_valid_collection_name() {
        let name = collection_name(" tamil  nadu ");
        assert_eq!(name, "tamil_nadu_knowledge_base");
        assert!(crate::vector_store::validate_collection_name(&name).is_ok());
    }
}
