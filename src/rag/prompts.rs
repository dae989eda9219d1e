//! Prompt templates for documentation answers

use crate::config::AssistantConfig;
use crate::models::ComposedPrompt;
use crate::models::RetrievedSnippet;
use crate::rag::ContextAssembler;

/// Builds the instructions sent to the completer.
///
/// The grounded variant embeds retrieved documentation as context; the
/// unaided variant sends the bare question and points the user at the
/// official docs.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    assistant: AssistantConfig,
}

impl PromptComposer {
    pub fn new(assistant: AssistantConfig) -> Self {
        Self { assistant }
    }

    pub fn grounded(&self, query: &str, snippets: &[RetrievedSnippet]) -> ComposedPrompt {
        let system = format!(
            r"{persona}

Use the provided documentation context to answer the user's question accurately and helpfully. If the context doesn't contain enough information to fully answer the question, say so and provide what information you can from the context.

Always base your answer primarily on the provided context. Be specific and include relevant details from the documentation.",
            persona = self.persona()
        );

        let user = format!(
            r"Context from {product} documentation:
{context}

Question: {query}

Please provide a helpful answer based on the documentation context above.",
            product = self.assistant.product_name,
            context = ContextAssembler::assemble(snippets),
        );

        ComposedPrompt::new(system, user)
    }

    pub fn unaided(&self, query: &str) -> ComposedPrompt {
        let system = format!(
            r"{persona}

Provide helpful answers about {product}'s services based on your general knowledge. Always recommend checking the official {product} documentation at {docs} for the most up-to-date information.",
            persona = self.persona(),
            product = self.assistant.product_name,
            docs = docs_host(&self.assistant.docs_url),
        );

        ComposedPrompt::new(system, query.to_string())
    }

    fn persona(&self) -> String {
        format!(
            "You are a helpful customer support assistant for {}, {}.",
            self.assistant.product_name, self.assistant.product_description
        )
    }
}

/// Docs URL without its scheme, as people write it in prose
fn docs_host(docs_url: &str) -> &str {
    let without_scheme = docs_url
        .strip_prefix("https://")
        .or_else(|| docs_url.strip_prefix("http://"))
        .unwrap_or(docs_url);
    without_scheme.trim_end_matches('/')
}
