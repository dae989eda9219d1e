//! One-shot question handler

use crate::api::types::QueryResponse;
use crate::cli::output::*;
use crate::rag::AnswerPipeline;
use crate::rag::ResourceBundle;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ask(
    config: &AppConfig,
    question: &str,
    max_results: Option<usize>,
    json: bool,
) -> Result<()> {
    let resources = ResourceBundle::from_config(config).await;
    if !json && !resources.rag_available() {
        print_warning("Vector index unavailable, answering from general knowledge");
    }

    let pipeline = AnswerPipeline::new(&resources, config);
    let result = pipeline.answer(question, max_results).await?;

    if json {
        let body = QueryResponse::from(result);
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_answer(&result);
    }

    Ok(())
}
