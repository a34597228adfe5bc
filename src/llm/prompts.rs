use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::{LlmError, LlmResult};

const CHAT_TEMPLATE: &str = include_str!("../../prompts/chat.hbs");
const INSIGHTS_TEMPLATE: &str = include_str!("../../prompts/insights.hbs");

/// Pre-compiled prompt templates.
pub struct PromptLibrary {
    handlebars: Handlebars<'static>,
}

impl PromptLibrary {
    pub fn new() -> LlmResult<Self> {
        let mut handlebars = Handlebars::new();
        // prompts are plain text, JSON context must pass through untouched
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string("chat", CHAT_TEMPLATE)
            .map_err(|err| LlmError::Prompt(err.to_string()))?;
        handlebars
            .register_template_string("insights", INSIGHTS_TEMPLATE)
            .map_err(|err| LlmError::Prompt(err.to_string()))?;
        Ok(Self { handlebars })
    }

    pub fn chat<S: Serialize>(&self, query: &str, context: &Value, sources: &[S]) -> LlmResult<String> {
        let context = serde_json::to_string_pretty(context)
            .map_err(|err| LlmError::Prompt(err.to_string()))?;
        Ok(self.handlebars.render(
            "chat",
            &json!({
                "query": query,
                "context": context,
                "sources": sources,
            }),
        )?)
    }

    pub fn insights(&self, task: &str, focus_areas: &[String], analysis: &Value) -> LlmResult<String> {
        let analysis = serde_json::to_string_pretty(analysis)
            .map_err(|err| LlmError::Prompt(err.to_string()))?;
        Ok(self.handlebars.render(
            "insights",
            &json!({
                "task": task,
                "focus_areas": focus_areas.join(", "),
                "analysis": analysis,
            }),
        )?)
    }
}
