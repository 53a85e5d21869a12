use pipeshell_core::ShellError;
use tracing::{debug, warn};

use crate::llm::LlmClient;

pub const USER_QUERY_PLACEHOLDER: &str = "{user_query}";

pub const INTENT_PROMPT_TEMPLATE: &str = r#"
You are an AI assistant for interacting with a CRM's activities API. Based on the user's query, return the exact method name and any relevant parameters as a comma-separated list. Only use the following method names:
- "get all activities"
- "get activity by id"
- "create activity"
- "update activity"
- "delete activity"

For example:
- "Get all activities" -> get all activities
- "Show details for activity 25" -> get activity by id, 25
- "Create an activity for deal 2" -> create activity, deal_id=2
- "Update activity 52" -> update activity, 52
- "Delete activity 30" -> delete activity, 30

User query: "{user_query}"

Method and parameters:
"#;

pub fn render_prompt(template: &str, utterance: &str) -> String {
    template.replace(USER_QUERY_PLACEHOLDER, utterance.trim())
}

/// Turns an utterance into the model's one-line method/parameter answer.
pub struct LlmAdapter<C> {
    client: C,
    template: String,
}

impl<C> LlmAdapter<C>
where
    C: LlmClient,
{
    pub fn new(client: C) -> Self {
        Self::with_template(client, INTENT_PROMPT_TEMPLATE)
    }

    pub fn with_template(client: C, template: impl Into<String>) -> Self {
        Self { client, template: template.into() }
    }

    pub async fn complete(&self, utterance: &str) -> Result<String, ShellError> {
        let prompt = render_prompt(&self.template, utterance);
        let text = self.client.complete(&prompt).await.map_err(|error| {
            warn!(event_name = "llm.completion.failed", error = %format!("{error:#}"));
            ShellError::LlmUnavailable(format!("{error:#}"))
        })?;

        debug!(event_name = "llm.completion.received", response = %text.trim());
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use pipeshell_core::ShellError;

    use super::{render_prompt, LlmAdapter, INTENT_PROMPT_TEMPLATE};
    use crate::llm::LlmClient;

    struct ScriptedClient {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().expect("prompt lock").push(prompt.to_string());
            self.reply.clone().map_err(|message| anyhow!(message))
        }
    }

    #[test]
    fn template_lists_every_method_phrase_and_example() {
        for phrase in [
            "\"get all activities\"",
            "\"get activity by id\"",
            "\"create activity\"",
            "\"update activity\"",
            "\"delete activity\"",
        ] {
            assert!(INTENT_PROMPT_TEMPLATE.contains(phrase), "missing {phrase}");
        }
        assert_eq!(INTENT_PROMPT_TEMPLATE.matches(" -> ").count(), 5);
    }

    #[test]
    fn utterance_is_interpolated() {
        let prompt = render_prompt(INTENT_PROMPT_TEMPLATE, "  Show details for activity 25 ");

        assert!(prompt.contains("User query: \"Show details for activity 25\""));
        assert!(!prompt.contains("{user_query}"));
    }

    #[tokio::test]
    async fn adapter_trims_model_output() {
        let client =
            ScriptedClient { reply: Ok("  get all activities\n".to_string()), prompts: Mutex::default() };
        let adapter = LlmAdapter::new(client);

        let text = adapter.complete("Get all activities").await.expect("completion");

        assert_eq!(text, "get all activities");
    }

    #[tokio::test]
    async fn client_failure_is_llm_unavailable() {
        let client = ScriptedClient {
            reply: Err("401 invalid api key".to_string()),
            prompts: Mutex::default(),
        };
        let adapter = LlmAdapter::with_template(client, "{user_query}");

        let error = adapter.complete("Get all activities").await.unwrap_err();

        assert!(matches!(error, ShellError::LlmUnavailable(ref reason) if reason.contains("401")));
    }
}
