use std::io::{BufRead, Write};

use pipeshell_core::{ActivityApi, ShellError};
use tracing::info;

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::intent::IntentParser;
use crate::llm::LlmClient;
use crate::prompt::LlmAdapter;

/// One utterance in, one remote call out: adapter, parser, dispatcher in order.
pub struct AgentRuntime<C, A> {
    adapter: LlmAdapter<C>,
    parser: IntentParser,
    dispatcher: Dispatcher<A>,
}

impl<C, A> AgentRuntime<C, A>
where
    C: LlmClient,
    A: ActivityApi,
{
    pub fn new(adapter: LlmAdapter<C>, parser: IntentParser, dispatcher: Dispatcher<A>) -> Self {
        Self { adapter, parser, dispatcher }
    }

    pub async fn handle_utterance<R, W>(
        &self,
        utterance: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<DispatchOutcome, ShellError>
    where
        R: BufRead,
        W: Write,
    {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ShellError::UnknownIntent { name: String::new() });
        }

        let line = self.adapter.complete(utterance).await?;
        let intent = self.parser.parse(&line)?;
        info!(
            event_name = "runtime.intent_resolved",
            method = intent.method.as_str(),
            "utterance resolved to intent"
        );

        self.dispatcher.dispatch(intent, input, output).await
    }
}
