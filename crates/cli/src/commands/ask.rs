use std::io::{self, BufRead, ErrorKind, Write};

use pipeshell_agent::{
    AgentRuntime, DispatchOutcome, Dispatcher, HttpLlmClient, IntentParser, LlmAdapter, LlmClient,
};
use pipeshell_core::config::{AppConfig, LoadOptions};
use pipeshell_core::{ActivityApi, ShellError};
use pipeshell_crm::HttpActivityClient;

use crate::commands::CommandResult;
use crate::logging;

pub const UTTERANCE_PROMPT: &str = "Ask something about your CRM activities: ";

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let error = ShellError::Configuration(error.to_string());
            return CommandResult::plain(error.exit_code(), error.to_string());
        }
    };
    logging::init(&config.logging);

    let llm = match HttpLlmClient::from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => return into_command_result(Err(ShellError::LlmUnavailable(format!("{error:#}")))),
    };
    let runtime = AgentRuntime::new(
        LlmAdapter::new(llm),
        IntentParser::default(),
        Dispatcher::new(HttpActivityClient::from_config(&config.crm)),
    );

    let executor = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(executor) => executor,
        Err(error) => {
            return CommandResult::plain(1, format!("failed to initialize async runtime: {error}"))
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    let result = executor.block_on(execute(&runtime, &mut input, &mut output));
    drop(output);

    into_command_result(result)
}

/// Prompts for one utterance and carries it through to a single remote call.
pub async fn execute<C, A, R, W>(
    runtime: &AgentRuntime<C, A>,
    input: &mut R,
    output: &mut W,
) -> Result<DispatchOutcome, ShellError>
where
    C: LlmClient,
    A: ActivityApi,
    R: BufRead,
    W: Write,
{
    write!(output, "{UTTERANCE_PROMPT}")?;
    output.flush()?;

    let mut utterance = String::new();
    if input.read_line(&mut utterance)? == 0 {
        return Err(ShellError::Input(io::Error::new(
            ErrorKind::UnexpectedEof,
            "no request was entered",
        )));
    }

    runtime.handle_utterance(&utterance, input, output).await
}

/// Completed dispatches (remote errors included) exit 0; the response is already printed.
pub fn into_command_result(result: Result<DispatchOutcome, ShellError>) -> CommandResult {
    match result {
        Ok(_) => CommandResult::plain(0, String::new()),
        Err(error) => {
            if error.is_fatal() {
                tracing::error!(
                    event_name = "shell.aborted",
                    error_class = error.error_class(),
                    "request aborted"
                );
            }
            CommandResult::plain(error.exit_code(), error.to_string())
        }
    }
}
