use std::io::{BufRead, Write};

use pipeshell_core::{
    ActivityApi, ActivityDraft, ActivityId, ApiResponse, CanonicalMethod, ParsedIntent, ShellError,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::slots::SlotFiller;

#[derive(Clone, Debug, PartialEq)]
pub struct DispatchOutcome {
    pub method: CanonicalMethod,
    pub response: ApiResponse,
}

/// Binds canonical methods to remote calls. Stateless between invocations.
pub struct Dispatcher<A> {
    api: A,
}

impl<A> Dispatcher<A>
where
    A: ActivityApi,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn dispatch<R, W>(
        &self,
        intent: ParsedIntent,
        input: &mut R,
        output: &mut W,
    ) -> Result<DispatchOutcome, ShellError>
    where
        R: BufRead,
        W: Write,
    {
        let ParsedIntent { method, params } = intent;
        let id = required_id(method, &params.positional)?;

        let surplus = params.positional.len().saturating_sub(method.required_positionals().len());
        if surplus > 0 {
            warn!(event_name = "dispatch.surplus_positionals", method = method.as_str(), surplus);
        }
        if !method.consumes_draft() && !params.keywords.is_empty() {
            warn!(
                event_name = "dispatch.ignored_keywords",
                method = method.as_str(),
                count = params.keywords.len()
            );
        }

        let response = match (method, id) {
            (CanonicalMethod::ListAll, _) => self.api.list_all().await?,
            (CanonicalMethod::GetById, Some(id)) => self.api.get_by_id(id).await?,
            (CanonicalMethod::Delete, Some(id)) => self.api.delete(id).await?,
            (CanonicalMethod::Create, _) => {
                let draft = SlotFiller::new(input, output).fill(&params.keywords)?;
                echo_payload(output, &draft)?;
                self.api.create(&draft).await?
            }
            (CanonicalMethod::Update, Some(id)) => {
                let draft = SlotFiller::new(input, output).fill(&params.keywords)?;
                echo_payload(output, &draft)?;
                self.api.update(id, &draft).await?
            }
            (method, None) => {
                return Err(ShellError::MissingArgument { method, argument: "activity id" })
            }
        };

        if let Some(remote_error) = &response.remote_error {
            writeln!(output, "{remote_error}")?;
        }
        writeln!(output, "{}", render_json(response.body.as_ref().unwrap_or(&Value::Null)))?;

        info!(
            event_name = "dispatch.completed",
            method = method.as_str(),
            status = response.status,
            remote_error = response.remote_error.is_some()
        );
        Ok(DispatchOutcome { method, response })
    }
}

/// Validates positional arity and parses the activity id where one is needed.
fn required_id(
    method: CanonicalMethod,
    positional: &[String],
) -> Result<Option<ActivityId>, ShellError> {
    let required = method.required_positionals();
    if let Some(missing) = required.get(positional.len()) {
        return Err(ShellError::MissingArgument { method, argument: *missing });
    }
    if required.is_empty() {
        return Ok(None);
    }
    Ok(Some(ActivityId::parse(&positional[0])?))
}

fn echo_payload<W: Write>(output: &mut W, draft: &ActivityDraft) -> Result<(), ShellError> {
    let payload = serde_json::to_value(draft).unwrap_or(Value::Null);
    writeln!(output, "Data being sent to API: {}", render_json(&payload))?;
    Ok(())
}

pub fn render_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
