//! Named tools over [`SurveyClient`].
//!
//! Each tool takes one line of text and returns one string: pretty-printed
//! JSON on success, or a human-readable `Error...` line. Nothing here returns
//! a Rust error; the string is the whole contract.

use std::fmt;
use std::str::FromStr;

use limerc_core::{CallRequest, RpcOutcome, TransportFaultKind};
use serde_json::Value;
use tracing::debug;

use crate::errors::RpcError;
use crate::survey::SurveyClient;

/// Every tool this crate exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurveyTool {
    /// Generic `limesurvey` tool: any command or JSON call description.
    Command,
    /// `list_surveys`
    ListSurveys,
    /// `get_survey_responses`
    GetSurveyResponses,
    /// `get_survey_properties`
    GetSurveyProperties,
    /// `list_questions`
    ListQuestions,
    /// `get_survey_statistics`
    GetSurveyStatistics,
    /// `create_survey`
    CreateSurvey,
    /// `add_question`
    AddQuestion,
    /// `activate_survey`
    ActivateSurvey,
}

impl SurveyTool {
    /// All tools, generic command first.
    pub const ALL: [Self; 9] = [
        Self::Command,
        Self::ListSurveys,
        Self::GetSurveyResponses,
        Self::GetSurveyProperties,
        Self::ListQuestions,
        Self::GetSurveyStatistics,
        Self::CreateSurvey,
        Self::AddQuestion,
        Self::ActivateSurvey,
    ];

    /// Tool name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Command => "limesurvey",
            Self::ListSurveys => "list_surveys",
            Self::GetSurveyResponses => "get_survey_responses",
            Self::GetSurveyProperties => "get_survey_properties",
            Self::ListQuestions => "list_questions",
            Self::GetSurveyStatistics => "get_survey_statistics",
            Self::CreateSurvey => "create_survey",
            Self::AddQuestion => "add_question",
            Self::ActivateSurvey => "activate_survey",
        }
    }

    /// One-paragraph description, including the expected input format.
    pub fn description(self) -> &'static str {
        match self {
            Self::Command => {
                "Call any RemoteControl method. Input is either a command line such as \
                 \"get_survey_properties 123\" or a JSON object {\"method\": ..., \"params\": ...} \
                 where params is an array (positional) or an object (surveyId, participantData, args)."
            }
            Self::ListSurveys => {
                "List all surveys available in LimeSurvey. Returns survey ID, title, language, \
                 and other details."
            }
            Self::GetSurveyResponses => {
                "Get all responses for a specific survey. Provide the survey ID as input."
            }
            Self::GetSurveyProperties => {
                "Get properties and details of a specific survey. Provide the survey ID as input."
            }
            Self::ListQuestions => {
                "List all questions in a specific survey. Provide the survey ID as input."
            }
            Self::GetSurveyStatistics => {
                "Get statistics and summary for a specific survey. Provide the survey ID as input."
            }
            Self::CreateSurvey => {
                "Create a new survey. Provide the survey title as input. You can also include \
                 \"|description\" to add a description."
            }
            Self::AddQuestion => {
                "Add a question to a survey. Format: \"surveyId|questionText|questionType\". \
                 Question types: T=Long text, S=Short text, L=List (radio), O=List with comment, \
                 etc. The type defaults to T."
            }
            Self::ActivateSurvey => {
                "Activate a survey to make it available for responses. Provide the survey ID as input."
            }
        }
    }
}

impl fmt::Display for SurveyTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown tool name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for SurveyTool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// Run `tool` with `input` and render the result as text.
#[tracing::instrument(skip_all, fields(tool = tool.name()))]
pub async fn invoke(client: &mut SurveyClient, tool: SurveyTool, input: &str) -> String {
    let input = input.trim();
    debug!(input_len = input.len(), "invoking tool");

    let result = match tool {
        SurveyTool::Command => return run_command(client, input).await,
        SurveyTool::ListSurveys => client.list_surveys().await,
        SurveyTool::GetSurveyResponses => match survey_id(input) {
            Ok(id) => client.export_responses(id).await,
            Err(message) => return message,
        },
        SurveyTool::GetSurveyProperties => match survey_id(input) {
            Ok(id) => client.get_survey_properties(id).await,
            Err(message) => return message,
        },
        SurveyTool::ListQuestions => match survey_id(input) {
            Ok(id) => client.list_questions(id).await,
            Err(message) => return message,
        },
        SurveyTool::GetSurveyStatistics => match survey_id(input) {
            Ok(id) => client.get_summary(id).await,
            Err(message) => return message,
        },
        SurveyTool::ActivateSurvey => match survey_id(input) {
            Ok(id) => client.activate_survey(id).await,
            Err(message) => return message,
        },
        SurveyTool::CreateSurvey => {
            let (title, description) = match input.split_once('|') {
                Some((title, description)) => (title.trim(), Some(description)),
                None => (input, None),
            };
            if title.is_empty() {
                return "Error: Please provide a survey title".to_string();
            }
            client.create_survey(title, description, None).await
        }
        SurveyTool::AddQuestion => {
            let parts: Vec<&str> = input.split('|').map(str::trim).collect();
            let survey = parts.first().copied().unwrap_or_default();
            let text = parts.get(1).copied().unwrap_or_default();
            if survey.is_empty() || text.is_empty() {
                return "Error: Please provide surveyId|questionText|questionType (optional)"
                    .to_string();
            }
            client
                .add_question(survey, text, parts.get(2).copied(), None)
                .await
        }
    };

    match result {
        Ok(value) => render_value(&value),
        Err(e) => render_error(&e),
    }
}

async fn run_command(client: &mut SurveyClient, input: &str) -> String {
    if input.is_empty() {
        return "Error: Please provide a command".to_string();
    }

    let call = if input.starts_with('{') {
        let parsed = serde_json::from_str::<Value>(input)
            .map_err(|e| e.to_string())
            .and_then(|value| CallRequest::from_json(&value).map_err(|e| e.to_string()));
        match parsed {
            Ok(call) => call,
            Err(e) => return format!("Error: invalid call description: {e}"),
        }
    } else {
        CallRequest::freeform(input)
    };

    let method = call.method_name().unwrap_or_default().to_string();
    match client.execute(call).await {
        Ok(RpcOutcome::Success(value)) => render_value(&value),
        Ok(RpcOutcome::Fault(fault)) => format!("Error in method {method}: {fault}"),
        Err(e) => render_error(&e),
    }
}

fn survey_id(input: &str) -> Result<&str, String> {
    if input.is_empty() {
        Err("Error: Please provide a survey ID".to_string())
    } else {
        Ok(input)
    }
}

/// Pretty-print a result value.
pub fn render_value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render an error as a single line a person can act on.
pub fn render_error(err: &RpcError) -> String {
    match err.root() {
        RpcError::Authentication { message } => {
            format!("Error: invalid credentials, login was rejected ({message})")
        }
        RpcError::Credentials(e) => format!("Error: no credentials available ({e})"),
        RpcError::Transport(fault) => match fault.kind {
            TransportFaultKind::Timeout => format!("Error: request timed out ({})", fault.detail),
            TransportFaultKind::ConnectionRefused | TransportFaultKind::DnsFailure => {
                format!("Error: connection failed ({fault})")
            }
            TransportFaultKind::ProtocolError => {
                format!("Error: unexpected reply from server ({})", fault.detail)
            }
        },
        RpcError::Remote { method, fault } => format!("Error in method {method}: {fault}"),
        RpcError::Client(detail) => format!("Error: connection failed ({detail})"),
        RpcError::InvalidRequest(_) | RpcError::Operation { .. } => format!("Error: {err}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use limerc_auth::StaticCredentials;
    use limerc_core::{Credentials, RpcFault, TransportFault};
    use limerc_settings::SurveySettings;
    use serde_json::json;

    use crate::dispatcher::RpcDispatcher;
    use crate::session::GET_SESSION_KEY;
    use crate::testing::{DEFAULT_TOKEN, Reply, ScriptedTransport};

    fn client(transport: &Arc<ScriptedTransport>) -> SurveyClient {
        SurveyClient::new(
            RpcDispatcher::new(transport.clone(), Duration::from_secs(10)),
            Arc::new(StaticCredentials::new(Credentials::new("admin", "pw"))),
            SurveySettings::default(),
        )
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for tool in SurveyTool::ALL {
            assert_eq!(tool.name().parse::<SurveyTool>().unwrap(), tool);
            assert!(!tool.description().is_empty());
        }
        assert_eq!(
            "drop_tables".parse::<SurveyTool>(),
            Err(UnknownTool("drop_tables".to_string()))
        );
    }

    #[tokio::test]
    async fn survey_id_tools_require_input() {
        let transport = ScriptedTransport::new();
        let mut client = client(&transport);

        for tool in [
            SurveyTool::GetSurveyResponses,
            SurveyTool::GetSurveyProperties,
            SurveyTool::ListQuestions,
            SurveyTool::GetSurveyStatistics,
            SurveyTool::ActivateSurvey,
        ] {
            let out = invoke(&mut client, tool, "   ").await;
            assert_eq!(out, "Error: Please provide a survey ID");
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn success_is_pretty_json() {
        let transport = ScriptedTransport::new();
        transport.on("get_survey_properties", Reply::Ok(json!({"sid": 12, "active": "N"})));
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::GetSurveyProperties, " 12 ").await;
        assert_eq!(out, "{\n  \"sid\": 12,\n  \"active\": \"N\"\n}");
        assert_eq!(transport.calls()[1].params(), &[json!(DEFAULT_TOKEN), json!(12)]);
    }

    #[tokio::test]
    async fn create_survey_splits_title_and_description() {
        let transport = ScriptedTransport::new();
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::CreateSurvey, "|no title").await;
        assert_eq!(out, "Error: Please provide a survey title");
        assert!(transport.calls().is_empty());

        let _ = invoke(&mut client, SurveyTool::CreateSurvey, "Team check-in|Weekly").await;
        assert_eq!(transport.count("add_survey"), 1);
        assert_eq!(transport.count("set_language_properties"), 1);
        assert_eq!(transport.calls()[1].params()[2], json!("Team check-in"));
    }

    #[tokio::test]
    async fn add_question_parses_parts() {
        let transport = ScriptedTransport::new();
        transport.on("add_group", Reply::Ok(json!(3)));
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::AddQuestion, "77").await;
        assert!(out.starts_with("Error: Please provide surveyId|questionText"));

        let _ = invoke(&mut client, SurveyTool::AddQuestion, "77|Your role?|S").await;
        let question = transport
            .calls()
            .into_iter()
            .find(|c| c.method() == "add_question")
            .unwrap();
        assert_eq!(question.params()[1], json!(77));
        assert_eq!(question.params()[2]["type"], json!("S"));
        assert_eq!(question.params()[2]["gid"], json!(3));
    }

    #[tokio::test]
    async fn command_accepts_freeform_and_json() {
        let transport = ScriptedTransport::new();
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::Command, "add_participants 77 a@x.com").await;
        assert_eq!(out, "\"OK\"");

        let out = invoke(
            &mut client,
            SurveyTool::Command,
            r#"{"method": "export_responses", "params": {"args": ["json"], "surveyId": 5}}"#,
        )
        .await;
        assert_eq!(out, "\"OK\"");

        let calls = transport.calls();
        assert_eq!(
            calls[1].params(),
            &[json!(DEFAULT_TOKEN), json!(77), json!("a@x.com")]
        );
        assert_eq!(
            calls[4].params(),
            &[json!(DEFAULT_TOKEN), json!(5), json!("json")]
        );
    }

    #[tokio::test]
    async fn command_reports_bad_json_without_login() {
        let transport = ScriptedTransport::new();
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::Command, r#"{"params": []}"#).await;
        assert_eq!(out, "Error: invalid call description: call description is missing a method name");
        let out = invoke(&mut client, SurveyTool::Command, "{not json").await;
        assert!(out.starts_with("Error: invalid call description"));
        let out = invoke(&mut client, SurveyTool::Command, "").await;
        assert_eq!(out, "Error: Please provide a command");
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn remote_fault_names_the_method() {
        let transport = ScriptedTransport::new();
        transport.on("list_participants", Reply::Fault(RpcFault::new("No participants found.")));
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::Command, "list_participants 9").await;
        assert_eq!(out, "Error in method list_participants: No participants found.");
    }

    #[tokio::test]
    async fn failures_are_classified() {
        let transport = ScriptedTransport::new();
        transport.on(GET_SESSION_KEY, Reply::Ok(json!({"status": "Invalid user name or password"})));
        transport.on(
            GET_SESSION_KEY,
            Reply::Transport(TransportFault::connection_refused("tcp connect error")),
        );
        transport.on("list_surveys", Reply::Transport(TransportFault::timeout("no reply")));
        let mut client = client(&transport);

        let out = invoke(&mut client, SurveyTool::ListSurveys, "").await;
        assert!(out.starts_with("Error: invalid credentials"), "{out}");
        let out = invoke(&mut client, SurveyTool::ListSurveys, "").await;
        assert!(out.starts_with("Error: connection failed"), "{out}");
        let out = invoke(&mut client, SurveyTool::ListSurveys, "").await;
        assert_eq!(out, "Error: request timed out (no reply)");
    }
}
