//! Typed survey operations.
//!
//! Each operation runs in its own scoped session and wraps failures with the
//! operation name, so callers see `failed to list surveys: ...` rather than a
//! bare transport or remote error.

use std::sync::Arc;

use limerc_auth::CredentialSource;
use limerc_core::{CallRequest, Credentials, RpcFault, RpcOutcome};
use limerc_settings::{LimercSettings, SurveySettings};
use rand::Rng;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::dispatcher::{RpcDispatcher, SessionCaller};
use crate::errors::RpcError;
use crate::normalize::token_value;

/// Range of survey ids picked for new surveys.
const NEW_SURVEY_IDS: std::ops::RangeInclusive<u32> = 100_000..=999_999;

/// Name given to the group created when a question has no group.
const DEFAULT_GROUP_NAME: &str = "Default Group";
const DEFAULT_GROUP_DESCRIPTION: &str = "Default question group";

/// Survey-level client over an [`RpcDispatcher`].
pub struct SurveyClient {
    dispatcher: RpcDispatcher,
    credentials: Arc<dyn CredentialSource>,
    defaults: SurveySettings,
}

impl SurveyClient {
    /// Create a client. Credentials are resolved on every call.
    pub fn new(
        dispatcher: RpcDispatcher,
        credentials: Arc<dyn CredentialSource>,
        defaults: SurveySettings,
    ) -> Self {
        Self {
            dispatcher,
            credentials,
            defaults,
        }
    }

    /// Create a client that speaks HTTP to the configured endpoint.
    pub fn from_settings(
        settings: &LimercSettings,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, RpcError> {
        let dispatcher = RpcDispatcher::from_settings(&settings.endpoint)?;
        Ok(Self::new(dispatcher, credentials, settings.survey.clone()))
    }

    /// Defaults used by [`create_survey`](Self::create_survey) and
    /// [`add_question`](Self::add_question).
    pub fn defaults(&self) -> &SurveySettings {
        &self.defaults
    }

    fn resolve_credentials(&self) -> Result<Credentials, RpcError> {
        Ok(self.credentials.credentials()?)
    }

    /// Run an arbitrary call in a fresh session.
    pub async fn execute(&mut self, call: CallRequest) -> Result<RpcOutcome, RpcError> {
        let credentials = self.resolve_credentials()?;
        self.dispatcher.execute(call, &credentials).await
    }

    async fn single(
        &mut self,
        operation: &'static str,
        method: &'static str,
        args: Vec<Value>,
    ) -> Result<Value, RpcError> {
        let credentials = self.resolve_credentials().map_err(|e| e.during(operation))?;
        self.dispatcher
            .with_session(&credentials, |caller| async move {
                caller.call_value(method, args).await
            })
            .await
            .map_err(|e| e.during(operation))
    }

    /// All surveys visible to the account.
    pub async fn list_surveys(&mut self) -> Result<Value, RpcError> {
        self.single("list surveys", "list_surveys", Vec::new()).await
    }

    /// Responses of a survey, exported as JSON.
    pub async fn export_responses(&mut self, survey_id: &str) -> Result<Value, RpcError> {
        self.single(
            "get survey responses",
            "export_responses",
            vec![token_value(survey_id), json!("json")],
        )
        .await
    }

    /// Survey settings and metadata.
    pub async fn get_survey_properties(&mut self, survey_id: &str) -> Result<Value, RpcError> {
        self.single(
            "get survey properties",
            "get_survey_properties",
            vec![token_value(survey_id)],
        )
        .await
    }

    /// Questions of a survey.
    pub async fn list_questions(&mut self, survey_id: &str) -> Result<Value, RpcError> {
        self.single("list questions", "list_questions", vec![token_value(survey_id)])
            .await
    }

    /// Response statistics of a survey (every statistic the remote offers).
    pub async fn get_summary(&mut self, survey_id: &str) -> Result<Value, RpcError> {
        self.single(
            "get survey statistics",
            "get_summary",
            vec![token_value(survey_id), json!("all")],
        )
        .await
    }

    /// Make a survey available for responses.
    pub async fn activate_survey(&mut self, survey_id: &str) -> Result<Value, RpcError> {
        self.single("activate survey", "activate_survey", vec![token_value(survey_id)])
            .await
    }

    /// Create a survey under a random six-digit id.
    ///
    /// Returns the `add_survey` result (the id the remote assigned). A
    /// non-empty `description` is stored with `set_language_properties` in
    /// the same session.
    pub async fn create_survey(
        &mut self,
        title: &str,
        description: Option<&str>,
        language: Option<&str>,
    ) -> Result<Value, RpcError> {
        const OPERATION: &str = "create survey";

        let credentials = self.resolve_credentials().map_err(|e| e.during(OPERATION))?;
        let language = language.unwrap_or(self.defaults.default_language.as_str()).to_string();
        let format = self.defaults.format.clone();
        let requested_id: u32 = rand::rng().random_range(NEW_SURVEY_IDS);
        let title = title.to_string();
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        debug!(survey_id = requested_id, %language, "creating survey");
        let created = self
            .dispatcher
            .with_session(&credentials, |caller| async move {
                let created = caller
                    .call_value(
                        "add_survey",
                        vec![json!(requested_id), json!(title), json!(language), json!(format)],
                    )
                    .await?;

                if let Some(description) = description {
                    let survey_id = match &created {
                        Value::Number(_) => created.clone(),
                        _ => json!(requested_id),
                    };
                    let _ = caller
                        .call_value(
                            "set_language_properties",
                            vec![
                                survey_id,
                                json!({"surveyls_description": description}),
                                json!(language),
                            ],
                        )
                        .await?;
                }
                Ok(created)
            })
            .await
            .map_err(|e| e.during(OPERATION))?;

        info!(result = %created, "survey created");
        Ok(created)
    }

    /// Add a question to a survey.
    ///
    /// Without a `group_id` a default group is created first, in the same
    /// session. `question_type` falls back to the configured default.
    pub async fn add_question(
        &mut self,
        survey_id: &str,
        question: &str,
        question_type: Option<&str>,
        group_id: Option<Value>,
    ) -> Result<Value, RpcError> {
        const OPERATION: &str = "add question";

        let credentials = self.resolve_credentials().map_err(|e| e.during(OPERATION))?;
        let survey_id = token_value(survey_id);
        let question_type = question_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.defaults.default_question_type.as_str())
            .to_string();
        let question = question.to_string();
        let code = format!("Q{}", chrono::Utc::now().timestamp_millis());

        self.dispatcher
            .with_session(&credentials, |caller| async move {
                let gid = match group_id.filter(|g| !g.is_null()) {
                    Some(gid) => gid,
                    None => create_default_group(&caller, &survey_id).await?,
                };
                let question_data = json!({
                    "title": code,
                    "question": question,
                    "type": question_type,
                    "gid": gid,
                    "mandatory": "N",
                    "other": "N",
                    "same_default": 0,
                });
                caller
                    .call_value("add_question", vec![survey_id, question_data])
                    .await
            })
            .await
            .map_err(|e| e.during(OPERATION))
    }
}

async fn create_default_group(caller: &SessionCaller, survey_id: &Value) -> Result<Value, RpcError> {
    let result = caller
        .call_value(
            "add_group",
            vec![
                survey_id.clone(),
                json!({
                    "group_name": DEFAULT_GROUP_NAME,
                    "description": DEFAULT_GROUP_DESCRIPTION,
                }),
            ],
        )
        .await?;
    group_id_from_result(result)
}

/// `add_group` answers with the new id, either bare or as `{"gid": ...}`.
fn group_id_from_result(result: Value) -> Result<Value, RpcError> {
    let missing = |detail: String| RpcError::Remote {
        method: "add_group".to_string(),
        fault: RpcFault::new(detail),
    };
    match result {
        Value::Object(mut obj) => match obj.remove("gid").filter(|g| !g.is_null()) {
            Some(gid) => Ok(gid),
            None => Err(missing(match obj.get("status") {
                Some(Value::String(status)) => status.clone(),
                _ => "no group id in result".to_string(),
            })),
        },
        Value::Number(n) => Ok(Value::Number(n)),
        Value::String(s) if !s.trim().is_empty() => Ok(Value::String(s)),
        other => Err(missing(format!("no group id in result {other}"))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
