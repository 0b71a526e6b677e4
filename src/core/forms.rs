use std::collections::BTreeMap;
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};
use crate::core::command::CommandError;
use crate::core::controller::{AppState, ServerError};
use crate::core::library::LibraryResult;
use crate::core::validation::{ValidationError, ValidationResult};
use crate::core::view::{form, page, Message};

// FormErrors collects field level and form level error messages
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    general: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.fields.entry(field.to_string()).or_default().push(message.to_string());
    }

    pub fn add_general(&mut self, message: &str) {
        self.general.push(message.to_string());
    }

    // records a failed check and hands back the cleaned value otherwise
    pub fn check<T>(&mut self, res: ValidationResult<T>) -> Option<T> {
        match res {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(err.field(), err.to_string().as_str());
                None
            }
        }
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn general(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }
}

impl From<ValidationError> for FormErrors {
    fn from(err: ValidationError) -> Self {
        let mut errors = FormErrors::new();
        errors.add(err.field(), err.to_string().as_str());
        errors
    }
}

// FormError separates bad input, which re-renders the form, from failures of the store
#[derive(Debug)]
pub enum FormError {
    Invalid(FormErrors),
    Command(CommandError),
}

impl From<FormErrors> for FormError {
    fn from(errors: FormErrors) -> Self {
        FormError::Invalid(errors)
    }
}

impl From<CommandError> for FormError {
    fn from(err: CommandError) -> Self {
        FormError::Command(err)
    }
}

// RecordForm is implemented by every "create a record" form; the generic
// handlers below render, validate and save any of them.
#[async_trait]
pub trait RecordForm: DeserializeOwned + Default + Send + Sync + 'static {
    // name of the record in titles and notices
    const ITEM_NAME: &'static str;
    // where the form is served; successful saves redirect back here
    const PATH: &'static str;

    fn title() -> String {
        format!("Register new {}", Self::ITEM_NAME.to_lowercase())
    }

    fn error_message() -> String {
        format!("Error registering {}. Check the fields.", Self::ITEM_NAME.to_lowercase())
    }

    // html of the form fields, filled with the submitted values
    async fn render_fields(&self, state: &AppState, errors: &FormErrors) -> LibraryResult<String>;

    // validates and persists the record, returning its id
    async fn save(&self, state: &AppState) -> Result<String, FormError>;

    // success notice for a saved record
    async fn describe(state: &AppState, id: &str) -> LibraryResult<String>;
}

#[derive(Debug, Default, Deserialize)]
pub struct FormNotice {
    pub created: Option<String>,
}

#[derive(Debug)]
pub enum FormOutcome {
    Saved { id: String, location: String },
    Invalid(Html<String>),
}

impl IntoResponse for FormOutcome {
    fn into_response(self) -> Response {
        match self {
            FormOutcome::Saved { location, .. } => Redirect::to(location.as_str()).into_response(),
            FormOutcome::Invalid(html) => html.into_response(),
        }
    }
}

async fn render_form<F: RecordForm>(state: &AppState, record: &F, errors: &FormErrors,
                                    mut messages: Vec<Message>) -> LibraryResult<Html<String>> {
    for general in errors.general() {
        messages.push(Message::error(general));
    }
    let fields = record.render_fields(state, errors).await?;
    Ok(page(F::title().as_str(), &messages, form(F::PATH, fields.as_str(), "Save").as_str()))
}

pub async fn new_record<F: RecordForm>(
    State(state): State<AppState>,
    Query(notice): Query<FormNotice>) -> Result<Html<String>, ServerError> {
    let mut messages = vec![];
    if let Some(id) = notice.created {
        match F::describe(&state, id.as_str()).await {
            Ok(text) => messages.push(Message::success(text.as_str())),
            Err(err) => debug!(item = F::ITEM_NAME, id = %id, error = %err, "no notice for created record"),
        }
    }
    Ok(render_form(&state, &F::default(), &FormErrors::new(), messages).await?)
}

pub async fn create_record<F: RecordForm>(
    State(state): State<AppState>,
    Form(record): Form<F>) -> Result<FormOutcome, ServerError> {
    let errors = match record.save(&state).await {
        Ok(id) => {
            info!(item = F::ITEM_NAME, id = %id, "record created");
            let location = format!("{}?created={}", F::PATH, id);
            return Ok(FormOutcome::Saved { id, location });
        }
        Err(FormError::Invalid(errors)) => errors,
        Err(FormError::Command(err)) if err.is_user_error() => {
            let mut errors = FormErrors::new();
            errors.add_general(err.message());
            errors
        }
        Err(FormError::Command(err)) => return Err(ServerError::from(err)),
    };
    warn!(item = F::ITEM_NAME, errors = ?errors, "rejected form submission");
    let html = render_form(&state, &record, &errors, vec![Message::error(F::error_message().as_str())]).await?;
    Ok(FormOutcome::Invalid(html))
}
