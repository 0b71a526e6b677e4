use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::Command;
use crate::core::controller::AppState;
use crate::core::forms::{FormError, FormErrors, RecordForm};
use crate::core::library::LibraryResult;
use crate::core::validation::{validate_email, validate_text, MAX_CATEGORY, MAX_MEMBER_NAME};
use crate::core::view::input;
use crate::members::command::add_member_cmd::{AddMemberCommand, AddMemberCommandRequest};
use crate::members::factory;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MemberForm {
    pub name: String,
    pub contact: String,
    pub category: String,
}

#[async_trait]
impl RecordForm for MemberForm {
    const ITEM_NAME: &'static str = "Member";
    const PATH: &'static str = "/members/new";

    async fn render_fields(&self, _state: &AppState, errors: &FormErrors) -> LibraryResult<String> {
        Ok([
            input("text", "name", "Name", &self.name, errors.field("name")),
            input("email", "contact", "Contact", &self.contact, errors.field("contact")),
            input("text", "category", "Category", &self.category, errors.field("category")),
        ].concat())
    }

    async fn save(&self, state: &AppState) -> Result<String, FormError> {
        let mut errors = FormErrors::new();
        let name = errors.check(validate_text("name", &self.name, MAX_MEMBER_NAME));
        let contact = errors.check(validate_email("contact", &self.contact));
        let category = errors.check(validate_text("category", &self.category, MAX_CATEGORY));
        let req = match (name, contact, category) {
            (Some(name), Some(contact), Some(category)) => {
                AddMemberCommandRequest::new(name.as_str(), contact.as_str(), category.as_str())
            }
            _ => return Err(FormError::Invalid(errors)),
        };
        let svc = factory::create_member_service(&state.config, &state.pool);
        let res = AddMemberCommand::new(svc).execute(req).await?;
        Ok(res.member.member_id)
    }

    async fn describe(state: &AppState, id: &str) -> LibraryResult<String> {
        let member = factory::create_member_service(&state.config, &state.pool).find_member_by_id(id).await?;
        Ok(format!("{} \"{}\" registered successfully!", Self::ITEM_NAME, member))
    }
}
