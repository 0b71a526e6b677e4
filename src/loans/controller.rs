use async_trait::async_trait;
use serde::Deserialize;
use crate::catalog::factory::create_catalog_service;
use crate::core::command::{Command, CommandError};
use crate::core::controller::AppState;
use crate::core::forms::{FormError, FormErrors, RecordForm};
use crate::core::library::LibraryResult;
use crate::core::validation::validate_choice;
use crate::core::view::select;
use crate::loans::command::issue_loan_cmd::{IssueLoanCommand, IssueLoanCommandRequest};
use crate::loans::domain::LoanService;
use crate::loans::factory::create_loan_service;
use crate::members::factory::create_member_service;

fn build_service(state: &AppState) -> Box<dyn LoanService> {
    create_loan_service(&state.config, &state.pool, state.clock.clone())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoanForm {
    pub member: String,
    pub book: String,
}

#[async_trait]
impl RecordForm for LoanForm {
    const ITEM_NAME: &'static str = "Loan";
    const PATH: &'static str = "/loans/new";

    fn error_message() -> String {
        "Error registering loan. Check that the book is available.".to_string()
    }

    async fn render_fields(&self, state: &AppState, errors: &FormErrors) -> LibraryResult<String> {
        let members = create_member_service(&state.config, &state.pool).member_choices().await?;
        let books = create_catalog_service(&state.config, &state.pool).book_choices().await?;
        Ok([
            select("member", "Member", &members, &self.member, errors.field("member")),
            select("book", "Book", &books, &self.book, errors.field("book")),
        ].concat())
    }

    async fn save(&self, state: &AppState) -> Result<String, FormError> {
        let mut errors = FormErrors::new();
        let member = errors.check(validate_choice("member", &self.member));
        let book = errors.check(validate_choice("book", &self.book));
        let req = match (member, book) {
            (Some(member), Some(book)) => IssueLoanCommandRequest::new(member.as_str(), book.as_str()),
            _ => return Err(FormError::Invalid(errors)),
        };
        match IssueLoanCommand::new(build_service(state)).execute(req).await {
            Ok(res) => Ok(res.loan.loan_id),
            Err(CommandError::Validation { message, reason_code: Some(field) })
            if field == "member" || field == "book" => {
                errors.add(field.as_str(), message.as_str());
                Err(FormError::Invalid(errors))
            }
            Err(err) => Err(FormError::Command(err)),
        }
    }

    async fn describe(state: &AppState, id: &str) -> LibraryResult<String> {
        let loan = build_service(state).find_loan_by_id(id).await?;
        Ok(format!("{} of \"{}\" to \"{}\" registered successfully.", Self::ITEM_NAME, loan.book_title, loan.member_name))
    }
}
