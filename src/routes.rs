use axum::routing::{get, post};
use axum::Router;
use crate::admin::controller as admin;
use crate::catalog::controller::{list_books, AuthorForm, BookForm};
use crate::core::controller::{index, not_found, AppState};
use crate::core::forms::{create_record, new_record};
use crate::loans::controller::LoanForm;
use crate::members::controller::MemberForm;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/books", get(list_books))
        .route("/authors/new", get(new_record::<AuthorForm>).post(create_record::<AuthorForm>))
        .route("/books/new", get(new_record::<BookForm>).post(create_record::<BookForm>))
        .route("/members/new", get(new_record::<MemberForm>).post(create_record::<MemberForm>))
        .route("/loans/new", get(new_record::<LoanForm>).post(create_record::<LoanForm>))
        .route(admin::AUTHORS_PATH, get(admin::list_authors))
        .route(admin::BOOKS_PATH, get(admin::list_books))
        .route("/admin/books/:id/stock", post(admin::update_stock))
        .route(admin::MEMBERS_PATH, get(admin::list_members))
        .route(admin::LOANS_PATH, get(admin::list_loans))
        .route("/admin/loans/return", post(admin::return_loans))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::core::controller::AppState;
    use crate::core::domain::Configuration;
    use crate::routes::build_router;
    use crate::utils::db::create_test_pool;

    #[tokio::test]
    async fn test_should_build_router() {
        let state = AppState::new(Configuration::new("test"), create_test_pool().await);
        let _ = build_router(state);
    }
}
