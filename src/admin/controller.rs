use std::collections::HashMap;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;
use tracing::{debug, info, warn};
use crate::catalog::command::update_stock_cmd::{UpdateStockCommand, UpdateStockCommandRequest};
use crate::catalog::domain::CatalogService;
use crate::catalog::factory::create_catalog_service;
use crate::core::command::Command;
use crate::core::controller::{AppState, ServerError};
use crate::core::validation::validate_integer;
use crate::core::view::{escape, input, page, pager, search_form, select, table, url_encode, Message};
use crate::loans::command::return_loans_cmd::{ReturnLoansCommand, ReturnLoansCommandRequest};
use crate::loans::domain::LoanService;
use crate::loans::factory::create_loan_service;
use crate::members::factory::create_member_service;
use crate::utils::date::DAY_FMT;

pub(crate) const AUTHORS_PATH: &str = "/admin/authors";
pub(crate) const BOOKS_PATH: &str = "/admin/books";
pub(crate) const MEMBERS_PATH: &str = "/admin/members";
pub(crate) const LOANS_PATH: &str = "/admin/loans";

const OVERDUE: &str = "Overdue";
const LOAN_STATUSES: &[&str] = &["Active", "Returned", OVERDUE];
// checkbox names in the loan listing are `selected:<loan_id>`
const SELECTED_PREFIX: &str = "selected:";

fn catalog_service(state: &AppState) -> Box<dyn CatalogService> {
    create_catalog_service(&state.config, &state.pool)
}

fn loan_service(state: &AppState) -> Box<dyn LoanService> {
    create_loan_service(&state.config, &state.pool, state.clock.clone())
}

// blank filters are left out
fn predicate(filters: &[(&str, &str)]) -> HashMap<String, String> {
    filters.iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k.to_string(), v.trim().to_string()))
        .collect()
}

fn options<T: ToString>(values: &[T]) -> Vec<(String, String)> {
    values.iter().map(|v| (v.to_string(), v.to_string())).collect()
}

fn search_input(q: &str) -> String {
    input("text", "q", "Search", q, &[])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AuthorListQuery {
    pub q: String,
    pub page: Option<String>,
}

pub(crate) async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorListQuery>) -> Result<Html<String>, ServerError> {
    let res = catalog_service(&state).query_authors(
        &predicate(&[("q", &query.q)]), query.page.as_deref(), state.config.page_size).await?;
    let rows: Vec<Vec<String>> = res.records.iter().map(|a| vec![
        escape(&a.name),
        escape(a.nationality.as_deref().unwrap_or("-")),
    ]).collect();
    let body = [
        search_form(AUTHORS_PATH, search_input(&query.q).as_str()),
        table(&["Name", "Nationality"], &rows),
        pager(AUTHORS_PATH, &[("q", &query.q)], &res),
    ].join("\n");
    Ok(page("Administer authors", &[], body.as_str()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BookListQuery {
    pub q: String,
    pub year: String,
    pub author: String,
    pub publisher: String,
    pub page: Option<String>,
    // set by the stock edit redirect
    pub updated: Option<String>,
    pub error: Option<String>,
}

fn stock_form(book_id: &str, available_copies: i64, version: i64) -> String {
    format!("<form method=\"post\" action=\"{path}/{id}/stock\">\
             <input type=\"number\" name=\"available_copies\" value=\"{available}\" min=\"0\">\
             <input type=\"hidden\" name=\"version\" value=\"{version}\">\
             <button type=\"submit\">Save</button></form>",
            path = BOOKS_PATH, id = url_encode(book_id), available = available_copies, version = version)
}

pub(crate) async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>) -> Result<Html<String>, ServerError> {
    let svc = catalog_service(&state);
    let mut messages = vec![];
    if let Some(ref book_id) = query.updated {
        match svc.find_book_by_id(book_id).await {
            Ok(book) => messages.push(Message::success(format!(
                "Stock of \"{}\" updated: {} of {} copies available.",
                book, book.available_copies, book.total_copies).as_str())),
            Err(err) => debug!(book_id = %book_id, error = %err, "no notice for updated book"),
        }
    }
    if let Some(ref error) = query.error {
        messages.push(Message::error(error));
    }

    let res = svc.query_books(&predicate(&[
        ("q", &query.q),
        ("year", &query.year),
        ("author_id", &query.author),
        ("publisher", &query.publisher),
    ]), query.page.as_deref(), state.config.page_size).await?;
    let (years, publishers) = svc.book_facets().await?;
    let authors = svc.author_choices().await?;

    let filters = [
        search_input(&query.q),
        select("year", "Year", &options(&years), &query.year, &[]),
        select("author", "Author", &authors, &query.author, &[]),
        select("publisher", "Publisher", &options(&publishers), &query.publisher, &[]),
    ].concat();
    let rows: Vec<Vec<String>> = res.records.iter().map(|b| vec![
        escape(&b.title),
        escape(&b.author_name),
        escape(&b.publisher),
        b.year.to_string(),
        stock_form(&b.book_id, b.available_copies, b.version),
        b.total_copies.to_string(),
    ]).collect();
    let body = [
        search_form(BOOKS_PATH, filters.as_str()),
        table(&["Title", "Author", "Publisher", "Year", "Available", "Total"], &rows),
        pager(BOOKS_PATH, &[("q", &query.q), ("year", &query.year), ("author", &query.author),
            ("publisher", &query.publisher)], &res),
    ].join("\n");
    Ok(page("Administer books", &messages, body.as_str()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StockForm {
    pub available_copies: String,
    pub version: String,
}

fn stock_error(message: &str) -> String {
    format!("{}?error={}", BOOKS_PATH, url_encode(message))
}

pub(crate) async fn update_stock(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Form(form): Form<StockForm>) -> Result<Redirect, ServerError> {
    let available = validate_integer("available_copies", &form.available_copies);
    let version = validate_integer("version", &form.version);
    let location = match (available, version) {
        (Ok(available), Ok(version)) => {
            let req = UpdateStockCommandRequest::new(book_id.as_str(), available, version);
            match UpdateStockCommand::new(catalog_service(&state)).execute(req).await {
                Ok(res) => {
                    info!(book_id = %book_id, available, "stock edited");
                    format!("{}?updated={}", BOOKS_PATH, url_encode(&res.book.book_id))
                }
                Err(err) if err.is_user_error() => {
                    warn!(book_id = %book_id, error = %err, "rejected stock edit");
                    stock_error(err.message())
                }
                Err(err) => return Err(ServerError::from(err)),
            }
        }
        (Err(err), _) | (_, Err(err)) => {
            warn!(book_id = %book_id, error = %err, "rejected stock edit");
            stock_error(format!("{}: {}", err.field(), err).as_str())
        }
    };
    Ok(Redirect::to(location.as_str()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MemberListQuery {
    pub q: String,
    pub category: String,
    pub page: Option<String>,
}

pub(crate) async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>) -> Result<Html<String>, ServerError> {
    let svc = create_member_service(&state.config, &state.pool);
    let res = svc.query_members(&predicate(&[("q", &query.q), ("category", &query.category)]),
                                query.page.as_deref(), state.config.page_size).await?;
    let categories = svc.categories().await?;
    let filters = [
        search_input(&query.q),
        select("category", "Category", &options(&categories), &query.category, &[]),
    ].concat();
    let rows: Vec<Vec<String>> = res.records.iter().map(|m| vec![
        escape(&m.name),
        escape(&m.contact),
        escape(&m.category),
    ]).collect();
    let body = [
        search_form(MEMBERS_PATH, filters.as_str()),
        table(&["Name", "Contact", "Category"], &rows),
        pager(MEMBERS_PATH, &[("q", &query.q), ("category", &query.category)], &res),
    ].join("\n");
    Ok(page("Administer members", &[], body.as_str()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoanListQuery {
    pub q: String,
    pub status: String,
    pub page: Option<String>,
    // set by the bulk return redirect
    pub returned: Option<usize>,
    pub failed: Option<String>,
}

fn bulk_return_messages(query: &LoanListQuery) -> Vec<Message> {
    let mut messages = vec![];
    match query.returned {
        Some(n) if n > 0 => {
            messages.push(Message::success(format!("{} loan(s) marked as returned and stock updated.", n).as_str()));
        }
        Some(_) if query.failed.is_none() => {
            messages.push(Message::warning("No active loan was selected or the items were already returned."));
        }
        _ => {}
    }
    if let Some(ref failed) = query.failed {
        messages.push(Message::error(format!("Error marking loans as returned: {}", failed).as_str()));
    }
    messages
}

pub(crate) async fn list_loans(
    State(state): State<AppState>,
    Query(query): Query<LoanListQuery>) -> Result<Html<String>, ServerError> {
    let svc = loan_service(&state);
    let today = state.clock.today();
    let page_size = state.config.page_size;
    let res = if query.status.trim() == OVERDUE {
        svc.query_overdue(&predicate(&[("q", &query.q)]), query.page.as_deref(), page_size).await?
    } else {
        svc.query_loans(&predicate(&[("q", &query.q), ("loan_status", &query.status)]),
                        query.page.as_deref(), page_size).await?
    };

    let filters = [
        search_input(&query.q),
        select("status", "Status", &options(LOAN_STATUSES), query.status.trim(), &[]),
    ].concat();
    let rows: Vec<Vec<String>> = res.records.iter().map(|l| vec![
        format!("<input type=\"checkbox\" name=\"{}{}\" value=\"on\">", SELECTED_PREFIX, escape(&l.loan_id)),
        escape(&l.book_title),
        escape(&l.member_name),
        l.issue_date.format(DAY_FMT).to_string(),
        l.due_date.format(DAY_FMT).to_string(),
        l.return_date.map(|d| d.format(DAY_FMT).to_string()).unwrap_or_else(|| "-".to_string()),
        if l.is_overdue(today) { OVERDUE.to_string() } else { l.loan_status.to_string() },
    ]).collect();
    let listing = format!(
        "<form method=\"post\" action=\"{}/return\">\n{}\n<button type=\"submit\">Mark selected as returned</button>\n</form>",
        LOANS_PATH, table(&["", "Book", "Member", "Issue date", "Due date", "Return date", "Status"], &rows));
    let body = [
        search_form(LOANS_PATH, filters.as_str()),
        listing,
        pager(LOANS_PATH, &[("q", &query.q), ("status", &query.status)], &res),
    ].join("\n");
    Ok(page("Administer loans", &bulk_return_messages(&query), body.as_str()))
}

// the form is read as ordered pairs so loans are returned in the order they were listed
pub(crate) async fn return_loans(
    State(state): State<AppState>,
    Form(form): Form<Vec<(String, String)>>) -> Result<Redirect, ServerError> {
    let mut loan_ids: Vec<String> = vec![];
    for (key, _) in form.iter() {
        if let Some(loan_id) = key.strip_prefix(SELECTED_PREFIX) {
            if !loan_id.is_empty() && !loan_ids.iter().any(|id| id == loan_id) {
                loan_ids.push(loan_id.to_string());
            }
        }
    }
    let selected = loan_ids.len();
    let res = ReturnLoansCommand::new(loan_service(&state))
        .execute(ReturnLoansCommandRequest::new(loan_ids)).await?;
    let report = res.report;
    info!(selected, returned = report.returned.len(), skipped = report.skipped,
          failed = report.failure.is_some(), "bulk return");
    let mut location = format!("{}?returned={}", LOANS_PATH, report.returned.len());
    if let Some(ref failure) = report.failure {
        location.push_str(format!("&failed={}", url_encode(failure)).as_str());
    }
    Ok(Redirect::to(location.as_str()))
}
