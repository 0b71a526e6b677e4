pub mod model;
pub mod service;

use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::members::dto::MemberDto;

#[async_trait]
pub(crate) trait MemberService: Sync + Send {
    async fn add_member(&self, member: &MemberDto) -> LibraryResult<MemberDto>;
    async fn find_member_by_id(&self, id: &str) -> LibraryResult<MemberDto>;
    async fn query_members(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<MemberDto>>;
    async fn member_choices(&self) -> LibraryResult<Vec<(String, String)>>;
    async fn categories(&self) -> LibraryResult<Vec<String>>;
}
