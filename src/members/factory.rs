use sqlx::SqlitePool;
use crate::core::domain::Configuration;
use crate::gateway::factory::create_publisher;
use crate::members::domain::MemberService;
use crate::members::domain::service::MemberServiceImpl;
use crate::members::repository::MemberRepository;
use crate::members::repository::sqlite_member_repository::SqliteMemberRepository;

pub(crate) fn create_member_repository(pool: &SqlitePool) -> Box<dyn MemberRepository> {
    Box::new(SqliteMemberRepository::new(pool.clone()))
}

pub(crate) fn create_member_service(config: &Configuration, pool: &SqlitePool) -> Box<dyn MemberService> {
    let member_repo = create_member_repository(pool);
    let publisher = create_publisher(config);
    Box::new(MemberServiceImpl::new(config, member_repo, publisher))
}
