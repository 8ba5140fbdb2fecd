pub mod assignment_repository;
pub mod revoked_token_repository;
pub mod submission_repository;
pub mod test_attempt_repository;
pub mod topic_repository;
pub mod user_repository;

pub use assignment_repository::{AssignmentRepository, MongoAssignmentRepository};
pub use revoked_token_repository::{MongoRevokedTokenRepository, RevokedTokenRepository};
pub use submission_repository::{MongoSubmissionRepository, SubmissionRepository};
pub use test_attempt_repository::{MongoTestAttemptRepository, TestAttemptRepository};
pub use topic_repository::{McqRepository, MongoMcqRepository, MongoTopicRepository, TopicRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
