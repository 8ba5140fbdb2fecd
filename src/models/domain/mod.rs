pub mod assignment;
pub mod revoked_token;
pub mod submission;
pub mod test_attempt;
pub mod topic;
pub mod user;
pub use assignment::Assignment;
pub use revoked_token::RevokedToken;
pub use submission::{Submission, SubmissionStatus};
pub use test_attempt::{QuestionSnapshot, TestAnalysis, TestAttempt};
pub use topic::{Mcq, Topic};
pub use user::{User, UserRole};
