pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod utils;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{extract_token, AuthMiddleware, AuthenticatedUser, TOKEN_COOKIE};
pub use utils::{can_view_test_attempt, require_student, require_teacher};
