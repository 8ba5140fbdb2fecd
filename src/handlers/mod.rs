pub mod assignment_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod test_handler;
pub mod topic_handler;

use actix_web::web;

use crate::errors::AppError;

const JSON_LIMIT_BYTES: usize = 256 * 1024;

/// Mounts every route under `/api`. Fixed paths are registered before the
/// `{id}` routes they would otherwise shadow.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(health_handler::health_check)
            .service(health_handler::health_check_live)
            .service(health_handler::health_check_ready)
            .service(auth_handler::signup)
            .service(auth_handler::login)
            .service(auth_handler::logout)
            .service(auth_handler::me)
            .service(assignment_handler::create_assignment)
            .service(assignment_handler::my_assignments)
            .service(assignment_handler::list_assignments)
            .service(assignment_handler::submit_assignment)
            .service(assignment_handler::assignment_submissions)
            .service(topic_handler::create_topic)
            .service(topic_handler::my_topics)
            .service(topic_handler::list_topics)
            .service(test_handler::start_test)
            .service(test_handler::submit_test)
            .service(test_handler::my_reports)
            .service(test_handler::teacher_reports)
            .service(test_handler::teacher_analytics)
            .service(test_handler::get_test),
    );
}
