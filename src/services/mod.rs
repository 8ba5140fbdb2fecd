pub mod assignment_service;
pub mod auth_service;
pub mod document_storage;
pub mod evaluation_service;
pub mod json_extract;
pub mod llm_client;
pub mod lookups;
pub mod ocr_client;
pub mod outbound;
pub mod scoring;
pub mod submission_pipeline;
pub mod test_service;
pub mod topic_service;
