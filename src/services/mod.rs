pub mod check_service;
pub mod submission_service;
