pub mod application_service;
pub mod candidate_service;
pub mod job_service;
pub mod notification_service;
pub mod storage_service;
