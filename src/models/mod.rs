pub mod application;
pub mod candidate;
pub mod job;
pub mod notification;
pub mod user;
