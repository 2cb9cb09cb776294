pub mod auth;
pub mod pic;
pub mod proposal;
pub mod report;
pub mod schedule;
pub mod stakeholder;
