pub mod auth;
pub mod court;
pub mod report;
