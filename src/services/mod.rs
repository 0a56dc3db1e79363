pub mod approval_requests;
pub mod groups;
