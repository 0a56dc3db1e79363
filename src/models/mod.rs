pub mod approval_request;
pub mod flow;
pub mod group;
pub mod param;
