pub mod api;
pub mod git;
