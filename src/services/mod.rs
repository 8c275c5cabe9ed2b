pub mod auth;
pub mod codes;
pub mod questions;
pub mod quiz;
