//! Infrastructure layer - password hashing, tokens, credential stores and logging

pub mod auth;
pub mod logging;
pub mod storage;
pub mod user;
