// src/handlers/mod.rs

pub mod auth;
pub mod published;
pub mod question;
pub mod quiz;
pub mod results;
