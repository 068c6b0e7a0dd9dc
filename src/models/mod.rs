// src/models/mod.rs

pub mod participant;
pub mod question;
pub mod quiz;
pub mod user;
