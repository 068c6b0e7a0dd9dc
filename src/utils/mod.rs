// src/utils/mod.rs

pub mod cache;
pub mod hash;
pub mod jwt;
pub mod notifier;
pub mod random;
pub mod slug;
