// src/models/mod.rs

pub mod institute;
pub mod paper;
pub mod question;
pub mod result;
