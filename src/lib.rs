//! HR Companion - mentor/mentee matchmaking for HR professionals
//!
//! The application keeps no database of its own: accounts, content and
//! uploads live in a hosted backend reached over REST. This library holds
//! the typed client for that backend, the domain services on top of it,
//! the JSON API and the server-rendered pages.

pub mod api;
pub mod backend;
pub mod config;
pub mod models;
pub mod services;
pub mod web;

#[cfg(test)]
mod testing;
