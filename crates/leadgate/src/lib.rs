//! Backend for the Techno Mech Engineers marketing site: contact-lead
//! capture and notification, the admin lead dashboard, and the visitor
//! chat assistant.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod leads;
pub mod telemetry;
