//! Gatehouse Server
//!
//! Administrative backend for a multi-tenant LLM gateway: dual-mode
//! authentication (bearer API keys with epoch revocation, browser
//! sessions) and role-based permission resolution in front of the
//! user/role/permission/menu catalog.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod menu;
pub mod permissions;
