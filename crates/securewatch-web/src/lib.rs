//! securewatch-web — Web GUI for SecureWatch
//! Serves the security dashboard:
//!   - Executive summary
//!   - SOC overview with the live alert feed
//!   - Threat-intelligence analytics
//!   - Vulnerability management
//!   - API integration status
//!   - JSON and SSE endpoints behind the pages

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod sessions;
pub mod sse;
pub mod state;
