//! API Routes
//!
//! Route handlers organized by functionality.

pub mod brand;
pub mod catalog;
pub mod export;
pub mod health;
pub mod reports;
pub mod session;
