//! Data models for platform resources.
//!
//! - `User`: the logged-in account
//! - `Application`, `Hosting`, `Environment`: deployable apps and where they run
//! - `Listing`: list endpoints answer either a bare array or a page

pub mod application;
pub mod user;

pub use application::{Application, Environment, Hosting, Listing, ModelRef};
pub use user::User;
