//! # solvency
//!
//! Client-side core of the insurance solvency reporting portal.
//!
//! The crate owns the domain model shared with the backend, a small REST
//! client for the `/api` surface, the role-aware login flow and the explicit
//! session context it establishes, plus the compliance badge used when
//! rendering submissions.
//!
//! Consumers (the `cli` crate) drive [`login::LoginFlow`] against a
//! [`session::SessionContext`], then call [`api::ApiClient`] and render the
//! results through [`badge::badge_for`].

pub mod api;
pub mod badge;
pub mod config;
pub mod directory;
pub mod login;
pub mod model;
pub mod session;
