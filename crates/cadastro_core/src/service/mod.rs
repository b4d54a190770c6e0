//! Form use-case services.
//!
//! # Responsibility
//! - Model the registration screen state (draft, edit target, photo).
//! - Keep host UI code free of store and storage details.

pub mod form_service;
