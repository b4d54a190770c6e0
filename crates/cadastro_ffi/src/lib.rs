//! Flutter-facing bindings for cadastro core.

pub mod api;
