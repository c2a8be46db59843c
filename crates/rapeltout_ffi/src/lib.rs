//! Flutter-facing bindings for the Rapeltout notes core.

pub mod api;
