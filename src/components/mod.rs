//! UI components.

pub mod cross_reference;
