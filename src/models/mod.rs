//! Domain model module declarations.

pub mod approval;
