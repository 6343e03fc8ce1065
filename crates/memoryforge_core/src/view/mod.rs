//! View controller: screen selection and intent routing.

pub mod controller;
