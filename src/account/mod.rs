//! Account input rules shared by the HTTP boundary

pub mod validation;
