pub mod auth;
pub mod domains;
pub mod token;

// vim: ts=4
