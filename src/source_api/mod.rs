//! HTTP bridge exposing the content source to reader hosts.

pub mod models;
mod routes;
pub mod services;

pub use routes::SourceApi;
