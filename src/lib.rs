//! Jellyfin content source for manga and comic readers.
//!
//! [`source::JellyfinSource`] implements the reader host's contract on top of a
//! Jellyfin server. [`source_api::SourceApi`] serves it over HTTP.

pub mod config;
pub mod domain;
pub mod error;
pub mod jellyfin_client;
pub mod session;
pub mod source;
pub mod source_api;
pub mod storage;
