//! Homecare contact service: the contact-form backend for a home-care
//! marketing site.

pub mod config;
pub mod contact;
pub mod error;
pub mod notify;
pub mod store;
pub mod verify;
