//! # nova-estates
//!
//! Headless client for the Nova Estates property marketing site.
//!
//! The crate fetches site copy, listings and offers from the estates REST
//! backend, projects them into a landing-page view model, lets visitors
//! submit offers without logging in, and gates site-copy edits behind an
//! admin login whose token lives only as long as the admin panel.

pub mod config;
pub mod net;
pub mod state;
pub mod util;
pub mod view;
