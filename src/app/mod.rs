//! The control surface without widgets: state, events and search tasks.
//!
//! A front end (the CLI in `main.rs`, or a GUI shell) owns an
//! `Arc<Mutex<AppState>>`, calls into [`tasks`] and renders the
//! [`events::UserEvent`]s it receives through its [`proxy::EventProxy`].

pub mod events;
pub mod helpers;
pub mod history;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;
