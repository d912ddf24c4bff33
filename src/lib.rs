//! reelfeed
//!
//! Vertical short-video feed for the terminal, with camera capture and
//! AI-generated posts.
//!
//! The crate follows a pure core / impure shell split: [`state`] holds every
//! transition as a function of input and time, while [`view`] owns the
//! terminal, the event loop and the worker that talks to [`service`].

pub mod capture;
pub mod config;
pub mod logging;
pub mod media;
pub mod model;
pub mod service;
pub mod state;
pub mod view;
