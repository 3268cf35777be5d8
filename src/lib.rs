//! Browser controller for the PaisaTrack pages: session storage, the
//! authenticated request pipeline, transaction-form rules and responsive
//! layout tweaks. Everything outside `browser` is plain Rust and tested on
//! the host.

pub mod api;
pub mod config;
pub mod currency;
pub mod form;
pub mod layout;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::start;
