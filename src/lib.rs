//! `rdwm`: a dynamic tiling window manager for X11, architecturally in the
//! spirit of dwm. See `SPEC_FULL.md` at the repository root for the full
//! behavioural contract.

pub mod arena;
pub mod atom;
pub mod bar;
pub mod bindings;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod layout;
pub mod manager;
pub mod monitor;
pub mod mouse;
pub mod rules;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
