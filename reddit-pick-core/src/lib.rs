#![doc = "reddit-pick-core: selection and media resolution logic for reddit-pick."]

//! This crate picks one post from a subreddit listing under a policy (skip
//! pinned/stickied posts, gate NSFW, require an allowed media type in upload
//! mode) and resolves it into a link or a re-uploaded media reference.
//!
//! The chat layer is not part of this crate: callers hand in a subreddit name
//! and receive an [`assemble::OutputContent`] to display.
//!
//! # Usage
//! Build a [`pipeline::Picker`] from a [`config::PickConfig`], a [`contract::Transport`]
//! and a [`contract::ContentStore`], then call `handle` once per request.

pub mod assemble;
pub mod config;
pub mod contract;
pub mod error;
pub mod listing;
pub mod media;
pub mod pipeline;
pub mod policy;
pub mod select;
pub mod transport;

pub use error::{PickError, Result};
