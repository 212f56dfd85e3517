#![doc(html_root_url = "https://docs.rs/patchwork-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A minimal keyed virtual DOM patcher.
//!
//! Describe the desired tree with [`element`] and [`text`], then let a [`Renderer`] patch it onto a container of any
//! [`Host`] DOM. Live nodes are reused wherever tag and position (or key) match, and the first patch against a container
//! with existing markup adopts that markup instead of rebuilding it.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod children;
pub mod diff;
mod error;
pub mod host;
mod key_index;
pub mod memory;
pub mod node;
mod props;
pub mod recycle;
pub mod web;

pub use crate::{
	diff::{Options, Renderer},
	error::Error,
	host::Host,
	node::{element, text, Element, Handler, IntoChildren, Node, Properties, Style, Value},
	props::REFLECTED_PROPERTIES,
};
