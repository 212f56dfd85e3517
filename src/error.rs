use core::fmt::Debug;
use thiserror::Error;
use tracing::error;

/// Errors that abort a [`Renderer::patch`](`crate::Renderer::patch`).
///
/// The live tree is left partially patched when one of these occurs.
/// Malformed descriptors (like duplicate keys) are not errors; they only produce a possibly unexpected DOM shape.
#[derive(Debug, Error)]
pub enum Error<H: Debug> {
	/// A host operation failed, for example because of an invalid tag name.
	#[error("host DOM operation failed: {0:?}")]
	Host(H),

	/// The descriptor tree is deeper than [`Options::depth_limit`](`crate::Options::depth_limit`).
	#[error("depth limit of {limit} reached")]
	DepthLimit { limit: usize },
}

/// Logs a failed host `operation` and wraps its error.
pub(crate) fn host<H: Debug>(operation: &'static str) -> impl FnOnce(H) -> Error<H> {
	move |error| {
		error!("Failed to {}: {:?}", operation, error);
		Error::Host(error)
	}
}
