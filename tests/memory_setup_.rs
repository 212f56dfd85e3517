#![allow(dead_code)]

use patchwork_dom::{
	memory::{MemoryDom, MemoryNode, Mutation},
	Renderer,
};

/// A fresh renderer with an empty `<body>` container to render into.
pub fn setup() -> (Renderer<MemoryDom>, MemoryNode) {
	// Fails after the first call per test binary, which is fine.
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();

	let mut renderer = Renderer::new(MemoryDom::new());
	let container = renderer.host_mut().container("body");
	(renderer, container)
}

pub fn created_or_removed(log: &[Mutation]) -> usize {
	log.iter().filter(|mutation| mutation.is_create_or_remove()).count()
}
