use crate::element::Callback;
use core::fmt::Debug;

/// The primitive operations a host tree has to provide.
///
/// A [`Renderer`](`crate::Renderer`) only calls these while committing, so implementations may assume
/// that nothing observes the host tree halfway through a set of calls made for one commit.
///
/// Primitives are side-effect-only and not transactional: if one fails, the commit it belongs to is aborted without
/// rolling back the calls that already succeeded.
pub trait Host {
	/// A handle to one node in the host tree.
	type Node: Clone + Debug;
	type Error: std::error::Error + 'static;

	/// Allocates a detached element node.
	///
	/// # Errors
	///
	/// If the host rejects the tag name.
	fn create_element_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

	/// Allocates a detached, empty text node.
	///
	/// # Errors
	///
	/// Implementation-defined.
	fn create_text_node(&mut self) -> Result<Self::Node, Self::Error>;

	/// Writes one attribute.
	///
	/// On text nodes, this is only called with [`NODE_VALUE`](`crate::element::NODE_VALUE`), which sets the content.
	///
	/// # Errors
	///
	/// If the host rejects the assignment.
	fn set_attribute(&mut self, node: &Self::Node, key: &str, value: &str) -> Result<(), Self::Error>;

	/// Resets one attribute to an empty value.
	///
	/// # Errors
	///
	/// If the host rejects the removal.
	fn remove_attribute(&mut self, node: &Self::Node, key: &str) -> Result<(), Self::Error>;

	/// # Errors
	///
	/// If the listener can't be attached.
	fn add_event_listener(&mut self, node: &Self::Node, event: &str, handler: &Callback) -> Result<(), Self::Error>;

	/// Detaches a listener previously attached with the same `event` and `handler`.
	///
	/// # Errors
	///
	/// If no such listener is attached.
	fn remove_event_listener(&mut self, node: &Self::Node, event: &str, handler: &Callback) -> Result<(), Self::Error>;

	/// # Errors
	///
	/// If `node` can't be attached under `parent`.
	fn append_child(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error>;

	/// Attaches `node` under `parent`, directly before its existing child `before`.
	///
	/// # Errors
	///
	/// If `before` isn't a child of `parent` or `node` can't be attached.
	fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, before: &Self::Node) -> Result<(), Self::Error>;

	/// # Errors
	///
	/// If `node` isn't a child of `parent`.
	fn remove_child(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error>;

	/// Called once after each successful commit.
	fn commit_finished(&mut self) {}
}
