//! A headless host tree.
//!
//! [`MemoryHost`] keeps its nodes in an [`indextree::Arena`] and records every primitive call as a [`Mutation`], which
//! makes it suitable for tests and for embedders that serialize the result themselves.

use crate::{
	element::{Callback, NODE_VALUE},
	host::Host,
};
use core::{any::Any, fmt::Write as _};
use hashbrown::HashSet;
use indextree::{Arena, NodeError, NodeId};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone)]
pub enum MemoryNode {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		listeners: Vec<(String, Callback)>,
	},
	Text {
		data: String,
	},
}

/// One recorded primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateElement { node: NodeId, tag: String },
	CreateText { node: NodeId },
	SetAttribute { node: NodeId, key: String, value: String },
	RemoveAttribute { node: NodeId, key: String },
	AddEventListener { node: NodeId, event: String },
	RemoveEventListener { node: NodeId, event: String },
	AppendChild { parent: NodeId, node: NodeId },
	InsertBefore { parent: NodeId, node: NodeId, before: NodeId },
	RemoveChild { parent: NodeId, node: NodeId },
}

#[derive(Debug, Error)]
pub enum MemoryError {
	#[error("attribute {key:?} was rejected")]
	Rejected { key: String },
	#[error("{node:?} is a text node, which only accepts its `nodeValue`")]
	NotAnElement { node: NodeId },
	#[error("no {event:?} listener with that callback is attached to {node:?}")]
	ListenerNotFound { node: NodeId, event: String },
	#[error("removal of {node:?} was rejected")]
	RemovalRejected { node: NodeId },
	#[error("{node:?} is not a child of {parent:?}")]
	NotAChild { parent: NodeId, node: NodeId },
	#[error("invalid tree operation: {0}")]
	Structure(#[from] NodeError),
}

#[derive(Debug, Default)]
pub struct MemoryHost {
	document: Arena<MemoryNode>,
	mutations: Vec<Mutation>,
	rejected_attributes: HashSet<String>,
	rejected_removals: HashSet<NodeId>,
}
impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element to render into. This isn't recorded as a [`Mutation`].
	pub fn create_container(&mut self, tag: &str) -> NodeId {
		self.document.new_node(MemoryNode::Element {
			tag: tag.to_owned(),
			attributes: Vec::new(),
			listeners: Vec::new(),
		})
	}

	/// Makes every later [`Host::set_attribute`] call with `key` fail.
	pub fn reject_attribute(&mut self, key: impl Into<String>) {
		self.rejected_attributes.insert(key.into());
	}

	/// Makes every later [`Host::remove_child`] call for `node` fail.
	pub fn reject_removal(&mut self, node: NodeId) {
		self.rejected_removals.insert(node);
	}

	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.mutations)
	}

	#[must_use]
	pub fn node(&self, node: NodeId) -> Option<&MemoryNode> {
		self.document.get(node).map(indextree::Node::get)
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		node.children(&self.document).collect()
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
		match self.node(node)? {
			MemoryNode::Element { attributes, .. } => attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()),
			MemoryNode::Text { data } if key == NODE_VALUE => Some(data.as_str()),
			MemoryNode::Text { .. } => None,
		}
	}

	/// Calls each `event` listener attached to `node` with `payload`. Returns how many were called.
	pub fn dispatch(&self, node: NodeId, event: &str, payload: &dyn Any) -> usize {
		let callbacks: Vec<Callback> = match self.node(node) {
			Some(MemoryNode::Element { listeners, .. }) => listeners.iter().filter(|(name, _)| name == event).map(|(_, callback)| callback.clone()).collect(),
			_ => Vec::new(),
		};
		for callback in &callbacks {
			callback.call(payload);
		}
		callbacks.len()
	}

	/// Serializes `node` and its descendants as HTML-like markup. Listeners are omitted.
	#[must_use]
	pub fn markup(&self, node: NodeId) -> String {
		let mut markup = String::new();
		self.write_markup(&mut markup, node);
		markup
	}

	fn write_markup(&self, markup: &mut String, node: NodeId) {
		match self.node(node) {
			Some(MemoryNode::Text { data }) => markup.push_str(data),
			Some(MemoryNode::Element { tag, attributes, .. }) => {
				markup.push('<');
				markup.push_str(tag);
				for (key, value) in attributes {
					// Writing into a `String` can't fail.
					let _ = write!(markup, " {}={:?}", key, value);
				}
				markup.push('>');
				for child in node.children(&self.document) {
					self.write_markup(markup, child);
				}
				let _ = write!(markup, "</{}>", tag);
			}
			None => (),
		}
	}

	fn listeners_mut(&mut self, node: NodeId) -> Result<&mut Vec<(String, Callback)>, MemoryError> {
		match self.document.get_mut(node).map(indextree::Node::get_mut) {
			Some(MemoryNode::Element { listeners, .. }) => Ok(listeners),
			_ => Err(MemoryError::NotAnElement { node }),
		}
	}

	fn check_child(&self, parent: NodeId, node: NodeId) -> Result<(), MemoryError> {
		match self.document.get(node).and_then(indextree::Node::parent) {
			Some(actual) if actual == parent => Ok(()),
			_ => Err(MemoryError::NotAChild { parent, node }),
		}
	}
}

impl Host for MemoryHost {
	type Node = NodeId;
	type Error = MemoryError;

	fn create_element_node(&mut self, tag: &str) -> Result<NodeId, MemoryError> {
		let node = self.create_container(tag);
		self.mutations.push(Mutation::CreateElement { node, tag: tag.to_owned() });
		Ok(node)
	}

	fn create_text_node(&mut self) -> Result<NodeId, MemoryError> {
		let node = self.document.new_node(MemoryNode::Text { data: String::new() });
		self.mutations.push(Mutation::CreateText { node });
		Ok(node)
	}

	fn set_attribute(&mut self, node: &NodeId, key: &str, value: &str) -> Result<(), MemoryError> {
		let node = *node;
		if self.rejected_attributes.contains(key) {
			return Err(MemoryError::Rejected { key: key.to_owned() });
		}

		match self.document.get_mut(node).map(indextree::Node::get_mut) {
			Some(MemoryNode::Text { data }) if key == NODE_VALUE => *data = value.to_owned(),
			Some(MemoryNode::Element { attributes, .. }) => match attributes.iter_mut().find(|(k, _)| k == key) {
				Some((_, existing)) => *existing = value.to_owned(),
				None => attributes.push((key.to_owned(), value.to_owned())),
			},
			_ => return Err(MemoryError::NotAnElement { node }),
		}

		trace!(?node, key, "Attribute set.");
		self.mutations.push(Mutation::SetAttribute {
			node,
			key: key.to_owned(),
			value: value.to_owned(),
		});
		Ok(())
	}

	fn remove_attribute(&mut self, node: &NodeId, key: &str) -> Result<(), MemoryError> {
		let node = *node;
		match self.document.get_mut(node).map(indextree::Node::get_mut) {
			Some(MemoryNode::Text { data }) if key == NODE_VALUE => data.clear(),
			Some(MemoryNode::Element { attributes, .. }) => attributes.retain(|(k, _)| k != key),
			_ => return Err(MemoryError::NotAnElement { node }),
		}

		self.mutations.push(Mutation::RemoveAttribute { node, key: key.to_owned() });
		Ok(())
	}

	fn add_event_listener(&mut self, node: &NodeId, event: &str, handler: &Callback) -> Result<(), MemoryError> {
		let node = *node;
		let listeners = self.listeners_mut(node)?;
		listeners.push((event.to_owned(), handler.clone()));
		self.mutations.push(Mutation::AddEventListener { node, event: event.to_owned() });
		Ok(())
	}

	fn remove_event_listener(&mut self, node: &NodeId, event: &str, handler: &Callback) -> Result<(), MemoryError> {
		let node = *node;
		let listeners = self.listeners_mut(node)?;
		let index = listeners
			.iter()
			.position(|(name, callback)| name == event && callback == handler)
			.ok_or_else(|| MemoryError::ListenerNotFound { node, event: event.to_owned() })?;
		listeners.remove(index);
		self.mutations.push(Mutation::RemoveEventListener { node, event: event.to_owned() });
		Ok(())
	}

	fn append_child(&mut self, parent: &NodeId, node: &NodeId) -> Result<(), MemoryError> {
		parent.checked_append(*node, &mut self.document)?;
		self.mutations.push(Mutation::AppendChild { parent: *parent, node: *node });
		Ok(())
	}

	fn insert_before(&mut self, parent: &NodeId, node: &NodeId, before: &NodeId) -> Result<(), MemoryError> {
		self.check_child(*parent, *before)?;
		before.checked_insert_before(*node, &mut self.document)?;
		self.mutations.push(Mutation::InsertBefore {
			parent: *parent,
			node: *node,
			before: *before,
		});
		Ok(())
	}

	/// Detached nodes are freed along with their descendants.
	fn remove_child(&mut self, parent: &NodeId, node: &NodeId) -> Result<(), MemoryError> {
		if self.rejected_removals.contains(node) {
			return Err(MemoryError::RemovalRejected { node: *node });
		}
		self.check_child(*parent, *node)?;
		node.remove_subtree(&mut self.document);
		self.mutations.push(Mutation::RemoveChild { parent: *parent, node: *node });
		Ok(())
	}
}
