//! Immutable element descriptors: the input shape of [`Renderer::render`](`crate::Renderer::render`).

use core::{
	any::Any,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use thiserror::Error;

/// Reserved attribute name standing in for an element's children.
///
/// Children live in [`Element::children`], so an attribute with this name is rejected.
pub const CHILDREN: &str = "children";

/// Attribute holding a text node's content.
pub const NODE_VALUE: &str = "nodeValue";

/// Name prefix of event listener attributes, as in `onClick`.
pub const EVENT_PREFIX: &str = "on";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
	/// A text node. Its content is the [`NODE_VALUE`] attribute.
	Text,
	/// An element node with the given tag name.
	Tag(String),
}
impl From<&str> for ElementType {
	fn from(tag: &str) -> Self {
		Self::Tag(tag.to_owned())
	}
}
impl From<String> for ElementType {
	fn from(tag: String) -> Self {
		Self::Tag(tag)
	}
}

/// An event handler, compared by identity.
///
/// The handler receives the host's event object type-erased. [`MemoryHost`](`crate::memory::MemoryHost`) passes whatever payload
/// was dispatched, [`DomHost`](`crate::web::DomHost`) passes a [`web_sys::Event`].
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&dyn Any)>);
impl Callback {
	pub fn new(handler: impl 'static + Fn(&dyn Any)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}

	/// Identity of the shared handler, stable for as long as any clone is alive.
	#[must_use]
	pub fn key(&self) -> *const () {
		Rc::as_ptr(&self.0).cast::<()>()
	}
}
impl PartialEq for Callback {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}
impl Eq for Callback {}
impl Debug for Callback {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Callback").field(&self.key()).finish()
	}
}

/// An attribute value, tagged when the descriptor is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
	Plain(String),
	Listener(Callback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: AttributeValue,
}
impl Attribute {
	#[must_use]
	pub fn plain(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: AttributeValue::Plain(value.into()),
		}
	}

	/// An event listener attribute. `name` should carry the [`EVENT_PREFIX`], as in `"onClick"`.
	#[must_use]
	pub fn listener(name: impl Into<String>, callback: Callback) -> Self {
		Self {
			name: name.into(),
			value: AttributeValue::Listener(callback),
		}
	}

	/// The DOM event name of a listener attribute: the name without [`EVENT_PREFIX`], lower-cased.
	///
	/// [`None`] for plain attributes.
	#[must_use]
	pub fn event_name(&self) -> Option<String> {
		match self.value {
			AttributeValue::Plain(_) => None,
			AttributeValue::Listener(_) => Some(event_name(&self.name)),
		}
	}
}

pub(crate) fn event_name(attribute_name: &str) -> String {
	attribute_name.strip_prefix(EVENT_PREFIX).unwrap_or(attribute_name).to_lowercase()
}

/// Plain description of a node: type, attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub element_type: ElementType,
	pub attributes: Vec<Attribute>,
	pub children: Vec<Element>,
}

/// Builds an [`Element`] descriptor.
///
/// Strings convert into text descriptors via [`From`], so `"Hello".into()` is a valid child.
#[must_use]
pub fn create_element(element_type: impl Into<ElementType>, attributes: Vec<Attribute>, children: Vec<Element>) -> Element {
	Element {
		element_type: element_type.into(),
		attributes,
		children,
	}
}

/// Builds a text descriptor.
#[must_use]
pub fn text(value: impl Into<String>) -> Element {
	Element {
		element_type: ElementType::Text,
		attributes: vec![Attribute::plain(NODE_VALUE, value)],
		children: Vec::new(),
	}
}

impl From<&str> for Element {
	fn from(value: &str) -> Self {
		text(value)
	}
}
impl From<String> for Element {
	fn from(value: String) -> Self {
		text(value)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
	#[error("element descriptor without a tag name")]
	MissingType,
	#[error("attribute name {name:?} is reserved")]
	ReservedAttribute { name: String },
	#[error("text descriptors can't have children")]
	TextWithChildren,
	#[error("element tree is nested deeper than the depth limit ({limit})")]
	DepthLimitExceeded { limit: usize },
}

impl Element {
	/// Checks the whole descriptor tree before any work is scheduled for it.
	///
	/// # Errors
	///
	/// Returns the first problem found, in preorder.
	pub fn validate(&self, depth_limit: usize) -> Result<(), ElementError> {
		self.validate_at(1, depth_limit)
	}

	fn validate_at(&self, depth: usize, limit: usize) -> Result<(), ElementError> {
		if depth > limit {
			return Err(ElementError::DepthLimitExceeded { limit });
		}

		match &self.element_type {
			ElementType::Tag(tag) if tag.is_empty() => return Err(ElementError::MissingType),
			ElementType::Text if !self.children.is_empty() => return Err(ElementError::TextWithChildren),
			ElementType::Tag(_) | ElementType::Text => (),
		}

		if let Some(reserved) = self.attributes.iter().find(|attribute| attribute.name == CHILDREN) {
			return Err(ElementError::ReservedAttribute { name: reserved.name.clone() });
		}

		self.children.iter().try_for_each(|child| child.validate_at(depth + 1, limit))
	}
}
