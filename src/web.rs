//! Browser integration through [`web_sys`].

use crate::{
	element::{Callback, NODE_VALUE},
	host::Host,
	rc_hash_map::{CountSaturatedError, RcHashMap},
	scheduler::{Deadline, IdleScheduler, IdleTask},
};
use core::time::Duration;
use js_sys::Function;
use thiserror::Error;
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, warn, Level};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

#[derive(Debug, Error)]
pub enum DomError {
	#[error("DOM operation failed: {0:?}")]
	Js(JsValue),
	#[error("expected an element but found {0:?}")]
	NotAnElement(web_sys::Node),
	#[error("too many (more than 65k) active references to the same event listener callback")]
	ListenerCountSaturated,
	#[error("tried to remove a {0:?} listener that was never added")]
	UnknownListener(String),
}
impl From<JsValue> for DomError {
	fn from(value: JsValue) -> Self {
		Self::Js(value)
	}
}
impl From<CountSaturatedError> for DomError {
	fn from(_: CountSaturatedError) -> Self {
		Self::ListenerCountSaturated
	}
}

/// Mutates a live DOM document.
///
/// Text content is written through [***nodeValue***](https://developer.mozilla.org/en-US/docs/Web/API/Node/nodeValue),
/// everything else as [***Attr***](https://developer.mozilla.org/en-US/docs/Web/API/Attr)ibutes.
///
/// # Event Listeners
///
/// Each distinct [`Callback`] is wrapped into one [`Closure`] that is shared by all its listeners and reference-counted.
/// Closures whose count drops to zero are freed after each commit, so listeners must only be removed through this host.
#[derive(Debug)]
pub struct DomHost {
	document: web_sys::Document,
	listeners: RcHashMap<*const (), u16, Closure<dyn Fn(web_sys::Event)>>,
}
impl DomHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			listeners: RcHashMap::new(),
		}
	}

	/// Number of distinct callbacks with live listeners or not yet freed.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	fn element(node: &web_sys::Node) -> Result<&web_sys::Element, DomError> {
		node.dyn_ref::<web_sys::Element>().ok_or_else(|| DomError::NotAnElement(node.clone()))
	}
}

impl Host for DomHost {
	type Node = web_sys::Node;
	type Error = DomError;

	#[instrument(skip(self))]
	fn create_element_node(&mut self, tag: &str) -> Result<web_sys::Node, DomError> {
		Ok(self.document.create_element(tag)?.into())
	}

	fn create_text_node(&mut self) -> Result<web_sys::Node, DomError> {
		Ok(self.document.create_text_node("").into())
	}

	fn set_attribute(&mut self, node: &web_sys::Node, key: &str, value: &str) -> Result<(), DomError> {
		if key == NODE_VALUE && node.node_type() == web_sys::Node::TEXT_NODE {
			node.set_node_value(Some(value));
			return Ok(());
		}
		Ok(Self::element(node)?.set_attribute(key, value)?)
	}

	fn remove_attribute(&mut self, node: &web_sys::Node, key: &str) -> Result<(), DomError> {
		if key == NODE_VALUE && node.node_type() == web_sys::Node::TEXT_NODE {
			node.set_node_value(Some(""));
			return Ok(());
		}
		Ok(Self::element(node)?.remove_attribute(key)?)
	}

	#[instrument(skip(self, node))]
	fn add_event_listener(&mut self, node: &web_sys::Node, event: &str, handler: &Callback) -> Result<(), DomError> {
		let closure = self.listeners.increment_or_insert_with(handler.key(), || {
			let handler = handler.clone();
			trace!("Created Closure.");
			Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(&event)) as Box<dyn Fn(web_sys::Event)>)
		})?;
		Ok(node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())?)
	}

	#[instrument(skip(self, node))]
	fn remove_event_listener(&mut self, node: &web_sys::Node, event: &str, handler: &Callback) -> Result<(), DomError> {
		let closure = self.listeners.weak_decrement(&handler.key()).ok_or_else(|| DomError::UnknownListener(event.to_owned()))?;
		Ok(node.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())?)
	}

	fn append_child(&mut self, parent: &web_sys::Node, node: &web_sys::Node) -> Result<(), DomError> {
		parent.append_child(node)?;
		Ok(())
	}

	fn insert_before(&mut self, parent: &web_sys::Node, node: &web_sys::Node, before: &web_sys::Node) -> Result<(), DomError> {
		parent.insert_before(node, Some(before))?;
		Ok(())
	}

	fn remove_child(&mut self, parent: &web_sys::Node, node: &web_sys::Node) -> Result<(), DomError> {
		parent.remove_child(node)?;
		Ok(())
	}

	fn commit_finished(&mut self) {
		{
			let drain = self.listeners.drain_weak();
			trace!("Freed {} event listener closure(s).", drain.count());
		}
		info!("Event listener closure count/cached capacity: {}/{}", self.listeners.len(), self.listeners.capacity());
		if STATIC_MAX_LEVEL >= Level::WARN && self.listeners.capacity() >= 1000 {
			warn!(
				"The event listener closure capacity is large ({}).\n\
				This may point to callbacks being recreated on each render instead of reused.",
				self.listeners.capacity()
			)
		}
	}
}

impl Deadline for web_sys::IdleDeadline {
	fn time_remaining(&self) -> Duration {
		Duration::from_secs_f64(web_sys::IdleDeadline::time_remaining(self).max(0.0) / 1000.0)
	}
}

/// Runs [`IdleTask`]s through [***requestIdleCallback***](https://developer.mozilla.org/en-US/docs/Web/API/Window/requestIdleCallback).
#[derive(Debug, Clone)]
pub struct IdleCallbackScheduler {
	window: web_sys::Window,
}
impl IdleCallbackScheduler {
	#[must_use]
	pub fn new(window: web_sys::Window) -> Self {
		Self { window }
	}
}
impl IdleScheduler for IdleCallbackScheduler {
	fn request_idle_callback(&self, task: IdleTask) {
		let callback = Closure::once_into_js(move |deadline: web_sys::IdleDeadline| task(&deadline));
		if let Err(error) = self.window.request_idle_callback(callback.unchecked_ref()) {
			error!("Failed to request an idle callback: {:?}", error)
		}
	}
}
