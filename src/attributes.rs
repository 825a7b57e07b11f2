use crate::{
	element::{event_name, Attribute, AttributeValue, Callback},
	host::Host,
};
use hashbrown::HashMap;
use tracing::{instrument, trace};

/// Attributes of one node, split by kind and indexed by name.
struct Partition<'a> {
	plain: HashMap<&'a str, &'a str>,
	listeners: HashMap<&'a str, &'a Callback>,
}
impl<'a> Partition<'a> {
	fn new(attributes: &'a [Attribute]) -> Self {
		let mut plain = HashMap::new();
		let mut listeners = HashMap::new();
		for Attribute { name, value } in attributes {
			match value {
				AttributeValue::Plain(value) => {
					plain.insert(name.as_str(), value.as_str());
				}
				AttributeValue::Listener(callback) => {
					listeners.insert(name.as_str(), callback);
				}
			}
		}
		Self { plain, listeners }
	}
}

/// Brings `node`'s attributes and listeners from `previous` to `next` with as few host calls as possible.
///
/// Removals happen before additions: stale listeners are detached, removed plain attributes cleared,
/// new or changed plain attributes written and new or changed listeners attached, each in attribute order.
/// Plain values are compared as strings, listeners by callback identity.
///
/// Both sets come from validated [`Element`](`crate::Element`)s, so neither contains the reserved
/// [`CHILDREN`](`crate::element::CHILDREN`) name.
///
/// # Errors
///
/// The first host error aborts the diff.
#[instrument(skip(host, previous, next))]
pub(crate) fn apply_attribute_diff<H: Host>(host: &mut H, node: &H::Node, previous: &[Attribute], next: &[Attribute]) -> Result<(), H::Error> {
	let old = Partition::new(previous);
	let new = Partition::new(next);

	for (name, callback) in listeners(previous) {
		if new.listeners.get(name) != Some(&callback) {
			let event = event_name(name);
			trace!(%event, "Removing event listener.");
			host.remove_event_listener(node, &event, callback)?;
		}
	}

	for (name, _) in plain(previous) {
		if !new.plain.contains_key(name) {
			trace!(name, "Removing attribute.");
			host.remove_attribute(node, name)?;
		}
	}

	for (name, value) in plain(next) {
		if old.plain.get(name) != Some(&value) {
			if cfg!(feature = "dangerous-logging") {
				trace!(name, value, "Setting attribute.");
			} else {
				trace!(name, "Setting attribute.");
			}
			host.set_attribute(node, name, value)?;
		}
	}

	for (name, callback) in listeners(next) {
		if old.listeners.get(name) != Some(&callback) {
			let event = event_name(name);
			trace!(%event, "Adding event listener.");
			host.add_event_listener(node, &event, callback)?;
		}
	}

	Ok(())
}

fn plain(attributes: &[Attribute]) -> impl Iterator<Item = (&str, &str)> {
	attributes.iter().filter_map(|Attribute { name, value }| match value {
		AttributeValue::Plain(value) => Some((name.as_str(), value.as_str())),
		AttributeValue::Listener(_) => None,
	})
}

fn listeners(attributes: &[Attribute]) -> impl Iterator<Item = (&str, &Callback)> {
	attributes.iter().filter_map(|Attribute { name, value }| match value {
		AttributeValue::Listener(callback) => Some((name.as_str(), callback)),
		AttributeValue::Plain(_) => None,
	})
}
