use crate::{
	attributes::apply_attribute_diff,
	element::{event_name, Attribute, AttributeValue, ElementType},
	host::Host,
	work::{Effect, WorkNode},
};
use indextree::{Arena, NodeId};
use tracing::{info, instrument, trace_span};

/// What a commit did to the host tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CommitSummary {
	pub placements: usize,
	pub updates: usize,
	pub deletions: usize,
}

/// Applies a completely built work tree to the host tree in one pass.
///
/// Deletions go first, in the order they were scheduled. The work-in-progress tree below `root` is then walked in the
/// same preorder the build used. Afterwards, the nodes below `root` no longer reference the previous tree.
///
/// # Errors
///
/// The first host error aborts the commit. Host calls made before it aren't rolled back. Committed nodes removed
/// so far are marked [`Effect::Deletion`], and placed nodes that were attached own their host node.
#[instrument(skip(host, arena, deletions), fields(deletions = deletions.len()))]
pub(crate) fn commit_root<H: Host>(host: &mut H, arena: &mut Arena<WorkNode<H::Node>>, root: NodeId, deletions: &[NodeId]) -> Result<CommitSummary, H::Error> {
	let mut summary = CommitSummary::default();

	for &deleted in deletions {
		commit_deletion(host, arena, deleted)?;
		summary.deletions += 1;
	}

	let order: Vec<NodeId> = root.descendants(arena).skip(1).collect();
	for node in order {
		match arena[node].get().effect {
			Effect::Placement => {
				commit_placement(host, arena, node)?;
				summary.placements += 1;
			}
			Effect::Update => {
				commit_update(host, arena, node)?;
				summary.updates += 1;
			}
			Effect::None => (),
			Effect::Deletion => unreachable!("deleted work nodes are never linked into the work-in-progress tree"),
		}
		arena[node].get_mut().previous = None;
	}
	arena[root].get_mut().previous = None;

	info!(placements = summary.placements, updates = summary.updates, deletions = summary.deletions, "Committed.");
	Ok(summary)
}

/// Allocates the host node for a work node and mirrors its attributes onto it.
///
/// # Errors
///
/// If allocation or any attribute assignment fails.
pub(crate) fn materialize<H: Host>(host: &mut H, node: &WorkNode<H::Node>) -> Result<H::Node, H::Error> {
	let host_node = match &node.element_type {
		Some(ElementType::Text) => host.create_text_node()?,
		Some(ElementType::Tag(tag)) => host.create_element_node(tag)?,
		None => unreachable!("the root work node is anchored at the host container"),
	};
	apply_attribute_diff(host, &host_node, &[], &node.attributes)?;
	Ok(host_node)
}

/// The host node of the closest proper ancestor that owns one.
fn host_parent<N: Clone>(arena: &Arena<WorkNode<N>>, node: NodeId) -> N {
	node.ancestors(arena)
		.skip(1)
		.find_map(|ancestor| arena[ancestor].get().host_node.clone())
		.expect("work trees are anchored at a root that owns the host container")
}

fn commit_placement<H: Host>(host: &mut H, arena: &mut Arena<WorkNode<H::Node>>, node: NodeId) -> Result<(), H::Error> {
	let span = trace_span!("Placing", ?node, element_type = ?arena[node].get().element_type);
	let _enter = span.enter();

	let host_node = materialize(host, arena[node].get())?;
	let parent = host_parent(arena, node);

	// Siblings updated in place keep their host nodes attached, in order.
	let before = node.following_siblings(arena).skip(1).find_map(|sibling| {
		let sibling = arena[sibling].get();
		match sibling.effect {
			Effect::Update => sibling.host_node.clone(),
			_ => None,
		}
	});
	match before {
		Some(before) => host.insert_before(&parent, &host_node, &before)?,
		None => host.append_child(&parent, &host_node)?,
	}

	arena[node].get_mut().host_node = Some(host_node);
	Ok(())
}

fn commit_update<H: Host>(host: &mut H, arena: &Arena<WorkNode<H::Node>>, node: NodeId) -> Result<(), H::Error> {
	let span = trace_span!("Updating", ?node);
	let _enter = span.enter();

	let work_node = arena[node].get();
	let previous = work_node.previous.expect("update work nodes are created with a previous node");
	let host_node = work_node.host_node.as_ref().expect("update work nodes inherit a host node");
	apply_attribute_diff(host, host_node, &arena[previous].get().attributes, &work_node.attributes)
}

/// Unbinds the listeners of a committed subtree and detaches its root from the host tree.
///
/// The node is marked [`Effect::Deletion`] only once its host node is gone.
fn commit_deletion<H: Host>(host: &mut H, arena: &mut Arena<WorkNode<H::Node>>, node: NodeId) -> Result<(), H::Error> {
	let span = trace_span!("Deleting", ?node);
	let _enter = span.enter();

	for descendant in node.descendants(arena) {
		let descendant = arena[descendant].get();
		if let Some(host_node) = &descendant.host_node {
			unbind_listeners(host, host_node, &descendant.attributes)?;
		}
	}

	let host_node = arena[node].get().host_node.as_ref().expect("committed work nodes own a host node");
	host.remove_child(&host_parent(arena, node), host_node)?;
	arena[node].get_mut().effect = Effect::Deletion;
	Ok(())
}

/// Detaches every listener of a node that's about to leave the host tree.
fn unbind_listeners<H: Host>(host: &mut H, host_node: &H::Node, attributes: &[Attribute]) -> Result<(), H::Error> {
	for Attribute { name, value } in attributes {
		if let AttributeValue::Listener(callback) = value {
			host.remove_event_listener(host_node, &event_name(name), callback)?;
		}
	}
	Ok(())
}
