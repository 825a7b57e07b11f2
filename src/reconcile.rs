use crate::{element::Element, work::WorkNode};
use indextree::{Arena, NodeId};
use tracing::{instrument, trace};

/// Diffs `elements` against the children of `wip_parent.previous`, by index only.
///
/// New work nodes are appended under `wip_parent` in descriptor order. Previous children without a same-typed
/// counterpart at their index are pushed onto `deletions` instead of being linked. They belong to the committed tree,
/// which stays untouched until the commit removes them.
#[instrument(skip(arena, deletions, elements), fields(count = elements.len()))]
pub(crate) fn reconcile_children<N: Clone>(arena: &mut Arena<WorkNode<N>>, deletions: &mut Vec<NodeId>, wip_parent: NodeId, elements: Vec<Element>) {
	let mut old = arena[wip_parent].get().previous.and_then(|previous| arena[previous].first_child());
	let mut elements = elements.into_iter();
	let mut index = 0_usize;

	loop {
		let element = elements.next();
		let previous = old;
		if element.is_none() && previous.is_none() {
			break;
		}

		let same_type = match (previous, &element) {
			(Some(previous), Some(element)) => arena[previous].get().element_type.as_ref() == Some(&element.element_type),
			_ => false,
		};

		let work_node = match (element, previous) {
			(Some(element), Some(previous)) if same_type => {
				trace!(index, "Updating in place.");
				let host_node = arena[previous].get().host_node.clone();
				Some(WorkNode::update(element, host_node, previous))
			}
			(Some(element), _) => {
				trace!(index, "Placing new node.");
				Some(WorkNode::placement(element))
			}
			(None, _) => None,
		};

		if let Some(previous) = previous {
			if !same_type {
				trace!(index, "Scheduling previous node for deletion.");
				deletions.push(previous);
			}
			old = arena[previous].next_sibling();
		}

		if let Some(work_node) = work_node {
			let child = arena.new_node(work_node);
			wip_parent.append(child, arena);
		}

		index += 1;
	}
}
