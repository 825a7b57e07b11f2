use crate::{
	element::{Attribute, Element, ElementType},
	reconcile::reconcile_children,
};
use core::mem;
use indextree::{Arena, NodeId};
use tracing::{trace, trace_span};

/// The pending host-tree change of a work node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
	None,
	Placement,
	Update,
	Deletion,
}

/// One node of a work tree.
///
/// Tree links (parent, first child, next sibling) are kept by the [`Arena`]. `previous` points into the last
/// committed tree in the same arena and is never followed for ownership.
#[derive(Debug)]
pub(crate) struct WorkNode<N> {
	/// [`None`] for the root, which stands for the host container.
	pub element_type: Option<ElementType>,
	pub attributes: Vec<Attribute>,
	/// Child descriptors, taken when this node's step reconciles them.
	pub pending_children: Vec<Element>,
	pub host_node: Option<N>,
	pub previous: Option<NodeId>,
	pub effect: Effect,
}
impl<N> WorkNode<N> {
	pub fn root(container: N, element: Element, previous: Option<NodeId>) -> Self {
		Self {
			element_type: None,
			attributes: Vec::new(),
			pending_children: vec![element],
			host_node: Some(container),
			previous,
			effect: Effect::None,
		}
	}

	pub fn placement(element: Element) -> Self {
		let Element { element_type, attributes, children } = element;
		Self {
			element_type: Some(element_type),
			attributes,
			pending_children: children,
			host_node: None,
			previous: None,
			effect: Effect::Placement,
		}
	}

	pub fn update(element: Element, host_node: Option<N>, previous: NodeId) -> Self {
		let Element { element_type, attributes, children } = element;
		Self {
			element_type: Some(element_type),
			attributes,
			pending_children: children,
			host_node,
			previous: Some(previous),
			effect: Effect::Update,
		}
	}
}

/// A resumable preorder walk over one work-in-progress tree.
///
/// The walk state is just the next node to visit; the way back up is recovered through parent links, so a build can be
/// suspended after any [`step`](`Build::step`) and resumed later without an explicit stack.
#[derive(Debug)]
pub struct Build {
	root: NodeId,
	next: Option<NodeId>,
	deletions: Vec<NodeId>,
	steps: usize,
}
impl Build {
	pub(crate) fn new(root: NodeId) -> Self {
		Self {
			root,
			next: Some(root),
			deletions: Vec::new(),
			steps: 0,
		}
	}

	/// How many work nodes have been processed so far.
	#[must_use]
	pub fn steps(&self) -> usize {
		self.steps
	}

	/// Whether every work node has been processed, so only the commit remains.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.next.is_none()
	}

	/// Number of previous-tree nodes scheduled for deletion so far.
	#[must_use]
	pub fn pending_deletions(&self) -> usize {
		self.deletions.len()
	}

	pub(crate) fn root(&self) -> NodeId {
		self.root
	}

	pub(crate) fn deletions(&self) -> &[NodeId] {
		&self.deletions
	}

	/// Processes exactly one work node: reconciles its children and advances to the next node in preorder.
	pub(crate) fn step<N: Clone>(&mut self, arena: &mut Arena<WorkNode<N>>) {
		let node = match self.next {
			Some(node) => node,
			None => return,
		};
		let span = trace_span!("Work step", step = self.steps, ?node);
		let _enter = span.enter();

		let elements = mem::take(&mut arena[node].get_mut().pending_children);
		reconcile_children(arena, &mut self.deletions, node, elements);

		self.next = next_unit(arena, self.root, node);
		self.steps += 1;
		trace!(next = ?self.next, "Step done.");
	}
}

/// First child, else the next sibling of the closest ancestor-or-self that has one, never leaving `root`.
fn next_unit<N>(arena: &Arena<WorkNode<N>>, root: NodeId, node: NodeId) -> Option<NodeId> {
	if let Some(child) = arena[node].first_child() {
		return Some(child);
	}

	let mut cursor = node;
	while cursor != root {
		if let Some(sibling) = arena[cursor].next_sibling() {
			return Some(sibling);
		}
		cursor = arena[cursor].parent()?;
	}
	None
}
