use crate::{
	commit::{commit_root, CommitSummary},
	element::{Element, ElementError, ElementType},
	host::Host,
	scheduler::{Deadline, Unbounded},
	work::{Build, Effect, WorkNode},
};
use core::time::Duration;
use indextree::{Arena, NodeId};
use tracing::{error, instrument, trace, warn};

/// Tuning knobs of a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Work is suspended once less idle time than this remains.
	pub yield_threshold: Duration,
	/// Maximum nesting depth of rendered element trees.
	pub depth_limit: usize,
}
impl Default for Options {
	fn default() -> Self {
		Self {
			yield_threshold: Duration::from_millis(1),
			depth_limit: 512,
		}
	}
}
impl Options {
	#[must_use]
	pub fn yield_threshold(mut self, yield_threshold: Duration) -> Self {
		self.yield_threshold = yield_threshold;
		self
	}

	#[must_use]
	pub fn depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}
}

/// Outcome of one [`Renderer::perform_work`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
	/// There is no build to work on.
	Idle,
	/// Idle time ran out before the build was complete. Call again during the next idle period.
	Pending,
	/// The build was completed and committed to the host tree.
	Committed(CommitSummary),
}

/// A preorder entry of [`Renderer::committed_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
	/// `0` for the root, which stands for the host container.
	pub depth: usize,
	/// [`None`] for the root.
	pub element_type: Option<ElementType>,
	/// The effect this node was committed with.
	pub effect: Effect,
}

/// Renders element trees into the children of one host container.
///
/// Each [`render`](`Renderer::render`) starts a build that is worked on in small steps by [`perform_work`](`Renderer::perform_work`),
/// one work node per step, checking the [`Deadline`] before each. Once the build is complete, it is diffed into the host tree
/// in one uninterruptible commit, so the host tree never shows a partial update.
///
/// # Correct Use
///
/// A `Renderer` assumes it is the only one mutating the container's children. Between commits, it remembers the committed
/// tree and expects the host tree to still match it.
///
/// Calling [`render`](`Renderer::render`) again before the previous build was committed abandons that build. No host calls
/// were made for it.
pub struct Renderer<H: Host> {
	host: H,
	container: H::Node,
	arena: Arena<WorkNode<H::Node>>,
	current: Option<NodeId>,
	build: Option<Build>,
	options: Options,
}
impl<H: Host> Renderer<H> {
	#[must_use]
	pub fn new(host: H, container: H::Node) -> Self {
		Self::with_options(host, container, Options::default())
	}

	#[must_use]
	pub fn with_options(host: H, container: H::Node, options: Options) -> Self {
		Self {
			host,
			container,
			arena: Arena::new(),
			current: None,
			build: None,
			options,
		}
	}

	/// Starts a build that will make `element` the only child content of the container.
	///
	/// The build is diffed against the last committed tree. Nothing happens to the host tree until the build is committed
	/// by [`perform_work`](`Renderer::perform_work`) or [`flush`](`Renderer::flush`).
	///
	/// # Errors
	///
	/// If `element` is malformed. No work is scheduled in that case and a pending build stays pending.
	#[instrument(skip(self, element))]
	pub fn render(&mut self, element: Element) -> Result<(), ElementError> {
		element.validate(self.options.depth_limit)?;

		if let Some(abandoned) = self.build.take() {
			warn!("Abandoning an unfinished build after {} step(s).", abandoned.steps());
			abandoned.root().remove_subtree(&mut self.arena);
		}

		let root = self.arena.new_node(WorkNode::root(self.container.clone(), element, self.current));
		self.build = Some(Build::new(root));
		trace!(?root, "Build started.");
		Ok(())
	}

	/// Works on the pending build until it is done or `deadline` runs out.
	///
	/// A completed build is committed right away, regardless of the remaining time.
	///
	/// # Errors
	///
	/// If a host primitive fails during the commit. The build and the previously committed tree are both discarded, and
	/// whatever they left attached to the container is detached, so the next [`render`](`Renderer::render`) starts from
	/// an empty container.
	#[instrument(skip(self, deadline))]
	pub fn perform_work(&mut self, deadline: &dyn Deadline) -> Result<WorkStatus, H::Error> {
		loop {
			let build = match self.build.as_mut() {
				Some(build) => build,
				None => return Ok(WorkStatus::Idle),
			};

			if build.is_complete() {
				return self.commit().map(WorkStatus::Committed);
			}

			if deadline.time_remaining() < self.options.yield_threshold {
				trace!(steps = build.steps(), "Yielding until the next idle period.");
				return Ok(WorkStatus::Pending);
			}

			build.step(&mut self.arena);
		}
	}

	/// Completes and commits the pending build without yielding.
	///
	/// Returns [`None`] if there was no build.
	///
	/// # Errors
	///
	/// As [`perform_work`](`Renderer::perform_work`).
	pub fn flush(&mut self) -> Result<Option<CommitSummary>, H::Error> {
		loop {
			match self.perform_work(&Unbounded)? {
				WorkStatus::Committed(summary) => return Ok(Some(summary)),
				WorkStatus::Idle => return Ok(None),
				WorkStatus::Pending => (),
			}
		}
	}

	fn commit(&mut self) -> Result<CommitSummary, H::Error> {
		let build = match self.build.take() {
			Some(build) => build,
			None => return Ok(CommitSummary::default()),
		};

		match commit_root(&mut self.host, &mut self.arena, build.root(), build.deletions()) {
			Ok(summary) => {
				if let Some(previous) = self.current.replace(build.root()) {
					previous.remove_subtree(&mut self.arena);
				}
				self.host.commit_finished();
				Ok(summary)
			}
			Err(error) => {
				error!("Commit aborted, starting over from an empty container: {}", error);
				self.discard(build.root());
				Err(error)
			}
		}
	}

	/// Forgets the committed tree and `wip`, detaching every top-level host node either of them left under the container.
	///
	/// The next build then places everything from scratch.
	fn discard(&mut self, wip: NodeId) {
		let arena = &self.arena;
		let mut attached: Vec<H::Node> = wip
			.children(arena)
			.filter_map(|node| match arena[node].get() {
				WorkNode {
					effect: Effect::Placement,
					host_node,
					..
				} => host_node.clone(),
				_ => None,
			})
			.collect();
		if let Some(current) = self.current {
			attached.extend(current.children(arena).filter_map(|node| match arena[node].get() {
				WorkNode { effect: Effect::Deletion, .. } => None,
				WorkNode { host_node, .. } => host_node.clone(),
			}));
		}

		wip.remove_subtree(&mut self.arena);
		if let Some(current) = self.current.take() {
			current.remove_subtree(&mut self.arena);
		}

		for host_node in &attached {
			if let Err(error) = self.host.remove_child(&self.container, host_node) {
				error!("Failed to detach a partially committed node: {}", error);
			}
		}
		if !attached.is_empty() {
			warn!("Detached {} top-level node(s). Their event listeners were not unbound.", attached.len());
		}
	}

	/// Whether there is no build waiting for work or commit.
	#[must_use]
	pub fn is_idle(&self) -> bool {
		self.build.is_none()
	}

	/// The pending build, if any.
	#[must_use]
	pub fn build(&self) -> Option<&Build> {
		self.build.as_ref()
	}

	/// The committed tree in preorder, starting with its root.
	#[must_use]
	pub fn committed_tree(&self) -> Vec<NodeSnapshot> {
		let root = match self.current {
			Some(root) => root,
			None => return Vec::new(),
		};
		root.descendants(&self.arena)
			.map(|node| {
				let work_node = self.arena[node].get();
				NodeSnapshot {
					depth: node.ancestors(&self.arena).count() - 1,
					element_type: work_node.element_type.clone(),
					effect: work_node.effect,
				}
			})
			.collect()
	}

	#[must_use]
	pub fn container(&self) -> &H::Node {
		&self.container
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	#[must_use]
	pub fn into_host(self) -> H {
		self.host
	}
}
