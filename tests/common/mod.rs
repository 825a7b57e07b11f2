#![allow(dead_code)]

use core::{cell::Cell, time::Duration};
use fiber_dom::{
	memory::MemoryHost,
	scheduler::{Deadline, IdleScheduler, IdleTask},
	Renderer,
};
use indextree::NodeId;
use std::{cell::RefCell, collections::VecDeque};

/// A deadline that has time for a fixed number of work steps.
pub struct StepBudget(Cell<usize>);
impl StepBudget {
	pub fn new(steps: usize) -> Self {
		Self(Cell::new(steps))
	}
}
impl Deadline for StepBudget {
	fn time_remaining(&self) -> Duration {
		match self.0.get() {
			0 => Duration::ZERO,
			steps => {
				self.0.set(steps - 1);
				Duration::from_millis(10)
			}
		}
	}
}

/// Queues idle callbacks until the test runs them.
#[derive(Default)]
pub struct ManualScheduler {
	tasks: RefCell<VecDeque<IdleTask>>,
}
impl ManualScheduler {
	/// Runs the oldest queued task with time for `steps` work steps.
	pub fn run_next(&self, steps: usize) -> bool {
		let task = self.tasks.borrow_mut().pop_front();
		match task {
			Some(task) => {
				task(&StepBudget::new(steps));
				true
			}
			None => false,
		}
	}

	pub fn queued(&self) -> usize {
		self.tasks.borrow().len()
	}
}
impl IdleScheduler for ManualScheduler {
	fn request_idle_callback(&self, task: IdleTask) {
		self.tasks.borrow_mut().push_back(task)
	}
}

pub fn memory_renderer() -> (Renderer<MemoryHost>, NodeId) {
	let mut host = MemoryHost::new();
	let body = host.create_container("body");
	(Renderer::new(host, body), body)
}
