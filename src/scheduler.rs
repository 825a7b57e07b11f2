//! Idle-time scheduling glue.

use crate::{host::Host, renderer::WorkStatus, Renderer};
use core::time::Duration;
use std::{cell::RefCell, rc::Rc};
use tracing::trace;

/// How much of the current idle period is left.
pub trait Deadline {
	fn time_remaining(&self) -> Duration;
}

/// A task to run during a future idle period.
pub type IdleTask = Box<dyn FnOnce(&dyn Deadline)>;

/// The host runtime's idle-time facility.
pub trait IdleScheduler {
	/// Runs `task` once, during a future idle period.
	fn request_idle_callback(&self, task: IdleTask);
}

/// A deadline that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;
impl Deadline for Unbounded {
	fn time_remaining(&self) -> Duration {
		Duration::MAX
	}
}

/// Works on `renderer`'s pending build whenever `scheduler` reports idle time, until it is committed.
///
/// Call this after each [`Renderer::render`]. Host errors that abort a commit are passed to `report`.
pub fn request_work<H, S>(renderer: Rc<RefCell<Renderer<H>>>, scheduler: Rc<S>, report: Rc<dyn Fn(H::Error)>)
where
	H: 'static + Host,
	S: 'static + IdleScheduler,
{
	let next = Rc::clone(&scheduler);
	scheduler.request_idle_callback(Box::new(move |deadline: &dyn Deadline| {
		let status = renderer.borrow_mut().perform_work(deadline);
		match status {
			Ok(WorkStatus::Pending) => {
				trace!("Out of idle time. Rescheduling.");
				request_work(renderer, next, report)
			}
			Ok(WorkStatus::Committed(_)) | Ok(WorkStatus::Idle) => (),
			Err(error) => report(error),
		}
	}));
}
