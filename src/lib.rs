#![doc(html_root_url = "https://docs.rs/fiber-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod attributes;
mod commit;
pub mod element;
pub mod host;
pub mod memory;
mod rc_hash_map;
mod reconcile;
mod renderer;
pub mod scheduler;
pub mod web;
mod work;

pub use commit::CommitSummary;
pub use element::{create_element, text, Attribute, AttributeValue, Callback, Element, ElementError, ElementType};
pub use host::Host;
pub use renderer::{NodeSnapshot, Options, Renderer, WorkStatus};
pub use work::{Build, Effect};
