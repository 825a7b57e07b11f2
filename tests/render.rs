mod common;

use common::memory_renderer;
use fiber_dom::{
	create_element,
	memory::{MemoryHost, Mutation},
	text, Attribute, CommitSummary, Effect, Element, ElementType, NodeSnapshot, Renderer,
};
use indextree::NodeId;

fn list(tags: &[&str]) -> Element {
	create_element("ul", vec![], tags.iter().map(|tag| create_element(*tag, vec![], vec![])).collect())
}

fn commit(renderer: &mut Renderer<MemoryHost>, element: Element) -> CommitSummary {
	renderer.render(element).unwrap();
	renderer.flush().unwrap().unwrap()
}

fn shape(snapshot: &[NodeSnapshot]) -> Vec<(usize, Option<ElementType>)> {
	snapshot.iter().map(|node| (node.depth, node.element_type.clone())).collect()
}

fn first_child(renderer: &Renderer<MemoryHost>, node: NodeId) -> NodeId {
	renderer.host().children(node)[0]
}

#[test]
fn first_render_places_everything() {
	let (mut renderer, body) = memory_renderer();

	let summary = commit(
		&mut renderer,
		create_element("div", vec![Attribute::plain("id", "app")], vec![text("Hello"), create_element("span", vec![], vec![])]),
	);

	assert_eq!(summary, CommitSummary { placements: 3, updates: 0, deletions: 0 });
	assert_eq!(renderer.host().markup(body), r#"<body><div id="app">Hello<span></span></div></body>"#);
	assert!(renderer.is_idle());
}

#[test]
fn string_children_become_text_nodes() {
	let (mut renderer, body) = memory_renderer();

	commit(&mut renderer, create_element("p", vec![], vec!["one".into(), String::from("two").into()]));

	assert_eq!(renderer.host().markup(body), "<body><p>onetwo</p></body>");
	let p = first_child(&renderer, body);
	let texts = renderer.host().children(p);
	assert_eq!(texts.len(), 2);
	assert_eq!(renderer.host().attribute(texts[1], "nodeValue"), Some("two"));
}

#[test]
fn identical_render_is_a_no_op() {
	let (mut renderer, body) = memory_renderer();
	let tree = || create_element("div", vec![Attribute::plain("class", "card")], vec![text("Hi"), create_element("b", vec![], vec![text("!")])]);

	commit(&mut renderer, tree());
	renderer.host_mut().take_mutations();

	let summary = commit(&mut renderer, tree());

	assert_eq!(summary, CommitSummary { placements: 0, updates: 4, deletions: 0 });
	assert!(renderer.host().mutations().is_empty());
	assert_eq!(renderer.host().markup(body), r#"<body><div class="card">Hi<b>!</b></div></body>"#);
}

#[test]
fn type_mismatch_replaces_in_place() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, list(&["div", "span"]));
	let ul = first_child(&renderer, body);
	let old = renderer.host().children(ul);
	renderer.host_mut().take_mutations();

	let summary = commit(&mut renderer, list(&["p", "span"]));

	// `ul` and `span` are updated without attribute changes.
	assert_eq!(summary, CommitSummary { placements: 1, updates: 2, deletions: 1 });
	let new = renderer.host().children(ul);
	assert_eq!(new[1], old[1]);
	assert_eq!(
		renderer.host().mutations(),
		&[
			Mutation::RemoveChild { parent: ul, node: old[0] },
			Mutation::CreateElement { node: new[0], tag: "p".to_owned() },
			Mutation::InsertBefore { parent: ul, node: new[0], before: old[1] },
		]
	);
	assert_eq!(renderer.host().markup(body), "<body><ul><p></p><span></span></ul></body>");
}

#[test]
fn growing_list_appends() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, list(&["a"]));

	let summary = commit(&mut renderer, list(&["a", "b"]));

	assert_eq!(summary, CommitSummary { placements: 1, updates: 2, deletions: 0 });
	assert_eq!(renderer.host().markup(body), "<body><ul><a></a><b></b></ul></body>");
}

#[test]
fn shrinking_list_deletes_the_tail() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, list(&["a", "b"]));

	let summary = commit(&mut renderer, list(&["a"]));

	assert_eq!(summary, CommitSummary { placements: 0, updates: 2, deletions: 1 });
	assert_eq!(renderer.host().markup(body), "<body><ul><a></a></ul></body>");
}

#[test]
fn reordering_is_seen_as_updates() {
	let (mut renderer, body) = memory_renderer();
	let items = |labels: [&str; 2]| create_element("ol", vec![], labels.iter().map(|label| create_element("li", vec![], vec![text(*label)])).collect());
	commit(&mut renderer, items(["x", "y"]));
	renderer.host_mut().take_mutations();

	let summary = commit(&mut renderer, items(["y", "x"]));

	assert_eq!(summary, CommitSummary { placements: 0, updates: 5, deletions: 0 });
	let mutations = renderer.host_mut().take_mutations();
	assert_eq!(mutations.len(), 2);
	assert!(mutations.iter().all(|mutation| matches!(mutation, Mutation::SetAttribute { key, .. } if key == "nodeValue")));
	assert_eq!(renderer.host().markup(body), "<body><ol><li>y</li><li>x</li></ol></body>");
}

#[test]
fn text_and_element_at_the_same_index_are_different_types() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, create_element("div", vec![], vec![text("loading")]));

	let summary = commit(&mut renderer, create_element("div", vec![], vec![create_element("img", vec![Attribute::plain("src", "cat.png")], vec![])]));

	assert_eq!(summary, CommitSummary { placements: 1, updates: 1, deletions: 1 });
	assert_eq!(renderer.host().markup(body), r#"<body><div><img src="cat.png"></img></div></body>"#);
}

#[test]
fn deleting_a_subtree_detaches_only_its_root() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, create_element("ul", vec![], vec![create_element("li", vec![], vec![text("x"), create_element("i", vec![], vec![])])]));
	let ul = first_child(&renderer, body);
	let li = first_child(&renderer, ul);
	let li_children = renderer.host().children(li);
	renderer.host_mut().take_mutations();

	let summary = commit(&mut renderer, create_element("ul", vec![], vec![]));

	assert_eq!(summary, CommitSummary { placements: 0, updates: 1, deletions: 1 });
	assert_eq!(renderer.host().mutations(), &[Mutation::RemoveChild { parent: ul, node: li }]);
	assert_eq!(renderer.host().markup(body), "<body><ul></ul></body>");
	assert!(renderer.host().node(li).is_none());
	assert!(li_children.iter().all(|&node| renderer.host().node(node).is_none()));
}

#[test]
fn replacing_the_root_element() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, create_element("header", vec![], vec![text("a")]));

	let summary = commit(&mut renderer, create_element("footer", vec![], vec![text("b")]));

	assert_eq!(summary, CommitSummary { placements: 2, updates: 0, deletions: 1 });
	assert_eq!(renderer.host().markup(body), "<body><footer>b</footer></body>");
}

#[test]
fn committed_tree_is_stable_across_identical_renders() {
	let (mut renderer, _) = memory_renderer();
	let tree = || create_element("main", vec![], vec![list(&["a", "b"]), create_element("p", vec![], vec![text("end")])]);

	commit(&mut renderer, tree());
	let first = renderer.committed_tree();
	commit(&mut renderer, tree());
	let second = renderer.committed_tree();

	assert_eq!(shape(&first), shape(&second));
	assert_eq!(
		shape(&first),
		vec![
			(0, None),
			(1, Some(ElementType::from("main"))),
			(2, Some(ElementType::from("ul"))),
			(3, Some(ElementType::from("a"))),
			(3, Some(ElementType::from("b"))),
			(2, Some(ElementType::from("p"))),
			(3, Some(ElementType::Text)),
		]
	);

	assert_eq!(first[0].effect, Effect::None);
	assert!(first[1..].iter().all(|node| node.effect == Effect::Placement));
	assert_eq!(second[0].effect, Effect::None);
	assert!(second[1..].iter().all(|node| node.effect == Effect::Update));
}

#[test]
fn updates_keep_their_host_nodes() {
	let (mut renderer, body) = memory_renderer();
	commit(&mut renderer, create_element("div", vec![], vec![text("a")]));
	let div = first_child(&renderer, body);
	let text_node = first_child(&renderer, div);

	commit(&mut renderer, create_element("div", vec![Attribute::plain("hidden", "")], vec![text("b")]));

	assert_eq!(first_child(&renderer, body), div);
	assert_eq!(first_child(&renderer, div), text_node);
	assert_eq!(renderer.host().markup(body), r#"<body><div hidden="">b</div></body>"#);
}
