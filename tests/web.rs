//! Mount lifecycle checks against a real DOM.
#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use crisis_connections::{ConnectionsGraph, ServiceDirectory, ServiceSource};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

const SERVICES: &str = r#"[
	{ "id": "211", "name": "211 Alberta", "shortName": "211", "category": "entry-point",
	  "accessibility": "public", "entryPoint": "211+3", "hours": { "type": "24/7" } },
	{ "id": "cott", "name": "Crisis Outreach", "parentService": "211", "entryPoint": "211+3",
	  "accessibility": "public-criteria", "isMobile": true, "transport": true },
	{ "id": "shelter", "name": "Night Shelter", "category": "shelter", "isDropOff": true,
	  "connections": ["cott"] }
]"#;

fn container() -> HtmlElement {
	let document = web_sys::window().and_then(|w| w.document()).expect("document");
	let div: HtmlElement = document
		.create_element("div")
		.expect("div")
		.dyn_into()
		.expect("html element");
	div.style().set_property("width", "800px").expect("width");
	div.style().set_property("height", "600px").expect("height");
	document.body().expect("body").append_child(&div).expect("attach");
	div
}

fn graph() -> ConnectionsGraph {
	let directory = ServiceDirectory::from_json(SERVICES).expect("services");
	ConnectionsGraph::new(Rc::new(directory) as Rc<dyn ServiceSource>)
}

fn canvases(el: &HtmlElement) -> u32 {
	el.query_selector_all("canvas").expect("query").length()
}

#[wasm_bindgen_test]
fn initialize_mounts_one_canvas_and_overlay() {
	let el = container();
	let g = graph();
	g.initialize(&el).expect("mount");
	assert!(g.is_initialized());
	assert_eq!(canvases(&el), 1);
	assert!(el.class_list().contains("cg-light"));
	assert!(el.query_selector(".cg-nav").expect("query").is_some());
	assert!(el.query_selector(".cg-search input").expect("query").is_some());
	g.destroy();
}

#[wasm_bindgen_test]
fn reinitializing_replaces_the_previous_mount() {
	let el = container();
	let g = graph();
	g.initialize(&el).expect("first mount");
	g.initialize(&el).expect("second mount");
	assert_eq!(canvases(&el), 1);

	g.destroy();
	g.initialize(&el).expect("third mount");
	assert_eq!(canvases(&el), 1);
	g.destroy();
}

#[wasm_bindgen_test]
fn destroy_cleans_up_and_is_idempotent() {
	let el = container();
	let g = graph();
	g.destroy();
	assert!(!g.is_initialized());

	g.initialize(&el).expect("mount");
	g.destroy();
	g.destroy();
	assert!(!g.is_initialized());
	assert_eq!(canvases(&el), 0);
	assert!(!el.class_list().contains("cg-light"));
}

#[wasm_bindgen_test]
fn empty_directory_still_mounts() {
	let el = container();
	let g = ConnectionsGraph::new(Rc::new(ServiceDirectory::default()) as Rc<dyn ServiceSource>);
	g.initialize(&el).expect("mount");
	assert_eq!(canvases(&el), 1);
	g.destroy();
}
