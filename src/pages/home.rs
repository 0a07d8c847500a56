use std::rc::Rc;

use leptos::prelude::*;
use log::info;

use crate::components::connections_graph::ConnectionsGraphView;
use crate::error::GraphError;
use crate::services::{ServiceDirectory, ServiceSource};

const SERVICES_JSON: &str = include_str!("../../data/services.json");

/// Parse the bundled service directory.
fn load_services() -> Result<Rc<dyn ServiceSource>, GraphError> {
	let directory = ServiceDirectory::from_json(SERVICES_JSON)?;
	info!("loaded {} services", directory.len());
	Ok(Rc::new(directory))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				{load_services().map(|source| view! { <ConnectionsGraphView source=source /> })}
				<div class="graph-overlay">
					<h1>"Service Connections"</h1>
					<p class="subtitle">"Click a service for details. Scroll to zoom. Drag to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
