use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures while loading data or mounting the graph into the page.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The services document could not be parsed.
	#[error("failed to parse services: {0}")]
	Parse(#[from] serde_json::Error),
	/// No global `window` (not running in a browser).
	#[error("no window available")]
	NoWindow,
	/// No `document` on the window.
	#[error("no document available")]
	NoDocument,
	/// The canvas refused a 2d context.
	#[error("canvas 2d context unavailable")]
	NoContext,
	/// A DOM call threw.
	#[error("dom error: {0}")]
	Dom(String),
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		Self::Dom(
			value
				.as_string()
				.unwrap_or_else(|| format!("{value:?}")),
		)
	}
}
