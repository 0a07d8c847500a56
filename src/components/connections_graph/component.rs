use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{Local, NaiveDateTime};
use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, CanvasRenderingContext2d, CustomEvent, Element, Event, EventTarget,
	HtmlCanvasElement, HtmlElement, MouseEvent, ResizeObserver, TouchEvent, WheelEvent, Window,
};

use super::config::LayoutConfig;
use super::detail::DetailView;
use super::dom::{Overlay, event_for_target};
use super::geom::Point;
use super::interaction::{Cursor, Effect as Action, InputEvent};
use super::render;
use super::state::GraphSession;
use crate::error::GraphError;
use crate::services::ServiceSource;

/// Fixed so a dataset always lays out the same way.
const LAYOUT_SEED: u64 = 0x2113_0911;
const CONTAINER_CLASS: &str = "cg-light";

type Handler = Closure<dyn FnMut(Event)>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Listener {
	target: EventTarget,
	event: &'static str,
	callback: Handler,
}

fn listen(
	target: &EventTarget,
	event: &'static str,
	passive: bool,
	f: impl FnMut(Event) + 'static,
) -> Result<Listener, GraphError> {
	let callback: Handler = Closure::new(f);
	let opts = AddEventListenerOptions::new();
	opts.set_passive(passive);
	target.add_event_listener_with_callback_and_add_event_listener_options(
		event,
		callback.as_ref().unchecked_ref(),
		&opts,
	)?;
	Ok(Listener {
		target: target.clone(),
		event,
		callback,
	})
}

/// Parse the optional `detail` of a `timechange` event.
pub fn parse_event_time(raw: &str) -> Option<NaiveDateTime> {
	["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
		.into_iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// DOM handles and the session for one mount.
struct Scene {
	session: RefCell<GraphSession>,
	source: Rc<dyn ServiceSource>,
	window: Window,
	container: HtmlElement,
	root: Element,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	overlay: Overlay,
}

impl Scene {
	fn new(source: Rc<dyn ServiceSource>, config: &LayoutConfig, container: &HtmlElement) -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::NoWindow)?;
		let document = window.document().ok_or(GraphError::NoDocument)?;
		let session = GraphSession::new(source.as_ref(), config, Local::now().naive_local(), LAYOUT_SEED);

		let root = document.create_element("div")?;
		root.set_class_name("cg-root");
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| GraphError::Dom("canvas element".into()))?;
		canvas.set_class_name("cg-canvas");
		root.append_child(&canvas)?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(GraphError::NoContext)?
			.dyn_into()
			.map_err(|_| GraphError::NoContext)?;
		let overlay = Overlay::build(&document, &root, &session.model)?;

		container.append_child(&root)?;
		let _ = container.class_list().add_1(CONTAINER_CLASS);

		Ok(Self {
			session: RefCell::new(session),
			source,
			window,
			container: container.clone(),
			root,
			canvas,
			ctx,
			overlay,
		})
	}

	fn local_point(&self, client_x: i32, client_y: i32) -> Point {
		let rect = self.canvas.get_bounding_client_rect();
		Point::new(client_x as f64 - rect.left(), client_y as f64 - rect.top())
	}

	fn touch_pair(&self, e: &TouchEvent) -> Option<(Point, Point)> {
		let touches = e.touches();
		if touches.length() < 2 {
			return None;
		}
		let (a, b) = (touches.get(0)?, touches.get(1)?);
		Some((
			self.local_point(a.client_x(), a.client_y()),
			self.local_point(b.client_x(), b.client_y()),
		))
	}

	/// Size the backing store to the container at device resolution.
	fn measure(&self) {
		let (w, h) = (
			self.container.client_width() as f64,
			self.container.client_height() as f64,
		);
		if w <= 0.0 || h <= 0.0 {
			self.session.borrow_mut().resize(0.0, 0.0);
			return;
		}
		let dpr = match self.window.device_pixel_ratio() {
			d if d > 0.0 => d,
			_ => 1.0,
		};
		self.canvas.set_width((w * dpr) as u32);
		self.canvas.set_height((h * dpr) as u32);
		let style = HtmlElement::style(&self.canvas);
		let _ = style.set_property("width", &format!("{w}px"));
		let _ = style.set_property("height", &format!("{h}px"));
		let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
		self.session.borrow_mut().resize(w, h);
	}

	fn dispatch(&self, event: InputEvent) {
		let actions = self.session.borrow_mut().dispatch(event);
		for action in actions {
			self.apply(action);
		}
	}

	fn apply(&self, action: Action) {
		match action {
			Action::ShowDetail(idx) => {
				let view = DetailView::build(&self.session.borrow().model, idx);
				if let Some(view) = view {
					if let Err(e) = self.overlay.show_detail(&view) {
						error!("detail panel: {e}");
					}
				}
			}
			Action::HideDetail => self.overlay.hide_detail(),
			Action::SetCursor(cursor) => {
				let value = match cursor {
					Cursor::Default => "grab",
					Cursor::Pointer => "pointer",
					Cursor::Grabbing => "grabbing",
				};
				let _ = HtmlElement::style(&self.canvas).set_property("cursor", value);
			}
			Action::ClearSearch => self.overlay.clear_search(),
			Action::SyncControls => self.overlay.sync_controls(&self.session.borrow().interaction),
		}
	}

	fn refresh_hours(&self, now: NaiveDateTime) {
		self.session.borrow_mut().refresh_hours(self.source.as_ref(), now);
		debug!("hours refreshed for {now}");
	}
}

struct Mounted {
	scene: Rc<Scene>,
	listeners: Vec<Listener>,
	raf_id: Rc<Cell<Option<i32>>>,
	animate: FrameCallback,
	observer: Option<ResizeObserver>,
	on_resize: Option<Closure<dyn FnMut()>>,
}

impl Mounted {
	fn new(scene: Scene) -> Self {
		Self {
			scene: Rc::new(scene),
			listeners: Vec::new(),
			raf_id: Rc::new(Cell::new(None)),
			animate: Rc::new(RefCell::new(None)),
			observer: None,
			on_resize: None,
		}
	}

	fn on(
		&mut self,
		target: &EventTarget,
		event: &'static str,
		passive: bool,
		f: impl FnMut(Event) + 'static,
	) -> Result<(), GraphError> {
		self.listeners.push(listen(target, event, passive, f)?);
		Ok(())
	}

	fn attach(&mut self) -> Result<(), GraphError> {
		let scene = self.scene.clone();
		let canvas: EventTarget = scene.canvas.clone().into();
		let window: EventTarget = scene.window.clone().into();

		let s = scene.clone();
		self.on(&canvas, "pointerdown", true, move |e| {
			if let Some(e) = e.dyn_ref::<MouseEvent>() {
				s.dispatch(InputEvent::PointerDown(s.local_point(e.client_x(), e.client_y())));
			}
		})?;
		let s = scene.clone();
		self.on(&window, "pointermove", true, move |e| {
			if let Some(e) = e.dyn_ref::<MouseEvent>() {
				s.dispatch(InputEvent::PointerMove(s.local_point(e.client_x(), e.client_y())));
			}
		})?;
		let s = scene.clone();
		self.on(&window, "pointerup", true, move |_| s.dispatch(InputEvent::PointerUp))?;
		let s = scene.clone();
		self.on(&canvas, "pointerleave", true, move |_| s.dispatch(InputEvent::PointerLeave))?;
		let s = scene.clone();
		self.on(&canvas, "click", true, move |e| {
			if let Some(e) = e.dyn_ref::<MouseEvent>() {
				s.dispatch(InputEvent::Click(s.local_point(e.client_x(), e.client_y())));
			}
		})?;
		let s = scene.clone();
		self.on(&canvas, "wheel", false, move |e| {
			e.prevent_default();
			if let Some(e) = e.dyn_ref::<WheelEvent>() {
				s.dispatch(InputEvent::Wheel {
					at: s.local_point(e.client_x(), e.client_y()),
					delta_y: e.delta_y(),
				});
			}
		})?;

		let s = scene.clone();
		self.on(&canvas, "touchstart", false, move |e| {
			let Some(touch) = e.dyn_ref::<TouchEvent>() else { return };
			if let Some((a, b)) = s.touch_pair(touch) {
				e.prevent_default();
				s.dispatch(InputEvent::TouchStart(a, b));
			}
		})?;
		let s = scene.clone();
		self.on(&canvas, "touchmove", false, move |e| {
			let Some(touch) = e.dyn_ref::<TouchEvent>() else { return };
			if let Some((a, b)) = s.touch_pair(touch) {
				e.prevent_default();
				s.dispatch(InputEvent::TouchMove(a, b));
			}
		})?;
		let s = scene.clone();
		self.on(&canvas, "touchend", true, move |e| {
			let remaining = e.dyn_ref::<TouchEvent>().map_or(0, |t| t.touches().length());
			if remaining < 2 {
				s.dispatch(InputEvent::TouchEnd);
			}
		})?;

		let s = scene.clone();
		let search: EventTarget = scene.overlay.search.clone().into();
		self.on(&search, "input", true, move |_| {
			let query = s.overlay.search.value();
			s.dispatch(InputEvent::Search(query));
		})?;

		for panel in [&scene.overlay.detail, &scene.overlay.filters, &scene.overlay.nav] {
			let s = scene.clone();
			let target: EventTarget = panel.clone().into();
			self.on(&target, "click", true, move |e| {
				let control = e
					.target()
					.and_then(|t| t.dyn_into::<Element>().ok())
					.and_then(|t| event_for_target(&t));
				if let Some(event) = control {
					s.dispatch(event);
				}
			})?;
		}

		if let Some(document) = scene.window.document() {
			let s = scene.clone();
			let target: EventTarget = document.into();
			self.on(&target, "timechange", true, move |e| {
				let now = e
					.dyn_ref::<CustomEvent>()
					.and_then(|c| c.detail().as_string())
					.and_then(|raw| parse_event_time(&raw))
					.unwrap_or_else(|| Local::now().naive_local());
				s.refresh_hours(now);
			})?;
		}

		let s = scene.clone();
		let on_resize: Closure<dyn FnMut()> = Closure::new(move || s.measure());
		scene
			.window
			.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
		let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
		observer.observe(&scene.container);
		self.observer = Some(observer);
		self.on_resize = Some(on_resize);
		Ok(())
	}

	/// Start the frame loop on the next animation frame, once the container has a size.
	fn start(&mut self) -> Result<(), GraphError> {
		let (s, next, id) = (self.scene.clone(), self.animate.clone(), self.raf_id.clone());
		let mut last: Option<f64> = None;
		*self.animate.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			let dt = match last {
				Some(prev) => (timestamp - prev) / 1000.0,
				None => {
					s.measure();
					0.0
				}
			};
			last = Some(timestamp);
			{
				let mut session = s.session.borrow_mut();
				session.tick(dt);
				render::render(&session, &s.ctx);
			}
			if let Some(cb) = next.borrow().as_ref() {
				id.set(s.window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));

		if let Some(cb) = self.animate.borrow().as_ref() {
			let handle = self.scene.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
			self.raf_id.set(Some(handle));
		}
		Ok(())
	}

	fn teardown(self) {
		let scene = &self.scene;
		if let Some(handle) = self.raf_id.take() {
			let _ = scene.window.cancel_animation_frame(handle);
		}
		self.animate.borrow_mut().take();
		for l in &self.listeners {
			let _ = l
				.target
				.remove_event_listener_with_callback(l.event, l.callback.as_ref().unchecked_ref());
		}
		if let Some(cb) = &self.on_resize {
			let _ = scene
				.window
				.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let Some(observer) = &self.observer {
			observer.disconnect();
		}
		scene.root.remove();
		let _ = scene.container.class_list().remove_1(CONTAINER_CLASS);
		info!("connections graph destroyed");
	}
}

/// Mountable connections view. Cloning shares the same mount slot, so any
/// clone can destroy what another initialized.
#[derive(Clone)]
pub struct ConnectionsGraph {
	source: Rc<dyn ServiceSource>,
	config: LayoutConfig,
	mounted: Rc<RefCell<Option<Mounted>>>,
}

impl ConnectionsGraph {
	pub fn new(source: Rc<dyn ServiceSource>) -> Self {
		Self {
			source,
			config: LayoutConfig::default(),
			mounted: Rc::new(RefCell::new(None)),
		}
	}

	pub fn with_config(mut self, config: LayoutConfig) -> Self {
		self.config = config;
		self
	}

	/// Build the graph and mount it into `container`, replacing any earlier mount.
	pub fn initialize(&self, container: &HtmlElement) -> Result<(), GraphError> {
		self.destroy();
		let scene = Scene::new(self.source.clone(), &self.config, container)?;
		let mut mounted = Mounted::new(scene);
		if let Err(e) = mounted.attach().and_then(|_| mounted.start()) {
			mounted.teardown();
			return Err(e);
		}
		*self.mounted.borrow_mut() = Some(mounted);
		Ok(())
	}

	/// Stop the frame loop, detach every listener and remove the DOM subtree.
	/// Safe to call when nothing is mounted.
	pub fn destroy(&self) {
		let mounted = self.mounted.borrow_mut().take();
		if let Some(mounted) = mounted {
			mounted.teardown();
		}
	}

	pub fn is_initialized(&self) -> bool {
		self.mounted.borrow().is_some()
	}
}

/// Leptos wrapper: mounts once the container exists and destroys on cleanup.
#[component]
pub fn ConnectionsGraphView(source: Rc<dyn ServiceSource>) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let graph = StoredValue::new_local(ConnectionsGraph::new(source));

	Effect::new(move |_| {
		let Some(div) = container_ref.get() else {
			return;
		};
		let container: HtmlElement = div.into();
		graph.with_value(|g| {
			if let Err(e) = g.initialize(&container) {
				error!("connections graph failed to start: {e}");
			}
		});
	});

	on_cleanup(move || {
		graph.try_with_value(|g| g.destroy());
	});

	view! { <div node_ref=container_ref class="cg-container"></div> }
}
