//! DOM side of the widget: the container, the iframe, and listener ownership.
//!
//! `DomHost` is the browser implementation of `WidgetHost`. Every listener
//! registered for a widget is parked here so teardown can find it again.

use crate::events::Listener;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlIFrameElement, Window};
use woop_api_types::HostMessage;
use woop_widget_core::{FrameChannel, PostError, TrustedOrigin, WidgetError, WidgetHost};

pub const FRAME_ID: &str = "woop-widget-frame";

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn window() -> Window {
    gloo_utils::window()
}

pub(crate) fn js_error_text(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

pub fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer)
}

// ── Frame ──

/// Live reference to the mounted `<iframe>`.
#[derive(Clone)]
pub struct DomFrame(HtmlIFrameElement);

impl DomFrame {
    pub fn element(&self) -> &HtmlIFrameElement {
        &self.0
    }
}

impl FrameChannel for DomFrame {
    fn post(&self, message: &HostMessage, target: &TrustedOrigin) -> Result<(), PostError> {
        let content = self
            .0
            .content_window()
            .ok_or_else(|| PostError("frame has no content window".to_owned()))?;
        let value = to_js(message).map_err(|e| PostError(e.to_string()))?;
        content
            .post_message(&value, target.as_str())
            .map_err(|e| PostError(js_error_text(&e)))
    }
}

// ── Host ──

pub struct DomHost {
    container: HtmlElement,
    listeners: RefCell<Vec<Listener>>,
}

impl DomHost {
    pub fn new(container: HtmlElement) -> Self {
        Self {
            container,
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn register(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn create_frame(&self, src: &str) -> Result<HtmlIFrameElement, JsValue> {
        let frame: HtmlIFrameElement = document().create_element("iframe")?.dyn_into()?;
        frame.set_src(src);
        frame.set_id(FRAME_ID);

        let style = frame.style();
        style.set_property("width", "100%")?;
        style.set_property("height", "600px")?;
        style.set_property("border", "1px solid #E5E7EB")?;
        style.set_property("border-radius", "16px")?;
        Ok(frame)
    }
}

impl WidgetHost for DomHost {
    type Frame = DomFrame;

    fn mount_frame(&self, src: &str) -> Result<DomFrame, WidgetError> {
        let frame = self
            .create_frame(src)
            .map_err(|e| WidgetError::Mount(js_error_text(&e)))?;

        self.container.set_inner_html("");
        self.container
            .append_child(&frame)
            .map_err(|e| WidgetError::Mount(js_error_text(&e)))?;
        Ok(DomFrame(frame))
    }

    fn set_frame_src(&self, frame: &DomFrame, src: &str) -> Result<(), WidgetError> {
        frame.0.set_src(src);
        Ok(())
    }

    fn unmount_frame(&self, frame: &DomFrame) {
        if frame.0.parent_node().is_some() {
            frame.0.remove();
        }
    }

    fn detach_listeners(&self) {
        let listeners: Vec<Listener> = self.listeners.borrow_mut().drain(..).collect();
        for listener in listeners {
            listener.detach();
        }
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        // Closures are about to be freed; JS must not call into them afterwards.
        self.detach_listeners();
    }
}
