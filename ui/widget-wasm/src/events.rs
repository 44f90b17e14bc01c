//! Event binding.
//!
//! Wires the frame `load` listener, the window `message` listener and the
//! optional provider change listeners. Each one is wrapped in a [`Listener`]
//! owned by the widget's `DomHost`, so `destroy()` can deregister it.
//! Handlers hold a `Weak` to the widget and spawn their async work via
//! `wasm_bindgen_futures::spawn_local`.

use crate::Runtime;
use crate::dom;
use crate::provider::JsProvider;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, MessageEvent};

const PROVIDER_EVENTS: [&str; 2] = ["accountsChanged", "chainChanged"];

enum Target {
    Dom(EventTarget),
    Provider(JsProvider),
}

/// A registered callback plus what it was registered on.
pub struct Listener {
    target: Target,
    event: &'static str,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl Listener {
    pub fn on_dom(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(JsValue) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: Target::Dom(target.clone()),
            event,
            callback,
        })
    }

    pub fn on_provider(
        provider: &JsProvider,
        event: &'static str,
        handler: impl FnMut(JsValue) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        provider.on(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: Target::Provider(provider.clone()),
            event,
            callback,
        })
    }

    /// Deregister and free the callback.
    pub fn detach(self) {
        let function: &js_sys::Function = self.callback.as_ref().unchecked_ref();
        let removed = match &self.target {
            Target::Dom(target) => target.remove_event_listener_with_callback(self.event, function),
            Target::Provider(provider) => provider.remove_listener(self.event, function),
        };
        if let Err(err) = removed {
            debug!("failed to remove {} listener: {:?}", self.event, err);
        }
    }
}

/// Bind every listener a freshly mounted widget needs.
pub fn bind_events(widget: &Rc<Runtime>, provider: Option<&JsProvider>) -> Result<(), JsValue> {
    let frame = widget
        .frame()
        .ok_or_else(|| JsValue::from_str("widget frame is not mounted"))?;

    // ── Frame load ──
    {
        let weak = Rc::downgrade(widget);
        let listener = Listener::on_dom(frame.element(), "load", move |_: JsValue| {
            spawn_with(&weak, |widget| async move {
                let outcome = widget.frame_loaded().await;
                debug!("frame load handshake: {:?}", outcome);
            });
        })?;
        widget.host().register(listener);
    }

    // ── Re-requests from the frame ──
    {
        let weak = Rc::downgrade(widget);
        let listener = Listener::on_dom(&dom::window(), "message", move |event: JsValue| {
            let event: MessageEvent = event.unchecked_into();
            let origin = event.origin();
            let Some(widget) = weak.upgrade() else {
                return;
            };
            if !widget.bridge().origin().matches(&origin) {
                return;
            }
            let data = serde_wasm_bindgen::from_value(event.data()).unwrap_or(serde_json::Value::Null);
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = widget.message_received(&origin, &data).await;
                debug!("frame message handled: {:?}", outcome);
            });
        })?;
        widget.host().register(listener);
    }

    // ── Provider changes ──
    // Subscription is optional on the provider side; without it the widget
    // still answers load events and re-requests.
    if let Some(provider) = provider {
        for event in PROVIDER_EVENTS {
            let weak = Rc::downgrade(widget);
            let subscribed = Listener::on_provider(provider, event, move |_: JsValue| {
                spawn_with(&weak, |widget| async move {
                    let outcome = widget.provider_changed().await;
                    debug!("provider event handshake: {:?}", outcome);
                });
            });
            match subscribed {
                Ok(listener) => widget.host().register(listener),
                Err(err) => {
                    warn!(
                        "could not follow provider {} events: {}",
                        event,
                        dom::js_error_text(&err)
                    );
                    break;
                }
            }
        }
    }

    Ok(())
}

fn spawn_with<F, Fut>(weak: &Weak<Runtime>, task: F)
where
    F: FnOnce(Rc<Runtime>) -> Fut,
    Fut: std::future::Future<Output = ()> + 'static,
{
    if let Some(widget) = weak.upgrade() {
        wasm_bindgen_futures::spawn_local(task(widget));
    }
}
