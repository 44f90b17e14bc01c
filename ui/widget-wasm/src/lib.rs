//! Woop wallet widget for the browser.
//!
//! `createWidget(container, config)` validates the app code, mounts the
//! hosted widget in an `<iframe>`, and answers its wallet-info requests from
//! the page's wallet provider. The returned handle tears everything down.

pub mod api;
pub mod dom;
pub mod events;
pub mod logging;
pub mod options;
pub mod provider;

use dom::DomHost;
use js_sys::{Promise, Reflect};
use options::EmbedOptions;
use provider::JsProvider;
use std::fmt::Display;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlElement;
use woop_widget_core::{ConfigPatch, Widget, WidgetConfig};

pub(crate) type Runtime = Widget<DomHost, JsProvider>;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init();
}

fn js_error(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn read_config<T: Default + serde::de::DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value.clone()).map_err(|e| js_error(format!("invalid widget config: {e}")))
}

fn read_provider(config: &JsValue) -> Option<JsProvider> {
    let explicit = if config.is_object() {
        Reflect::get(config, &JsValue::from_str("provider")).unwrap_or(JsValue::UNDEFINED)
    } else {
        JsValue::UNDEFINED
    };
    JsProvider::resolve(&explicit)
}

/// Mount a widget into `container`.
///
/// Rejects, leaving the container untouched, when the config is malformed or
/// the app code does not validate. Wallet info is delivered asynchronously
/// after the frame loads.
#[wasm_bindgen(js_name = createWidget)]
pub async fn create_widget(container: HtmlElement, config: JsValue) -> Result<WidgetHandle, JsValue> {
    let widget_config: WidgetConfig = read_config(&config)?;
    let options: EmbedOptions = read_config(&config)?;
    let settings = options.settings().map_err(js_error)?;

    let provider = read_provider(&config);
    if provider.is_none() {
        warn!("no wallet provider found; widget will not receive wallet info");
    }
    let followed = if options.follow_provider_events {
        provider.clone()
    } else {
        None
    };

    let widget = Widget::create(DomHost::new(container), widget_config, settings, provider)
        .await
        .map_err(js_error)?;
    let widget = Rc::new(widget);

    if let Err(err) = events::bind_events(&widget, followed.as_ref()) {
        widget.destroy();
        return Err(err);
    }

    Ok(WidgetHandle { widget })
}

#[wasm_bindgen]
pub struct WidgetHandle {
    widget: Rc<Runtime>,
}

#[wasm_bindgen]
impl WidgetHandle {
    /// Remove the frame and every listener. Safe to call more than once.
    pub fn destroy(&self) -> bool {
        self.widget.destroy()
    }

    /// Merge a partial config and re-render the frame if its URL changed.
    /// Resolves to whether the frame was re-rendered.
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&self, partial: JsValue) -> Promise {
        let widget = Rc::clone(&self.widget);
        future_to_promise(async move {
            let patch: ConfigPatch = read_config(&partial)?;
            let rerendered = widget.update_config(patch).await.map_err(js_error)?;
            Ok(JsValue::from_bool(rerendered))
        })
    }

    #[wasm_bindgen(getter, js_name = frameSrc)]
    pub fn frame_src(&self) -> String {
        self.widget.frame_src()
    }

    #[wasm_bindgen(getter)]
    pub fn origin(&self) -> String {
        self.widget.bridge().origin().as_str().to_owned()
    }

    #[wasm_bindgen(getter, js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.widget.is_mounted()
    }

    #[wasm_bindgen(getter, js_name = listenerCount)]
    pub fn listener_count(&self) -> usize {
        self.widget.host().listener_count()
    }
}
