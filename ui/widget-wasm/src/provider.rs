//! Browser wallet provider (EIP-1193 object such as `window.ethereum`).
//!
//! The page keeps ownership of the provider; the widget only holds a
//! reference to the JS object and talks to it through `request`, `on` and
//! `removeListener`.

use crate::dom::{self, js_error_text, to_js};
use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use woop_widget_core::{ProviderError, ProviderHints, RpcMethod, WalletProvider};

#[derive(Clone)]
pub struct JsProvider {
    inner: Object,
}

impl JsProvider {
    /// Accepts any object exposing a `request` function.
    pub fn from_value(value: &JsValue) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let inner: &Object = value.unchecked_ref();
        let request = Reflect::get(inner, &JsValue::from_str("request")).ok()?;
        request.is_function().then(|| Self {
            inner: inner.clone(),
        })
    }

    /// The explicitly passed provider, else `window.ethereum`, else none.
    pub fn resolve(explicit: &JsValue) -> Option<Self> {
        if !explicit.is_undefined() && !explicit.is_null() {
            return Self::from_value(explicit);
        }
        let injected = Reflect::get(&dom::window(), &JsValue::from_str("ethereum")).ok()?;
        Self::from_value(&injected)
    }

    fn flag(&self, name: &str) -> Option<bool> {
        Reflect::get(&self.inner, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_bool())
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.inner, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.dyn_into::<Function>().ok())
    }

    pub fn on(&self, event: &str, callback: &Function) -> Result<(), JsValue> {
        match self.method("on") {
            Some(on) => on.call2(&self.inner, &JsValue::from_str(event), callback).map(drop),
            None => Err(JsValue::from_str("wallet provider does not support events")),
        }
    }

    pub fn remove_listener(&self, event: &str, callback: &Function) -> Result<(), JsValue> {
        match self.method("removeListener") {
            Some(remove) => remove
                .call2(&self.inner, &JsValue::from_str(event), callback)
                .map(drop),
            None => Ok(()),
        }
    }

    async fn call_request(&self, method: RpcMethod, params: &[Value]) -> Result<JsValue, String> {
        let request = self
            .method("request")
            .ok_or_else(|| "provider.request is not a function".to_owned())?;

        let args = if params.is_empty() {
            json!({ "method": method.as_str() })
        } else {
            json!({ "method": method.as_str(), "params": params })
        };
        let args = to_js(&args).map_err(|e| e.to_string())?;

        let result = request
            .call1(&self.inner, &args)
            .map_err(|e| js_error_text(&e))?;
        let promise = match result.dyn_into::<Promise>() {
            Ok(promise) => promise,
            Err(value) => Promise::resolve(&value),
        };
        JsFuture::from(promise).await.map_err(|e| js_error_text(&e))
    }
}

#[async_trait(?Send)]
impl WalletProvider for JsProvider {
    async fn request(&self, method: RpcMethod, params: &[Value]) -> Result<Value, ProviderError> {
        let raw = self
            .call_request(method, params)
            .await
            .map_err(|reason| ProviderError::Rejected {
                method: method.as_str(),
                reason,
            })?;

        if raw.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(raw).map_err(|e| ProviderError::InvalidResponse {
            method: method.as_str(),
            detail: e.to_string(),
        })
    }

    fn hints(&self) -> ProviderHints {
        ProviderHints {
            is_meta_mask: self.flag("isMetaMask"),
            is_coinbase_wallet: self.flag("isCoinbaseWallet"),
        }
    }
}
