//! Widget lifecycle: validate, render, bridge, tear down.

use crate::bridge::{BridgeOptions, FrameChannel, HandshakeOutcome, IgnoreReason, ProviderBridge};
use crate::config::{ConfigPatch, WidgetConfig, normalize};
use crate::error::WidgetError;
use crate::logo::LogoResolver;
use crate::origin::WidgetEndpoint;
use crate::provider::WalletProvider;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};
use woop_appcode::AppCodeValidator;

/// Where the widget lives: a container that can hold exactly one frame plus
/// the listeners registered for it.
pub trait WidgetHost {
    type Frame: FrameChannel + Clone;

    /// Clear the container and mount a fresh frame pointing at `src`.
    fn mount_frame(&self, src: &str) -> Result<Self::Frame, WidgetError>;

    /// Re-render an already mounted frame.
    fn set_frame_src(&self, frame: &Self::Frame, src: &str) -> Result<(), WidgetError>;

    /// Remove the frame from its container. Must tolerate a frame that is
    /// already gone.
    fn unmount_frame(&self, frame: &Self::Frame);

    /// Deregister every listener registered for this widget.
    fn detach_listeners(&self);
}

pub struct WidgetSettings {
    pub endpoint: WidgetEndpoint,
    pub bridge: BridgeOptions,
    pub validator: Option<Rc<dyn AppCodeValidator>>,
    pub logo_resolver: Option<Rc<dyn LogoResolver>>,
}

impl WidgetSettings {
    pub fn new(endpoint: WidgetEndpoint) -> Self {
        Self {
            endpoint,
            bridge: BridgeOptions::default(),
            validator: None,
            logo_resolver: None,
        }
    }

    pub fn with_bridge(mut self, bridge: BridgeOptions) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_validator(mut self, validator: Rc<dyn AppCodeValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_logo_resolver(mut self, resolver: Rc<dyn LogoResolver>) -> Self {
        self.logo_resolver = Some(resolver);
        self
    }

    async fn render_url(&self, config: &WidgetConfig) -> String {
        normalize(config, self.logo_resolver.as_deref())
            .await
            .widget_url(&self.endpoint)
    }
}

pub struct Widget<H: WidgetHost, P> {
    host: H,
    settings: WidgetSettings,
    config: RefCell<WidgetConfig>,
    frame: RefCell<Option<H::Frame>>,
    src: RefCell<String>,
    bridge: ProviderBridge<P>,
}

impl<H: WidgetHost, P: WalletProvider> Widget<H, P> {
    /// Validate, normalize and mount. Nothing in the container changes unless
    /// this returns `Ok`.
    pub async fn create(
        host: H,
        config: WidgetConfig,
        settings: WidgetSettings,
        provider: Option<P>,
    ) -> Result<Self, WidgetError> {
        check_app_code(settings.validator.as_deref(), &config.app_code).await?;

        let src = settings.render_url(&config).await;
        let frame = host.mount_frame(&src)?;
        info!("mounted widget frame for app {} ({})", config.app_code, settings.endpoint.origin());

        let bridge = ProviderBridge::new(provider, settings.endpoint.origin().clone(), settings.bridge);
        if !bridge.has_provider() {
            debug!("no wallet provider; widget will render disconnected");
        }

        Ok(Self {
            host,
            settings,
            config: RefCell::new(config),
            frame: RefCell::new(Some(frame)),
            src: RefCell::new(src),
            bridge,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn bridge(&self) -> &ProviderBridge<P> {
        &self.bridge
    }

    pub fn config(&self) -> WidgetConfig {
        self.config.borrow().clone()
    }

    pub fn frame_src(&self) -> String {
        self.src.borrow().clone()
    }

    pub fn frame(&self) -> Option<H::Frame> {
        self.frame.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.frame.borrow().is_some()
    }

    pub async fn frame_loaded(&self) -> HandshakeOutcome {
        match self.frame() {
            Some(frame) => self.bridge.on_frame_loaded(&frame).await,
            None => HandshakeOutcome::Ignored(IgnoreReason::Detached),
        }
    }

    pub async fn message_received(&self, origin: &str, data: &Value) -> HandshakeOutcome {
        match self.frame() {
            Some(frame) => self.bridge.on_message(&frame, origin, data).await,
            None => HandshakeOutcome::Ignored(IgnoreReason::Detached),
        }
    }

    pub async fn provider_changed(&self) -> HandshakeOutcome {
        match self.frame() {
            Some(frame) => self.bridge.on_provider_event(&frame).await,
            None => HandshakeOutcome::Ignored(IgnoreReason::Detached),
        }
    }

    /// Unmount the frame and drop every listener. Safe to call repeatedly;
    /// returns `false` when there was nothing left to tear down.
    pub fn destroy(&self) -> bool {
        let Some(frame) = self.frame.borrow_mut().take() else {
            return false;
        };
        self.bridge.detach();
        self.host.detach_listeners();
        self.host.unmount_frame(&frame);
        info!("widget destroyed");
        true
    }

    /// Merge `patch` and re-render the frame when its URL changes.
    ///
    /// Returns whether the frame was navigated. A re-rendered frame gets
    /// wallet info again on its next load event.
    pub async fn update_config(&self, patch: ConfigPatch) -> Result<bool, WidgetError> {
        if !self.is_mounted() {
            return Err(WidgetError::Destroyed);
        }

        let mut next = self.config();
        let app_code_changed = patch
            .app_code
            .as_ref()
            .is_some_and(|code| *code != next.app_code);
        next.merge(patch);

        if app_code_changed {
            check_app_code(self.settings.validator.as_deref(), &next.app_code).await?;
        }

        let src = self.settings.render_url(&next).await;

        // The widget may have been destroyed while the logo or app code resolved.
        let Some(frame) = self.frame() else {
            return Err(WidgetError::Destroyed);
        };

        *self.config.borrow_mut() = next;
        if *self.src.borrow() == src {
            debug!("config update leaves the frame url unchanged");
            return Ok(false);
        }

        self.host.set_frame_src(&frame, &src)?;
        self.bridge.reset();
        *self.src.borrow_mut() = src;
        info!("widget frame re-rendered");
        Ok(true)
    }
}

async fn check_app_code(validator: Option<&dyn AppCodeValidator>, app_code: &str) -> Result<(), WidgetError> {
    let Some(validator) = validator else {
        return Ok(());
    };

    if app_code.trim().is_empty() {
        return Err(WidgetError::Configuration("appCode is required".to_owned()));
    }

    match validator.validate(app_code).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(WidgetError::Configuration(format!("invalid appCode: {app_code}"))),
        Err(err) => Err(WidgetError::Configuration(format!(
            "could not validate appCode {app_code}: {err:#}"
        ))),
    }
}
