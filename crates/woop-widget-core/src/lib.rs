//! Core of the embeddable Woop wallet widget.
//!
//! Browser-independent: the DOM, the wallet provider, app-code validation and
//! logo fetching are all reached through traits, so the handshake and the
//! lifecycle can be exercised natively. `widget-wasm` supplies the browser
//! implementations.

pub mod bridge;
pub mod config;
pub mod error;
pub mod logo;
pub mod origin;
pub mod provider;
pub mod widget;

pub use bridge::{
    BridgeOptions, BridgeState, Dialect, FrameChannel, HandshakeOutcome, IgnoreReason, ProviderBridge,
};
pub use config::{ConfigPatch, Modules, Networks, Theme, WidgetConfig, WidgetQuery, normalize};
pub use error::{EndpointError, LogoError, PostError, ProviderError, WidgetError};
pub use logo::{LogoResolver, data_url};
pub use origin::{DEFAULT_WIDGET_URL, TrustedOrigin, WidgetEndpoint};
pub use provider::{AccountsRequest, FetchOptions, RpcMethod, WalletProvider, fetch_wallet_info};
pub use widget::{Widget, WidgetHost, WidgetSettings};
pub use woop_api_types::{ChainId, FrameMessage, HostMessage, ProviderHints, WalletInfo};
pub use woop_appcode::AppCodeValidator;
