//! Host side of the wallet handshake with the widget frame.
//!
//! ```text
//!   Idle ──load──▶ AwaitingWalletInfo ──ok──▶ Sent
//!    ▲                     │                   │
//!    └──────failed─────────┘                   │
//!    re-request (trusted origin) ◀─────────────┘
//! ```
//!
//! Every round queries the provider live. Rounds are never retried
//! automatically; the frame has to ask again.

use crate::error::{PostError, ProviderError};
use crate::origin::TrustedOrigin;
use crate::provider::{AccountsRequest, FetchOptions, WalletProvider, fetch_wallet_info};
use serde_json::Value;
use std::cell::Cell;
use tracing::{debug, info, trace, warn};
use woop_api_types::{FrameMessage, HostMessage, WalletInfo};

/// Outbound half of the cross-document channel.
pub trait FrameChannel {
    /// Post to the frame's content window, restricted to `target`.
    fn post(&self, message: &HostMessage, target: &TrustedOrigin) -> Result<(), PostError>;
}

/// Message flavour understood by the hosted widget build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// `WALLET_INFO` with `{ address, chainId }`.
    #[default]
    WalletInfo,
    /// `WOOP_CONNECT` with `{ address, chainId, provider }`, where `provider`
    /// only carries capability hints.
    WoopConnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    pub accounts: AccountsRequest,
    pub include_chain_id: bool,
    pub dialect: Dialect,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            accounts: AccountsRequest::Passive,
            include_chain_id: true,
            dialect: Dialect::WalletInfo,
        }
    }
}

impl BridgeOptions {
    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            accounts: self.accounts,
            include_chain_id: self.include_chain_id,
            include_hints: self.dialect == Dialect::WoopConnect,
        }
    }

    fn message(&self, info: WalletInfo) -> HostMessage {
        match self.dialect {
            Dialect::WalletInfo => HostMessage::WalletInfo(info),
            Dialect::WoopConnect => HostMessage::WoopConnect(info),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BridgeState {
    #[default]
    Idle,
    AwaitingWalletInfo,
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UntrustedOrigin,
    UnrecognizedMessage,
    FrameNotLoaded,
    Detached,
}

/// Result of one bridge entry point. Nothing here is surfaced to the widget
/// creator; it exists for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    Sent(WalletInfo),
    Failed(ProviderError),
    PostFailed(PostError),
    Ignored(IgnoreReason),
}

impl HandshakeOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

pub struct ProviderBridge<P> {
    provider: Option<P>,
    origin: TrustedOrigin,
    options: BridgeOptions,
    state: Cell<BridgeState>,
    loaded: Cell<bool>,
    detached: Cell<bool>,
    /// Bumped whenever the frame's document is replaced or the bridge is
    /// detached; a round that started under an older value never posts.
    generation: Cell<u64>,
}

impl<P: WalletProvider> ProviderBridge<P> {
    pub fn new(provider: Option<P>, origin: TrustedOrigin, options: BridgeOptions) -> Self {
        Self {
            provider,
            origin,
            options,
            state: Cell::new(BridgeState::Idle),
            loaded: Cell::new(false),
            detached: Cell::new(false),
            generation: Cell::new(0),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state.get()
    }

    pub fn origin(&self) -> &TrustedOrigin {
        &self.origin
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// The frame's document finished loading.
    pub async fn on_frame_loaded<F: FrameChannel>(&self, frame: &F) -> HandshakeOutcome {
        if self.detached.get() {
            return HandshakeOutcome::Ignored(IgnoreReason::Detached);
        }
        self.loaded.set(true);
        self.handshake(frame).await
    }

    /// A `message` event reached the host window.
    ///
    /// The origin is checked before the payload is looked at; anything from
    /// another origin is dropped without side effects.
    pub async fn on_message<F: FrameChannel>(
        &self,
        frame: &F,
        origin: &str,
        data: &Value,
    ) -> HandshakeOutcome {
        if !self.origin.matches(origin) {
            trace!("dropping message from untrusted origin {}", origin);
            return HandshakeOutcome::Ignored(IgnoreReason::UntrustedOrigin);
        }

        match FrameMessage::from_value(data) {
            Some(message) if message.requests_wallet_info() => {
                debug!("frame requested wallet info ({:?})", message);
                self.rerun(frame).await
            }
            _ => HandshakeOutcome::Ignored(IgnoreReason::UnrecognizedMessage),
        }
    }

    /// The provider reported an account or chain change.
    pub async fn on_provider_event<F: FrameChannel>(&self, frame: &F) -> HandshakeOutcome {
        self.rerun(frame).await
    }

    /// Forget the current document; the next load event starts over.
    pub fn reset(&self) {
        self.generation.set(self.generation.get() + 1);
        self.loaded.set(false);
        self.state.set(BridgeState::Idle);
    }

    /// Stop answering. In-flight provider calls are not aborted, but their
    /// results are never posted.
    pub fn detach(&self) {
        self.detached.set(true);
        self.generation.set(self.generation.get() + 1);
        self.loaded.set(false);
        self.state.set(BridgeState::Idle);
    }

    async fn rerun<F: FrameChannel>(&self, frame: &F) -> HandshakeOutcome {
        if self.detached.get() {
            return HandshakeOutcome::Ignored(IgnoreReason::Detached);
        }
        if !self.loaded.get() {
            debug!("wallet info requested before frame load; ignoring");
            return HandshakeOutcome::Ignored(IgnoreReason::FrameNotLoaded);
        }
        self.handshake(frame).await
    }

    async fn handshake<F: FrameChannel>(&self, frame: &F) -> HandshakeOutcome {
        let generation = self.generation.get();
        self.state.set(BridgeState::AwaitingWalletInfo);

        let Some(provider) = self.provider.as_ref() else {
            warn!("No provider available; widget stays disconnected");
            return self.fail(ProviderError::Unavailable);
        };

        let fetched = fetch_wallet_info(provider, self.options.fetch_options()).await;

        if self.detached.get() {
            debug!("widget destroyed during handshake; discarding wallet info");
            return HandshakeOutcome::Ignored(IgnoreReason::Detached);
        }
        if self.generation.get() != generation || !self.loaded.get() {
            // The frame was re-rendered; its new document gets its own round.
            debug!("frame navigated during handshake; discarding wallet info");
            return HandshakeOutcome::Ignored(IgnoreReason::FrameNotLoaded);
        }

        let info = match fetched {
            Ok(info) => info,
            Err(err) => {
                warn!("Failed to get wallet info: {}", err);
                return self.fail(err);
            }
        };

        let message = self.options.message(info.clone());
        if let Err(err) = frame.post(&message, &self.origin) {
            warn!("{}", err);
            self.state.set(BridgeState::Idle);
            return HandshakeOutcome::PostFailed(err);
        }

        info!(
            "posted {} for {} to {}",
            message.tag(),
            info.address,
            self.origin
        );
        self.state.set(BridgeState::Sent);
        HandshakeOutcome::Sent(info)
    }

    fn fail(&self, err: ProviderError) -> HandshakeOutcome {
        self.state.set(BridgeState::Idle);
        HandshakeOutcome::Failed(err)
    }
}
