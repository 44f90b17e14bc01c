//! Wallet provider capability (EIP-1193 style) as seen by the bridge.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;
use woop_api_types::{ChainId, ProviderHints, WalletInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    EthAccounts,
    EthRequestAccounts,
    EthChainId,
}

impl RpcMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EthAccounts => "eth_accounts",
            Self::EthRequestAccounts => "eth_requestAccounts",
            Self::EthChainId => "eth_chainId",
        }
    }
}

/// Wallet owned by the host page. The widget only borrows it for the
/// lifetime of the bridge.
#[async_trait(?Send)]
pub trait WalletProvider {
    async fn request(&self, method: RpcMethod, params: &[Value]) -> Result<Value, ProviderError>;

    fn hints(&self) -> ProviderHints {
        ProviderHints::default()
    }
}

#[async_trait(?Send)]
impl<P: WalletProvider + ?Sized> WalletProvider for Rc<P> {
    async fn request(&self, method: RpcMethod, params: &[Value]) -> Result<Value, ProviderError> {
        (**self).request(method, params).await
    }

    fn hints(&self) -> ProviderHints {
        (**self).hints()
    }
}

/// Which accounts call opens a handshake round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountsRequest {
    /// `eth_accounts`: never prompts the user.
    #[default]
    Passive,
    /// `eth_requestAccounts`: may open the wallet's connect prompt.
    Prompt,
}

impl AccountsRequest {
    pub fn method(self) -> RpcMethod {
        match self {
            Self::Passive => RpcMethod::EthAccounts,
            Self::Prompt => RpcMethod::EthRequestAccounts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub accounts: AccountsRequest,
    pub include_chain_id: bool,
    pub include_hints: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            accounts: AccountsRequest::Passive,
            include_chain_id: true,
            include_hints: false,
        }
    }
}

/// Query the provider's current state. One accounts call, then at most one
/// chain id call; nothing is cached.
pub async fn fetch_wallet_info<P>(provider: &P, options: FetchOptions) -> Result<WalletInfo, ProviderError>
where
    P: WalletProvider + ?Sized,
{
    let accounts_method = options.accounts.method();
    let accounts = provider.request(accounts_method, &[]).await?;
    let address = first_account(accounts_method, &accounts)?;

    let chain_id = if options.include_chain_id {
        let raw = provider.request(RpcMethod::EthChainId, &[]).await?;
        Some(parse_chain_id(&raw)?)
    } else {
        None
    };

    let provider = options
        .include_hints
        .then(|| provider.hints())
        .filter(|hints| !hints.is_empty());

    Ok(WalletInfo {
        address,
        chain_id,
        provider,
    })
}

fn first_account(method: RpcMethod, accounts: &Value) -> Result<String, ProviderError> {
    let list = accounts.as_array().ok_or_else(|| ProviderError::InvalidResponse {
        method: method.as_str(),
        detail: format!("expected an array, got {accounts}"),
    })?;

    match list.first() {
        None => Err(ProviderError::NoAccounts),
        Some(Value::String(address)) if !address.is_empty() => Ok(address.clone()),
        Some(Value::String(_)) => Err(ProviderError::NoAccounts),
        Some(other) => Err(ProviderError::InvalidResponse {
            method: method.as_str(),
            detail: format!("account is not a string: {other}"),
        }),
    }
}

fn parse_chain_id(raw: &Value) -> Result<ChainId, ProviderError> {
    match raw {
        Value::String(hex) if !hex.is_empty() => Ok(ChainId::Hex(hex.clone())),
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0 && *n >= 0.0).map(|n| n as u64))
            .map(ChainId::Numeric)
            .ok_or_else(|| invalid_chain_id(raw)),
        _ => Err(invalid_chain_id(raw)),
    }
}

fn invalid_chain_id(raw: &Value) -> ProviderError {
    ProviderError::InvalidResponse {
        method: RpcMethod::EthChainId.as_str(),
        detail: format!("unusable chain id {raw}"),
    }
}
