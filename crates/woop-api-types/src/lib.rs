use serde::{Deserialize, Serialize};
use std::fmt;

pub const WALLET_INFO_TAG: &str = "WALLET_INFO";
pub const WOOP_CONNECT_TAG: &str = "WOOP_CONNECT";

/// EIP-155 chain id as reported by a wallet provider.
///
/// Most providers answer `eth_chainId` with a hex string; a few legacy ones
/// return a plain number. Both forms are forwarded as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChainId {
    Hex(String),
    Numeric(u64),
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex(value) => f.write_str(value),
            Self::Numeric(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_meta_mask: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_coinbase_wallet: Option<bool>,
}

impl ProviderHints {
    pub fn is_empty(&self) -> bool {
        self.is_meta_mask.is_none() && self.is_coinbase_wallet.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderHints>,
}

/// Messages posted from the host page into the widget frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    WalletInfo(WalletInfo),
    WoopConnect(WalletInfo),
}

impl HostMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::WalletInfo(_) => WALLET_INFO_TAG,
            Self::WoopConnect(_) => WOOP_CONNECT_TAG,
        }
    }

    pub fn payload(&self) -> &WalletInfo {
        match self {
            Self::WalletInfo(info) | Self::WoopConnect(info) => info,
        }
    }
}

/// Messages the widget frame sends back to the host page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameMessage {
    RequestWalletInfo,
    ConnectWallet,
}

impl FrameMessage {
    /// Parse an untrusted message body. Anything without a recognised `type`
    /// tag yields `None`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    pub fn requests_wallet_info(self) -> bool {
        matches!(self, Self::RequestWalletInfo | Self::ConnectWallet)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAppCodeRequest {
    pub app_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAppCodeResponse {
    pub app_code: String,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAppCodeRequest {
    pub app_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAppCodeResponse {
    pub app_code: String,
    pub registered: bool,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wallet_info_message_shape() {
        let message = HostMessage::WalletInfo(WalletInfo {
            address: "0xABC".to_owned(),
            chain_id: Some(ChainId::Hex("0x1".to_owned())),
            provider: None,
        });

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "type": "WALLET_INFO", "payload": { "address": "0xABC", "chainId": "0x1" } })
        );
    }

    #[test]
    fn woop_connect_carries_hints_only() {
        let message = HostMessage::WoopConnect(WalletInfo {
            address: "0xABC".to_owned(),
            chain_id: Some(ChainId::Numeric(10)),
            provider: Some(ProviderHints {
                is_meta_mask: Some(true),
                is_coinbase_wallet: None,
            }),
        });

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "WOOP_CONNECT",
                "payload": { "address": "0xABC", "chainId": 10, "provider": { "isMetaMask": true } }
            })
        );
    }

    #[test]
    fn frame_message_recognises_known_tags() {
        assert_eq!(
            FrameMessage::from_value(&json!({ "type": "REQUEST_WALLET_INFO" })),
            Some(FrameMessage::RequestWalletInfo)
        );
        assert_eq!(
            FrameMessage::from_value(&json!({ "type": "CONNECT_WALLET", "extra": 1 })),
            Some(FrameMessage::ConnectWallet)
        );
    }

    #[test]
    fn frame_message_ignores_unknown_shapes() {
        assert_eq!(FrameMessage::from_value(&json!({ "type": "SOMETHING_ELSE" })), None);
        assert_eq!(FrameMessage::from_value(&json!("REQUEST_WALLET_INFO")), None);
        assert_eq!(FrameMessage::from_value(&json!(null)), None);
    }
}
