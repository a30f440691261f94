//! Value delivery after a withdrawal.
//!
//! The accumulator only computes what is owed. The host decides how value
//! reaches the participant by choosing a [`RewardDelivery`] at construction:
//! - [`MintDelivery`] creates new tokens through a [`TokenMinter`]
//! - [`TransferDelivery`] moves existing funds through a [`NativeTransfer`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeliveryError;
use crate::types::{Address, Amount};

/// Delivers a withdrawn amount to a participant.
pub trait RewardDelivery: Send {
    /// Deliver `amount` to `to`. Called exactly once per successful claim.
    fn deliver(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError>;
}

impl<D: RewardDelivery + ?Sized> RewardDelivery for Box<D> {
    fn deliver(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError> {
        (**self).deliver(to, amount)
    }
}

/// Host capability: mint new reward tokens.
pub trait TokenMinter: Send {
    fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError>;
}

/// Host capability: transfer native currency held by the host.
pub trait NativeTransfer: Send {
    fn transfer(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError>;
}

/// Delivers rewards by minting.
#[derive(Debug)]
pub struct MintDelivery<M> {
    minter: M,
}

impl<M: TokenMinter> MintDelivery<M> {
    pub fn new(minter: M) -> Self {
        Self { minter }
    }

    pub fn into_inner(self) -> M {
        self.minter
    }
}

impl<M: TokenMinter> RewardDelivery for MintDelivery<M> {
    fn deliver(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError> {
        self.minter.mint(to, amount)
    }
}

/// Delivers rewards by transferring native currency.
#[derive(Debug)]
pub struct TransferDelivery<T> {
    sender: T,
}

impl<T: NativeTransfer> TransferDelivery<T> {
    pub fn new(sender: T) -> Self {
        Self { sender }
    }

    pub fn into_inner(self) -> T {
        self.sender
    }
}

impl<T: NativeTransfer> RewardDelivery for TransferDelivery<T> {
    fn deliver(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError> {
        self.sender.transfer(to, amount)
    }
}

/// Which delivery mechanism a host is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    /// Mint reward tokens.
    #[default]
    Mint,
    /// Transfer native currency.
    Transfer,
}

impl DeliveryKind {
    /// Box the matching delivery over a host that supports both mechanisms.
    pub fn select<H>(self, host: H) -> Box<dyn RewardDelivery>
    where
        H: TokenMinter + NativeTransfer + 'static,
    {
        match self {
            Self::Mint => Box::new(MintDelivery::new(host)),
            Self::Transfer => Box::new(TransferDelivery::new(host)),
        }
    }
}

impl fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

impl FromStr for DeliveryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mint" => Ok(Self::Mint),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!("unknown delivery kind: {other}")),
        }
    }
}
