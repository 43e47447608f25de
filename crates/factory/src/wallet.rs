//! HD wallet derived from a seed phrase.

use alloy_core::primitives::Address;
use alloy_network::EthereumWallet;
use alloy_signer_local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};
use anyhow::{Context, Result};

/// Default number of derived accounts, matching what HD wallet providers expose.
pub const DEFAULT_ACCOUNT_COUNT: u32 = 10;

/// A set of accounts derived from one mnemonic along `m/44'/60'/0'/0/{index}`.
///
/// One of them is the sending account used for transactions that don't name a
/// `from` explicitly.
#[derive(Clone)]
pub struct HdWallet {
    signers: Vec<PrivateKeySigner>,
    default_index: usize,
}

impl HdWallet {
    /// Derive `count` accounts from `phrase` and select `default_index` as the sender.
    pub fn from_mnemonic(phrase: &str, count: u32, default_index: u32) -> Result<Self> {
        if count == 0 {
            anyhow::bail!("At least one account must be derived from the mnemonic");
        }

        if default_index >= count {
            anyhow::bail!(
                "Account index {} is out of range: only {} accounts are derived",
                default_index,
                count
            );
        }

        let signers = (0..count)
            .map(|index| derive_signer(phrase, index))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count, default_index, "Derived accounts from mnemonic");

        Ok(Self {
            signers,
            default_index: default_index as usize,
        })
    }

    /// All derived account addresses, in derivation order.
    pub fn accounts(&self) -> Vec<Address> {
        self.signers.iter().map(|s| s.address()).collect()
    }

    /// The sending account.
    pub fn default_account(&self) -> Address {
        self.signers[self.default_index].address()
    }

    /// Build a network wallet holding every derived signer, with the sending
    /// account as the default.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        let mut wallet = EthereumWallet::new(self.signers[self.default_index].clone());
        for (index, signer) in self.signers.iter().enumerate() {
            if index != self.default_index {
                wallet.register_signer(signer.clone());
            }
        }
        wallet
    }
}

fn derive_signer(phrase: &str, index: u32) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase.trim())
        .index(index)
        .with_context(|| format!("Invalid derivation index {}", index))?
        .build()
        .context("Failed to derive account from mnemonic")
}
