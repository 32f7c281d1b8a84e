use crate::CourtError;
use alloy_primitives::{Address, B256, Bytes, U256};
use cc_api_types::{Dispute, DisputeId};
use cc_contract::{calls, returns};
use cc_wallet_provider::{ProviderExt, TransactionRequest, WalletProvider};
use std::rc::Rc;

/// Typed handle to the deployed court.
///
/// Built read-only; [`CourtContract::connect`] binds it to a signer so that
/// writes carry a `from` address.
pub struct CourtContract<P: ?Sized> {
    address: Address,
    provider: Rc<P>,
    from: Option<Address>,
}

impl<P: ?Sized> Clone for CourtContract<P> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            provider: Rc::clone(&self.provider),
            from: self.from,
        }
    }
}

impl<P: WalletProvider + ?Sized> CourtContract<P> {
    pub fn new(address: Address, provider: Rc<P>) -> Self {
        Self {
            address,
            provider,
            from: None,
        }
    }

    pub fn connect(&self, signer: &SignerHandle<P>) -> Self {
        Self {
            address: self.address,
            provider: Rc::clone(&self.provider),
            from: Some(signer.address),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.from
    }

    fn request(&self, data: Bytes, value: Option<U256>) -> TransactionRequest {
        TransactionRequest {
            from: self.from,
            to: self.address,
            value,
            data,
        }
    }

    async fn view(&self, data: Bytes) -> Result<Bytes, CourtError> {
        Ok(self.provider.call(&self.request(data, None)).await?)
    }

    pub async fn get_dispute(&self, dispute_id: DisputeId) -> Result<Dispute, CourtError> {
        let out = self.view(calls::get_dispute(dispute_id)).await?;
        Ok(returns::dispute(&out)?)
    }

    pub async fn get_dispute_count(&self) -> Result<U256, CourtError> {
        let out = self.view(calls::get_dispute_count()).await?;
        Ok(returns::uint("getDisputeCount", &out)?)
    }

    pub async fn is_authorized_arbitrator(&self, arbitrator: Address) -> Result<bool, CourtError> {
        let out = self.view(calls::is_authorized_arbitrator(arbitrator)).await?;
        Ok(returns::boolean("isAuthorizedArbitrator", &out)?)
    }

    pub async fn arbitration_fee(&self) -> Result<U256, CourtError> {
        let out = self.view(calls::arbitration_fee()).await?;
        Ok(returns::uint("arbitrationFee", &out)?)
    }

    pub async fn owner(&self) -> Result<Address, CourtError> {
        let out = self.view(calls::owner()).await?;
        Ok(returns::address("owner", &out)?)
    }

    /// Dry-run a write with the signer as sender, then hand it to the wallet.
    /// Reverts surface here, before the wallet prompts.
    pub async fn submit(&self, data: Bytes, value: Option<U256>) -> Result<B256, CourtError> {
        if self.from.is_none() {
            return Err(CourtError::NotConnected);
        }
        let tx = self.request(data, value);
        self.provider.call(&tx).await?;
        Ok(self.provider.send_transaction(&tx).await?)
    }
}

/// The wallet account that authorizes transactions. Signing itself stays
/// inside the provider.
pub struct SignerHandle<P: ?Sized> {
    provider: Rc<P>,
    address: Address,
}

impl<P: ?Sized> Clone for SignerHandle<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Rc::clone(&self.provider),
            address: self.address,
        }
    }
}

impl<P: ?Sized> SignerHandle<P> {
    pub fn new(provider: Rc<P>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &Rc<P> {
        &self.provider
    }
}

/// Everything that exists only while a wallet is connected.
pub struct Session<P: ?Sized> {
    provider: Rc<P>,
    signer: SignerHandle<P>,
    contract: CourtContract<P>,
    chain_id: u64,
}

impl<P: ?Sized> Clone for Session<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Rc::clone(&self.provider),
            signer: self.signer.clone(),
            contract: self.contract.clone(),
            chain_id: self.chain_id,
        }
    }
}

impl<P: WalletProvider + ?Sized> Session<P> {
    pub fn open(provider: Rc<P>, contract: &CourtContract<P>, address: Address, chain_id: u64) -> Self {
        let signer = SignerHandle::new(Rc::clone(&provider), address);
        let contract = contract.connect(&signer);
        Self {
            provider,
            signer,
            contract,
            chain_id,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn provider(&self) -> &Rc<P> {
        &self.provider
    }

    pub fn signer(&self) -> &SignerHandle<P> {
        &self.signer
    }

    pub fn contract(&self) -> &CourtContract<P> {
        &self.contract
    }
}
