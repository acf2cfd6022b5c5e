use codec::Decode;
use subxt::backend::legacy::LegacyRpcMethods;
use subxt::backend::rpc::RpcClient;
use subxt::blocks::ExtrinsicEvents;
use subxt::dynamic::Value;
use subxt::{OnlineClient, PolkadotConfig};
use subxt_signer::sr25519::Keypair;
use thiserror::Error;

use vesting_distribution_shared::vesting::VestingSchedule;
use vesting_distribution_shared::{AccountId, Balance};

pub type Events = ExtrinsicEvents<PolkadotConfig>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Subxt(#[from] subxt::Error),

    #[error("failed to decode {what} from storage: {source}")]
    StorageDecode {
        what: &'static str,
        source: codec::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountBalances {
    pub free: Balance,
    pub reserved: Balance,
}

// System.Account storage layout; only the balance fields are read.
#[derive(Decode)]
struct AccountInfo {
    _nonce: u32,
    _consumers: u32,
    _providers: u32,
    _sufficients: u32,
    data: AccountData,
}

#[derive(Decode)]
struct AccountData {
    free: Balance,
    reserved: Balance,
    _frozen: Balance,
    _flags: Balance,
}

/// Websocket connection to the deployment's node: storage reads plus signed,
/// batched, finalization-watched submission. Everything the scripts know
/// about the chain goes through here.
pub struct ChainClient {
    api: OnlineClient<PolkadotConfig>,
    rpc: LegacyRpcMethods<PolkadotConfig>,
}

impl ChainClient {
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let rpc_client = RpcClient::from_url(url).await?;
        let api = OnlineClient::from_rpc_client(rpc_client.clone()).await?;
        let rpc = LegacyRpcMethods::new(rpc_client);
        Ok(Self { api, rpc })
    }

    pub fn api(&self) -> &OnlineClient<PolkadotConfig> {
        &self.api
    }

    /// Chain name and node implementation version, for the connection log.
    pub async fn chain_info(&self) -> Result<(String, String), Error> {
        let chain = self.rpc.system_chain().await?;
        let version = self.rpc.system_version().await?;
        Ok((chain, version))
    }

    /// Runtime spec version as the node currently reports it (not a value
    /// cached at connection time).
    pub async fn spec_version(&self) -> Result<u32, Error> {
        let version = self.rpc.state_get_runtime_version(None).await?;
        Ok(version.spec_version)
    }

    pub async fn sudo_key(&self) -> Result<Option<AccountId>, Error> {
        let query = subxt::dynamic::storage("Sudo", "Key", vec![]);
        let entry = self.api.storage().at_latest().await?.fetch(&query).await?;
        entry
            .map(|thunk| {
                AccountId::decode(&mut thunk.encoded()).map_err(|source| Error::StorageDecode {
                    what: "sudo key",
                    source,
                })
            })
            .transpose()
    }

    pub async fn account_balances(&self, who: &AccountId) -> Result<AccountBalances, Error> {
        let query = subxt::dynamic::storage("System", "Account", vec![Value::from_bytes(who.0)]);
        let entry = self.api.storage().at_latest().await?.fetch(&query).await?;
        let Some(thunk) = entry else {
            return Ok(AccountBalances::default());
        };
        let info =
            AccountInfo::decode(&mut thunk.encoded()).map_err(|source| Error::StorageDecode {
                what: "account info",
                source,
            })?;
        Ok(AccountBalances {
            free: info.data.free,
            reserved: info.data.reserved,
        })
    }

    pub async fn vesting_schedules(&self, who: &AccountId) -> Result<Vec<VestingSchedule>, Error> {
        let query = subxt::dynamic::storage("Vesting", "VestingSchedules", vec![Value::from_bytes(who.0)]);
        let entry = self.api.storage().at_latest().await?.fetch(&query).await?;
        entry
            .map(|thunk| {
                Vec::<VestingSchedule>::decode(&mut thunk.encoded()).map_err(|source| {
                    Error::StorageDecode {
                        what: "vesting schedules",
                        source,
                    }
                })
            })
            .transpose()
            .map(|schedules| schedules.unwrap_or_default())
    }

    /// Sign a `Utility.batch_all` of `calls`, submit it and wait until it is
    /// finalized *and* succeeded. Returns the events of the extrinsic for
    /// the caller to verify against its expectations.
    pub async fn submit_batch_all(&self, signer: &Keypair, calls: Vec<Value>) -> Result<Events, Error> {
        let payload = subxt::dynamic::tx(
            "Utility",
            "batch_all",
            vec![Value::unnamed_composite(calls)],
        );
        let events = self
            .api
            .tx()
            .sign_and_submit_then_watch_default(&payload, signer)
            .await?
            .wait_for_finalized_success()
            .await?;
        Ok(events)
    }
}

/// Typed views of the events the scripts verify phase results against.
/// Only the variants this deployment dispatches are modelled.
pub mod events {
    use codec::Decode;
    use subxt::events::StaticEvent;

    use vesting_distribution_shared::{AccountId, Balance};

    #[derive(Decode, subxt::ext::scale_decode::DecodeAsType, Debug, Clone, Copy, PartialEq, Eq)]
    #[decode_as_type(crate_path = "subxt::ext::scale_decode")]
    pub enum ProxyType {
        Any,
        CancelProxy,
        Governance,
        Transfer,
    }

    #[derive(Decode, subxt::ext::scale_decode::DecodeAsType, Debug, Clone)]
    #[decode_as_type(crate_path = "subxt::ext::scale_decode")]
    pub struct PureCreated {
        pub pure: AccountId,
        pub who: AccountId,
        pub proxy_type: ProxyType,
        pub disambiguation_index: u16,
    }

    impl StaticEvent for PureCreated {
        const PALLET: &'static str = "Proxy";
        const EVENT: &'static str = "PureCreated";
    }

    #[derive(Decode, subxt::ext::scale_decode::DecodeAsType, Debug, Clone)]
    #[decode_as_type(crate_path = "subxt::ext::scale_decode")]
    pub struct ProxyAdded {
        pub delegator: AccountId,
        pub delegatee: AccountId,
        pub proxy_type: ProxyType,
        pub delay: u32,
    }

    impl StaticEvent for ProxyAdded {
        const PALLET: &'static str = "Proxy";
        const EVENT: &'static str = "ProxyAdded";
    }

    #[derive(Decode, subxt::ext::scale_decode::DecodeAsType, Debug, Clone)]
    #[decode_as_type(crate_path = "subxt::ext::scale_decode")]
    pub struct Transfer {
        pub from: AccountId,
        pub to: AccountId,
        pub amount: Balance,
    }

    impl StaticEvent for Transfer {
        const PALLET: &'static str = "Balances";
        const EVENT: &'static str = "Transfer";
    }
}
