use std::str::FromStr;

use subxt_signer::sr25519::Keypair;
use subxt_signer::SecretUri;
use thiserror::Error;

use vesting_distribution_shared::{AccountId, Balance};

use crate::chain_client::{self, ChainClient};
use crate::consts;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse {name}: {reason}")]
    FailedToParse { name: &'static str, reason: String },

    #[error("failed to connect to the node: {0}")]
    FailedToConnect(#[from] chain_client::Error),
}

pub mod env_vars {
    use std::env;
    use std::fmt::Debug;

    use crate::consts;

    #[derive(Clone)]
    pub struct EnvVarValue<TVal> {
        pub name: &'static str,
        pub sensitive: bool,
        pub value: TVal,
    }

    impl<TVal: Debug> Debug for EnvVarValue<TVal> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let value_print = if self.sensitive {
                "***".to_string()
            } else {
                format!("{:?}", self.value)
            };
            f.debug_struct("EnvVarValue")
                .field("name", &self.name)
                .field("value", &value_print)
                .finish()
        }
    }

    #[derive(Debug, Clone)]
    pub struct EnvVars {
        pub rpc_url: EnvVarValue<String>,
        pub account_secret: EnvVarValue<String>,
        pub delegate_multisig: EnvVarValue<Option<String>>,
    }

    impl EnvVars {
        fn optional(key: &'static str, sensitive: bool) -> EnvVarValue<Option<String>> {
            EnvVarValue {
                name: key,
                sensitive,
                value: env::var(key).ok(),
            }
        }

        fn with_default(key: &'static str, sensitive: bool, default: &str) -> EnvVarValue<String> {
            EnvVarValue {
                name: key,
                sensitive,
                value: env::var(key).unwrap_or_else(|_| default.to_string()),
            }
        }

        pub fn init_from_env() -> Self {
            Self {
                rpc_url: Self::with_default("RPC_URL", false, consts::DEFAULT_RPC_URL),
                account_secret: Self::with_default("ACCOUNT_SECRET", true, "//Alice"),
                delegate_multisig: Self::optional("DELEGATE_MULTISIG", false),
            }
        }
    }
}

/// Deployment knobs resolved from env vars and the chain constants.
pub struct Settings {
    pub treasury: AccountId,
    pub delegate_multisig: Option<AccountId>,
    pub proxy_index_base: u16,
    pub proxy_funding: Balance,
    pub unit_scale: Balance,
}

pub struct ScriptRuntime {
    pub chain: ChainClient,
    pub signer: Keypair,
    pub settings: Settings,
    pub env_vars: Option<env_vars::EnvVars>,
}

impl ScriptRuntime {
    pub async fn init(env_vars: env_vars::EnvVars) -> Result<Self, Error> {
        let uri = SecretUri::from_str(&env_vars.account_secret.value).map_err(|e| Error::FailedToParse {
            name: "ACCOUNT_SECRET",
            reason: format!("{e:?}"),
        })?;
        let signer = Keypair::from_uri(&uri).map_err(|e| Error::FailedToParse {
            name: "ACCOUNT_SECRET",
            reason: format!("{e:?}"),
        })?;

        let delegate_multisig = env_vars
            .delegate_multisig
            .value
            .as_deref()
            .map(|raw| {
                AccountId::from_str(raw).map_err(|e| Error::FailedToParse {
                    name: "DELEGATE_MULTISIG",
                    reason: format!("{e:?}"),
                })
            })
            .transpose()?;

        let chain = ChainClient::connect(&env_vars.rpc_url.value).await?;

        let settings = Settings {
            treasury: consts::treasury_account(),
            delegate_multisig,
            proxy_index_base: consts::PROXY_INDEX_BASE,
            proxy_funding: consts::PROXY_FUNDING,
            unit_scale: consts::UNIT,
        };

        Ok(Self {
            chain,
            signer,
            settings,
            env_vars: Some(env_vars),
        })
    }

    pub async fn init_from_env() -> Result<Self, Error> {
        let env_vars = env_vars::EnvVars::init_from_env();
        tracing::debug!("Env: {:?}", env_vars);
        Self::init(env_vars).await
    }

    pub fn signer_account(&self) -> AccountId {
        AccountId::from(self.signer.public_key().0)
    }
}
