//! Registration bootstrap
//!
//! Runs the whole registration once: record version metadata, make sure a
//! key pair exists, mint a token, call pilotauth, persist the credential.
//! A failed remote call falls back to the credential stored by an earlier
//! run.

use crate::api::{AuthApi, HttpAuthApi, PilotAuthRequest};
use crate::keys::{ensure_keypair, KeyGenerator, KeyPair, OpenSslKeyGenerator};
use crate::token::{OpenSslSigner, RegisterClaims, TokenSigner};
use crate::{DeviceCredential, Result};
use pilot_config::{keys, FileParams, ParamsStore, PilotConfig, VersionInfo};
use pilot_device::{AndroidProperties, AndroidServiceCall, DeviceIdentityClient};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a bootstrap run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    KeyEnsured,
    TokenMinted,
    Authenticated { from_cache: bool },
    Failed,
}

/// Result of a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Fresh credential from the auth service, persisted
    Registered(DeviceCredential),
    /// Remote call failed, credential from an earlier run
    Cached(DeviceCredential),
    /// Remote call failed and nothing was cached
    Unavailable,
}

impl RegistrationOutcome {
    pub fn credential(&self) -> Option<&DeviceCredential> {
        match self {
            RegistrationOutcome::Registered(c) | RegistrationOutcome::Cached(c) => Some(c),
            RegistrationOutcome::Unavailable => None,
        }
    }

    pub fn into_credential(self) -> Option<DeviceCredential> {
        match self {
            RegistrationOutcome::Registered(c) | RegistrationOutcome::Cached(c) => Some(c),
            RegistrationOutcome::Unavailable => None,
        }
    }
}

/// Drives one registration attempt.
///
/// Not safe to run twice at once against the same persist directory.
pub struct RegistrationBootstrap {
    persist_dir: PathBuf,
    params: Arc<dyn ParamsStore + Send + Sync>,
    identity: DeviceIdentityClient,
    keygen: Box<dyn KeyGenerator>,
    signer: Box<dyn TokenSigner>,
    api: Box<dyn AuthApi>,
    version: Option<VersionInfo>,
    state: BootstrapState,
}

impl RegistrationBootstrap {
    pub fn new(
        persist_dir: impl Into<PathBuf>,
        params: Arc<dyn ParamsStore + Send + Sync>,
        identity: DeviceIdentityClient,
        keygen: Box<dyn KeyGenerator>,
        signer: Box<dyn TokenSigner>,
        api: Box<dyn AuthApi>,
    ) -> Self {
        Self {
            persist_dir: persist_dir.into(),
            params,
            identity,
            keygen,
            signer,
            api,
            version: None,
            state: BootstrapState::Uninitialized,
        }
    }

    /// Production wiring: `service call`, `getprop`, `openssl`, HTTP
    pub fn from_config(config: &PilotConfig) -> Result<Self> {
        let physical = config.is_device();
        let identity = DeviceIdentityClient::new(
            Box::new(AndroidServiceCall::new(physical)),
            Box::new(AndroidProperties::new(physical)),
        );
        let params = FileParams::open(&config.params_dir)?;
        let api = HttpAuthApi::new(&config.api_host, config.auth_timeout)?;

        Ok(Self::new(
            &config.persist_dir,
            Arc::new(params),
            identity,
            Box::new(OpenSslKeyGenerator::default()),
            Box::new(OpenSslSigner),
            Box::new(api),
        )
        .with_version(VersionInfo::detect(&config.repo_dir)))
    }

    /// Record `version` in the parameter store on each run
    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = Some(version);
        self
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Run the bootstrap.
    ///
    /// Errors are reserved for local faults (key provisioning, signing,
    /// parameter storage). Remote failures end in `Cached` or `Unavailable`.
    pub async fn register(&mut self) -> Result<RegistrationOutcome> {
        self.state = BootstrapState::Uninitialized;
        let result = self.run().await;
        if result.is_err() {
            self.state = BootstrapState::Failed;
        }
        result
    }

    async fn run(&mut self) -> Result<RegistrationOutcome> {
        if let Some(version) = &self.version {
            version.store(self.params.as_ref())?;
        }
        self.params
            .put(keys::SUBSCRIBER_INFO, &self.identity.subscriber_info())?;

        let pair = ensure_keypair(&self.persist_dir, self.keygen.as_ref())?;
        self.state = BootstrapState::KeyEnsured;

        let cached = self.cached_credential()?;
        let public_key = pair.public_key_pem()?;
        let register_token = self.signer.sign(&RegisterClaims::new(), &pair.private_key)?;
        self.state = BootstrapState::TokenMinted;

        match self.authenticate(&pair, public_key, register_token).await {
            Ok(credential) => {
                tracing::info!(dongle_id = %credential.dongle_id, "registered");
                self.state = BootstrapState::Authenticated { from_cache: false };
                Ok(RegistrationOutcome::Registered(credential))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to authenticate");
                match cached {
                    Some(credential) => {
                        tracing::warn!(dongle_id = %credential.dongle_id, "using cached credential");
                        self.state = BootstrapState::Authenticated { from_cache: true };
                        Ok(RegistrationOutcome::Cached(credential))
                    }
                    None => {
                        self.state = BootstrapState::Failed;
                        Ok(RegistrationOutcome::Unavailable)
                    }
                }
            }
        }
    }

    /// Identity collection, remote call and persistence. Any error here is
    /// recoverable through the cached credential.
    async fn authenticate(
        &self,
        pair: &KeyPair,
        public_key: String,
        register_token: String,
    ) -> Result<DeviceCredential> {
        let request = PilotAuthRequest {
            imei: self.identity.imei(0)?,
            imei2: self.identity.imei(1)?,
            serial: self.identity.serial(),
            public_key,
            register_token,
        };

        tracing::info!(key = %pair.public_key.display(), "getting pilotauth");
        let credential = self.api.pilotauth(&request).await?;

        self.params.put_all(&[
            (keys::DONGLE_ID, credential.dongle_id.as_str()),
            (keys::ACCESS_TOKEN, credential.access_token.as_str()),
        ])?;
        Ok(credential)
    }

    fn cached_credential(&self) -> Result<Option<DeviceCredential>> {
        let dongle_id = self.params.get(keys::DONGLE_ID)?;
        let access_token = self.params.get(keys::ACCESS_TOKEN)?;
        Ok(match (dongle_id, access_token) {
            (Some(dongle_id), Some(access_token)) => Some(DeviceCredential {
                dongle_id,
                access_token,
            }),
            _ => None,
        })
    }
}
