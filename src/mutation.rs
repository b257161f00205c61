//! Create, update and delete, each terminal on the first failing step:
//! admission gate, authenticator gate, body validation, then the store.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::admission::AdmissionController;
use crate::auth::{Authenticator, Credentials, Identity};
use crate::error::{Error, Result};
use crate::models::Laureate;
use crate::store::RecordStore;
use crate::validation::LaureateValidator;

/// Who is asking: the client address used for admission control and the
/// credentials presented.
#[derive(Clone, Debug)]
pub struct Caller {
    pub client_addr: String,
    pub credentials: Credentials,
}

impl Caller {
    pub fn new(client_addr: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client_addr: client_addr.into(),
            credentials,
        }
    }
}

/// A completed mutation and the actor that performed it.
#[derive(Clone, Debug)]
pub struct Applied {
    pub laureate: Laureate,
    pub actor: Identity,
}

#[derive(Clone)]
pub struct MutationApi {
    store: Arc<RecordStore>,
    admission: AdmissionController,
    authenticator: Arc<dyn Authenticator>,
}

impl MutationApi {
    pub fn new(
        store: Arc<RecordStore>,
        admission: AdmissionController,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            store,
            admission,
            authenticator,
        }
    }

    pub async fn create(&self, caller: &Caller, body: &[u8]) -> Result<Applied> {
        let actor = self.gate(caller).await?;

        let body = LaureateValidator::parse_body(body)?;
        let new = LaureateValidator::validate_create(&body)?;
        let laureate = self.store.create(new).await?;

        info!(id = %laureate.id, actor = %actor, "Created laureate");
        Ok(Applied { laureate, actor })
    }

    pub async fn update(&self, caller: &Caller, id: &str, body: &[u8]) -> Result<Applied> {
        let actor = self.gate(caller).await?;

        let body = LaureateValidator::parse_body(body)?;
        let patch = LaureateValidator::validate_update(&body)?;
        let laureate = self.store.update(id, patch).await?;

        info!(id = %laureate.id, actor = %actor, "Updated laureate");
        Ok(Applied { laureate, actor })
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<Applied> {
        let actor = self.gate(caller).await?;

        let laureate = self.store.delete(id).await?;

        info!(id = %laureate.id, actor = %actor, "Deleted laureate");
        Ok(Applied { laureate, actor })
    }

    /// Admission first, so throttled clients never reach the authenticator.
    async fn gate(&self, caller: &Caller) -> Result<Identity> {
        let now = Instant::now();
        if !self.admission.admit(&caller.client_addr, now)? {
            let retry_after = self.admission.retry_after(&caller.client_addr, now)?;
            warn!(client = %caller.client_addr, "Mutation rate limited");
            return Err(Error::RateLimited { retry_after });
        }

        self.authenticator
            .check(&caller.credentials)
            .await
            .map_err(|e| {
                warn!(client = %caller.client_addr, error = %e, "Mutation rejected");
                e
            })
    }
}
