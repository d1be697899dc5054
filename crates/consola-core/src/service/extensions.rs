// Resource-specific endpoints: relationship-scoped reads, license
// blocking and seat assignment, tenant API keys.

use consola_api::{ApiResponse, Envelope};
use serde::Serialize;
use serde_json::Value;

use super::{Ack, EntityClient};
use crate::error::DomainError;
use crate::model::{
    Aplicacao, ApiKeyIssued, BlockRequest, Cliente, EntityId, Funcionalidade, Licenca, Modulo,
    Resource, Utilizador,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatRequest<'a> {
    utilizador_id: &'a EntityId,
}

impl<E: Resource> EntityClient<E> {
    /// Records scoped under a parent record, e.g. modules of one
    /// application: `GET {path}/{parent}/{id}`.
    pub async fn get_by_parent(
        &self,
        parent_id: &EntityId,
    ) -> Result<ApiResponse<Envelope<Vec<E>>>, DomainError> {
        let Some(parent) = E::KIND.parent() else {
            return Err(DomainError::Validation {
                entity: E::KIND,
                message: format!("{} has no parent collection", E::KIND.plural()),
            });
        };
        let url = format!("{}/{parent}/{parent_id}", E::KIND.path());
        self.cached_get(&url).await
    }

    async fn write<B, T>(
        &self,
        method: WriteMethod,
        url: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, DomainError>
    where
        B: Serialize + Sync + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let http = self.http();
        self.write_retry
            .run(|| async {
                match method {
                    WriteMethod::Post => http.post::<T, B>(url, body).await,
                    WriteMethod::Put => http.put::<T, B>(url, body).await,
                    WriteMethod::Delete => http.delete::<T>(url).await,
                }
            })
            .await
            .map_err(|e| DomainError::from_api(E::KIND, e))
    }
}

#[derive(Debug, Clone, Copy)]
enum WriteMethod {
    Post,
    Put,
    Delete,
}

impl EntityClient<Aplicacao> {
    pub async fn by_area(
        &self,
        area_id: &EntityId,
    ) -> Result<ApiResponse<Envelope<Vec<Aplicacao>>>, DomainError> {
        self.get_by_parent(area_id).await
    }
}

impl EntityClient<Modulo> {
    pub async fn by_aplicacao(
        &self,
        aplicacao_id: &EntityId,
    ) -> Result<ApiResponse<Envelope<Vec<Modulo>>>, DomainError> {
        self.get_by_parent(aplicacao_id).await
    }
}

impl EntityClient<Funcionalidade> {
    pub async fn by_modulo(
        &self,
        modulo_id: &EntityId,
    ) -> Result<ApiResponse<Envelope<Vec<Funcionalidade>>>, DomainError> {
        self.get_by_parent(modulo_id).await
    }
}

impl EntityClient<Utilizador> {
    pub async fn by_licenca(
        &self,
        licenca_id: &EntityId,
    ) -> Result<ApiResponse<Envelope<Vec<Utilizador>>>, DomainError> {
        self.get_by_parent(licenca_id).await
    }
}

impl EntityClient<Licenca> {
    /// Suspend a license, recording why.
    pub async fn block(&self, id: &EntityId, motivo: &str) -> Result<Ack, DomainError> {
        let url = format!("{}/{id}/bloquear", Licenca::KIND.path());
        let body = BlockRequest {
            motivo: motivo.to_owned(),
        };
        self.write(WriteMethod::Put, &url, &body).await
    }

    pub async fn unblock(&self, id: &EntityId) -> Result<Ack, DomainError> {
        let url = format!("{}/{id}/desbloquear", Licenca::KIND.path());
        self.write(WriteMethod::Put, &url, &Value::Object(serde_json::Map::new()))
            .await
    }

    /// Assign a seat on the license to a user.
    pub async fn add_utilizador(
        &self,
        id: &EntityId,
        utilizador_id: &EntityId,
    ) -> Result<Ack, DomainError> {
        let url = format!("{}/{id}/utilizadores", Licenca::KIND.path());
        self.write(WriteMethod::Post, &url, &SeatRequest { utilizador_id })
            .await
    }

    pub async fn remove_utilizador(
        &self,
        id: &EntityId,
        utilizador_id: &EntityId,
    ) -> Result<Ack, DomainError> {
        let url = format!("{}/{id}/utilizadores/{utilizador_id}", Licenca::KIND.path());
        self.write(WriteMethod::Delete, &url, &()).await
    }
}

impl EntityClient<Cliente> {
    /// Issue the tenant's first API key.
    pub async fn issue_api_key(
        &self,
        id: &EntityId,
    ) -> Result<ApiResponse<Envelope<ApiKeyIssued>>, DomainError> {
        let url = format!("{}/{id}/api-key", Cliente::KIND.path());
        self.write(WriteMethod::Post, &url, &Value::Object(serde_json::Map::new()))
            .await
    }

    /// Replace the tenant's API key; the old key stops working.
    pub async fn rotate_api_key(
        &self,
        id: &EntityId,
    ) -> Result<ApiResponse<Envelope<ApiKeyIssued>>, DomainError> {
        let url = format!("{}/{id}/api-key", Cliente::KIND.path());
        self.write(WriteMethod::Put, &url, &Value::Object(serde_json::Map::new()))
            .await
    }
}
