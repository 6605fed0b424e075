//! In-process transport that calls `DataApi` directly.
//!
//! Requests are serialized to bytes and replies decoded from JSON, so the
//! same status/body contract as the HTTP surface is exercised.

use super::{ClientError, ClientResult, DataTransport};
use crate::api::{DataApi, DataSnapshot, SaveAck, SaveRequest};
use crate::store::CollectionStore;
use async_trait::async_trait;
use std::sync::Arc;

pub struct LocalTransport<S: CollectionStore> {
    api: Arc<DataApi<S>>,
}

impl<S: CollectionStore> LocalTransport<S> {
    pub fn new(api: Arc<DataApi<S>>) -> Self {
        Self { api }
    }

    pub fn from_store(store: S) -> Self {
        Self::new(Arc::new(DataApi::new(store)))
    }

    pub fn api(&self) -> &Arc<DataApi<S>> {
        &self.api
    }
}

impl<S: CollectionStore> Clone for LocalTransport<S> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

#[async_trait]
impl<S: CollectionStore + 'static> DataTransport for LocalTransport<S> {
    async fn get_data(&self) -> ClientResult<DataSnapshot> {
        let reply = self.api.get();
        if !reply.is_success() {
            return Err(ClientError::from_reply(&reply));
        }
        serde_json::from_value(reply.body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn post_data(&self, request: &SaveRequest) -> ClientResult<()> {
        let body =
            serde_json::to_vec(request).map_err(|err| ClientError::Transport(err.to_string()))?;
        let reply = self.api.post(&body);
        if !reply.is_success() {
            return Err(ClientError::from_reply(&reply));
        }
        let ack: SaveAck =
            serde_json::from_value(reply.body).map_err(|err| ClientError::Decode(err.to_string()))?;
        if !ack.success {
            return Err(ClientError::Decode("save reply reported success=false".to_string()));
        }
        Ok(())
    }
}
