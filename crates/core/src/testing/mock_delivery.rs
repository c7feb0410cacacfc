//! Mock delivery client for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::acquirer::Acquisition;
use crate::delivery::{DeliveryClient, DeliveryError};

/// Mock implementation of the DeliveryClient trait.
#[derive(Debug)]
pub struct MockDeliveryClient {
    /// Recorded deliveries.
    deliveries: Arc<RwLock<Vec<Acquisition>>>,
    /// If set, the next send fails with this error.
    next_error: Arc<RwLock<Option<DeliveryError>>>,
}

impl Default for MockDeliveryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDeliveryClient {
    pub fn new() -> Self {
        Self {
            deliveries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn delivery_count(&self) -> usize {
        self.deliveries.read().await.len()
    }

    pub async fn recorded_deliveries(&self) -> Vec<Acquisition> {
        self.deliveries.read().await.clone()
    }

    pub async fn set_next_error(&self, error: DeliveryError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl DeliveryClient for MockDeliveryClient {
    async fn send_media(&self, acquisition: &Acquisition) -> Result<(), DeliveryError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.deliveries.write().await.push(acquisition.clone());
        Ok(())
    }
}
