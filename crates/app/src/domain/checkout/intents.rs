//! Checkout intents service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::checkout::{
        errors::IntentsServiceError,
        models::{CheckoutIntent, CheckoutIntentStatus, NewCheckoutIntent},
        repository::PgCheckoutIntentsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCheckoutIntentsService {
    db: Db,
    repository: PgCheckoutIntentsRepository,
}

impl PgCheckoutIntentsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCheckoutIntentsRepository::new(),
        }
    }
}

#[async_trait]
impl CheckoutIntentsService for PgCheckoutIntentsService {
    async fn create_intent(
        &self,
        intent: NewCheckoutIntent,
    ) -> Result<CheckoutIntent, IntentsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.insert_intent(&mut tx, &intent).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_intent(&self, gateway_intent_id: &str) -> Result<CheckoutIntent, IntentsServiceError> {
        let mut tx = self.db.begin().await?;

        let intent = self.repository.get_intent(&mut tx, gateway_intent_id).await?;

        tx.commit().await?;

        Ok(intent)
    }

    async fn set_status(
        &self,
        gateway_intent_id: &str,
        status: CheckoutIntentStatus,
    ) -> Result<(), IntentsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows = self
            .repository
            .update_status(&mut tx, gateway_intent_id, status)
            .await?;

        if rows == 0 {
            return Err(IntentsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CheckoutIntentsService: Send + Sync {
    /// Record a gateway intent with the quote it was sized from.
    async fn create_intent(
        &self,
        intent: NewCheckoutIntent,
    ) -> Result<CheckoutIntent, IntentsServiceError>;

    /// Retrieve an intent by its gateway id.
    async fn get_intent(&self, gateway_intent_id: &str) -> Result<CheckoutIntent, IntentsServiceError>;

    /// Move an intent to a new status.
    async fn set_status(
        &self,
        gateway_intent_id: &str,
        status: CheckoutIntentStatus,
    ) -> Result<(), IntentsServiceError>;
}
