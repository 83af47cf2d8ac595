use std::sync::Arc;

use crate::domain::entity::Drink;
use crate::domain::repository::DrinkRepository;

#[derive(Debug, thiserror::Error)]
pub enum ListDrinksError {
    #[error("internal error: {0}")]
    Internal(String),
}

pub struct ListDrinksUseCase {
    repo: Arc<dyn DrinkRepository>,
}

impl ListDrinksUseCase {
    pub fn new(repo: Arc<dyn DrinkRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> Result<Vec<Drink>, ListDrinksError> {
        self.repo
            .find_all()
            .await
            .map_err(|e| ListDrinksError::Internal(e.to_string()))
    }
}
