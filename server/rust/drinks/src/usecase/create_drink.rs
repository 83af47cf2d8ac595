use std::sync::Arc;

use crate::domain::entity::drink::{normalize_title, DrinkValidationError};
use crate::domain::entity::{Drink, NewDrink, Recipe};
use crate::domain::repository::DrinkRepository;

/// 作成リクエストの入力。どちらのフィールドも必須だが、欠落の判定はここで行う。
#[derive(Debug, Clone)]
pub struct CreateDrinkInput {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDrinkError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid drink: {0}")]
    Validation(#[from] DrinkValidationError),

    #[error("drink already exists: {0}")]
    AlreadyExists(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub struct CreateDrinkUseCase {
    repo: Arc<dyn DrinkRepository>,
}

impl CreateDrinkUseCase {
    pub fn new(repo: Arc<dyn DrinkRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: &CreateDrinkInput) -> Result<Drink, CreateDrinkError> {
        let title = input
            .title
            .as_deref()
            .map(normalize_title)
            .ok_or(CreateDrinkError::MissingField("title"))?;
        let recipe = input
            .recipe
            .clone()
            .ok_or(CreateDrinkError::MissingField("recipe"))?;

        let drink = NewDrink { title, recipe };
        drink.validate()?;

        let exists = self
            .repo
            .exists_by_title(&drink.title, None)
            .await
            .map_err(|e| CreateDrinkError::Internal(e.to_string()))?;

        if exists {
            return Err(CreateDrinkError::AlreadyExists(drink.title));
        }

        self.repo
            .create(&drink)
            .await
            .map_err(|e| CreateDrinkError::Internal(e.to_string()))
    }
}
