use std::sync::Arc;

use crate::domain::entity::drink::{normalize_title, validate_title, DrinkValidationError};
use crate::domain::entity::{Drink, Recipe};
use crate::domain::repository::DrinkRepository;

/// 部分更新の入力。指定されたフィールドだけを置き換える。
#[derive(Debug, Clone)]
pub struct UpdateDrinkInput {
    pub id: i32,
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateDrinkError {
    #[error("nothing to update")]
    NoChanges,

    #[error("invalid drink: {0}")]
    Validation(#[from] DrinkValidationError),

    #[error("drink not found: {0}")]
    NotFound(i32),

    #[error("drink already exists: {0}")]
    AlreadyExists(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub struct UpdateDrinkUseCase {
    repo: Arc<dyn DrinkRepository>,
}

impl UpdateDrinkUseCase {
    pub fn new(repo: Arc<dyn DrinkRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: &UpdateDrinkInput) -> Result<Drink, UpdateDrinkError> {
        if input.title.is_none() && input.recipe.is_none() {
            return Err(UpdateDrinkError::NoChanges);
        }
        let title = input.title.as_deref().map(normalize_title);
        if let Some(ref title) = title {
            validate_title(title)?;
        }
        if let Some(ref recipe) = input.recipe {
            recipe.validate()?;
        }

        let mut drink = self
            .repo
            .find_by_id(input.id)
            .await
            .map_err(|e| UpdateDrinkError::Internal(e.to_string()))?
            .ok_or(UpdateDrinkError::NotFound(input.id))?;

        if let Some(title) = title {
            if title != drink.title {
                let taken = self
                    .repo
                    .exists_by_title(&title, Some(drink.id))
                    .await
                    .map_err(|e| UpdateDrinkError::Internal(e.to_string()))?;
                if taken {
                    return Err(UpdateDrinkError::AlreadyExists(title));
                }
            }
            drink.title = title;
        }
        if let Some(ref recipe) = input.recipe {
            drink.recipe = recipe.clone();
        }

        let updated = self
            .repo
            .update(&drink)
            .await
            .map_err(|e| UpdateDrinkError::Internal(e.to_string()))?;

        if !updated {
            return Err(UpdateDrinkError::NotFound(input.id));
        }

        Ok(drink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Ingredient, NewDrink};
    use crate::domain::repository::drink_repository::MockDrinkRepository;

    fn water() -> Drink {
        let sample = NewDrink::sample();
        Drink {
            id: 1,
            title: sample.title,
            recipe: sample.recipe,
        }
    }

    fn sparkling_recipe() -> Recipe {
        Recipe::new(vec![Ingredient {
            color: "clear".to_string(),
            name: "sparkling water".to_string(),
            parts: 2,
        }])
    }

    #[tokio::test]
    async fn success_title_only() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id()
            .withf(|id| *id == 1)
            .returning(|_| Ok(Some(water())));
        mock.expect_exists_by_title()
            .withf(|title, exclude| title == "still water" && *exclude == Some(1))
            .returning(|_, _| Ok(false));
        mock.expect_update().returning(|_| Ok(true));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: Some("still water".to_string()),
            recipe: None,
        };
        let updated = uc.execute(&input).await.unwrap();
        assert_eq!(updated.title, "still water");
        assert_eq!(updated.recipe, water().recipe);
    }

    #[tokio::test]
    async fn success_recipe_only() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(Some(water())));
        mock.expect_exists_by_title().never();
        mock.expect_update()
            .withf(|d| d.title == "water" && d.recipe.ingredients()[0].parts == 2)
            .returning(|_| Ok(true));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: None,
            recipe: Some(sparkling_recipe()),
        };
        let updated = uc.execute(&input).await.unwrap();
        assert_eq!(updated.recipe, sparkling_recipe());
    }

    #[tokio::test]
    async fn same_title_skips_uniqueness_check() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(Some(water())));
        mock.expect_exists_by_title().never();
        mock.expect_update().returning(|_| Ok(true));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: Some("water".to_string()),
            recipe: None,
        };
        assert!(uc.execute(&input).await.is_ok());
    }

    #[tokio::test]
    async fn padded_title_is_trimmed() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(Some(water())));
        mock.expect_exists_by_title().never();
        mock.expect_update()
            .withf(|d| d.title == "water")
            .returning(|_| Ok(true));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: Some("  water ".to_string()),
            recipe: None,
        };
        assert_eq!(uc.execute(&input).await.unwrap().title, "water");
    }

    #[tokio::test]
    async fn no_changes() {
        let mock = MockDrinkRepository::new();

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: None,
            recipe: None,
        };
        assert!(matches!(
            uc.execute(&input).await,
            Err(UpdateDrinkError::NoChanges)
        ));
    }

    #[tokio::test]
    async fn invalid_title() {
        let mock = MockDrinkRepository::new();

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: Some(String::new()),
            recipe: None,
        };
        assert!(matches!(
            uc.execute(&input).await,
            Err(UpdateDrinkError::Validation(DrinkValidationError::EmptyTitle))
        ));
    }

    #[tokio::test]
    async fn not_found() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 42,
            title: Some("ghost".to_string()),
            recipe: None,
        };
        match uc.execute(&input).await.unwrap_err() {
            UpdateDrinkError::NotFound(id) => assert_eq!(id, 42),
            e => unreachable!("unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn title_taken() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(Some(water())));
        mock.expect_exists_by_title().returning(|_, _| Ok(true));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: Some("latte".to_string()),
            recipe: None,
        };
        match uc.execute(&input).await.unwrap_err() {
            UpdateDrinkError::AlreadyExists(title) => assert_eq!(title, "latte"),
            e => unreachable!("unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn deleted_concurrently() {
        let mut mock = MockDrinkRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(Some(water())));
        mock.expect_update().returning(|_| Ok(false));

        let uc = UpdateDrinkUseCase::new(Arc::new(mock));
        let input = UpdateDrinkInput {
            id: 1,
            title: None,
            recipe: Some(sparkling_recipe()),
        };
        assert!(matches!(
            uc.execute(&input).await,
            Err(UpdateDrinkError::NotFound(1))
        ));
    }
}
