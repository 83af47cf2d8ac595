use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entity::{Drink, NewDrink};
use crate::domain::repository::DrinkRepository;

/// InMemoryDrinkRepository はデータベース未設定時に使うインメモリ実装。
///
/// id は 1 から採番し、削除しても再利用しない。
pub struct InMemoryDrinkRepository {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    next_id: i32,
    drinks: BTreeMap<i32, Drink>,
}

impl MemoryState {
    fn empty() -> Self {
        Self {
            next_id: 1,
            drinks: BTreeMap::new(),
        }
    }

    fn insert(&mut self, drink: &NewDrink) -> Drink {
        let created = Drink {
            id: self.next_id,
            title: drink.title.clone(),
            recipe: drink.recipe.clone(),
        };
        self.next_id += 1;
        self.drinks.insert(created.id, created.clone());
        created
    }
}

impl InMemoryDrinkRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::empty()),
        }
    }
}

impl Default for InMemoryDrinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrinkRepository for InMemoryDrinkRepository {
    async fn find_all(&self) -> anyhow::Result<Vec<Drink>> {
        let state = self.state.read().await;
        Ok(state.drinks.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Drink>> {
        let state = self.state.read().await;
        Ok(state.drinks.get(&id).cloned())
    }

    async fn exists_by_title(&self, title: &str, exclude_id: Option<i32>) -> anyhow::Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != exclude_id))
    }

    async fn create(&self, drink: &NewDrink) -> anyhow::Result<Drink> {
        let mut state = self.state.write().await;
        // UNIQUE 制約相当
        if state.drinks.values().any(|d| d.title == drink.title) {
            anyhow::bail!("duplicate title: {}", drink.title);
        }
        Ok(state.insert(drink))
    }

    async fn update(&self, drink: &Drink) -> anyhow::Result<bool> {
        let mut state = self.state.write().await;
        if state
            .drinks
            .values()
            .any(|d| d.title == drink.title && d.id != drink.id)
        {
            anyhow::bail!("duplicate title: {}", drink.title);
        }
        match state.drinks.get_mut(&drink.id) {
            Some(existing) => {
                *existing = drink.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.drinks.remove(&id).is_some())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        *state = MemoryState::empty();
        state.insert(&NewDrink::sample());
        Ok(())
    }
}
