pub mod create_drink;
pub mod delete_drink;
pub mod list_drinks;
pub mod update_drink;

pub use create_drink::CreateDrinkUseCase;
pub use delete_drink::DeleteDrinkUseCase;
pub use list_drinks::ListDrinksUseCase;
pub use update_drink::UpdateDrinkUseCase;
