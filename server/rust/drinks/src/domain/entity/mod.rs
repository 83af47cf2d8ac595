pub mod drink;

pub use drink::{Drink, Ingredient, NewDrink, Recipe};
