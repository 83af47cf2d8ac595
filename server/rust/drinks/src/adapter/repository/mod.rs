pub mod drink_memory;
pub mod drink_postgres;

pub use drink_memory::InMemoryDrinkRepository;
pub use drink_postgres::DrinkPostgresRepository;
