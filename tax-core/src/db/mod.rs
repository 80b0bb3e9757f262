pub mod factory;
pub mod repository;

pub use factory::{DEFAULT_DATABASE_PATH, DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{CalculationRepository, RepositoryError};
