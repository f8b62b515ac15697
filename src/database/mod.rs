pub mod activities_repo;
pub mod participations_repo;
pub mod schema;
