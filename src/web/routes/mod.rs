pub mod activities;
pub mod participations;
