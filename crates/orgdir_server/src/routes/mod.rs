pub mod activities;
pub mod organizations;
