// Workbench provisioning
pub mod cluster;
pub mod project;
pub mod workbench;

// Deployment lifecycle
pub mod product;

// Overview
pub mod inspect;
