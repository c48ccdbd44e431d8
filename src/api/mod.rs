pub mod campaigns;
pub mod contacts;
pub mod payments;
pub mod templates;
pub mod tenants;
