pub mod dispatch;
pub mod import;
pub mod payments;
pub mod segment;
pub mod whatsapp;
