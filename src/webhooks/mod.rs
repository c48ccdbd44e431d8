pub mod razorpay;
pub mod whatsapp;
