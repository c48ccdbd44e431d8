use crate::api::campaigns::{create_campaign, list_campaigns, send_campaign_endpoint};
use crate::api::contacts::{create_contact_endpoint, import_contacts, list_contacts};
use crate::api::payments::{create_payment_endpoint, list_payments};
use crate::api::templates::{create_template_endpoint, list_templates};
use crate::api::tenants::create_tenant;
use crate::config::AppConfig;
use crate::services::payments::RazorpayClient;
use crate::services::whatsapp::WhatsAppSender;
use crate::webhooks::razorpay::http_server::handle_razorpay_webhook;
use crate::webhooks::whatsapp::http_server::{handle_whatsapp_webhook, verify_whatsapp_webhook};
use actix_web::{get, middleware, web, App, HttpServer, Responder};
use megaphone::db::PgPool;

pub async fn run_http_server(config: AppConfig, pool: PgPool) -> std::io::Result<()> {
    let port = config.port;

    tracing::info!("Starting HTTP server on port {}", port);

    let pool = web::Data::new(pool);
    let sender = web::Data::new(WhatsAppSender::new(config.clone()));
    let razorpay = web::Data::new(RazorpayClient::new(&config));
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(pool.clone())
            .app_data(sender.clone())
            .app_data(razorpay.clone())
            .app_data(config.clone())
            .service(health)
            .service(create_tenant)
            .service(list_contacts)
            .service(create_contact_endpoint)
            .service(import_contacts)
            .service(list_templates)
            .service(create_template_endpoint)
            .service(list_campaigns)
            .service(create_campaign)
            .service(send_campaign_endpoint)
            .service(list_payments)
            .service(create_payment_endpoint)
            .service(handle_razorpay_webhook)
            .service(handle_whatsapp_webhook)
            .service(verify_whatsapp_webhook)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[get("/health")]
async fn health() -> impl Responder {
    "I'm ok"
}
