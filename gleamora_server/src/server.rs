use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use gleamora_engine::{CatalogApi, OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::JwtAuthMiddlewareFactory,
    routes::{
        health,
        CreateOrderRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PaymentIntentRoute,
        PaymentVerifyRoute,
        UpdateOrderStatusRoute,
        UpiDetailsRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let platform_upi = config.platform_upi.clone();
        let log_format = if config.use_x_forwarded_for {
            "%t (%D ms) %s %{X-Forwarded-For}i %{Host}i %U"
        } else {
            "%t (%D ms) %s %a %{Host}i %U"
        };
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        let path_config = web::PathConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into());
        let app = App::new()
            .wrap(Logger::new(log_format).log_target("gjm::access_log"))
            .app_data(json_config)
            .app_data(path_config)
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(platform_upi));
        // Routes that require authentication
        let auth_scope = web::scope("/api")
            .wrap(JwtAuthMiddlewareFactory::new(config.auth.jwt_secret.reveal()))
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(PaymentIntentRoute::<SqliteDatabase>::new())
            .service(PaymentVerifyRoute::<SqliteDatabase>::new())
            .service(UpiDetailsRoute::<SqliteDatabase>::new());
        app.service(auth_scope).service(health)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
