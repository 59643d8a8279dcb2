use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use vehicle_rental::config::{DatabaseConfig, EnvironmentConfig};
use vehicle_rental::database::DatabaseConnection;
use vehicle_rental::repositories::{InMemoryRentalStore, PgRentalStore, RentalStore};
use vehicle_rental::services::khalti_service::{KhaltiGateway, PaymentGateway};
use vehicle_rental::services::notification_service::{notifier_from_config, Notifier};
use vehicle_rental::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vehicle_rental=debug,tower_http=info")),
        )
        .init();

    info!("🚗 Vehicle Rental - API de alquiler con pagos Khalti");
    info!("===================================================");

    let config = EnvironmentConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Configuración inválida: {}", e))?;

    // Store: PostgreSQL si hay DATABASE_URL, memoria en caso contrario
    let store: Arc<dyn RentalStore> = match DatabaseConfig::from_env()? {
        Some(db_config) => {
            let connection = match DatabaseConnection::new(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Arc::new(PgRentalStore::new(connection.pool().clone()))
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida, usando store en memoria (solo desarrollo)");
            Arc::new(InMemoryRentalStore::new())
        }
    };

    let gateway: Arc<dyn PaymentGateway> = Arc::new(KhaltiGateway::new(config.khalti.clone())?);
    let notifier: Arc<dyn Notifier> = Arc::from(notifier_from_config(&config.mail)?);

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_app_router(AppState::new(config, store, gateway, notifier));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Vehículos:");
    info!("   GET  /api/vehicles - Catálogo (disponibles / no disponibles)");
    info!("   POST /api/vehicles - Registrar vehículo (owner)");
    info!("   GET  /api/vehicles/:id - Detalle con reseñas");
    info!("   PUT  /api/vehicles/:id - Editar vehículo (owner)");
    info!("   DELETE /api/vehicles/:id - Baja lógica (owner)");
    info!("   POST /api/vehicles/:id/reviews - Reseñar (customer)");
    info!("🔑 Propietario:");
    info!("   GET  /api/owner/vehicles - Mis vehículos");
    info!("   GET  /api/owner/on-rent - Vehículos alquilados");
    info!("   POST /api/owner/vehicles/:id/returned - Marcar devuelto");
    info!("💳 Pagos:");
    info!("   POST /api/payments/initiate - Iniciar pago Khalti (customer)");
    info!("   GET  /api/payments/verify - Callback de Khalti");
    info!("📋 Alquileres:");
    info!("   GET  /api/rentals/mine - Panel del arrendatario");
    info!("   GET  /api/rentals/transactions - Mis transacciones");
    info!("   GET  /api/admin/transactions - Todas las transacciones (admin)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
