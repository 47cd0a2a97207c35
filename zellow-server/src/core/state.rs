use std::sync::Arc;

use crate::auth::JwtService;
use crate::cart::{CartRepository, CartService, RedbCartRepository};
use crate::checkout::CheckoutService;
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::{Storage, StorageResult};
use crate::notify::{
    MailTransport, NotificationDispatcher, NotificationWorker, PlainTextReceipt, PushSender,
    WebPushSender, transport_from_config,
};
use crate::orders::LifecycleManager;
use crate::requests::RequestService;

/// Shared server state - one reference to every service
///
/// Cloning is cheap: every field is an `Arc` or wraps one.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | Immutable configuration |
/// | storage | redb database |
/// | jwt_service | Token verification |
/// | carts | Cart mutations |
/// | checkout | Checkout steps and order placement |
/// | lifecycle | Order commands and the event channel |
/// | notifier | Mail and push sends |
/// | requests | Staff request workflows |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub jwt_service: Arc<JwtService>,
    pub carts: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub lifecycle: Arc<LifecycleManager>,
    pub notifier: Arc<NotificationDispatcher>,
    pub requests: Arc<RequestService>,
}

impl ServerState {
    /// Wire every service on top of an opened database and the given
    /// outbound transports
    pub fn with_parts(
        config: Config,
        storage: Storage,
        mail: Arc<dyn MailTransport>,
        push: Option<Arc<dyn PushSender>>,
    ) -> Self {
        let config = Arc::new(config);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        let cart_repo: Arc<dyn CartRepository> = Arc::new(RedbCartRepository::new(storage.clone()));
        let carts = Arc::new(CartService::new(cart_repo.clone(), Arc::new(storage.clone())));

        let lifecycle = Arc::new(LifecycleManager::new(storage.clone(), config.event_buffer));
        let notifier = Arc::new(NotificationDispatcher::new(
            config.clone(),
            storage.clone(),
            mail,
            push,
            Arc::new(PlainTextReceipt),
        ));
        let checkout = Arc::new(CheckoutService::new(
            storage.clone(),
            cart_repo,
            lifecycle.clone(),
            notifier.clone(),
            config.shipping_methods.clone(),
        ));
        let requests = Arc::new(RequestService::new(storage.clone()));

        Self {
            config,
            storage,
            jwt_service,
            carts,
            checkout,
            lifecycle,
            notifier,
            requests,
        }
    }

    /// Open the database under `work_dir` and build transports from config.
    ///
    /// Push stays disabled when the VAPID key cannot be loaded.
    pub fn initialize(config: &Config) -> StorageResult<Self> {
        let storage = Storage::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Database opened");

        let mail = transport_from_config(&config.mail);
        let push = match &config.push {
            Some(vapid) => match WebPushSender::new(vapid) {
                Ok(sender) => Some(Arc::new(sender) as Arc<dyn PushSender>),
                Err(e) => {
                    tracing::warn!(error = %e, "Web push disabled: VAPID key rejected");
                    None
                }
            },
            None => {
                tracing::info!("Web push disabled: no VAPID keys configured");
                None
            }
        };

        Ok(Self::with_parts(config.clone(), storage, mail, push))
    }

    /// Spawn the notification worker
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let worker = NotificationWorker::new(self.storage.clone(), self.notifier.clone());
        let events = self.lifecycle.subscribe();
        let shutdown = tasks.shutdown_token();
        tasks.spawn("notification_worker", TaskKind::Listener, async move {
            worker.run(events, shutdown).await;
        });
        tasks.log_summary();
    }
}
