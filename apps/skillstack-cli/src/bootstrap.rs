//! Wiring of the provider, session, guard and API clients.

use std::sync::Arc;

use anyhow::Context;
use identity_sdk::IdentityProviderClient;
use skillstack_courses::CoursesApi;
use skillstack_http::ApiClient;
use skillstack_session::{AuthFlows, PendingNavigation, RouteGuard, RoutePolicy, SessionContext};
use tracing::{info, warn};

use crate::config::{AppConfig, ProviderKind};

/// One session and everything that consumes it.
pub struct App {
    pub session: Arc<SessionContext>,
    pub guard: RouteGuard,
    pub flows: AuthFlows,
    pub courses: CoursesApi,
}

impl App {
    /// Build the application and resolve the initial session state.
    ///
    /// # Errors
    ///
    /// Invalid provider, API client or route configuration.
    pub async fn build(cfg: &AppConfig) -> anyhow::Result<Self> {
        let provider = connect_provider(cfg).await?;
        let session = Arc::new(SessionContext::new(Arc::clone(&provider)));

        let policy = RoutePolicy::from_config(&cfg.routes).context("invalid route policy")?;
        let pending = Arc::new(PendingNavigation::new());
        let guard = RouteGuard::new(Arc::clone(&session), Arc::new(policy), Arc::clone(&pending));

        let http = ApiClient::new(&cfg.api, provider).context("invalid API client config")?;
        let courses = CoursesApi::new(http);
        let flows = AuthFlows::new(Arc::clone(&session), pending, courses.clone());

        Ok(Self {
            session,
            guard,
            flows,
            courses,
        })
    }
}

async fn connect_provider(cfg: &AppConfig) -> anyhow::Result<Arc<dyn IdentityProviderClient>> {
    let provider: Arc<dyn IdentityProviderClient> = match cfg.identity.provider {
        ProviderKind::Static => {
            let service = static_identity_plugin::Service::from_config(&cfg.identity.static_accounts);
            service.resolve_initial_state();
            Arc::new(service)
        }
        ProviderKind::Firebase => {
            let service = firebase_identity_plugin::Service::from_config(&cfg.identity.firebase)
                .context("invalid firebase identity config")?;
            // The session still resolves, as signed out.
            if let Err(e) = service.resolve_initial_state().await {
                warn!(error = %e, "previous session not restored");
            }
            Arc::new(service)
        }
    };
    info!(provider = ?cfg.identity.provider, "identity provider ready");
    Ok(provider)
}
