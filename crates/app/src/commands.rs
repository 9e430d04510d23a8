//! Subcommand handlers.

use std::sync::Arc;

use authgate_application::{
    AuthInterceptor, AuthenticatedClient, RequestError, TokenStorage, TokenStore,
};
use authgate_domain::{
    Credential, CredentialKind, InterceptorConfig, RequestContext, RequestSpec, ResponseSpec,
    TokenSource,
};
use authgate_infrastructure::{
    ConfigLoader, CookieTokenStorage, ReqwestRefreshEndpoint, ReqwestTransport, StorageOptions,
    token_storage_for,
};
use tracing::{info, warn};

use crate::cli::{Args, Command};
use crate::error::Result;

/// Everything a subcommand needs, resolved from flags, config and environment.
pub struct Context {
    config: InterceptorConfig,
    storage: Arc<dyn TokenStorage>,
}

impl Context {
    /// Loads configuration and opens the configured token backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the backend has
    /// nowhere to keep credentials.
    pub async fn resolve(args: &Args) -> Result<Self> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = &args.config {
            loader = loader.with_file(path);
        }
        let mut config = loader.load()?;
        if let Some(source) = args.token_source {
            config = config.with_token_source(source);
        }

        let options = StorageOptions {
            token_file: args.token_file.clone(),
            cookie_jar_file: args
                .cookie_jar
                .clone()
                .or_else(CookieTokenStorage::default_path),
            ..StorageOptions::default()
        };
        let storage = token_storage_for(config.token_source, &options).await?;

        if config.token_source == TokenSource::SessionPersistent {
            warn!("session backend selected, credentials are dropped when this command exits");
        }

        Ok(Self { config, storage })
    }

    fn token_store(&self) -> TokenStore {
        TokenStore::new(Arc::clone(&self.storage), &self.config)
    }
}

/// Runs the parsed subcommand.
///
/// # Errors
///
/// Returns the first error hit while running it.
pub async fn execute(args: Args) -> Result<()> {
    let context = Context::resolve(&args).await?;

    match args.command {
        Command::Login { access, refresh } => login(&context, access, refresh).await,
        Command::Logout => logout(&context).await,
        Command::Status => status(&context).await,
        Command::Request {
            method,
            url,
            headers,
            body,
            skip_auth,
        } => {
            let mut spec = RequestSpec::new(method, url);
            for header in headers {
                spec.headers.set(header.name, header.value);
            }
            spec.body = body;
            let mut request = RequestContext::new(spec);
            request.skip_auth = skip_auth;
            send(&context, request).await
        }
    }
}

async fn login(context: &Context, access: String, refresh: Option<String>) -> Result<()> {
    let store = context.token_store();
    store
        .store(CredentialKind::Access, &Credential::new(access))
        .await;
    if let Some(refresh) = refresh {
        store
            .store(CredentialKind::Refresh, &Credential::new(refresh))
            .await;
    }

    info!(source = %store.source(), "credentials stored");
    println!("{}", store.status().await.display_message());
    Ok(())
}

async fn logout(context: &Context) -> Result<()> {
    let store = context.token_store();
    store.clear().await;
    println!("Logged out ({})", store.source());
    Ok(())
}

async fn status(context: &Context) -> Result<()> {
    let store = context.token_store();
    println!("Backend:  {}", store.source());
    println!("Status:   {}", store.status().await.display_message());
    match &context.config.refresh_endpoint {
        Some(endpoint) => println!("Refresh:  {endpoint}"),
        None => println!("Refresh:  disabled (no refresh_endpoint configured)"),
    }
    Ok(())
}

async fn send(context: &Context, request: RequestContext) -> Result<()> {
    let interceptor = AuthInterceptor::new(
        context.config.clone(),
        Arc::clone(&context.storage),
        Arc::new(ReqwestRefreshEndpoint::new()?),
    )?;
    interceptor.notifier().on_auth_failure(|failure| {
        eprintln!(
            "Session expired ({}). Run `authgate login` to sign in again.",
            failure.reason
        );
    });

    let client = AuthenticatedClient::new(Arc::new(ReqwestTransport::new()?), Arc::new(interceptor));

    match client.send(request).await {
        Ok(response) => {
            print_response(&response);
            Ok(())
        }
        Err(error) => {
            print_failure(&error);
            Err(error.into())
        }
    }
}

fn print_response(response: &ResponseSpec) {
    println!("HTTP {} ({} ms)", response.status, response.duration.as_millis());
    for header in response.headers.iter() {
        println!("{}: {}", header.name, header.value);
    }
    println!();
    println!("{}", response.body);
}

fn print_failure(error: &RequestError) {
    if let Some(response) = error.source.response() {
        print_response(response);
    }
}
