use std::{future::IntoFuture, io::Write, process, sync::Arc};

use tokio::task::JoinError;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vitrina::{
    application::{
        error::AppError,
        seo::{SeoService, StrategyRegistry, route::PublicRoute},
    },
    cache::{CacheConfig, SeoCache},
    config,
    infra::{
        directory::build_directories,
        error::InfraError,
        http::{self, HttpState},
        spa_entry::SpaEntryResolver,
        telemetry,
    },
    presentation::render_seo_html,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Render(args) => run_render(settings, args).await,
    }
}

async fn build_seo_service(settings: &config::Settings) -> Result<SeoService, AppError> {
    let directories = build_directories(&settings.directory).await?;
    let cache_config = CacheConfig::from(&settings.cache);
    let ttl = cache_config.ttl;
    let cache = Arc::new(SeoCache::new(cache_config));

    Ok(SeoService::new(
        directories.companies,
        directories.services,
        cache,
        Arc::new(StrategyRegistry::with_defaults()),
        ttl,
    ))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    if settings.public.base_url.is_none() && settings.public.allowed_hosts.is_empty() {
        warn!(
            target = "vitrina::server",
            "Neither public.base_url nor public.allowed_hosts is set; pages will answer 421"
        );
    }

    let state = HttpState {
        seo: Arc::new(build_seo_service(&settings).await?),
        spa_entry: Arc::new(SpaEntryResolver::new(&settings.public)),
        base_url: settings.public.base_url.clone(),
        allowed_hosts: settings.public.allowed_hosts.clone().into(),
        root_id: settings.public.spa_root_id.clone(),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "vitrina::server",
        addr = %settings.server.addr,
        "Serving public pages"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        result = &mut server => return server_outcome(result),
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(target = "vitrina::server", error = %err, "Failed to listen for Ctrl-C");
            }
        }
    }

    info!(
        target = "vitrina::server",
        grace_seconds = settings.server.graceful_shutdown.as_secs(),
        "Shutting down"
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(result) => server_outcome(result),
        Err(_) => {
            warn!(
                target = "vitrina::server",
                "Graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

fn server_outcome(result: Result<std::io::Result<()>, JoinError>) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn run_render(settings: config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let base_url = args
        .base_url
        .as_deref()
        .or(settings.public.base_url.as_deref())
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::validation("render needs --base-url or public.base_url"))?;

    let seo = build_seo_service(&settings).await?;
    let category = seo
        .strategies()
        .categories()
        .find(|known| *known == args.category)
        .ok_or_else(|| AppError::validation(format!("unknown category `{}`", args.category)))?;
    let route = PublicRoute {
        slug: args.slug.clone(),
        category,
        service_slug: args.service.clone(),
    };
    let descriptor = route.descriptor(base_url.clone(), args.locale.clone());

    let document = seo
        .build_seo_data(&route.slug, category, &descriptor, route.service_slug.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;

    let spa_entry = SpaEntryResolver::new(&config::PublicSettings {
        base_url: Some(base_url),
        ..settings.public.clone()
    })
    .resolve()
    .await;
    let html = render_seo_html(
        &document,
        &spa_entry,
        &settings.public.spa_root_id,
        &args.locale,
    )
    .map_err(|err| AppError::unexpected(err.to_string()))?;

    {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(html.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| AppError::from(InfraError::from(err)))?;
    }

    info!(
        target = "vitrina::render",
        path = %descriptor.path,
        "Rendered page"
    );
    Ok(())
}
