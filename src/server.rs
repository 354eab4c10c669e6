use std::{io::Result, sync::Arc, time::Instant};

use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{
        header::{ContentType, HeaderName, HeaderValue},
        StatusCode,
    },
    middleware::{from_fn, Next},
    web::{self, resource, scope},
    App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    core::{
        cache::ContentCache,
        data::{Catalog, ContentError, ContentLoader},
        markdown::DetailStore,
        settings::Settings,
    },
    render::{pages, project, NavItem},
    types::Entry,
};

/// Shared state handed to every handler.
pub struct AppState {
    pub cache: ContentCache,
    pub details: DetailStore,
    pub base_url: String,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        let loader = ContentLoader::new(&settings.content_file);
        AppState {
            cache: ContentCache::new(loader, settings.cache_ttl(), settings.reload_policy),
            details: DetailStore::new(settings.content_root()),
            base_url: settings.base_url.clone(),
        }
    }

    /// Catalog for page rendering; failures are already logged by the loader.
    fn catalog(&self) -> Option<Arc<Catalog>> {
        self.cache.get().ok()
    }
}

pub async fn start_server(settings: Settings) -> Result<()> {
    let addr = settings.addr();
    let state = web::Data::new(AppState::from_settings(&settings));

    // Warm the cache so content problems show up in the startup log.
    match state.cache.get() {
        Ok(catalog) => info!(projects = catalog.len(), "content loaded"),
        Err(err) => warn!(error = %err, "starting without content"),
    }

    #[cfg(unix)]
    actix_web::rt::spawn(reload_on_hangup(state.clone()));

    info!(%addr, base_url = %settings.base_url, "server starting");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes)
            .wrap(from_fn(request_span))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allowed_methods(vec!["GET"]),
            )
    })
    .bind(addr)?
    .run()
    .await
}

/// `SIGHUP` drops the cached catalog so edits show up on the next request.
#[cfg(unix)]
async fn reload_on_hangup(state: web::Data<AppState>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(err) => {
            warn!(error = %err, "could not listen for SIGHUP");
            return;
        }
    };
    while hangup.recv().await.is_some() {
        info!("SIGHUP received");
        state.cache.invalidate();
    }
}

/// Register every route. Shared by the server and handler tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        scope("/api")
            .service(resource("/projects").route(web::get().to(api_projects)))
            .service(resource("/projects/{id}").route(web::get().to(api_project)))
            .service(resource("/project-ids").route(web::get().to(api_project_ids))),
    )
    .service(resource("/").route(web::get().to(home_handler)))
    .service(resource("/about").route(web::get().to(static_handler)))
    .service(resource("/design").route(web::get().to(static_handler)))
    .service(resource("/developer").route(web::get().to(static_handler)))
    .service(resource("/3d").route(web::get().to(static_handler)))
    .service(resource("/contact").route(web::get().to(static_handler)))
    .service(resource("/projects/{id}").route(web::get().to(project_handler)))
    .service(resource("/sitemap.xml").route(web::get().to(sitemap_handler)))
    .service(resource("/health").route(web::get().to(status_handler)))
    .default_service(web::to(not_found_handler));
}

/// Per-request span carrying a generated request id, echoed as `x-request-id`.
async fn request_span(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> std::result::Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "http.request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.path(),
    );
    let started = Instant::now();

    let mut res = next.call(req).instrument(span.clone()).await?;
    span.in_scope(|| {
        info!(
            status = res.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    Ok(res)
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

#[derive(Deserialize)]
struct HomeQuery {
    open: Option<usize>,
}

/// Unparseable query strings fall back to the default widget state.
async fn home_handler(
    state: web::Data<AppState>,
    query: Option<web::Query<HomeQuery>>,
) -> HttpResponse {
    let catalog = state.catalog();
    let open = query.and_then(|query| query.open);
    html(
        StatusCode::OK,
        pages::home(&state.base_url, catalog.as_deref(), open),
    )
}

async fn static_handler(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let page = NavItem::ALL
        .into_iter()
        .find(|item| item.path() == req.path())
        .and_then(|item| pages::static_page(&state.base_url, item));
    match page {
        Some(page) => html(StatusCode::OK, page),
        None => not_found_handler(state, req).await,
    }
}

#[derive(Deserialize)]
struct ViewQuery {
    view: Option<usize>,
}

async fn project_handler(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: Option<web::Query<ViewQuery>>,
    req: HttpRequest,
) -> HttpResponse {
    let Some(catalog) = state.catalog() else {
        return html(
            StatusCode::SERVICE_UNAVAILABLE,
            pages::unavailable(&state.base_url, req.path()),
        );
    };
    match catalog.find_entry(&id) {
        Some(entry) => {
            let body = state.details.render(&entry);
            let view = query.and_then(|query| query.view);
            html(
                StatusCode::OK,
                project::detail(&state.base_url, &entry, &body, view),
            )
        }
        None => {
            info!(id = %id, "unknown project");
            html(
                StatusCode::NOT_FOUND,
                pages::not_found(&state.base_url, req.path()),
            )
        }
    }
}

async fn not_found_handler(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    html(
        StatusCode::NOT_FOUND,
        pages::not_found(&state.base_url, req.path()),
    )
}

async fn status_handler() -> HttpResponse {
    HttpResponse::Ok().body("folio-site is running")
}

async fn sitemap_handler(state: web::Data<AppState>) -> HttpResponse {
    let catalog = state.catalog();
    let ids = catalog.as_deref().map(Catalog::ids).unwrap_or_default();
    let body = sitemap(&state.base_url, &ids, &Utc::now().format("%Y-%m-%d").to_string());
    HttpResponse::Ok()
        .content_type(ContentType::xml())
        .body(body)
}

fn sitemap(base_url: &str, ids: &[&str], lastmod: &str) -> String {
    let paths = NavItem::ALL
        .iter()
        .map(|item| item.path().to_string())
        .chain(ids.iter().map(|id| format!("/projects/{id}")));

    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in paths {
        body.push_str(&format!(
            "<url><loc>{}</loc><lastmod>{lastmod}</lastmod></url>\n",
            crate::render::escape(&format!("{base_url}{path}"))
        ));
    }
    body.push_str("</urlset>\n");
    body
}

/// JSON API failures.
#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("project {0:?} not found")]
    NotFound(String),

    #[error("{0}")]
    Content(#[from] ContentError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Content(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Content(err) => err.kind(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error,
            message: self.to_string(),
        })
    }
}

async fn api_projects(state: web::Data<AppState>) -> std::result::Result<HttpResponse, ApiError> {
    let catalog = state.cache.get()?;
    Ok(HttpResponse::Ok().json(catalog.projects()))
}

/// Top-level projects and sub-projects, by id.
async fn api_project(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> std::result::Result<HttpResponse, ApiError> {
    let catalog = state.cache.get()?;
    let id = id.into_inner();
    match catalog.find_entry(&id) {
        Some(Entry::Project(project)) => Ok(HttpResponse::Ok().json(project)),
        Some(Entry::Sub { sub, .. }) => Ok(HttpResponse::Ok().json(sub)),
        None => Err(ApiError::NotFound(id)),
    }
}

async fn api_project_ids(state: web::Data<AppState>) -> std::result::Result<HttpResponse, ApiError> {
    let catalog = state.cache.get()?;
    Ok(HttpResponse::Ok().json(catalog.ids()))
}
