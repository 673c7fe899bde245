// File: src/main.rs
// Purpose: Demo server wiring a vista manager and named routes into axum

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::json;
use tracing::info;
use vista::{Config, DirStore, Links, Manager, MemoryStore, Options, Page, Rendered};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    manager: Arc<Manager>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::var("VISTA_CONFIG").unwrap_or_else(|_| "vista.toml".to_string());
    let config = Config::load(&config_path)?;
    let prod = std::env::args().any(|arg| arg == "--prod");

    let mut links = Links::new();
    let routes = Routes::named(&mut links);
    let links = Arc::new(links);

    let manager = if prod {
        // Templates are built into the binary and compiled before serving
        let options = Options::new().cache().links(Arc::clone(&links));
        let manager = Manager::new(embedded(), options);
        let compiled = manager
            .compile_all()
            .context("Failed to compile templates")?;
        info!(templates = compiled, "production mode");
        manager
    } else {
        let manager = Manager::new(
            DirStore::new(&config.templates.dir),
            config.options().links(Arc::clone(&links)),
        );
        if config.templates.warm_up {
            manager
                .compile_all()
                .context("Failed to compile templates")?;
        }
        info!(dir = %config.templates.dir, cache = manager.is_cached(), "development mode");
        manager
    };

    let state = AppState {
        manager: Arc::new(manager),
    };

    let app = Router::new()
        .route(routes.home, get(index_handler))
        .route(routes.hello, get(hello_handler))
        .route(routes.features, get(features_handler))
        .route(routes.feature, get(feature_handler))
        .layer(Extension(links))
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Route patterns, registered under the names templates link to
struct Routes {
    home: &'static str,
    hello: &'static str,
    features: &'static str,
    feature: &'static str,
}

impl Routes {
    fn named(links: &mut Links) -> Self {
        Self {
            home: links.named("home", "/"),
            hello: links.named("hello", "/hello"),
            features: links.named("features", "/features"),
            feature: links.named("feature", "/features/:feature"),
        }
    }
}

/// Templates compiled into the binary
fn embedded() -> MemoryStore {
    MemoryStore::new()
        .with("@layout.html", include_str!("../templates/@layout.html"))
        .with("index.html", include_str!("../templates/index.html"))
        .with("hello.html", include_str!("../templates/hello.html"))
        .with(
            "features/@layout.html",
            include_str!("../templates/features/@layout.html"),
        )
        .with(
            "features/index.html",
            include_str!("../templates/features/index.html"),
        )
        .with(
            "features/layouts.html",
            include_str!("../templates/features/layouts.html"),
        )
        .with(
            "features/links.html",
            include_str!("../templates/features/links.html"),
        )
}

async fn index_handler(State(state): State<AppState>, page: Page) -> Rendered {
    state.manager.instance("index.html", page.view(()))
}

async fn hello_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    page: Page,
) -> Rendered {
    let name = query.get("name").map(String::as_str).unwrap_or("World");
    state
        .manager
        .instance("hello.html", page.view(json!({ "name": name })))
}

async fn features_handler(State(state): State<AppState>, page: Page) -> Rendered {
    state.manager.instance("features/index.html", page.view(()))
}

async fn feature_handler(
    State(state): State<AppState>,
    Path(feature): Path<String>,
    page: Page,
) -> Rendered {
    // Only the last segment, so `..` cannot leave the features directory
    let cleaned = vista::clean(&feature);
    let feature = cleaned.rsplit('/').next().unwrap_or_default();
    let name = format!("features/{}.html", feature);
    state.manager.instance(&name, page.view(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vista::ViewContext;

    fn links() -> Arc<Links> {
        let mut links = Links::new();
        Routes::named(&mut links);
        Arc::new(links)
    }

    #[test]
    fn test_embedded_templates_compile() {
        let manager = Manager::new(embedded(), Options::new().cache().links(links()));
        assert_eq!(manager.compile_all().unwrap(), 5);
    }

    #[test]
    fn test_feature_page_links() {
        let links = links();
        let manager = Manager::new(embedded(), Options::new().links(Arc::clone(&links)));
        let view = ViewContext::new("/features/links", ()).with_links(links);

        let mut out = Vec::new();
        manager
            .instance("features/links.html", view)
            .render(&mut out)
            .unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.contains("<title>Links</title>"));
        assert!(html.contains(r#"<a href="../features/layouts">Layouts</a>"#));
        assert!(html.contains(r#"<a href="../features">to the list</a>"#));
        assert!(html.contains(r#"<a href="../features" class="active">Features</a>"#));
    }
}
