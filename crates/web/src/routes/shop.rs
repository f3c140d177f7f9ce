//! Shop landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::{Operation, RequestContext};
use crate::state::AppState;

/// Fixed showcase shown on the index page.
const SHOWCASE: [(&str, u32); 3] = [("Laptop", 1999), ("Desktop", 2999), ("Smartphone", 999)];

/// Shop index template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub products: Vec<(&'static str, u32)>,
    /// Seconds since the server started.
    pub time_running: f64,
}

/// Display the shop index.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::ShopIndex)?;

    Ok(ShopIndexTemplate {
        products: SHOWCASE.to_vec(),
        time_running: state.uptime().as_secs_f64(),
    })
}
