//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use mysite_core::ProductId;

use super::{found, paths};
use crate::db::ProductRepository;
use crate::error::AppError;
use crate::forms::{FormErrors, ProductForm};
use crate::middleware::{Operation, RequestContext};
use crate::models::Product;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub discount: u16,
    pub preview: Option<String>,
    pub archived: bool,
    pub created_at: String,
    pub detail_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            discount: product.discount,
            preview: product.preview.clone(),
            archived: product.is_archived(),
            created_at: product.created_at.format("%Y-%m-%d %H:%M").to_string(),
            detail_url: paths::product_detail(product.id),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/list.html")]
pub struct ProductListTemplate {
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/detail.html")]
pub struct ProductDetailTemplate {
    pub product: ProductView,
    pub update_url: String,
    pub archive_url: String,
}

/// Create/update form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub heading: String,
    pub action: String,
    pub form: ProductForm,
    pub errors: FormErrors,
}

/// Archive confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "products/archive_confirm.html")]
pub struct ArchiveConfirmTemplate {
    pub product: ProductView,
    pub action: String,
}

async fn load(state: &AppState, id: ProductId) -> Result<Product, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

// =============================================================================
// Read Routes
// =============================================================================

/// Display active products.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::ProductList)?;

    let products = ProductRepository::new(state.pool()).list_active().await?;
    Ok(ProductListTemplate {
        products: products.iter().map(ProductView::from).collect(),
    })
}

/// Display one product, archived or not.
#[instrument(skip(state, ctx), fields(product_id = %id))]
pub async fn detail(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::ProductDetail)?;

    let product = load(&state, id).await?;
    Ok(ProductDetailTemplate {
        product: ProductView::from(&product),
        update_url: paths::product_update(id),
        archive_url: paths::product_archive(id),
    })
}

// =============================================================================
// Create/Update Routes
// =============================================================================

/// Display an empty product form.
pub async fn create_page(ctx: RequestContext) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::ProductCreate)?;

    Ok(ProductFormTemplate {
        heading: "Create product".to_string(),
        action: paths::PRODUCT_CREATE.to_string(),
        form: ProductForm::initial(),
        errors: FormErrors::new(),
    })
}

/// Handle product form submission.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    ctx.authorize(Operation::ProductCreate)?;

    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            return Ok(ProductFormTemplate {
                heading: "Create product".to_string(),
                action: paths::PRODUCT_CREATE.to_string(),
                form,
                errors,
            }
            .into_response());
        }
    };

    let product = ProductRepository::new(state.pool()).create(&new).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "product created");

    Ok(found(paths::PRODUCT_LIST))
}

/// Display the edit form, pre-filled.
#[instrument(skip(state, ctx), fields(product_id = %id))]
pub async fn update_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::ProductUpdate)?;

    let product = load(&state, id).await?;
    Ok(ProductFormTemplate {
        heading: format!("Update product {}", product.name),
        action: paths::product_update(id),
        form: ProductForm::from_product(&product),
        errors: FormErrors::new(),
    })
}

/// Handle edit form submission.
#[instrument(skip(state, ctx, form), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    ctx.authorize(Operation::ProductUpdate)?;

    let product = load(&state, id).await?;
    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(errors) => {
            return Ok(ProductFormTemplate {
                heading: format!("Update product {}", product.name),
                action: paths::product_update(id),
                form,
                errors,
            }
            .into_response());
        }
    };

    ProductRepository::new(state.pool())
        .update(id, &changes)
        .await?;
    tracing::info!(product_id = %id, "product updated");

    Ok(found(paths::product_detail(id)))
}

// =============================================================================
// Archive Routes
// =============================================================================

/// Ask for confirmation before archiving.
#[instrument(skip(state, ctx), fields(product_id = %id))]
pub async fn archive_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::ProductArchive)?;

    let product = load(&state, id).await?;
    Ok(ArchiveConfirmTemplate {
        product: ProductView::from(&product),
        action: paths::product_archive(id),
    })
}

/// Mark the product archived. The row is kept.
#[instrument(skip(state, ctx), fields(product_id = %id))]
pub async fn archive(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    ctx.authorize(Operation::ProductArchive)?;

    ProductRepository::new(state.pool())
        .archive(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => AppError::Database(other),
        })?;
    tracing::info!(product_id = %id, "product archived");

    Ok(found(paths::PRODUCT_LIST))
}
