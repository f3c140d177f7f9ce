//! Order route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use mysite_core::OrderId;

use super::products::ProductView;
use super::{found, paths};
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::forms::order::check_references;
use crate::forms::{FormErrors, OrderForm};
use crate::middleware::{Operation, RequestContext};
use crate::models::OrderDetails;
use crate::state::AppState;

/// Order display data for templates.
pub struct OrderView {
    pub id: OrderId,
    pub username: String,
    pub promocode: String,
    pub delivery_address: String,
    pub created_at: String,
    pub products: Vec<ProductView>,
    pub detail_url: String,
}

impl From<&OrderDetails> for OrderView {
    fn from(details: &OrderDetails) -> Self {
        Self {
            id: details.order.id,
            username: details.username.to_string(),
            promocode: details.order.promocode.clone(),
            delivery_address: details.order.delivery_address.clone(),
            created_at: details.order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            products: details.products.iter().map(ProductView::from).collect(),
            detail_url: paths::order_detail(details.order.id),
        }
    }
}

/// A selectable option in the order form.
pub struct ChoiceView {
    pub value: String,
    pub label: String,
}

/// Order listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/list.html")]
pub struct OrderListTemplate {
    pub orders: Vec<OrderView>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub order: OrderView,
}

/// Order creation form template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/form.html")]
pub struct OrderFormTemplate {
    pub form: OrderForm,
    pub errors: FormErrors,
    pub users: Vec<ChoiceView>,
    pub products: Vec<ChoiceView>,
}

impl OrderFormTemplate {
    async fn new(state: &AppState, form: OrderForm, errors: FormErrors) -> Result<Self, AppError> {
        let users = UserRepository::new(state.pool())
            .list_all()
            .await?
            .into_iter()
            .map(|u| ChoiceView {
                value: u.id.to_string(),
                label: u.username.to_string(),
            })
            .collect();
        let products = ProductRepository::new(state.pool())
            .list_all()
            .await?
            .into_iter()
            .map(|p| ChoiceView {
                value: p.id.to_string(),
                label: p.name,
            })
            .collect();

        Ok(Self {
            form,
            errors,
            users,
            products,
        })
    }
}

/// Display all orders with their owners and products.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::OrderList)?;

    let orders = OrderRepository::new(state.pool()).list_details().await?;
    Ok(OrderListTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Display one order.
#[instrument(skip(state, ctx), fields(order_id = %id))]
pub async fn detail(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::OrderDetail)?;

    let order = OrderRepository::new(state.pool())
        .get_details(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderDetailTemplate {
        order: OrderView::from(&order),
    })
}

/// Display an empty order form.
pub async fn create_page(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::OrderCreate)?;

    OrderFormTemplate::new(&state, OrderForm::default(), FormErrors::new()).await
}

/// Handle order form submission.
///
/// The body is read raw because `products` repeats once per selected product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    ctx.authorize(Operation::OrderCreate)?;

    let form = OrderForm::from_urlencoded(&body);
    let order = match form.validate() {
        Ok(order) => order,
        Err(errors) => {
            return Ok(OrderFormTemplate::new(&state, form, errors)
                .await?
                .into_response());
        }
    };

    let errors = check_references(state.pool(), &order).await?;
    if !errors.is_empty() {
        return Ok(OrderFormTemplate::new(&state, form, errors)
            .await?
            .into_response());
    }

    let created = OrderRepository::new(state.pool()).create(&order).await?;
    tracing::info!(
        order_id = %created.id,
        user_id = %created.user_id,
        products = order.products.len(),
        "order created"
    );

    Ok(found(paths::ORDER_LIST))
}
