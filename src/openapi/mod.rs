use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
Backend API for the storefront order lifecycle: order placement and
listing, per-item return processing, customer address books with a
single default address, and signed payment confirmations.

Errors use a consistent shape with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation error: ...",
  "timestamp": "2025-01-01T00:00:00Z"
}
```

List endpoints accept `page` and `limit` (max 100) query parameters.
"#,
        contact(name = "Storefront API Team")
    ),
    paths(
        crate::handlers::addresses::create_address,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::returns::request_return,
        crate::handlers::payments::confirm_payment,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::services::addresses::CreateAddressInput,
        crate::services::addresses::UpdateAddressInput,
        crate::services::addresses::AddressResponse,
        crate::services::orders::PlaceOrderRequest,
        crate::services::orders::OrderItemInput,
        crate::services::orders::ShippingAddressInput,
        crate::services::orders::UpdateOrderStatusRequest,
        crate::services::orders::OrderResponse,
        crate::services::orders::OrderItemResponse,
        crate::services::returns::RequestReturnInput,
        crate::services::returns::ResolveReturnInput,
        crate::handlers::payments::ConfirmPaymentRequest,
        crate::services::payments::PaymentConfirmation,
    )),
    tags(
        (name = "Addresses", description = "Per-user shipping address book"),
        (name = "Orders", description = "Order placement and status tracking"),
        (name = "Returns", description = "Per-item return workflow"),
        (name = "Payments", description = "Signed payment confirmations")
    )
)]
pub struct ApiDoc;

/// Swagger UI router mounted at /docs
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
