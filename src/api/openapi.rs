//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{account, bank, chest, lottery, market, stock, system};

/// Generated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "SPITr Economy",
        description = "Bank interest, stock oscillator, lottery tickets and loot chests for the SPITr platform."
    ),
    paths(
        system::health_handler,
        system::ticket_tiers_handler,
        market::get_market,
        account::open_account,
        account::get_account,
        bank::get_bank,
        bank::deposit,
        bank::withdraw,
        bank::purge_dust,
        bank::claim_paycheck,
        lottery::purchase_ticket,
        lottery::list_tickets,
        lottery::scratch_ticket,
        chest::buy_chests,
        chest::open_chest,
        stock::buy_stock,
        stock::sell_stock,
    ),
    tags(
        (name = "System", description = "Health and static configuration"),
        (name = "Market", description = "Deposit rate and stock price oscillators"),
        (name = "Accounts", description = "Account lifecycle"),
        (name = "Bank", description = "Deposits, certificates, withdrawals and paychecks"),
        (name = "Lottery", description = "Scratch-off tickets"),
        (name = "Chests", description = "Loot chests"),
        (name = "Stock", description = "Stock trading"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui`, serving the OpenAPI document at `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
#[must_use]
pub fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
