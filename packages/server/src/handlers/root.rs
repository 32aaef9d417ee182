#[utoipa::path(
    get,
    path = "/",
    tag = "Root",
    operation_id = "root",
    summary = "Greeting",
    responses((status = 200, description = "Plain-text greeting", body = String, content_type = "text/plain")),
)]
pub async fn root() -> &'static str {
    "Welcome to the Catalog API!"
}
