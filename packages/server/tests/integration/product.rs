use chrono::{DateTime, Utc};
use sea_orm::EntityTrait;
use serde_json::json;
use uuid::Uuid;

use catalog_server::entity::product;

use crate::common::{MAX_IMAGE_SIZE, TestApp, product_form, routes};

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp should be a string")
        .parse()
        .expect("timestamp should be RFC 3339")
}

#[tokio::test]
async fn root_greets() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::ROOT).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.text, "Welcome to the Catalog API!");
}

#[tokio::test]
async fn openapi_document_lists_product_paths() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::OPENAPI).await;
    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/products"].is_object());
    assert!(res.body["paths"]["/products/{id}"].is_object());
}

#[tokio::test]
async fn product_lifecycle_without_image() {
    let app = TestApp::spawn().await;

    let created = app
        .post_json(
            routes::PRODUCTS,
            &json!({"name": "Widget", "description": "A widget", "price": 9.99}),
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    assert!(created.body.get("image_url").is_none());
    let id = created.id();

    let fetched = app.get(&routes::product(&id)).await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["id"], id.as_str());
    assert_eq!(fetched.body["name"], "Widget");
    assert_eq!(fetched.body["description"], "A widget");
    assert_eq!(fetched.body["price"], 9.99);
    assert_eq!(fetched.body["created_at"], fetched.body["updated_at"]);

    let updated = app
        .put_json(
            &routes::product(&id),
            &json!({"name": "Widget Pro", "description": "A better widget", "price": 19.5}),
        )
        .await;
    assert_eq!(updated.status, 200, "{}", updated.text);
    assert_eq!(updated.body["id"], id.as_str());
    assert_eq!(updated.body["name"], "Widget Pro");
    assert_eq!(updated.body["price"], 19.5);
    assert_eq!(updated.body["created_at"], fetched.body["created_at"]);
    assert!(timestamp(&updated.body["updated_at"]) > timestamp(&fetched.body["updated_at"]));

    let list = app.get(routes::PRODUCTS).await;
    assert_eq!(list.status, 200);
    assert_eq!(list.body.as_array().map(Vec::len), Some(1));

    let deleted = app.delete(&routes::product(&id)).await;
    assert_eq!(deleted.status, 200);

    let gone = app.get(&routes::product(&id)).await;
    assert_eq!(gone.status, 404);
    assert_eq!(gone.body["message"], "Product not found");
}

#[tokio::test]
async fn list_is_empty_array_on_fresh_catalog() {
    let app = TestApp::spawn().await;
    let res = app.get(routes::PRODUCTS).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn list_returns_products_in_creation_order() {
    let app = TestApp::spawn().await;
    let first = app.create_product("First", 1.0).await;
    let second = app.create_product("Second", 2.0).await;
    let third = app.create_product("Third", 3.0).await;

    let res = app.get(routes::PRODUCTS).await;
    let ids: Vec<&str> = res
        .body
        .as_array()
        .expect("list should be an array")
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str(), third.as_str()]);
}

#[tokio::test]
async fn consecutive_updates_strictly_increase_updated_at() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Widget", 1.0).await;

    let body = json!({"name": "Widget", "description": "same", "price": 1.0});
    let first = app.put_json(&routes::product(&id), &body).await;
    let second = app.put_json(&routes::product(&id), &body).await;
    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert!(timestamp(&second.body["updated_at"]) > timestamp(&first.body["updated_at"]));
}

#[tokio::test]
async fn malformed_id_is_rejected() {
    let app = TestApp::spawn().await;

    let get = app.get(&routes::product("not-a-uuid")).await;
    assert_eq!(get.status, 400);
    assert_eq!(get.body["message"], "Invalid product ID");

    let put = app
        .put_json(
            &routes::product("not-a-uuid"),
            &json!({"name": "x", "description": "y", "price": 1.0}),
        )
        .await;
    assert_eq!(put.status, 400);

    let delete = app.delete(&routes::product("not-a-uuid")).await;
    assert_eq!(delete.status, 400);
}

#[tokio::test]
async fn unknown_id_is_404_for_get_and_update() {
    let app = TestApp::spawn().await;
    let id = Uuid::new_v4().to_string();

    let get = app.get(&routes::product(&id)).await;
    assert_eq!(get.status, 404);

    let put = app
        .put_json(
            &routes::product(&id),
            &json!({"name": "x", "description": "y", "price": 1.0}),
        )
        .await;
    assert_eq!(put.status, 404);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Widget", 1.0).await;

    assert_eq!(app.delete(&routes::product(&id)).await.status, 200);
    assert_eq!(app.delete(&routes::product(&id)).await.status, 200);
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = TestApp::spawn().await;

    let negative = app
        .post_json(
            routes::PRODUCTS,
            &json!({"name": "Widget", "description": "d", "price": -5}),
        )
        .await;
    assert_eq!(negative.status, 400);
    assert!(negative.body["message"].is_string());

    let wrong_type = app
        .post_json(
            routes::PRODUCTS,
            &json!({"name": "Widget", "description": "d", "price": "cheap"}),
        )
        .await;
    assert_eq!(wrong_type.status, 400);

    let missing = app
        .post_json(routes::PRODUCTS, &json!({"description": "d", "price": 1}))
        .await;
    assert_eq!(missing.status, 400);

    let list = app.get(routes::PRODUCTS).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn body_id_is_ignored_on_create() {
    let app = TestApp::spawn().await;
    let supplied = Uuid::new_v4().to_string();

    let res = app
        .post_json(
            routes::PRODUCTS,
            &json!({"id": supplied, "name": "Widget", "description": "d", "price": 1}),
        )
        .await;
    assert_eq!(res.status, 201);
    assert_ne!(res.id(), supplied);
}

#[tokio::test]
async fn multipart_create_stores_image_and_key() {
    let app = TestApp::spawn().await;

    let res = app
        .post_multipart(
            routes::PRODUCTS,
            product_form("Lamp", "24.00", Some(b"\x89PNG fake image")),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let reference = res.body["image_url"]
        .as_str()
        .expect("image_url should be returned")
        .to_string();
    assert!(reference.starts_with("images/"));
    assert!(reference.ends_with(".png"));
    assert!(app.object_exists(&reference).await);

    let id: Uuid = res.id().parse().unwrap();
    let row = product::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .expect("DB query failed")
        .expect("product row should exist");
    assert_eq!(row.image_key.as_deref(), Some(reference.as_str()));
    assert_eq!(row.price, 24.0);

    let fetched = app.get(&routes::product(&res.id())).await;
    assert_eq!(fetched.body["image_url"], reference.as_str());
}

#[tokio::test]
async fn multipart_create_requires_image() {
    let app = TestApp::spawn().await;
    let res = app
        .post_multipart(routes::PRODUCTS, product_form("Lamp", "24.00", None))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "Image is required");
}

#[tokio::test]
async fn multipart_rejects_bad_price_without_storing_image() {
    let app = TestApp::spawn().await;
    let res = app
        .post_multipart(routes::PRODUCTS, product_form("Lamp", "-1", Some(b"PNG")))
        .await;
    assert_eq!(res.status, 400);

    let list = app.get(routes::PRODUCTS).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn oversized_image_is_rejected() {
    let app = TestApp::spawn().await;
    let image = vec![0u8; MAX_IMAGE_SIZE as usize + 1];
    let res = app
        .post_multipart(routes::PRODUCTS, product_form("Lamp", "1", Some(&image)))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn update_with_new_image_replaces_the_old_object() {
    let app = TestApp::spawn().await;
    let created = app
        .post_multipart(routes::PRODUCTS, product_form("Lamp", "10", Some(b"OLD")))
        .await;
    assert_eq!(created.status, 201);
    let id = created.id();
    let old_key = created.body["image_url"].as_str().unwrap().to_string();

    let updated = app
        .put_multipart(
            &routes::product(&id),
            product_form("Lamp v2", "12", Some(b"NEW")),
        )
        .await;
    assert_eq!(updated.status, 200, "{}", updated.text);
    let new_key = updated.body["image_url"].as_str().unwrap().to_string();

    assert_ne!(new_key, old_key);
    assert!(app.object_exists(&new_key).await);
    assert!(!app.object_exists(&old_key).await);
    assert_eq!(updated.body["name"], "Lamp v2");
}

#[tokio::test]
async fn update_without_image_keeps_existing_one() {
    let app = TestApp::spawn().await;
    let created = app
        .post_multipart(routes::PRODUCTS, product_form("Lamp", "10", Some(b"IMG")))
        .await;
    let id = created.id();
    let key = created.body["image_url"].as_str().unwrap().to_string();

    let updated = app
        .put_multipart(&routes::product(&id), product_form("Lamp", "11", None))
        .await;
    assert_eq!(updated.status, 200, "{}", updated.text);
    assert_eq!(updated.body["image_url"], key.as_str());
    assert!(app.object_exists(&key).await);
}

#[tokio::test]
async fn delete_removes_the_image_object() {
    let app = TestApp::spawn().await;
    let created = app
        .post_multipart(routes::PRODUCTS, product_form("Lamp", "10", Some(b"IMG")))
        .await;
    let id = created.id();
    let key = created.body["image_url"].as_str().unwrap().to_string();

    let res = app.delete(&routes::product(&id)).await;
    assert_eq!(res.status, 200);
    assert!(!app.object_exists(&key).await);
}

#[tokio::test]
async fn unsupported_content_type_is_rejected() {
    let app = TestApp::spawn().await;
    let res = app
        .client
        .post(format!("http://{}{}", app.addr, routes::PRODUCTS))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("name=Widget&description=d&price=1")
        .send()
        .await
        .expect("Failed to send POST request");
    assert_eq!(res.status().as_u16(), 400);
}
