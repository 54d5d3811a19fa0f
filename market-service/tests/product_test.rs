//! Product listing, ownership, and stock/status integration tests.

mod common;

use common::{spawn_app, unique_email};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn created_product_derives_status_from_stock() {
    let Some(app) = spawn_app().await else { return };

    let (_, token) = app.register_ok(&unique_email("seller")).await;

    let sold_out = app.create_product_ok(&token, "Empty shelf", "10.00", 0).await;
    assert_eq!(sold_out["status"], "sold_out");
    assert_eq!(sold_out["stock"], 0);

    let available = app.create_product_ok(&token, "Full shelf", "10.00", 7).await;
    assert_eq!(available["status"], "available");

    // The image URL comes from the asset host, not the client.
    let image = sold_out["image"].as_str().expect("image url");
    assert!(image.starts_with("https://assets.test/"));
}

#[tokio::test]
#[serial]
async fn updating_stock_flips_the_status_both_ways() {
    let Some(app) = spawn_app().await else { return };

    let (_, token) = app.register_ok(&unique_email("seller")).await;
    let product = app.create_product_ok(&token, "Old lamp", "15.00", 0).await;
    let id = product["id"].as_str().expect("product id");

    let restocked = app.update_product(&token, id, &[("stock", "5")]).await;
    assert_eq!(restocked.status().as_u16(), 200);
    let body: serde_json::Value = restocked.json().await.expect("update body");
    assert_eq!(body["stock"], 5);
    assert_eq!(body["status"], "available");

    let sold_out = app.update_product(&token, id, &[("stock", "0")]).await;
    let body: serde_json::Value = sold_out.json().await.expect("update body");
    assert_eq!(body["status"], "sold_out");
}

#[tokio::test]
#[serial]
async fn partial_update_retains_unsupplied_fields() {
    let Some(app) = spawn_app().await else { return };

    let (_, token) = app.register_ok(&unique_email("seller")).await;
    let product = app.create_product_ok(&token, "Wooden desk", "80.00", 2).await;
    let id = product["id"].as_str().expect("product id");
    let original_image = product["image"].as_str().expect("image url").to_string();

    let response = app.update_product(&token, id, &[("price", "65.00")]).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("update body");
    assert_eq!(body["price"], "65.00");
    assert_eq!(body["name"], "Wooden desk");
    assert_eq!(body["description"], "integration test listing");
    assert_eq!(body["image"], original_image);
    assert_eq!(body["stock"], 2);
    assert_eq!(body["status"], "available");
    assert_eq!(body["createdAt"], product["createdAt"]);
}

#[tokio::test]
#[serial]
async fn updating_someone_elses_product_looks_like_a_missing_product() {
    let Some(app) = spawn_app().await else { return };

    let (_, owner_token) = app.register_ok(&unique_email("owner")).await;
    let (_, intruder_token) = app.register_ok(&unique_email("intruder")).await;

    let product = app
        .create_product_ok(&owner_token, "Guarded vase", "30.00", 1)
        .await;
    let id = product["id"].as_str().expect("product id");

    let response = app
        .update_product(&intruder_token, id, &[("price", "0.01")])
        .await;
    assert_eq!(response.status().as_u16(), 404);

    // The listing is untouched.
    let mine = app
        .get_with_token("/api/products/mine", &owner_token)
        .await;
    let listings: Vec<serde_json::Value> = mine.json().await.expect("mine body");
    let vase = listings
        .iter()
        .find(|p| p["id"] == *id)
        .expect("product still owned");
    assert_eq!(vase["price"], "30.00");
}

#[tokio::test]
#[serial]
async fn delete_distinguishes_foreign_owners_from_super_admins() {
    let Some(app) = spawn_app().await else { return };

    let (_, owner_token) = app.register_ok(&unique_email("owner")).await;
    let (_, intruder_token) = app.register_ok(&unique_email("intruder")).await;
    let (root_id, root_token) = app.register_ok(&unique_email("root")).await;
    app.promote_to_super_admin(root_id).await;

    let product = app
        .create_product_ok(&owner_token, "Disputed chair", "12.00", 1)
        .await;
    let id = product["id"].as_str().expect("product id");

    let forbidden = app
        .delete_with_token(&format!("/api/products/{}", id), &intruder_token)
        .await;
    assert_eq!(forbidden.status().as_u16(), 403);

    let removed = app
        .delete_with_token(&format!("/api/products/{}", id), &root_token)
        .await;
    assert_eq!(removed.status().as_u16(), 204);

    let gone = app
        .delete_with_token(&format!("/api/products/{}", id), &root_token)
        .await;
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
#[serial]
async fn owners_can_delete_their_own_products() {
    let Some(app) = spawn_app().await else { return };

    let (_, token) = app.register_ok(&unique_email("seller")).await;
    let product = app.create_product_ok(&token, "Short lived", "5.00", 1).await;
    let id = product["id"].as_str().expect("product id");

    let response = app
        .delete_with_token(&format!("/api/products/{}", id), &token)
        .await;
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
#[serial]
async fn mine_only_lists_the_callers_products() {
    let Some(app) = spawn_app().await else { return };

    let (a_id, a_token) = app.register_ok(&unique_email("seller-a")).await;
    let (_, b_token) = app.register_ok(&unique_email("seller-b")).await;

    app.create_product_ok(&a_token, "A's shelf", "9.00", 1).await;
    app.create_product_ok(&b_token, "B's shelf", "9.00", 1).await;

    let mine = app.get_with_token("/api/products/mine", &a_token).await;
    assert_eq!(mine.status().as_u16(), 200);

    let listings: Vec<serde_json::Value> = mine.json().await.expect("mine body");
    assert!(!listings.is_empty());
    assert!(listings
        .iter()
        .all(|p| p["adminId"] == a_id.to_string()));
}

#[tokio::test]
#[serial]
async fn available_listing_is_public_stock_filtered_and_stable() {
    let Some(app) = spawn_app().await else { return };

    let (_, token) = app.register_ok(&unique_email("seller")).await;
    let in_stock = app.create_product_ok(&token, "On display", "20.00", 3).await;
    let sold_out = app.create_product_ok(&token, "Back room", "20.00", 0).await;

    // No Authorization header: this surface is public.
    let first = app.get("/api/products/available").await;
    assert_eq!(first.status().as_u16(), 200);
    let first_body: Vec<serde_json::Value> = first.json().await.expect("available body");

    assert!(first_body.iter().any(|p| p["id"] == in_stock["id"]));
    assert!(first_body.iter().all(|p| p["id"] != sold_out["id"]));
    assert!(first_body
        .iter()
        .all(|p| p["stock"].as_i64().unwrap_or(0) > 0));

    // Newest first: the in-stock product we just created leads anything older.
    let newer = app.create_product_ok(&token, "Fresh arrival", "20.00", 1).await;
    let second = app.get("/api/products/available").await;
    let second_body: Vec<serde_json::Value> = second.json().await.expect("available body");
    let pos = |body: &[serde_json::Value], id: &serde_json::Value| {
        body.iter().position(|p| p["id"] == *id)
    };
    let newer_pos = pos(&second_body, &newer["id"]).expect("new product listed");
    let older_pos = pos(&second_body, &in_stock["id"]).expect("old product listed");
    assert!(newer_pos < older_pos);

    // Idempotence: with no intervening writes, the ordered list is identical.
    let third = app.get("/api/products/available").await;
    let third_body: Vec<serde_json::Value> = third.json().await.expect("available body");
    assert_eq!(second_body, third_body);
}

#[tokio::test]
#[serial]
async fn all_products_listing_requires_the_super_admin_gate() {
    let Some(app) = spawn_app().await else { return };

    let (seller_id, seller_token) = app.register_ok(&unique_email("seller")).await;
    app.create_product_ok(&seller_token, "Hidden stock", "4.00", 0)
        .await;

    let forbidden = app.get_with_token("/api/products/all", &seller_token).await;
    assert_eq!(forbidden.status().as_u16(), 403);

    let (root_id, root_token) = app.register_ok(&unique_email("root")).await;
    app.promote_to_super_admin(root_id).await;

    let all = app.get_with_token("/api/products/all", &root_token).await;
    assert_eq!(all.status().as_u16(), 200);

    let listings: Vec<serde_json::Value> = all.json().await.expect("all body");
    // Sold-out products show up here, unlike the public listing.
    assert!(listings
        .iter()
        .any(|p| p["adminId"] == seller_id.to_string() && p["status"] == "sold_out"));
}

#[tokio::test]
#[serial]
async fn creating_a_product_without_an_image_is_rejected() {
    let Some(app) = spawn_app().await else { return };

    let (_, token) = app.register_ok(&unique_email("seller")).await;

    let form = reqwest::multipart::Form::new()
        .text("name", "No photo")
        .text("price", "1.00")
        .text("stock", "1");
    let response = app
        .client
        .post(format!("{}/api/products", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("create request failed");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.expect("error body");
    assert_eq!(body["message"], "An image file is required");
}
