//! API integration tests against a running server with a migrated database

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// ISBNs are unique, so every created book needs its own
fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

async fn create(client: &Client, resource: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}/{}", BASE_URL, resource))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn create_author(client: &Client) -> Value {
    create(
        client,
        "authors",
        json!({"firstName": "AAAAAAAAAA", "lastName": unique("author")}),
    )
    .await
}

async fn create_category(client: &Client) -> Value {
    create(client, "categories", json!({"name": unique("category")})).await
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_relations() {
    let client = Client::new();
    let author = create_author(&client).await;
    let category = create_category(&client).await;
    let isbn = unique("isbn");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "AAAAAAAAAA",
            "isbn": isbn,
            "imagePath": "AAAAAAAAAA",
            "publisher": "AAAAAAAAAA",
            "dateOfPublication": "1970-01-01",
            "authors": [{"id": author["id"]}],
            "categories": [{"id": category["id"]}]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()["location"].to_str().unwrap().to_string();
    assert!(response.headers()["x-libraryapp-alert"]
        .to_str()
        .unwrap()
        .ends_with(".book.created"));

    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(location, format!("/api/books/{}", book["id"]));
    assert_eq!(book["isbn"], isbn);
    assert_eq!(book["dateOfPublication"], "1970-01-01");
    assert_eq!(book["authors"][0]["id"], author["id"]);
    assert_eq!(book["categories"][0]["id"], category["id"]);

    // The author now lists the book
    let author: Value = client
        .get(format!("{}/authors/{}", BASE_URL, author["id"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(author["books"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"] == book["id"]));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_conflicts() {
    let client = Client::new();
    let isbn = unique("isbn");
    create(&client, "books", json!({"title": "AAAAAAAAAA", "isbn": isbn})).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({"title": "BBBBBBBBBB", "isbn": isbn}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_unknown_author_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "AAAAAAAAAA",
            "isbn": unique("isbn"),
            "authors": [{"id": i64::MAX}]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_update_book() {
    let client = Client::new();
    let book = create(&client, "books", json!({"title": "AAAAAAAAAA", "isbn": unique("isbn")})).await;
    let isbn = unique("isbn");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .json(&json!({
            "id": book["id"],
            "title": "BBBBBBBBBB",
            "isbn": isbn,
            "dateOfPublication": "1969-12-31"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["title"], "BBBBBBBBBB");
    assert_eq!(updated["isbn"], isbn);
    assert_eq!(updated["dateOfPublication"], "1969-12-31");
}

#[tokio::test]
#[ignore]
async fn test_update_missing_book_is_rejected() {
    let client = Client::new();

    let response = client
        .put(format!("{}/books/{}", BASE_URL, i64::MAX))
        .json(&json!({"id": i64::MAX, "title": "AAAAAAAAAA", "isbn": "AAAAAAAAAA"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-libraryapp-error"], "error.idnotfound");
}

#[tokio::test]
#[ignore]
async fn test_partial_update_keeps_relations() {
    let client = Client::new();
    let author = create_author(&client).await;
    let book = create(
        &client,
        "books",
        json!({
            "title": "AAAAAAAAAA",
            "isbn": unique("isbn"),
            "publisher": "AAAAAAAAAA",
            "authors": [{"id": author["id"]}]
        }),
    )
    .await;

    let response = client
        .patch(format!("{}/books/{}", BASE_URL, book["id"]))
        .json(&json!({"id": book["id"], "title": "BBBBBBBBBB"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let patched: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(patched["title"], "BBBBBBBBBB");
    assert_eq!(patched["publisher"], "AAAAAAAAAA");
    assert_eq!(patched["authors"][0]["id"], author["id"]);
}

#[tokio::test]
#[ignore]
async fn test_filter_and_count_books() {
    let client = Client::new();
    let author = create_author(&client).await;
    let title = unique("title");
    let book = create(
        &client,
        "books",
        json!({"title": title, "isbn": unique("isbn"), "authors": [{"id": author["id"]}]}),
    )
    .await;

    let response = client
        .get(format!("{}/books?authorId.equals={}&sort=id,desc", BASE_URL, author["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-total-count"], "1");
    assert!(response.headers()["link"]
        .to_str()
        .unwrap()
        .contains("rel=\"first\""));
    let books: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(books[0]["id"], book["id"]);

    let count: Value = client
        .get(format!("{}/books/count?title.equals={}", BASE_URL, title))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(count, json!(1));

    let count: Value = client
        .get(format!("{}/books/count?title.notEquals={}&id.equals={}", BASE_URL, title, book["id"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(count, json!(0));
}

#[tokio::test]
#[ignore]
async fn test_library_lookup_by_isbn() {
    let client = Client::new();
    let category = create_category(&client).await;
    let isbn = unique("isbn");
    create(
        &client,
        "books",
        json!({"title": "AAAAAAAAAA", "isbn": isbn, "categories": [{"id": category["id"]}]}),
    )
    .await;

    let response = client
        .get(format!("{}/library/books/{}/isbn", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["categories"][0]["id"], category["id"]);

    let response = client
        .get(format!("{}/library/books/{}/isbn", BASE_URL, unique("missing")))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_delete_author_unlinks_books() {
    let client = Client::new();
    let author = create_author(&client).await;
    let book = create(
        &client,
        "books",
        json!({"title": "AAAAAAAAAA", "isbn": unique("isbn"), "authors": [{"id": author["id"]}]}),
    )
    .await;

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers()["x-libraryapp-alert"]
        .to_str()
        .unwrap()
        .ends_with(".author.deleted"));

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(book["authors"], json!([]));

    let response = client
        .get(format!("{}/authors/{}", BASE_URL, author["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_relation_filters_do_not_duplicate_rows() {
    let client = Client::new();
    let first = create_author(&client).await;
    let second = create_author(&client).await;
    let book = create(
        &client,
        "books",
        json!({
            "title": "AAAAAAAAAA",
            "isbn": unique("isbn"),
            "authors": [{"id": first["id"]}, {"id": second["id"]}]
        }),
    )
    .await;

    let response = client
        .get(format!(
            "{}/books?authorId.in={},{}&id.equals={}",
            BASE_URL, first["id"], second["id"], book["id"]
        ))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-total-count"], "1");
    let books: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["id"], book["id"]);
}

#[tokio::test]
#[ignore]
async fn test_unlinked_book_matches_unspecified_relation() {
    let client = Client::new();
    let author = create_author(&client).await;
    let lonely = create(&client, "books", json!({"title": "AAAAAAAAAA", "isbn": unique("isbn")})).await;
    let linked = create(
        &client,
        "books",
        json!({"title": "AAAAAAAAAA", "isbn": unique("isbn"), "authors": [{"id": author["id"]}]}),
    )
    .await;

    let count = |id: &Value| {
        let client = client.clone();
        let url = format!("{}/books/count?authorId.specified=false&id.equals={}", BASE_URL, id);
        async move {
            client
                .get(url)
                .send()
                .await
                .expect("Failed to send request")
                .json::<Value>()
                .await
                .expect("Failed to parse response")
        }
    };

    assert_eq!(count(&lonely["id"]).await, json!(1));
    assert_eq!(count(&linked["id"]).await, json!(0));
}
