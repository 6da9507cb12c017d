use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn querying_an_upserted_product_returns_its_metadata() {
    // Arrange
    let app = spawn_app().await;
    let upsert_body = json!({
        "id": "p1",
        "nombre": "Widget",
        "descripcion": "A simple widget",
        "costo": 10,
        "precioBase": 6
    });
    assert_eq!(200, app.post_upsert(&upsert_body).await.status().as_u16());

    // Act
    let response = app
        .post_query(&json!({"queryText": "widget", "topK": 1}))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let matches: serde_json::Value = response.json().await.unwrap();
    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["metadata"]["costo"], 10.0);
    assert_eq!(matches[0]["metadata"]["nombre"], "Widget");
    assert_eq!(matches[0]["metadata"]["precioBase"], 6.0);
}

#[tokio::test]
async fn the_closest_product_is_returned_first() {
    // Arrange
    let app = spawn_app().await;
    let products = [
        ("p1", "Widget", "A simple widget for everyday use", 10),
        ("p2", "Hammer", "Heavy steel hammer with oak handle", 25),
    ];
    for (id, nombre, descripcion, costo) in products {
        let body = json!({
            "id": id,
            "nombre": nombre,
            "descripcion": descripcion,
            "costo": costo,
            "precioBase": 1
        });
        assert_eq!(200, app.post_upsert(&body).await.status().as_u16());
    }

    // Act
    let response = app
        .post_query(&json!({"queryText": "heavy steel hammer", "topK": 2}))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let matches: serde_json::Value = response.json().await.unwrap();
    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["metadata"]["id"], "p2");
    // Descending similarity
    assert!(
        matches[0]["score"].as_f64().unwrap() >= matches[1]["score"].as_f64().unwrap()
    );
}

#[tokio::test]
async fn top_k_defaults_to_one() {
    // Arrange
    let app = spawn_app().await;
    for (id, nombre) in [("p1", "Widget"), ("p2", "Gadget")] {
        let body = json!({
            "id": id,
            "nombre": nombre,
            "descripcion": "Some description",
            "costo": 5,
            "precioBase": 2
        });
        assert_eq!(200, app.post_upsert(&body).await.status().as_u16());
    }

    // Act
    let response = app.post_query(&json!({"queryText": "widget"})).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let matches: serde_json::Value = response.json().await.unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn query_returns_a_400_when_the_query_text_is_missing_or_empty() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let missing = app.post_query(&json!({"topK": 1})).await;
    let empty = app.post_query(&json!({"queryText": ""})).await;

    // Assert
    assert_eq!(400, missing.status().as_u16());
    assert_eq!(400, empty.status().as_u16());
}
