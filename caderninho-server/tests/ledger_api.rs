//! Orders, payments and customer debt through the HTTP surface

mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_debt_follows_unpaid_orders() {
    let app = TestApp::new().await;
    let customer = app.customer("Dona Maria").await;
    let cafe = app.product("Café", 10.0, None).await;
    let pao = app.product("Pão", 15.0, None).await;

    let first = app.order(customer, &[(cafe, 5)]).await;
    assert_eq!(first["total_amount"].as_f64(), Some(50.0));
    let second = app.order(customer, &[(pao, 2)]).await;
    assert_eq!(second["total_amount"].as_f64(), Some(30.0));
    assert_eq!(app.debt_of(customer).await, 80.0);

    let (status, body) = app
        .put(
            &format!("/api/orders/{}/pay", first["id"]),
            json!({ "method": "pix" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["order"]["is_paid"], true);
    assert_eq!(body["payment"]["amount"].as_f64(), Some(50.0));
    assert_eq!(app.debt_of(customer).await, 30.0);

    let (status, detail) = app.get(&format!("/api/debts/customer/{customer}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["total_debt"].as_f64(), Some(30.0));
    assert_eq!(detail["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_paying_twice_is_rejected() {
    let app = TestApp::new().await;
    let customer = app.customer("Seu João").await;
    let cafe = app.product("Café", 4.5, None).await;
    let order = app.order(customer, &[(cafe, 2)]).await;
    let uri = format!("/api/orders/{}/pay", order["id"]);

    let (status, _) = app.put(&uri, json!({ "method": "cash" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.put(&uri, json!({ "method": "cash" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);

    let (_, payments) = app
        .get(&format!("/api/payments?order_id={}", order["id"]))
        .await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(app.debt_of(customer).await, 0.0);
}

#[tokio::test]
async fn test_amount_must_match_total() {
    let app = TestApp::new().await;
    let customer = app.customer("Ana").await;
    let bolo = app.product("Bolo", 12.0, None).await;
    let order = app.order(customer, &[(bolo, 1)]).await;

    let (status, body) = app
        .put(
            &format!("/api/orders/{}/pay", order["id"]),
            json!({ "method": "card", "amount": 10.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5002);
    assert_eq!(app.debt_of(customer).await, 12.0);
}

#[tokio::test]
async fn test_out_of_stock_leaves_nothing_behind() {
    let app = TestApp::new().await;
    let customer = app.customer("Carlos").await;
    let arroz = app.product("Arroz", 25.0, Some(3)).await;
    let feijao = app.product("Feijão", 9.0, Some(1)).await;

    let (status, body) = app
        .post(
            "/api/orders",
            json!({
                "customer_id": customer,
                "items": [
                    { "product_id": arroz, "quantity": 2 },
                    { "product_id": feijao, "quantity": 5 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);

    let (_, product) = app.get(&format!("/api/products/{arroz}")).await;
    assert_eq!(product["stock_quantity"], 3);
    assert_eq!(app.debt_of(customer).await, 0.0);
}

#[tokio::test]
async fn test_deleting_order_restocks_and_clears_debt() {
    let app = TestApp::new().await;
    let customer = app.customer("Beatriz").await;
    let leite = app.product("Leite", 6.0, Some(10)).await;
    let order = app.order(customer, &[(leite, 4)]).await;

    let (_, product) = app.get(&format!("/api/products/{leite}")).await;
    assert_eq!(product["stock_quantity"], 6);

    // employees cannot delete orders
    let (status, _) = app
        .send(
            http::Method::DELETE,
            &format!("/api/orders/{}", order["id"]),
            Some(&app.employee_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .admin_delete(&format!("/api/orders/{}", order["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, product) = app.get(&format!("/api/products/{leite}")).await;
    assert_eq!(product["stock_quantity"], 10);
    assert_eq!(app.debt_of(customer).await, 0.0);

    let (status, _) = app.get(&format!("/api/orders/{}", order["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_moves_debt_between_customers() {
    let app = TestApp::new().await;
    let from = app.customer("Pedro").await;
    let to = app.customer("Paula").await;
    let suco = app.product("Suco", 7.5, None).await;
    let order = app.order(from, &[(suco, 2)]).await;

    let (status, body) = app
        .put(
            &format!("/api/orders/{}", order["id"]),
            json!({ "customer_id": to, "items": [{ "product_id": suco, "quantity": 4 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_amount"].as_f64(), Some(30.0));

    assert_eq!(app.debt_of(from).await, 0.0);
    assert_eq!(app.debt_of(to).await, 30.0);
}

#[tokio::test]
async fn test_customer_debt_payment_settles_every_order() {
    let app = TestApp::new().await;
    let customer = app.customer("Lúcia").await;
    let cafe = app.product("Café", 10.0, None).await;
    app.order(customer, &[(cafe, 5)]).await;
    app.order(customer, &[(cafe, 3)]).await;

    let (_, summary) = app.get("/api/debts/summary").await;
    assert_eq!(summary["total_debt"].as_f64(), Some(80.0));
    assert_eq!(summary["customer_count"], 1);

    let (status, body) = app
        .post(
            &format!("/api/debts/customer/{customer}/pay"),
            json!({ "method": "cash", "amount": 80.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["amount_paid"].as_f64(), Some(80.0));
    assert_eq!(body["remaining_debt"].as_f64(), Some(0.0));
    assert_eq!(body["payments"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .post(
            &format!("/api/debts/customer/{customer}/pay"),
            json!({ "method": "cash" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5007);
}

#[tokio::test]
async fn test_recalculate_repairs_drift() {
    let app = TestApp::new().await;
    let customer = app.customer("Rafael").await;
    let pao = app.product("Pão", 0.1, None).await;
    app.order(customer, &[(pao, 3)]).await;

    sqlx::query("UPDATE customer SET debt = 999 WHERE id = ?1")
        .bind(customer)
        .execute(&app.state.pool)
        .await
        .unwrap();

    let (status, _) = app.post("/api/debts/recalculate", json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            http::Method::POST,
            "/api/debts/recalculate",
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["customers_corrected"], 1);
    assert_eq!(app.debt_of(customer).await, 0.3);
}

#[tokio::test]
async fn test_customer_with_unpaid_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let customer = app.customer("Marcos").await;
    let agua = app.product("Água", 3.0, None).await;
    let order = app.order(customer, &[(agua, 1)]).await;

    let (status, body) = app
        .admin_delete(&format!("/api/customers/{customer}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3003);

    app.put(
        &format!("/api/orders/{}/pay", order["id"]),
        json!({ "method": "pix" }),
    )
    .await;
    let (status, _) = app
        .admin_delete(&format!("/api/customers/{customer}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    // paid history survives with the customer reference cleared
    let (status, kept) = app.get(&format!("/api/orders/{}", order["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(kept["customer_id"].is_null());
}
