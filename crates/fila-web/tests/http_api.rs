mod common;

use axum::http::StatusCode;
use common::{app, get_request, json_request, read_json};
use fila_core::realtime::{QueueEvent, Role};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn create_and_list_waiting() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tickets",
            Some("t1"),
            json!({ "subject_name": "Maria", "priority": true, "specialty": "Clínico Geral" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let ticket = read_json(response).await;
    assert_eq!(ticket["status"], "waiting");
    let code = ticket["display_code"].as_str().expect("code");
    assert!(code.starts_with('P') && code.len() == 3);
    assert!(code[1..].chars().all(|c| c.is_ascii_digit()));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tickets",
            Some("t1"),
            json!({ "subject_name": "João" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = read_json(response).await;
    assert_eq!(second["specialty"], "Clínico Geral");
    assert_eq!(second["priority"], false);

    let response = app
        .clone()
        .oneshot(get_request("/api/tickets/waiting", Some("t1")))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let list = read_json(response).await;
    let ids: Vec<&str> = list
        .as_array()
        .expect("array")
        .iter()
        .map(|t| t["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec![ticket["id"].as_str().unwrap(), second["id"].as_str().unwrap()]);

    let response = app
        .oneshot(get_request("/api/tickets/waiting", Some("t2")))
        .await
        .expect("list other tenant");
    assert_eq!(read_json(response).await, json!([]));
}

#[tokio::test]
async fn create_with_empty_name_is_rejected() {
    let (app, state) = app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/tickets",
            Some("t1"),
            json!({ "subject_name": "   ", "priority": false, "specialty": "Geral" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_input");
    assert!(state.tickets.list_tickets("t1").await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_tenant_header_is_unauthorized() {
    let (app, _) = app().await;

    let response = app
        .oneshot(get_request("/api/tickets/waiting", None))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"], "unidentified");
}

#[tokio::test]
async fn call_ticket_twice_conflicts() {
    let (app, state) = app().await;
    let ticket = state
        .tickets
        .create_ticket("t1", fila_core::NewTicket::new("Ana", false, "Pediatria"))
        .await
        .unwrap();
    let uri = format!("/api/tickets/{}/call", ticket.id);

    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some("t1"), json!({ "room": "Consultório 2" })))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);
    let called = read_json(response).await;
    assert_eq!(called["status"], "called");
    assert_eq!(called["assigned_room"], "Consultório 2");

    let response = app
        .oneshot(json_request("POST", &uri, Some("t1"), json!({ "room": "Consultório 5" })))
        .await
        .expect("call again");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], "already_called");
}

#[tokio::test]
async fn cross_tenant_call_is_forbidden() {
    let (app, state) = app().await;
    let ticket = state
        .tickets
        .create_ticket("t2", fila_core::NewTicket::new("Pedro", false, "Geral"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/tickets/{}/call", ticket.id),
            Some("t1"),
            json!({ "room": "Sala 1" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get_request(&format!("/api/tickets/{}", ticket.id), Some("t2")))
        .await
        .expect("get");
    let stored = read_json(response).await;
    assert_eq!(stored["status"], "waiting");
    assert_eq!(stored["assigned_room"], serde_json::Value::Null);
}

#[tokio::test]
async fn display_role_cannot_call() {
    let (app, state) = app().await;
    let ticket = state
        .tickets
        .create_ticket("t1", fila_core::NewTicket::new("Ana", false, "Geral"))
        .await
        .unwrap();

    let mut request = json_request(
        "POST",
        &format!("/api/tickets/{}/call", ticket.id),
        Some("t1"),
        json!({ "room": "Sala 1" }),
    );
    request
        .headers_mut()
        .insert("x-role", "display".parse().unwrap());

    let response = app.oneshot(request).await.expect("call");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn http_call_reaches_registered_displays_of_tenant() {
    let (app, state) = app().await;
    let (d1, mut rx1) = state.registry.open().await;
    let (d2, mut rx2) = state.registry.open().await;
    let (d3, mut rx3) = state.registry.open().await;
    state.registry.register(d1, "t1", Role::Display).await.unwrap();
    state.registry.register(d2, "t1", Role::Display).await.unwrap();
    state.registry.register(d3, "t2", Role::Display).await.unwrap();

    let ticket = state
        .tickets
        .create_ticket("t1", fila_core::NewTicket::new("Maria", true, "Geral"))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/tickets/{}/call", ticket.id),
            Some("t1"),
            json!({ "room": "Consultório 1" }),
        ))
        .await
        .expect("call");
    assert_eq!(response.status(), StatusCode::OK);

    for rx in [&mut rx1, &mut rx2] {
        assert!(matches!(rx.try_recv().unwrap(), QueueEvent::TicketCreated { .. }));
        assert!(matches!(rx.try_recv().unwrap(), QueueEvent::TicketCalled { .. }));
    }
    assert!(rx3.try_recv().is_err());
}

#[tokio::test]
async fn internal_notify_relays_to_tenant() {
    let (app, state) = app().await;
    let (d1, mut rx1) = state.registry.open().await;
    state.registry.register(d1, "t1", Role::Display).await.unwrap();

    let ticket = state
        .tickets
        .create_ticket("t1", fila_core::NewTicket::new("Ana", false, "Geral"))
        .await
        .unwrap();
    rx1.try_recv().unwrap();

    let event = QueueEvent::TicketCreated { ticket };
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/internal/notify",
            None,
            json!({ "tenant_id": "t1", "event": event }),
        ))
        .await
        .expect("notify");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "delivered": 1, "failed": 0 }));
    assert_eq!(rx1.try_recv().unwrap(), event);

    let response = app
        .oneshot(json_request(
            "POST",
            "/internal/notify",
            None,
            json!({ "tenant_id": "t2", "event": event }),
        ))
        .await
        .expect("notify");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_reports_connections() {
    let (app, state) = app().await;
    let (_conn, _rx) = state.registry.open().await;

    let response = app.oneshot(get_request("/health", None)).await.expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 1);
}

#[tokio::test]
async fn internal_notify_rejects_calls_the_store_does_not_know() {
    let (app, state) = app().await;
    let (d1, mut rx1) = state.registry.open().await;
    state.registry.register(d1, "t1", Role::Display).await.unwrap();

    let waiting = state
        .tickets
        .create_ticket("t1", fila_core::NewTicket::new("Ana", false, "Geral"))
        .await
        .unwrap();
    rx1.try_recv().unwrap();

    let mut ghost = waiting.clone();
    ghost.id = "ghost".to_string();
    let forged = QueueEvent::TicketCalled {
        ticket: ghost,
        assigned_room: "Sala 9".into(),
        called_at: chrono::Utc::now(),
    };
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/internal/notify",
            None,
            json!({ "tenant_id": "t1", "event": forged }),
        ))
        .await
        .expect("notify");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let premature = QueueEvent::TicketCalled {
        ticket: waiting.clone(),
        assigned_room: "Sala 9".into(),
        called_at: chrono::Utc::now(),
    };
    let response = app
        .oneshot(json_request(
            "POST",
            "/internal/notify",
            None,
            json!({ "tenant_id": "t1", "event": premature }),
        ))
        .await
        .expect("notify");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(rx1.try_recv().is_err());
    assert!(state.tickets.get_ticket("t1", &waiting.id).await.unwrap().is_waiting());
}

#[tokio::test]
async fn internal_notify_dispatches_stored_call() {
    let (app, state) = app().await;
    let ticket = state
        .tickets
        .create_ticket("t1", fila_core::NewTicket::new("Ana", false, "Geral"))
        .await
        .unwrap();
    let called = state
        .tickets
        .call_ticket("t1", &ticket.id, "Consultório 4")
        .await
        .unwrap();

    let (d1, mut rx1) = state.registry.open().await;
    state.registry.register(d1, "t1", Role::Display).await.unwrap();

    let tampered = QueueEvent::TicketCalled {
        ticket: called.clone(),
        assigned_room: "Sala errada".into(),
        called_at: chrono::Utc::now(),
    };
    let response = app
        .oneshot(json_request(
            "POST",
            "/internal/notify",
            None,
            json!({ "tenant_id": "t1", "event": tampered }),
        ))
        .await
        .expect("notify");
    assert_eq!(response.status(), StatusCode::OK);

    match rx1.try_recv().unwrap() {
        QueueEvent::TicketCalled { ticket, assigned_room, called_at } => {
            assert_eq!(ticket, called);
            assert_eq!(assigned_room, "Consultório 4");
            assert_eq!(Some(called_at), called.called_at);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
