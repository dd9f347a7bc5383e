//! End-to-end client tests against a real local HTTP server, exercising the
//! reqwest-backed transport rather than a mock.

use std::thread;

use serde_json::json;
use tiny_http::{Header, Response, Server};
use wirepact::{
    contract, ApiClient, ClientError, Method, RequestOptions, ResponseContract, RouteDefinition,
    Schema, TransportConfig, TransportError,
};

mod common;

fn json_header() -> Header {
    common::init_tracing();
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

/// Spawns a one-shot server that answers the next request with the given
/// status and JSON body, returning the base URL and the request it observed.
fn one_shot_server(
    status: u16,
    body: serde_json::Value,
) -> (String, thread::JoinHandle<(String, String)>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base_url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();
        let response = Response::from_string(body.to_string())
            .with_status_code(status)
            .with_header(json_header());
        request.respond(response).unwrap();
        (method, url)
    });

    (base_url, handle)
}

fn user_schema() -> Schema {
    Schema::new(json!({
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "name": {"type": "string"}
        },
        "required": ["id", "name"]
    }))
    .unwrap()
}

#[test]
fn get_over_http_decodes_a_conforming_response() {
    let (base_url, handle) = one_shot_server(200, json!({"id": "1", "name": "Ana"}));

    let routes = contract(
        "/api/users/[id]",
        [(
            Method::Get,
            RouteDefinition::new(ResponseContract::success(user_schema())),
        )],
    );
    let client = ApiClient::new(TransportConfig::with_base_url(&base_url)).unwrap();

    let response = client
        .execute(
            routes.get(Method::Get).unwrap(),
            RequestOptions::new().with_param("id", "1"),
        )
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"id": "1", "name": "Ana"}));

    let (method, url) = handle.join().unwrap();
    assert_eq!(method, "GET");
    assert_eq!(url, "/api/users/1");
}

#[test]
fn non_2xx_over_http_surfaces_status_and_payload() {
    let (base_url, handle) = one_shot_server(404, json!({"message": "no such user"}));

    let routes = contract(
        "/api/users/[id]",
        [(
            Method::Get,
            RouteDefinition::new(ResponseContract::full(
                user_schema(),
                Schema::new(json!({
                    "type": "object",
                    "properties": {"message": {"type": "string"}},
                    "required": ["message"]
                }))
                .unwrap(),
            )),
        )],
    );
    let client = ApiClient::new(TransportConfig::with_base_url(&base_url)).unwrap();

    let err = client
        .execute(
            routes.get(Method::Get).unwrap(),
            RequestOptions::new().with_param("id", "404"),
        )
        .unwrap_err();

    match err {
        ClientError::Transport(TransportError::Status { status, data, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(data, json!({"message": "no such user"}));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    handle.join().unwrap();
}

#[test]
fn nonconforming_success_body_is_a_contract_violation() {
    let (base_url, handle) = one_shot_server(200, json!({"id": "1"}));

    let routes = contract(
        "/api/users/[id]",
        [(
            Method::Get,
            RouteDefinition::new(ResponseContract::success(user_schema())),
        )],
    );
    let client = ApiClient::new(TransportConfig::with_base_url(&base_url)).unwrap();

    let err = client
        .execute(
            routes.get(Method::Get).unwrap(),
            RequestOptions::new().with_param("id", "1"),
        )
        .unwrap_err();

    assert!(matches!(err, ClientError::ContractViolation(_)));
    handle.join().unwrap();
}

#[test]
fn post_sends_json_body_and_query_string() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base_url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = String::new();
        use std::io::Read;
        request.as_reader().read_to_string(&mut body).unwrap();
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();
        let response = Response::from_string(json!({"id": "9", "name": "Rui"}).to_string())
            .with_status_code(201)
            .with_header(json_header());
        request.respond(response).unwrap();
        (method, url, body)
    });

    let routes = contract(
        "/api/users",
        [(
            Method::Post,
            RouteDefinition::new(ResponseContract::success(user_schema())),
        )],
    );
    let client = ApiClient::new(TransportConfig::with_base_url(&base_url)).unwrap();

    let response = client
        .execute(
            routes.get(Method::Post).unwrap(),
            RequestOptions::new()
                .with_query(json!({"notify": "true"}))
                .with_body(json!({"name": "Rui"})),
        )
        .unwrap();
    assert_eq!(response.status, 201);

    let (method, url, body) = handle.join().unwrap();
    assert_eq!(method, "POST");
    assert_eq!(url, "/api/users?notify=true");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&body).unwrap(),
        json!({"name": "Rui"})
    );
}
