//! End-to-end tests: parse a file, then resolve its requests.

use super::{create_temp_http_file, init_test_env, isolated_options};
use rest_client_core::models::{HttpMethod, RequestBody};
use rest_client_core::parser::parse_with;
use rest_client_core::variables::Resolver;

#[test]
fn test_timestamp_shared_between_url_and_header() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "@h = example.com\n\
         GET https://{{h}}/x?{{$timestamp}}\n\
         X-Timestamp: {{$timestamp}}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);

    let digits = resolved
        .url
        .strip_prefix("https://example.com/x?")
        .expect("URL should start with the resolved host");
    assert!(!digits.is_empty());
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(resolved.headers.get("X-Timestamp"), Some(digits));
}

#[test]
fn test_uuid_identical_within_request_and_fresh_across_requests() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "POST https://example.com/items/{{$uuid}}\n\
         X-Request-ID: {{$guid}}\n\
         Content-Type: application/json\n\
         \n\
         {\"id\": \"{{$uuid}}\", \"a\": {{$randomFloat}}, \"b\": {{$randomFloat}}}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    let resolver = Resolver::new();

    let mut scopes = parsed.scopes_for(request, &options);
    let first = resolver.resolve_request(request, &mut scopes);
    let id = first.url.rsplit('/').next().unwrap().to_string();
    assert_eq!(id.len(), 36);
    assert_eq!(first.headers.get("X-Request-ID"), Some(id.as_str()));
    let body = first.body.as_ref().and_then(RequestBody::as_text).unwrap();
    assert!(body.contains(&format!("\"id\": \"{}\"", id)));
    assert!(!body.contains("{{"));

    let mut scopes = parsed.scopes_for(request, &options);
    let second = resolver.resolve_request(request, &mut scopes);
    assert_ne!(second.url, first.url);
}

#[test]
fn test_programmatic_variables_win() {
    init_test_env();
    let (_dir, path) = create_temp_http_file("@host = file.example.com\nGET https://{{host}}/\n");

    let options = isolated_options().with_variable("host", "caller.example.com");
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    assert_eq!(resolved.url, "https://caller.example.com/");
}

#[test]
fn test_file_variable_resolves_when_nothing_shadows_it() {
    init_test_env();
    let (_dir, path) = create_temp_http_file("@x = value\nGET https://example.com/{{x}}\n");

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    assert_eq!(resolved.url, "https://example.com/value");
}

#[test]
fn test_mutually_referencing_definitions_terminate() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "@a = {{b}}\n\
         @b = {{a}}\n\
         GET https://example.com/?v={{a}}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    assert_eq!(parsed.variables["a"], "{{b}}");

    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    assert!(resolved.url.starts_with("https://example.com/?v={{"));
}

#[test]
fn test_malformed_generator_arguments_stay_literal() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "GET https://example.com/\n\
         X-Bad: {{$randomInt abc def}}\n\
         X-Swapped: {{$randomInt 10 1}}\n\
         X-Format: {{$datetime nonsense}}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    assert_eq!(resolved.headers.get("X-Bad"), Some("{{$randomInt abc def}}"));
    assert_eq!(resolved.headers.get("X-Swapped"), Some("{{$randomInt 10 1}}"));
    assert_eq!(resolved.headers.get("X-Format"), Some("{{$datetime nonsense}}"));
}

#[test]
fn test_memoized_generator_shared_across_url_and_body() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "@orderId = {{$randomAlphanumeric 12}}\n\
         PUT https://example.com/orders/{{orderId}}\n\
         \n\
         {\"orderId\": \"{{orderId}}\"}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    assert_eq!(request.method, HttpMethod::PUT);

    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    let order_id = resolved.url.rsplit('/').next().unwrap();
    assert_eq!(order_id.len(), 12);
    let body = resolved.body.as_ref().and_then(RequestBody::as_text).unwrap();
    assert_eq!(body, format!("{{\"orderId\": \"{}\"}}", order_id));
}

#[test]
fn test_request_count_matches_separators() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "GET https://example.com/1\n\
         ###\n\
         # nothing here\n\
         ###\n\
         POST https://example.com/2\n\
         ###\n\
         https://example.com/3\n",
    );

    let parsed = parse_with(&path, &isolated_options()).unwrap();
    assert_eq!(parsed.requests.len(), 3);
    assert_eq!(parsed.request_at_line(5).map(|r| r.line_number), Some(5));
}

#[test]
fn test_file_body_reference_is_passed_through() {
    init_test_env();
    let (dir, path) = create_temp_http_file(
        "POST https://example.com/upload\n\
         Content-Type: application/json\n\
         \n\
         < ./payload.json\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);

    match resolved.body {
        Some(RequestBody::File(reference)) => {
            assert!(!reference.substitute);
            assert!(reference.path.ends_with("payload.json"));
            let expected_dir = std::fs::canonicalize(dir.path()).unwrap();
            assert!(reference.path.starts_with(expected_dir));
        }
        other => panic!("expected file reference, got {:?}", other),
    }
}

#[test]
fn test_aliased_generator_shares_one_value() {
    init_test_env();
    let (_dir, path) = create_temp_http_file(
        "@id = {{$randomInt 1 1000000}}\n\
         @ref = {{id}}\n\
         GET https://example.com/{{id}}/{{ref}}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&path, &options).unwrap();
    assert_eq!(parsed.variables["ref"], "{{id}}");

    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    let path = resolved.url.strip_prefix("https://example.com/").unwrap();
    let (id, alias) = path.split_once('/').unwrap();
    assert!(id.parse::<u32>().is_ok());
    assert_eq!(id, alias);
}
