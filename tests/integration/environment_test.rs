//! Environment and dotenv files next to the request file.

use super::{init_test_env, isolated_options, write_file};
use rest_client_core::config::ParserConfig;
use rest_client_core::parser::parse_with;
use rest_client_core::variables::Resolver;
use tempfile::TempDir;

const ENV_FILE: &str = r#"{
    "$shared": { "apiVersion": "v1", "host": "shared.example.com" },
    "dev": { "host": "localhost:3000", "debug": true, "retries": 3 },
    "prod": { "host": "api.example.com" }
}"#;

#[test]
fn test_selected_environment_feeds_definitions_and_requests() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", ENV_FILE);
    let main = write_file(
        dir.path(),
        "api.http",
        "@base = http://{{host}}/{{apiVersion}}\nGET {{base}}/users?debug={{debug}}\n",
    );

    let options = isolated_options().with_environment("dev");
    let parsed = parse_with(&main, &options).unwrap();
    assert_eq!(parsed.variables["base"], "http://localhost:3000/v1");
    assert_eq!(parsed.environment_variables["retries"], "3");
    assert_eq!(parsed.global_variables["apiVersion"], "v1");

    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    assert_eq!(resolved.url, "http://localhost:3000/v1/users?debug=true");
    assert!(resolved.parsed_url.is_some());
}

#[test]
fn test_private_environment_overrides_public() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", ENV_FILE);
    write_file(
        dir.path(),
        "http-client.private.env.json",
        r#"{ "prod": { "token": "secret" , "host": "internal.example.com" } }"#,
    );
    let main = write_file(dir.path(), "api.http", "GET https://{{host}}/\n");

    let parsed = parse_with(&main, &isolated_options().with_environment("prod")).unwrap();
    assert_eq!(parsed.environment_variables["host"], "internal.example.com");
    assert_eq!(parsed.environment_variables["token"], "secret");
}

#[test]
fn test_no_environment_selected_uses_shared_only() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", ENV_FILE);
    let main = write_file(dir.path(), "api.http", "@h = {{host}}\nGET https://{{h}}/\n");

    let parsed = parse_with(&main, &isolated_options()).unwrap();
    assert!(parsed.environment_variables.is_empty());
    assert_eq!(parsed.variables["h"], "shared.example.com");
}

#[test]
fn test_default_environment_from_config() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", ENV_FILE);
    let main = write_file(dir.path(), "api.http", "GET https://{{host}}/\n");

    let config = ParserConfig {
        default_environment: Some("prod".to_string()),
        ..ParserConfig::default()
    };
    let parsed = parse_with(&main, &isolated_options().with_config(config)).unwrap();
    assert_eq!(parsed.environment_variables["host"], "api.example.com");
}

#[test]
fn test_broken_environment_files_are_absorbed() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", "{ not json");
    write_file(dir.path(), "http-client.private.env.json", r#"{ "dev": ["wrong", "shape"] }"#);
    let main = write_file(dir.path(), "api.http", "GET https://example.com/\n");

    let parsed = parse_with(&main, &isolated_options().with_environment("dev")).unwrap();
    assert_eq!(parsed.requests.len(), 1);
    assert!(parsed.environment_variables.is_empty());
}

#[test]
fn test_unknown_environment_contributes_nothing() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", ENV_FILE);
    let main = write_file(dir.path(), "api.http", "GET https://example.com/\n");

    let parsed = parse_with(&main, &isolated_options().with_environment("staging")).unwrap();
    assert!(parsed.environment_variables.is_empty());
}

#[test]
fn test_dotenv_variables_and_generator() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".env", "API_KEY=from-dotenv\n# comment\nREGION=\"eu-west-1\"\n");
    let main = write_file(
        dir.path(),
        "api.http",
        "@region = {{REGION}}\n\
         GET https://{{region}}.example.com/\n\
         X-Key: {{$dotenv API_KEY}}\n\
         X-Missing: {{$dotenv NOPE}}\n",
    );

    let options = isolated_options();
    let parsed = parse_with(&main, &options).unwrap();
    assert_eq!(parsed.variables["region"], "eu-west-1");
    assert_eq!(parsed.dotenv_variables["API_KEY"], "from-dotenv");

    let request = &parsed.requests[0];
    let mut scopes = parsed.scopes_for(request, &options);
    let resolved = Resolver::new().resolve_request(request, &mut scopes);
    assert_eq!(resolved.url, "https://eu-west-1.example.com/");
    assert_eq!(resolved.headers.get("X-Key"), Some("from-dotenv"));
    assert_eq!(resolved.headers.get("X-Missing"), Some("{{$dotenv NOPE}}"));
}

#[test]
fn test_load_environment_after_parse() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "http-client.env.json", ENV_FILE);
    let main = write_file(dir.path(), "api.http", "GET https://{{host}}/\n");

    let mut parsed = parse_with(&main, &isolated_options()).unwrap();
    assert!(parsed.environment_variables.is_empty());

    parsed.load_environment(Some("dev"), &ParserConfig::default());
    assert_eq!(parsed.environment_variables["host"], "localhost:3000");
}
