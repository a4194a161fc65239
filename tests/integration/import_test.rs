//! Import resolution tests against real files on disk.

use super::{init_test_env, isolated_options, write_file};
use rest_client_core::parser::{parse_with, ParseError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_imported_requests_come_first_in_directive_order() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.http", "GET https://example.com/a\n");
    write_file(dir.path(), "b.http", "GET https://example.com/b\n");
    let main = write_file(
        dir.path(),
        "main.http",
        "# @import \"./a.http\"\n\
         // @import \"b.http\"\n\
         GET https://example.com/main\n",
    );

    let parsed = parse_with(&main, &isolated_options()).unwrap();
    let urls: Vec<_> = parsed.requests.iter().map(|r| r.raw_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/main"
        ]
    );

    assert_eq!(parsed.imports.len(), 2);
    assert!(parsed.imports[0].ends_with("a.http"));
    assert!(parsed.imports[0].is_absolute());

    // Imported requests keep their own source location.
    assert!(parsed.requests[0].file_path.ends_with("a.http"));
    assert_eq!(parsed.requests[2].line_number, 3);
}

#[test]
fn test_import_variable_precedence() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "first.http", "@shared = first\n@only_first = 1\n");
    write_file(dir.path(), "second.http", "@shared = second\n@own = imported\n");
    let main = write_file(
        dir.path(),
        "main.http",
        "@own = mine\n\
         # @import \"first.http\"\n\
         # @import \"second.http\"\n\
         @derived = {{shared}}-{{only_first}}\n\
         GET https://example.com/{{own}}\n",
    );

    let parsed = parse_with(&main, &isolated_options()).unwrap();
    assert_eq!(parsed.variables["shared"], "second");
    assert_eq!(parsed.variables["own"], "mine");
    assert_eq!(parsed.variables["derived"], "second-1");
    assert_eq!(parsed.requests[0].variables["own"], "mine");
}

#[test]
fn test_nested_imports_resolve_relative_to_each_file() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "lib/auth.http", "@token = secret\n");
    write_file(
        dir.path(),
        "lib/common.http",
        "# @import \"auth.http\"\nGET https://example.com/common\n",
    );
    let main = write_file(
        dir.path(),
        "api/main.http",
        "# @import \"../lib/common.http\"\nGET https://example.com/main\n",
    );

    let parsed = parse_with(&main, &isolated_options()).unwrap();
    assert_eq!(parsed.requests.len(), 2);
    assert_eq!(parsed.variables["token"], "secret");
    assert_eq!(parsed.imports.len(), 1);
}

#[test]
fn test_circular_import_names_both_files() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "a.http", "# @import \"b.http\"\nGET https://example.com/a\n");
    write_file(dir.path(), "b.http", "# @import \"a.http\"\nGET https://example.com/b\n");

    let err = parse_with(&a, &isolated_options()).unwrap_err();
    match err {
        ParseError::CircularImport { chain } => {
            let a = fs::canonicalize(&a).unwrap();
            let b = fs::canonicalize(dir.path().join("b.http")).unwrap();
            assert_eq!(chain, vec![a.clone(), b, a]);
        }
        other => panic!("expected circular import, got {:?}", other),
    }
}

#[test]
fn test_self_import_is_circular() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "self.http", "# @import \"./self.http\"\n");

    let err = parse_with(&a, &isolated_options()).unwrap_err();
    assert!(matches!(err, ParseError::CircularImport { ref chain } if chain.len() == 2));
}

#[test]
fn test_diamond_import_is_not_circular() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "base.http", "@base = 1\n");
    write_file(dir.path(), "left.http", "# @import \"base.http\"\n");
    write_file(dir.path(), "right.http", "# @import \"base.http\"\n");
    let main = write_file(
        dir.path(),
        "main.http",
        "# @import \"left.http\"\n# @import \"right.http\"\nGET https://example.com\n",
    );

    let parsed = parse_with(&main, &isolated_options()).unwrap();
    assert_eq!(parsed.variables["base"], "1");
}

#[test]
fn test_missing_import_names_path() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let main = write_file(
        dir.path(),
        "main.http",
        "# @import \"does-not-exist.http\"\nGET https://example.com\n",
    );

    let err = parse_with(&main, &isolated_options()).unwrap_err();
    match &err {
        ParseError::ImportNotFound { importer, path } => {
            assert!(importer.ends_with("main.http"));
            assert!(path.ends_with("does-not-exist.http"));
        }
        other => panic!("expected missing import, got {:?}", other),
    }
    assert!(err.to_string().contains("does-not-exist.http"));
}

#[test]
fn test_error_in_imported_file_propagates() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "broken.http", "GET https://example.com\nnot a header\n");
    let main = write_file(dir.path(), "main.http", "# @import \"broken.http\"\n");

    let err = parse_with(&main, &isolated_options()).unwrap_err();
    match err {
        ParseError::InvalidHeader { path, line, .. } => {
            assert!(path.ends_with("broken.http"));
            assert_eq!(line, 2);
        }
        other => panic!("expected invalid header, got {:?}", other),
    }
}
