mod common;

use common::{read, service, single_file, write_file};
use reorder_initializers::config::ReorderConfig;
use reorder_initializers::service::ReorderService;
use tempfile::TempDir;

#[test]
fn test_permuted_initializers_follow_member_order() {
    let (_dir, path) = single_file(
        "t.cpp",
        r#"struct T {
    int a;
    int b;
    int c;
    T() : c(3), a(1), b(2) {}
};
"#,
    );

    let report = service().process_file(&path).unwrap();
    assert_eq!(report.edits, 1);
    assert!(report.written);
    assert!(report.changed);
    assert_eq!(
        read(&path),
        "struct T {\n    int a;\n    int b;\n    int c;\n    T() : a(1),\nb(2),\nc(3){}\n};\n"
    );
}

#[test]
fn test_synthesized_members_never_appear() {
    let (_dir, path) = single_file(
        "t.cpp",
        r#"struct T {
    int x = 0;
    int y;
    T() : y(5) {}
};
"#,
    );

    service().process_file(&path).unwrap();
    let result = read(&path);
    assert!(result.contains("T() : y(5){}"));
    assert!(!result.contains("x("));
}

#[test]
fn test_second_pass_changes_nothing() {
    let (_dir, path) = single_file(
        "t.cpp",
        r#"class Pair {
public:
    Pair(int l, int r) : right(r), left(l) {}
private:
    int left;
    int right;
};
"#,
    );

    let service = service();
    let first = service.process_file(&path).unwrap();
    assert!(first.changed);
    let after_first = read(&path);

    let second = service.process_file(&path).unwrap();
    assert_eq!(second.edits, 1);
    assert!(!second.changed);
    assert_eq!(read(&path), after_first);
}

#[test]
fn test_constructor_without_initializers_leaves_file_identical() {
    let source = r#"struct Empty {
    int value;
    Empty() { value = 1; }
    Empty(int) = delete;
};
"#;
    let (_dir, path) = single_file("empty.cpp", source);

    let report = service().process_file(&path).unwrap();
    assert_eq!(report.edits, 0);
    assert!(!report.written);
    assert_eq!(read(&path), source);
}

#[test]
fn test_comments_and_trailing_text_before_body_are_normalized() {
    let (_dir, path) = single_file(
        "t.cpp",
        "struct T {\n  int a;\n  int b;\n  T()\n      : b(2),  // second\n        a(1)   // first\n  {}\n};\n",
    );

    service().process_file(&path).unwrap();
    assert_eq!(
        read(&path),
        "struct T {\n  int a;\n  int b;\n  T()\n      : a(1),\nb(2){}\n};\n"
    );
}

#[test]
fn test_bases_come_before_members() {
    let (_dir, path) = single_file(
        "derived.cpp",
        r#"struct Base { Base(int) {} };
struct Derived : Base {
    int x;
    Derived() : x(1), Base(2) {}
};
"#,
    );

    service().process_file(&path).unwrap();
    assert!(read(&path).contains("Derived() : Base(2),\nx(1){}"));
}

#[test]
fn test_out_of_line_template_constructor() {
    let (_dir, path) = single_file(
        "box.cpp",
        r#"template <typename U>
class Box {
    U first;
    U second;
public:
    Box();
};

template <typename U>
Box<U>::Box() : second(), first() {}
"#,
    );

    let report = service().process_file(&path).unwrap();
    assert_eq!(report.edits, 1);
    assert!(read(&path).ends_with("Box<U>::Box() : first(),\nsecond(){}\n"));
}

#[test]
fn test_header_constructors_are_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let header_source = r#"#pragma once
struct Shape {
    int w;
    int h;
    Shape(int s) : h(s), w(s) {}
    Shape();
};
"#;
    let header = write_file(dir.path(), "shape.h", header_source);
    let main = write_file(
        dir.path(),
        "shape.cpp",
        "#include \"shape.h\"\n\nShape::Shape() : h(0), w(0) {}\n",
    );

    let report = service().process_file(&main).unwrap();
    assert_eq!(report.constructors_seen, 2);
    assert_eq!(report.constructors_eligible, 1);
    assert_eq!(read(&header), header_source);
    assert_eq!(
        read(&main),
        "#include \"shape.h\"\n\nShape::Shape() : w(0),\nh(0){}\n"
    );
}

#[test]
fn test_unplaceable_initializer_skips_only_that_constructor() {
    let (_dir, path) = single_file(
        "t.cpp",
        r#"struct T {
    int a;
    int b;
    T() : b(1), a(2) {}
    T(int) : b(1), MACRO_INIT(x), a(2) {}
};
"#,
    );

    let report = service().process_file(&path).unwrap();
    assert_eq!(report.edits, 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("MACRO_INIT"));

    let result = read(&path);
    assert!(result.contains("T() : a(2),\nb(1){}"));
    assert!(result.contains("T(int) : b(1), MACRO_INIT(x), a(2) {}"));
}

#[test]
fn test_parse_failure_is_fatal_for_the_file_only() {
    let dir = TempDir::new().unwrap();
    let broken_source = "struct T { int a; int b; T() : b(1), a(2) {} };\nint broken( {\n";
    let broken = write_file(dir.path(), "broken.cpp", broken_source);
    let good = write_file(
        dir.path(),
        "good.cpp",
        "struct G { int a; int b; G() : b(1), a(2) {} };\n",
    );

    let summary = service().run(&[broken.clone(), good.clone()]);
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].error.contains("Parser error"));
    assert_eq!(read(&broken), broken_source);

    assert_eq!(summary.files.len(), 1);
    assert_eq!(summary.files_written, 1);
    assert!(read(&good).contains("G() : a(2),\nb(1){}"));
}

#[test]
fn test_tolerated_parse_errors_rewrite_intact_constructors() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "t.cpp",
        "struct T { int a; int b; T() : b(1), a(2) {} };\nint broken( {\n",
    );

    let service = ReorderService::new(ReorderConfig {
        tolerate_parse_errors: true,
        ..ReorderConfig::default()
    })
    .unwrap();
    let report = service.process_file(&path).unwrap();
    assert_eq!(report.edits, 1);
    assert!(read(&path).contains("T() : a(2),\nb(1){}"));
}

#[test]
fn test_tolerated_parse_errors_leave_broken_constructor_alone() {
    let dir = TempDir::new().unwrap();
    let broken_ctor = "U() : b(1), a(2) { call()); }";
    let path = write_file(
        dir.path(),
        "t.cpp",
        &format!(
            "struct T {{ int a; int b; T() : b(1), a(2) {{}} }};\nstruct U {{\n  int a;\n  int b;\n  {broken_ctor}\n}};\n"
        ),
    );

    let service = ReorderService::new(ReorderConfig {
        tolerate_parse_errors: true,
        ..ReorderConfig::default()
    })
    .unwrap();
    let report = service.process_file(&path).unwrap();

    assert_eq!(report.edits, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].constructor, "U");
    assert!(report.skipped[0].reason.contains("syntax error"));

    let result = read(&path);
    assert!(result.contains("T() : a(2),\nb(1){}"));
    assert!(result.contains(broken_ctor));
}

#[test]
fn test_local_class_constructors_are_rewritten() {
    let (_dir, path) = single_file(
        "local.cpp",
        "void f() {\n  struct L { int a; int b; L() : b(1), a(2) {} };\n}\n",
    );

    let report = service().process_file(&path).unwrap();
    assert_eq!(report.constructors_seen, 1);
    assert_eq!(report.edits, 1);
    assert!(read(&path).contains("L() : a(2),\nb(1){}"));
}

#[test]
fn test_conditional_members_keep_their_position() {
    let (_dir, path) = single_file(
        "t.cpp",
        "struct T {\n  int a;\n#ifdef DEBUG\n  int dbg;\n#endif\n  int b;\n  T() : b(1), dbg(0), a(2) {}\n};\n",
    );

    let report = service().process_file(&path).unwrap();
    assert!(report.skipped.is_empty());
    assert!(read(&path).contains("T() : a(2),\ndbg(0),\nb(1){}"));
}

#[cfg(unix)]
#[test]
fn test_symlinked_input_rewrites_link_target() {
    let dir = TempDir::new().unwrap();
    let real = write_file(
        dir.path(),
        "real/t.cpp",
        "struct T { int a; int b; T() : b(1), a(2) {} };\n",
    );
    let link = dir.path().join("t.cpp");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let report = service().process_file(&link).unwrap();
    assert!(report.written);
    assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert!(read(&real).contains("T() : a(2),\nb(1){}"));
}

#[test]
fn test_compilation_database_supplies_include_dirs() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "include/geom/point.h",
        "namespace geom {\nstruct Point {\n  double x;\n  double y;\n  Point();\n};\n}\n",
    );
    let source = "#include \"geom/point.h\"\nnamespace geom {\nPoint::Point() : y(0), x(0) {}\n}\n";
    let main = write_file(dir.path(), "src/point.cpp", source);
    write_file(
        dir.path(),
        "build/compile_commands.json",
        &serde_json::json!([{
            "directory": dir.path(),
            "file": "src/point.cpp",
            "arguments": ["c++", "-Iinclude", "-c", "src/point.cpp"],
        }])
        .to_string(),
    );

    // Without include paths the record cannot be found and nothing changes.
    let report = service().process_file(&main).unwrap();
    assert_eq!(report.edits, 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(read(&main), source);

    let service = ReorderService::new(ReorderConfig {
        build_path: Some(dir.path().join("build")),
        ..ReorderConfig::default()
    })
    .unwrap();
    let report = service.process_file(&main).unwrap();
    assert_eq!(report.edits, 1);
    assert!(read(&main).contains("Point::Point() : x(0),\ny(0){}"));
}

#[test]
fn test_include_dirs_from_compiler_args() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "inc/node.h",
        "struct Node {\n  Node* next;\n  int value;\n  Node();\n};\n",
    );
    let main = write_file(
        dir.path(),
        "node.cpp",
        "#include <node.h>\nNode::Node() : value(0), next(nullptr) {}\n",
    );

    let service = ReorderService::new(ReorderConfig {
        compiler_args: vec![
            "-I".to_string(),
            dir.path().join("inc").display().to_string(),
        ],
        ..ReorderConfig::default()
    })
    .unwrap();
    service.process_file(&main).unwrap();
    assert!(read(&main).contains("Node::Node() : next(nullptr),\nvalue(0){}"));
}
