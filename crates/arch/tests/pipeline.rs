//! 端到端测试: 目录 -> 模型 -> JSON / 类图

use arch::{
    to_json, write_artifacts, AnalyzerConfig, ArchError, CommandRenderer, DiagramFormat,
    PlantUmlGenerator, Renderer, StructureAnalyzer,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// 创建临时 Python 项目用于测试
fn create_test_project() -> tempfile::TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();

    write(
        root,
        "library/models.py",
        r#"
import os
from dataclasses import dataclass


class Book:
    title = ""

    def __init__(self, title):
        self.title = title


class Catalog:
    def __init__(self):
        self.books = []

    def add(self, book):
        self.books.append(book)
"#,
    );

    write(
        root,
        "library/service.py",
        r#"
from .models import Book, Catalog
import logging


class Storage:
    pass


class Library(Storage):
    def __init__(self, name):
        self.name = name
        self.catalog = Catalog()
        if name:
            self.index = Index()

    def lend(self, title):
        book = Book(title)
        self.repo.save(book)
        audit(book)


def build_library():
    return Library("main")
"#,
    );

    write(root, "main.py", "def main():\n    pass\n\nmain()\n");
    dir
}

fn sequential() -> StructureAnalyzer {
    StructureAnalyzer::new(AnalyzerConfig::default().with_parallel(false))
}

#[test]
fn test_every_class_appears_once() {
    let project = create_test_project();
    let analysis = sequential().analyze(project.path()).expect("analysis");

    let names: Vec<_> = analysis.model.classes.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Book", "Catalog", "Library", "Storage"]);
    assert_eq!(analysis.files_analyzed, 3);
    assert!(analysis.skipped.is_empty());
}

#[test]
fn test_relationships_and_packages() {
    let project = create_test_project();
    let analysis = sequential().analyze(project.path()).expect("analysis");
    let model = &analysis.model;

    let library = model.class("Library").unwrap();
    assert_eq!(library.package, "library");
    assert_eq!(library.base_classes, vec!["Storage"]);
    assert!(library.composition.contains("Catalog"));
    // 嵌套在 if 中的赋值不参与推断
    assert!(!library.composition.contains("Index"));
    assert!(!library.attributes.contains("index"));
    assert!(library.uses.contains("repo"));
    assert!(library.uses.contains("Book"));
    assert!(library.uses.contains("audit"));

    let methods: Vec<_> = library.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["__init__", "lend"]);

    let catalog = model.class("Catalog").unwrap();
    assert!(catalog.uses.contains("books"));

    let book = model.class("Book").unwrap();
    assert!(book.attributes.contains("title"));
    assert!(book.file_path.ends_with("models.py"));

    assert_eq!(model.functions, vec!["build_library", "main"]);
    assert_eq!(
        model.imports,
        vec!["os", "dataclasses", "models", "logging"]
    );
}

#[test]
fn test_duplicate_class_last_in_path_order_wins() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "b/foo.py", "class Foo(Base):\n    pass\n");
    write(dir.path(), "a/foo.py", "class Foo(Base):\n    def only_in_a(self):\n        pass\n");

    let analysis = sequential().analyze(dir.path()).expect("analysis");
    let foo = analysis.model.class("Foo").unwrap();
    assert_eq!(analysis.model.classes.len(), 1);
    assert_eq!(foo.package, "b");
    assert!(foo.methods.is_empty());
}

#[test]
fn test_syntax_error_file_is_skipped() {
    let project = create_test_project();
    write(project.path(), "broken.py", "class Broken(:\n    pass\n");

    let analysis = sequential().analyze(project.path()).expect("analysis");
    assert_eq!(analysis.skipped.len(), 1);
    assert!(analysis.skipped[0].path.ends_with("broken.py"));
    assert!(analysis.skipped[0].reason.contains("syntax error"));
    assert!(analysis.model.class("Broken").is_none());
    assert_eq!(analysis.model.classes.len(), 4);
}

#[test]
fn test_deeply_nested_file_is_skipped_without_aborting() {
    let project = create_test_project();
    let depth = 5000;
    let source = format!(
        "class Deep:\n    pass\n\nx = {}1{}\n",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    write(project.path(), "deep.py", &source);

    for parallel in [false, true] {
        let analyzer = StructureAnalyzer::new(AnalyzerConfig::default().with_parallel(parallel));
        let analysis = analyzer.analyze(project.path()).expect("analysis");
        assert_eq!(analysis.skipped.len(), 1);
        assert!(analysis.skipped[0].path.ends_with("deep.py"));
        assert!(analysis.skipped[0].reason.contains("syntax error"));
        assert!(analysis.model.class("Deep").is_none());
        assert_eq!(analysis.model.classes.len(), 4);
    }
}

#[test]
fn test_undecodable_file_is_skipped() {
    let project = create_test_project();
    fs::write(project.path().join("latin1.py"), [0x23, 0x20, 0xe9, 0x0a]).unwrap();

    let analysis = sequential().analyze(project.path()).expect("analysis");
    assert_eq!(analysis.skipped.len(), 1);
    assert!(analysis.skipped[0].reason.starts_with("invalid UTF-8"));
    assert_eq!(analysis.files_analyzed, 3);
}

#[test]
fn test_invalid_root_writes_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("missing");

    let result = sequential().analyze(&missing);
    assert!(matches!(result, Err(ArchError::InvalidRoot { .. })));

    let file_root = dir.path().join("file.py");
    fs::write(&file_root, "x = 1\n").unwrap();
    assert!(matches!(
        sequential().analyze(&file_root),
        Err(ArchError::InvalidRoot { .. })
    ));

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_output_is_deterministic() {
    let project = create_test_project();
    let first = sequential().analyze(project.path()).expect("analysis");
    let second = sequential().analyze(project.path()).expect("analysis");

    assert_eq!(to_json(&first.model).unwrap(), to_json(&second.model).unwrap());
    assert_eq!(
        PlantUmlGenerator::new().generate(&first.model),
        PlantUmlGenerator::new().generate(&second.model)
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let project = create_test_project();
    for i in 0..20 {
        write(
            project.path(),
            &format!("gen/m{:02}.py", i),
            &format!("class Dup(Base{}):\n    pass\n\nclass Gen{}:\n    pass\n", i, i),
        );
    }

    let parallel = StructureAnalyzer::new(AnalyzerConfig::default().with_parallel(true))
        .analyze(project.path())
        .expect("analysis");
    let serial = sequential().analyze(project.path()).expect("analysis");

    assert_eq!(to_json(&parallel.model).unwrap(), to_json(&serial.model).unwrap());
    assert_eq!(parallel.model.class("Dup").unwrap().base_classes, vec!["Base19"]);
}

#[test]
fn test_artifacts_written_for_both_formats() {
    let project = create_test_project();
    let out = tempdir().expect("Failed to create temp dir");
    let analysis = sequential().analyze(project.path()).expect("analysis");

    let puml_base = out.path().join("classes");
    assert!(write_artifacts(&analysis.model, &puml_base, DiagramFormat::PlantUml).is_ok());
    let puml = fs::read_to_string(out.path().join("classes.puml")).unwrap();
    assert!(puml.contains("Storage <|-- Library"));
    assert!(puml.contains("Library --> Catalog : composed of"));
    assert!(puml.contains("Library ..> repo : uses"));
    assert!(puml.contains("package \"library\" {"));

    let mmd_base = out.path().join("mermaid");
    assert!(write_artifacts(&analysis.model, &mmd_base, DiagramFormat::Mermaid).is_ok());
    let mmd = fs::read_to_string(out.path().join("mermaid.mmd")).unwrap();
    assert!(mmd.starts_with("classDiagram\n"));
    assert!(mmd.contains("Storage <|-- Library"));

    let json_text = fs::read_to_string(out.path().join("classes.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(json["classes"]["Library"]["composition"], serde_json::json!(["Catalog"]));
}

#[tokio::test]
async fn test_render_failure_keeps_artifacts() {
    let project = create_test_project();
    let out = tempdir().expect("Failed to create temp dir");
    let analysis = sequential().analyze(project.path()).expect("analysis");

    let basename = out.path().join("diagram");
    let artifacts = write_artifacts(&analysis.model, &basename, DiagramFormat::PlantUml);
    let diagram = artifacts.diagram.expect("diagram written");

    let renderer = CommandRenderer::plantuml("classmap-missing-plantuml");
    assert!(renderer.render(&diagram).await.is_err());

    assert!(out.path().join("diagram.json").exists());
    assert!(out.path().join("diagram.puml").exists());
}
