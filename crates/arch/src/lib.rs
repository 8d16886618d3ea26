//! arch - 类结构分析
//!
//! 遍历源码目录, 提取类/函数/导入, 推断继承、组合与使用关系, 输出 JSON 与类图描述

mod analyzer;
mod collector;
mod config;
mod error;
mod export;
mod mermaid;
mod model;
mod plantuml;
mod render;
mod visitor;

pub use analyzer::{Analysis, ModelAssembler, StructureAnalyzer};
pub use collector::{package_name, SourceCollector, SourceFile};
pub use config::AnalyzerConfig;
pub use error::{ArchError, FileSkipped, Result};
pub use export::{artifact_path, to_json, write_artifacts, Artifacts, DiagramFormat};
pub use mermaid::MermaidGenerator;
pub use model::{
    AnalysisModel, ClassEntity, FileAnalysis, MethodEntity, Relation, RelationKind,
};
pub use plantuml::PlantUmlGenerator;
pub use render::{render_diagram, CommandRenderer, RenderError, Renderer};
pub use visitor::StructuralVisitor;
