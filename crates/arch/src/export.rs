use crate::error::{ArchError, Result};
use crate::mermaid::MermaidGenerator;
use crate::model::AnalysisModel;
use crate::plantuml::PlantUmlGenerator;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// 图描述语法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramFormat {
    PlantUml,
    Mermaid,
}

impl DiagramFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DiagramFormat::PlantUml => "puml",
            DiagramFormat::Mermaid => "mmd",
        }
    }

    pub fn generate(&self, model: &AnalysisModel) -> String {
        match self {
            DiagramFormat::PlantUml => PlantUmlGenerator::new().generate(model),
            DiagramFormat::Mermaid => MermaidGenerator::new().generate(model),
        }
    }
}

impl std::str::FromStr for DiagramFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plantuml" | "puml" => Ok(DiagramFormat::PlantUml),
            "mermaid" | "mmd" => Ok(DiagramFormat::Mermaid),
            other => Err(format!("unsupported diagram format: {}", other)),
        }
    }
}

/// 结构化数据 (JSON), 4 空格缩进, 以换行结尾
///
/// 类按名字排序, 集合字段按字典序, 相同输入得到逐字节相同的输出.
pub fn to_json(model: &AnalysisModel) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    model.serialize(&mut serializer)?;

    let mut json = String::from_utf8_lossy(&buf).into_owned();
    json.push('\n');
    Ok(json)
}

/// `<basename>.<ext>`, 不替换 basename 中已有的点
pub fn artifact_path(basename: &Path, extension: &str) -> PathBuf {
    let mut path = basename.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// 两个产物各自的写入结果, 一个失败不影响另一个
#[derive(Debug)]
pub struct Artifacts {
    pub json: Result<PathBuf>,
    pub diagram: Result<PathBuf>,
}

impl Artifacts {
    pub fn is_ok(&self) -> bool {
        self.json.is_ok() && self.diagram.is_ok()
    }
}

/// 写出 `<basename>.json` 与图描述文件
pub fn write_artifacts(model: &AnalysisModel, basename: &Path, format: DiagramFormat) -> Artifacts {
    let json_path = artifact_path(basename, "json");
    let json = to_json(model).and_then(|content| write_file(&json_path, &content));

    let diagram_path = artifact_path(basename, format.extension());
    let diagram = write_file(&diagram_path, &format.generate(model));

    Artifacts { json, diagram }
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    fs::write(path, content).map_err(|source| ArchError::SerializationIo {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Saved {}", path.display());
    Ok(path.to_path_buf())
}
