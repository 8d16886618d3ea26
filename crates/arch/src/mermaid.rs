use crate::model::{AnalysisModel, ClassEntity, RelationKind};

/// Mermaid 类图生成器
pub struct MermaidGenerator {
    file_notes: bool,
}

impl MermaidGenerator {
    pub fn new() -> Self {
        Self { file_notes: true }
    }

    /// 是否在每个类前输出文件路径注释
    pub fn with_file_notes(mut self, file_notes: bool) -> Self {
        self.file_notes = file_notes;
        self
    }

    /// 生成 classDiagram
    pub fn generate(&self, model: &AnalysisModel) -> String {
        let mut lines = vec!["classDiagram".to_string()];

        // 按包分组, 根包直接输出
        for (package, classes) in model.classes_by_package() {
            if package.is_empty() {
                for class in classes {
                    self.class_block(class, "    ", &mut lines);
                }
            } else {
                lines.push(format!("    namespace {} {{", Self::node_id(package)));
                for class in classes {
                    self.class_block(class, "        ", &mut lines);
                }
                lines.push("    }".to_string());
            }
        }

        // 生成边
        for relation in model.relations() {
            let from = Self::node_id(relation.from);
            let to = Self::node_id(relation.to);
            let edge = match relation.kind {
                RelationKind::Inheritance => format!("    {} <|-- {}", from, to),
                RelationKind::Composition => format!("    {} --> {}", from, to),
                RelationKind::Usage => format!("    {} ..> {}", from, to),
            };
            match relation.kind.label() {
                Some(label) => lines.push(format!("{} : {}", edge, label)),
                None => lines.push(edge),
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn class_block(&self, class: &ClassEntity, indent: &str, lines: &mut Vec<String>) {
        if self.file_notes {
            lines.push(format!("{}%% {}", indent, class.file_path));
        }
        let id = Self::node_id(&class.name);
        if class.attributes.is_empty() && class.methods.is_empty() {
            lines.push(format!("{}class {}", indent, id));
            return;
        }

        lines.push(format!("{}class {} {{", indent, id));
        for attr in &class.attributes {
            lines.push(format!("{}    +{}", indent, attr));
        }
        for method in &class.methods {
            lines.push(format!("{}    +{}() L{}", indent, method.name, method.line));
        }
        lines.push(format!("{}}}", indent));
    }

    /// Mermaid 标识符: 非字母数字字符替换为 `_`
    #[doc(hidden)]
    pub fn node_id(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}

impl Default for MermaidGenerator {
    fn default() -> Self {
        Self::new()
    }
}
