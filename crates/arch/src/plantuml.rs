use crate::model::{AnalysisModel, ClassEntity, RelationKind};

/// creole 成对标记字符, 连续出现时需要转义
const CREOLE_MARKUP: &[char] = &['_', '-', '*', '/', '"', '~', '^', '='];

/// PlantUML 类图生成器
pub struct PlantUmlGenerator {
    legend: bool,
}

impl PlantUmlGenerator {
    pub fn new() -> Self {
        Self { legend: true }
    }

    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// 生成类图描述
    ///
    /// 先输出按包分组的类定义, 再统一输出继承/组合/使用三类边.
    pub fn generate(&self, model: &AnalysisModel) -> String {
        let mut lines = vec!["@startuml".to_string()];

        for (package, classes) in model.classes_by_package() {
            if package.is_empty() {
                for class in classes {
                    Self::class_block(class, "", &mut lines);
                }
            } else {
                lines.push(format!("package \"{}\" {{", Self::quote(package)));
                for class in classes {
                    Self::class_block(class, "    ", &mut lines);
                }
                lines.push("}".to_string());
            }
        }

        for relation in model.relations() {
            let from = Self::alias(relation.from);
            let to = Self::alias(relation.to);
            let edge = match relation.kind {
                RelationKind::Inheritance => format!("{} <|-- {}", from, to),
                RelationKind::Composition => format!("{} --> {}", from, to),
                RelationKind::Usage => format!("{} ..> {}", from, to),
            };
            match relation.kind.label() {
                Some(label) => lines.push(format!("{} : {}", edge, label)),
                None => lines.push(edge),
            }
        }

        if self.legend {
            lines.push("legend left".to_string());
            lines.push("| <|-- | Inheritance |".to_string());
            lines.push("| -->   | Composition |".to_string());
            lines.push("| ..>   | Uses        |".to_string());
            lines.push("endlegend".to_string());
        }

        lines.push("@enduml".to_string());
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn class_block(class: &ClassEntity, indent: &str, lines: &mut Vec<String>) {
        lines.push(format!(
            "{}class \"{}\" as {} {{",
            indent,
            Self::quote(&class.name),
            Self::alias(&class.name)
        ));
        if !class.attributes.is_empty() {
            lines.push(format!("{}    .. Attributes ..", indent));
            for attr in &class.attributes {
                lines.push(format!("{}    {}", indent, Self::escape_member(attr)));
            }
        }
        if !class.methods.is_empty() {
            lines.push(format!("{}    .. Methods ..", indent));
            for method in &class.methods {
                lines.push(format!(
                    "{}    {}() : line {}",
                    indent,
                    Self::escape_member(&method.name),
                    method.line
                ));
            }
        }
        lines.push(format!("{}    .. File Path ..", indent));
        lines.push(format!("{}    {}", indent, Self::escape_member(&class.file_path)));
        lines.push(format!("{}}}", indent));
    }

    /// 别名: 非字母数字字符替换为 `_`
    #[doc(hidden)]
    pub fn alias(name: &str) -> String {
        let alias: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if alias.is_empty() || alias.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{}", alias)
        } else {
            alias
        }
    }

    /// 引号内的名字不能再含双引号
    #[doc(hidden)]
    pub fn quote(name: &str) -> String {
        name.replace('"', "'")
    }

    /// 转义 creole 成对标记, 例如 `__init__` 不应被渲染为下划线文本
    #[doc(hidden)]
    pub fn escape_member(text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        for (i, &c) in chars.iter().enumerate() {
            if CREOLE_MARKUP.contains(&c) && chars.get(i + 1) == Some(&c) {
                out.push('~');
            }
            out.push(c);
        }
        out
    }
}

impl Default for PlantUmlGenerator {
    fn default() -> Self {
        Self::new()
    }
}
