use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 方法
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodEntity {
    pub name: String,
    pub line: u32,
}

/// 类实体
///
/// 集合字段使用 `BTreeSet`, 迭代与序列化均为字典序.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassEntity {
    #[serde(skip)]
    pub name: String,
    pub file_path: String,
    /// 相对分析根目录的包名, 根目录下的文件为 ""
    pub package: String,
    pub line: u32,
    /// 声明顺序
    pub methods: Vec<MethodEntity>,
    pub attributes: BTreeSet<String>,
    /// 声明顺序
    pub base_classes: Vec<String>,
    pub composition: BTreeSet<String>,
    pub uses: BTreeSet<String>,
}

impl ClassEntity {
    pub fn new(name: &str, file_path: &str, package: &str, line: u32) -> Self {
        Self {
            name: name.to_string(),
            file_path: file_path.to_string(),
            package: package.to_string(),
            line,
            methods: Vec::new(),
            attributes: BTreeSet::new(),
            base_classes: Vec::new(),
            composition: BTreeSet::new(),
            uses: BTreeSet::new(),
        }
    }
}

/// 单个文件的访问结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAnalysis {
    /// 前序遍历顺序
    pub classes: Vec<ClassEntity>,
    pub functions: Vec<String>,
    pub imports: Vec<String>,
}

/// 分析模型
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisModel {
    pub classes: BTreeMap<String, ClassEntity>,
    pub functions: Vec<String>,
    pub imports: Vec<String>,
}

impl AnalysisModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntity> {
        self.classes.get(name)
    }

    /// 按包分组, 包名与组内类名均为字典序
    pub fn classes_by_package(&self) -> BTreeMap<&str, Vec<&ClassEntity>> {
        let mut packages: BTreeMap<&str, Vec<&ClassEntity>> = BTreeMap::new();
        for class in self.classes.values() {
            packages.entry(class.package.as_str()).or_default().push(class);
        }
        packages
    }

    /// 继承/组合/使用三类关系, 仅在序列化时物化
    pub fn relations(&self) -> Vec<Relation<'_>> {
        let mut relations = Vec::new();
        for class in self.classes.values() {
            for base in &class.base_classes {
                relations.push(Relation {
                    kind: RelationKind::Inheritance,
                    from: base,
                    to: &class.name,
                });
            }
            for composed in &class.composition {
                relations.push(Relation {
                    kind: RelationKind::Composition,
                    from: &class.name,
                    to: composed,
                });
            }
            for used in &class.uses {
                relations.push(Relation {
                    kind: RelationKind::Usage,
                    from: &class.name,
                    to: used,
                });
            }
        }
        relations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// base -> derived
    Inheritance,
    /// derived -> composed
    Composition,
    /// derived -> used
    Usage,
}

impl RelationKind {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            RelationKind::Inheritance => None,
            RelationKind::Composition => Some("composed of"),
            RelationKind::Usage => Some("uses"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation<'a> {
    pub kind: RelationKind,
    pub from: &'a str,
    pub to: &'a str,
}
