//! 结构访问器
//!
//! 单个文件语法树的一次前序遍历: 记录类/函数/导入, 并从方法体的直接语句中推断
//! 组合与使用关系. 只检查方法体的顶层语句, 嵌套在 if/for/while/try 等块里的
//! 语句不参与关系推断.

use crate::model::{ClassEntity, FileAnalysis, MethodEntity};
use syntax::{Assign, ClassDef, Expr, FunctionDef, Module, Stmt};

pub struct StructuralVisitor<'a> {
    file_path: &'a str,
    package: &'a str,
    constructor: &'a str,
    /// 当前所处的类嵌套深度, > 0 时函数不计入独立函数
    class_depth: usize,
    result: FileAnalysis,
}

impl<'a> StructuralVisitor<'a> {
    pub fn new(file_path: &'a str, package: &'a str, constructor: &'a str) -> Self {
        Self {
            file_path,
            package,
            constructor,
            class_depth: 0,
            result: FileAnalysis::default(),
        }
    }

    pub fn visit_module(mut self, module: &Module) -> FileAnalysis {
        self.visit_body(&module.body);
        self.result
    }

    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::ClassDef(class) => self.visit_class(class),
            Stmt::FunctionDef(function) => {
                if self.class_depth == 0 {
                    self.result.functions.push(function.name.clone());
                }
                self.visit_body(&function.body);
            }
            Stmt::Import(names) => self.result.imports.extend(names.iter().cloned()),
            Stmt::ImportFrom(module) => {
                if let Some(module) = module {
                    self.result.imports.push(module.clone());
                }
            }
            Stmt::Nested(body) => self.visit_body(body),
            Stmt::Assign(_) | Stmt::Expr(_) | Stmt::Other => {}
        }
    }

    fn visit_class(&mut self, class: &ClassDef) {
        let mut entity = ClassEntity::new(&class.name, self.file_path, self.package, class.line);
        entity.base_classes = class
            .bases
            .iter()
            .filter_map(Expr::as_name)
            .map(str::to_string)
            .collect();

        for stmt in &class.body {
            match stmt {
                Stmt::FunctionDef(method) => self.inspect_method(&mut entity, method),
                Stmt::Assign(assign) => {
                    let names = assign.targets.iter().filter_map(Expr::as_name);
                    entity.attributes.extend(names.map(str::to_string));
                }
                _ => {}
            }
        }

        // 前序: 外层类先于其内部嵌套的类
        self.result.classes.push(entity);

        self.class_depth += 1;
        self.visit_body(&class.body);
        self.class_depth -= 1;
    }

    fn inspect_method(&self, entity: &mut ClassEntity, method: &FunctionDef) {
        entity.methods.push(MethodEntity {
            name: method.name.clone(),
            line: method.line,
        });

        let is_constructor = method.name == self.constructor;
        let receiver = method.params.first().map(String::as_str);

        for stmt in &method.body {
            match stmt {
                Stmt::Assign(assign) => {
                    Self::inspect_assign(entity, assign, receiver, is_constructor)
                }
                Stmt::Expr(Expr::Call { func }) => match func.as_ref() {
                    Expr::Name(name) => {
                        entity.uses.insert(name.clone());
                    }
                    Expr::Attribute { value, .. } => {
                        if let Some(root) = root_object(value, receiver) {
                            entity.uses.insert(root.to_string());
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    fn inspect_assign(
        entity: &mut ClassEntity,
        assign: &Assign,
        receiver: Option<&str>,
        is_constructor: bool,
    ) {
        let self_attrs: Vec<&str> = assign
            .targets
            .iter()
            .filter_map(|target| self_attribute(target, receiver))
            .collect();
        entity
            .attributes
            .extend(self_attrs.iter().map(|attr| attr.to_string()));

        let Expr::Call { func } = &assign.value else {
            return;
        };
        match func.as_ref() {
            Expr::Name(name) => {
                entity.uses.insert(name.clone());
                if is_constructor && !self_attrs.is_empty() {
                    entity.composition.insert(name.clone());
                }
            }
            // module.Book(...) -> Book; self.make(...) 是自身方法, 不记录
            Expr::Attribute { value, attr } => match value.as_name() {
                Some(object) if Some(object) != receiver => {
                    entity.uses.insert(attr.clone());
                }
                _ => {}
            },
            _ => {}
        }
    }
}

/// `self.<name>` 形式的赋值目标
fn self_attribute<'e>(target: &'e Expr, receiver: Option<&str>) -> Option<&'e str> {
    match target {
        Expr::Attribute { value, attr }
            if value.as_name().is_some() && value.as_name() == receiver =>
        {
            Some(attr.as_str())
        }
        _ => None,
    }
}

/// 方法调用接收者的根对象名
///
/// `a.b.c()` -> `a`; 以 self 为根时取其后第一个属性: `self.repo.save()` -> `repo`;
/// `self.helper()` 没有根对象.
fn root_object<'e>(receiver_expr: &'e Expr, receiver: Option<&str>) -> Option<&'e str> {
    let mut current = receiver_expr;
    let mut next_to_root = None;
    loop {
        match current {
            Expr::Attribute { value, attr } => {
                next_to_root = Some(attr.as_str());
                current = value.as_ref();
            }
            Expr::Name(name) => {
                return if Some(name.as_str()) == receiver {
                    next_to_root
                } else {
                    Some(name.as_str())
                };
            }
            Expr::Call { .. } | Expr::Other => return None,
        }
    }
}
