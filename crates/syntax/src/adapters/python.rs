use super::SourceParser;
use crate::types::{Assign, ClassDef, Expr, FunctionDef, Module, ParseError, Result, Stmt};
use std::cell::Cell;
use tree_sitter::{Node, Parser};

/// 语句与表达式的最大嵌套层数, 与 CPython 的括号嵌套上限一致
const MAX_NESTING: usize = 200;

/// 复合语句的子句, 其中的块按源码顺序展开
const CLAUSE_KINDS: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "case_clause",
];

/// Python 解析器 (tree-sitter-python)
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }
}

impl SourceParser for PythonParser {
    fn language(&self) -> &'static str {
        "python"
    }

    fn parse(&mut self, source: &str) -> Result<Module> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        // tree-sitter 会容错, 这里把任何 ERROR / MISSING 节点视为整个文件无法解析
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            tracing::debug!("Python syntax error at line {}", line);
            return Err(ParseError::Syntax { line });
        }

        let lowering = Lowering::new(source.as_bytes());
        let body = lowering.statements(root);
        if let Some(line) = lowering.rejected.get() {
            tracing::debug!("Python syntax rejected at line {}", line);
            return Err(ParseError::Syntax { line });
        }
        Ok(Module { body })
    }
}

fn first_error_line(node: Node) -> Option<u32> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(node));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// CST -> 语法树
///
/// 嵌套过深或出现 Python 2 专有语句时记录首个出错行, 整个文件按语法错误处理.
struct Lowering<'a> {
    source: &'a [u8],
    depth: Cell<usize>,
    rejected: Cell<Option<u32>>,
}

impl<'a> Lowering<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            depth: Cell::new(0),
            rejected: Cell::new(None),
        }
    }

    fn reject(&self, node: Node) {
        if self.rejected.get().is_none() {
            self.rejected.set(Some(line_of(node)));
        }
    }

    /// 进入一层嵌套; 超过上限时返回 `fallback`
    fn descend<T>(&self, node: Node, fallback: T, lower: impl FnOnce() -> T) -> T {
        let depth = self.depth.get();
        if depth >= MAX_NESTING {
            self.reject(node);
            return fallback;
        }
        self.depth.set(depth + 1);
        let lowered = lower();
        self.depth.set(depth);
        lowered
    }

    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    /// 块 (或模块) 的直接语句
    fn statements(&self, node: Node) -> Vec<Stmt> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .map(|child| self.statement(child))
            .collect()
    }

    fn statement(&self, node: Node) -> Stmt {
        self.descend(node, Stmt::Other, || self.lower_statement(node))
    }

    fn lower_statement(&self, node: Node) -> Stmt {
        match node.kind() {
            "class_definition" => self.class_def(node).map_or(Stmt::Other, Stmt::ClassDef),
            "function_definition" => self
                .function_def(node)
                .map_or(Stmt::Other, Stmt::FunctionDef),
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(definition) => self.statement(definition),
                None => Stmt::Other,
            },
            "import_statement" => Stmt::Import(self.import_names(node)),
            "import_from_statement" => Stmt::ImportFrom(self.from_module(node)),
            "future_import_statement" => Stmt::ImportFrom(Some("__future__".to_string())),
            "expression_statement" => self.expression_statement(node),
            "if_statement" | "for_statement" | "while_statement" | "try_statement"
            | "with_statement" | "match_statement" => Stmt::Nested(self.nested(node)),
            kind if CLAUSE_KINDS.contains(&kind) => Stmt::Nested(self.nested(node)),
            // Python 2: `print "x"`, `exec "code"`
            "print_statement" | "exec_statement" => {
                self.reject(node);
                Stmt::Other
            }
            _ => Stmt::Other,
        }
    }

    /// 复合语句所有子块中的语句
    fn nested(&self, node: Node) -> Vec<Stmt> {
        let mut body = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "block" => body.extend(self.statements(child)),
                kind if CLAUSE_KINDS.contains(&kind) => body.extend(self.nested(child)),
                _ => {}
            }
        }
        body
    }

    fn class_def(&self, node: Node) -> Option<ClassDef> {
        let name = self.text(node.child_by_field_name("name")?);

        let bases = match node.child_by_field_name("superclasses") {
            Some(args) => {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .filter(|arg| arg.kind() != "comment")
                    .map(|arg| self.expr(arg))
                    .collect()
            }
            None => Vec::new(),
        };

        let body = node
            .child_by_field_name("body")
            .map(|block| self.statements(block))
            .unwrap_or_default();

        Some(ClassDef {
            name,
            line: line_of(node),
            bases,
            body,
        })
    }

    fn function_def(&self, node: Node) -> Option<FunctionDef> {
        let name = self.text(node.child_by_field_name("name")?);

        let params = match node.child_by_field_name("parameters") {
            Some(params) => self.params(params),
            None => Vec::new(),
        };

        let body = node
            .child_by_field_name("body")
            .map(|block| self.statements(block))
            .unwrap_or_default();

        Some(FunctionDef {
            name,
            line: line_of(node),
            params,
            body,
        })
    }

    fn params(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|param| param.kind() != "comment")
            .map(|param| match param.kind() {
                "identifier" => self.text(param),
                // `self: "Foo"`
                "typed_parameter" => match param.named_child(0) {
                    Some(inner) if inner.kind() == "identifier" => self.text(inner),
                    _ => self.text(param),
                },
                "default_parameter" | "typed_default_parameter" => {
                    match param.child_by_field_name("name") {
                        Some(inner) if inner.kind() == "identifier" => self.text(inner),
                        _ => self.text(param),
                    }
                }
                _ => self.text(param),
            })
            .collect()
    }

    fn import_names(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .filter_map(|name| match name.kind() {
                "dotted_name" => Some(self.text(name)),
                "aliased_import" => name.child_by_field_name("name").map(|n| self.text(n)),
                _ => None,
            })
            .collect()
    }

    /// `from .m import x` 的模块名不含前导点, `from . import x` 没有模块名
    fn from_module(&self, node: Node) -> Option<String> {
        let module = node.child_by_field_name("module_name")?;
        match module.kind() {
            "dotted_name" => Some(self.text(module)),
            "relative_import" => {
                let mut cursor = module.walk();
                let dotted = module
                    .named_children(&mut cursor)
                    .find(|child| child.kind() == "dotted_name");
                dotted.map(|d| self.text(d))
            }
            _ => None,
        }
    }

    fn expression_statement(&self, node: Node) -> Stmt {
        // `a, b` 这样的裸元组会有多个子节点
        if node.named_child_count() != 1 {
            return Stmt::Expr(Expr::Other);
        }
        let Some(child) = node.named_child(0) else {
            return Stmt::Other;
        };
        match child.kind() {
            "assignment" => self.assignment(child),
            "augmented_assignment" => Stmt::Other,
            _ => Stmt::Expr(self.expr(child)),
        }
    }

    /// 链式赋值展开; 只有注解没有值 (`x: int`) 时 value 为 `Expr::Other`
    fn assignment(&self, node: Node) -> Stmt {
        let line = line_of(node);
        let mut targets = Vec::new();
        let mut current = node;
        loop {
            if let Some(left) = current.child_by_field_name("left") {
                targets.push(self.expr(left));
            }
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                Some(right) => {
                    return Stmt::Assign(Assign {
                        line,
                        targets,
                        value: self.expr(right),
                    });
                }
                None => {
                    return Stmt::Assign(Assign {
                        line,
                        targets,
                        value: Expr::Other,
                    });
                }
            }
        }
    }

    fn expr(&self, node: Node) -> Expr {
        self.descend(node, Expr::Other, || self.lower_expr(node))
    }

    fn lower_expr(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node)),
            "attribute" => {
                match (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("attribute"),
                ) {
                    (Some(object), Some(attr)) => Expr::Attribute {
                        value: Box::new(self.expr(object)),
                        attr: self.text(attr),
                    },
                    _ => Expr::Other,
                }
            }
            "call" => match node.child_by_field_name("function") {
                Some(func) => Expr::Call {
                    func: Box::new(self.expr(func)),
                },
                None => Expr::Other,
            },
            "parenthesized_expression" => match node.named_child(0) {
                Some(inner) if node.named_child_count() == 1 => self.expr(inner),
                _ => Expr::Other,
            },
            _ => Expr::Other,
        }
    }
}
