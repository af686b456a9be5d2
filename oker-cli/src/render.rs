//! Text renderings of each pipeline stage.
//!
//! These are for people: the layout may change between versions and nothing
//! should parse it.

use oker_common::{Builtin, CompiledFunction, Instruction, Opcode, Program, Value};
use oker_syntax::ast::{self, Expr, ExprKind, Stmt, StmtKind};
use oker_syntax::{Token, TokenKind};
use std::fmt::Write;

/// One line per token: position, category, lexeme.
pub fn tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        let position = format!("{}:{}", tok.line, tok.column);
        let lexeme = match tok.kind {
            TokenKind::String => format!("{:?}", tok.lexeme),
            TokenKind::Eof => "<eof>".to_string(),
            _ => tok.lexeme.clone(),
        };
        let _ = writeln!(
            out,
            "{position:<7}  {:<11}  {lexeme}",
            tok.kind.category().name()
        );
    }
    out
}

/// Indented syntax tree, two spaces per level.
pub fn ast(program: &ast::Program) -> String {
    let mut printer = TreePrinter::default();
    printer.line(0, "Program");
    printer.block(1, &program.statements);
    printer.out
}

#[derive(Default)]
struct TreePrinter {
    out: String,
}

impl TreePrinter {
    fn line(&mut self, depth: usize, text: &str) {
        let _ = writeln!(self.out, "{:width$}{text}", "", width = depth * 2);
    }

    fn block(&mut self, depth: usize, statements: &[Stmt]) {
        for stmt in statements {
            self.stmt(depth, stmt);
        }
    }

    fn stmt(&mut self, depth: usize, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                self.line(depth, &format!("Let {name}"));
                self.expr(depth + 1, value);
            }
            StmtKind::Say { value } => {
                self.line(depth, "Say");
                self.expr(depth + 1, value);
            }
            StmtKind::Function(decl) => {
                self.line(depth, &format!("Function {}", decl.name));
                self.line(depth + 1, &format!("Params: {}", decl.params.join(", ")));
                self.line(depth + 1, "Body:");
                self.block(depth + 2, &decl.body);
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.line(depth, "If");
                self.expr(depth + 1, condition);
                self.line(depth + 1, "Then:");
                self.block(depth + 2, then_branch);
                if let Some(else_branch) = else_branch {
                    self.line(depth + 1, "Else:");
                    self.block(depth + 2, else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.line(depth, "While");
                self.expr(depth + 1, condition);
                self.line(depth + 1, "Body:");
                self.block(depth + 2, body);
            }
            StmtKind::Return { value } => {
                self.line(depth, "Return");
                if let Some(value) = value {
                    self.expr(depth + 1, value);
                }
            }
            StmtKind::Expr(expr) => {
                self.line(depth, "ExprStmt");
                self.expr(depth + 1, expr);
            }
        }
    }

    fn expr(&mut self, depth: usize, expr: &Expr) {
        match &expr.kind {
            ExprKind::Number(n) => {
                self.line(depth, &format!("Number {}", oker_common::format_number(*n)))
            }
            ExprKind::Str(s) => self.line(depth, &format!("String {s:?}")),
            ExprKind::Bool(b) => self.line(depth, &format!("Bool {b}")),
            ExprKind::Nil => self.line(depth, "Nil"),
            ExprKind::Identifier(name) => self.line(depth, &format!("Identifier {name}")),
            ExprKind::Binary { op, left, right } => {
                self.line(depth, &format!("Binary {op}"));
                self.expr(depth + 1, left);
                self.expr(depth + 1, right);
            }
            ExprKind::Unary { op, operand } => {
                self.line(depth, &format!("Unary {op}"));
                self.expr(depth + 1, operand);
            }
            ExprKind::Call { callee, args } => {
                self.line(depth, &format!("Call {callee}"));
                if !args.is_empty() {
                    self.line(depth + 1, "Args:");
                    for arg in args {
                        self.expr(depth + 2, arg);
                    }
                }
            }
        }
    }
}

/// Constant pool, then every function body with `<main>` first.
pub fn bytecode(program: &Program) -> String {
    let mut out = String::new();

    out.push_str("constants:\n");
    for (i, value) in program.constants.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{i:<4} {:<8} {}",
            value.type_tag().name(),
            literal(value)
        );
    }

    for function in std::iter::once(&program.main).chain(&program.functions) {
        out.push('\n');
        function_section(&mut out, program, function);
    }
    out
}

fn function_section(out: &mut String, program: &Program, function: &CompiledFunction) {
    let _ = writeln!(
        out,
        "fn {} (arity {}, locals {})",
        function.name, function.arity, function.local_count
    );
    for (offset, instr) in function.code.iter().enumerate() {
        let text = instr.to_string();
        match comment(program, function, instr) {
            Some(note) => {
                let _ = writeln!(out, "  {offset:>4}  L{:<4} {text:<22} ; {note}", instr.line);
            }
            None => {
                let _ = writeln!(out, "  {offset:>4}  L{:<4} {text}", instr.line);
            }
        }
    }
}

/// What an operand refers to, when it refers to something by index.
fn comment(program: &Program, function: &CompiledFunction, instr: &Instruction) -> Option<String> {
    match instr.opcode {
        Opcode::Const => program.constant(instr.arg1).map(literal),
        Opcode::LoadLocal | Opcode::StoreLocal => {
            function.local_names.get(usize::from(instr.arg1)).cloned()
        }
        Opcode::LoadFunction => program.function(instr.arg1).map(|f| f.name.clone()),
        Opcode::CallBuiltin => Builtin::from_id(instr.arg1).map(|b| b.name().to_string()),
        _ => None,
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("{:?}", &**s),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oker_syntax::{parse, tokenize};

    fn compile_src(source: &str) -> Program {
        oker_compiler::compile(&parse(&tokenize(source).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn token_listing() {
        let listing = tokens(&tokenize("say \"hi\"").unwrap());
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(
            lines,
            vec![
                "1:1      KEYWORD      say",
                "1:5      STRING       \"hi\"",
                "1:9      EOF          <eof>",
            ]
        );
    }

    #[test]
    fn ast_sections() {
        let src = "makef f(a, b):\n  if a < b:\n    return a\n  else:\n    return b\n  end\nend\nsay f(1, 2)";
        let tree = ast(&parse(&tokenize(src).unwrap()).unwrap());
        let expected = "\
Program
  Function f
    Params: a, b
    Body:
      If
        Binary <
          Identifier a
          Identifier b
        Then:
          Return
            Identifier a
        Else:
          Return
            Identifier b
  Say
    Call f
      Args:
        Number 1
        Number 2
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn ast_while_and_literals() {
        let tree = ast(&parse(&tokenize("while true:\n  say -\"x\"\nend\nnil").unwrap()).unwrap());
        assert!(tree.contains("  While\n    Bool true\n    Body:\n      Say\n        Unary -\n          String \"x\"\n"));
        assert!(tree.ends_with("  ExprStmt\n    Nil\n"));
    }

    #[test]
    fn bytecode_listing() {
        let listing = bytecode(&compile_src("let x = \"hi\"\nsay upper(x)"));
        assert!(listing.starts_with("constants:\n  #0    string   \"hi\"\n"));
        assert!(listing.contains("fn <main> (arity 0, locals 1)\n"));
        assert!(listing.contains("STORE_LOCAL 0"));
        assert!(listing.contains("; x"));
        assert!(listing.contains("CALL_BUILTIN 5 1"));
        assert!(listing.contains("; upper"));
        assert!(listing.trim_end().ends_with("RETURN"));
    }

    #[test]
    fn functions_follow_main() {
        let listing = bytecode(&compile_src("makef f(n): return n end\nsay f(1)"));
        let main_at = listing.find("fn <main>").unwrap();
        let f_at = listing.find("fn f (arity 1, locals 1)").unwrap();
        assert!(main_at < f_at);
        assert!(listing.contains("; f\n"));
    }
}
