//! The C translator.
//!
//! Expression trees are flattened into straight-line C by an explicit
//! evaluation stack: translating an expression emits the statements that
//! compute it and pushes exactly one [`ValueSlot`] describing where the
//! value lives, either a numbered temporary or a named local. Statements
//! pop the slots they consume, and popping a string temporary emits its
//! `zrt_str_del` in program order, right after last use.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zeebc_par::{Expr, ExprKind, Program, Stmt, Symbol, SymbolId};
use zeebc_sem::{BaseType, BinaryOp, Type, UnaryOp};

use crate::error::EmitError;

/// One entry on the emitter's evaluation stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSlot {
    /// An emitted temporary `t_<id>`.
    Temporary { ty: Type, id: i32 },
    /// A named local variable.
    Local { symbol: SymbolId },
}

/// Emit the C translation unit for `program`.
///
/// The output is deterministic: emitting the same program twice yields
/// byte-identical text.
pub fn emit(program: &Program<'_>) -> String {
    CEmitter::new(program).run()
}

/// Emit `program` into the file at `path`, truncating any existing file.
pub fn emit_to_path(program: &Program<'_>, path: &Path) -> Result<(), EmitError> {
    let text = emit(program);

    let mut file = File::create(path).map_err(|source| EmitError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(text.as_bytes())
        .map_err(|source| EmitError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    file.flush().map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Walks a program and writes the C text.
pub struct CEmitter<'p, 'src> {
    program: &'p Program<'src>,
    out: String,
    indent: usize,
    /// The evaluation stack, mirroring expression evaluation order.
    slots: Vec<ValueSlot>,
    /// Temporaries are numbered from 1 per compile.
    next_temp_id: i32,
}

impl<'p, 'src> CEmitter<'p, 'src> {
    pub fn new(program: &'p Program<'src>) -> Self {
        Self {
            program,
            out: String::new(),
            indent: 0,
            slots: Vec::new(),
            next_temp_id: 1,
        }
    }

    /// Produce the whole translation unit.
    pub fn run(mut self) -> String {
        let program = self.program;

        self.raw("#include <ZeeBasic/Runtime/ZeeRuntime.h>");
        self.raw("");
        self.raw("void program(void)");
        self.raw("{");
        self.indent = 1;

        // locals first, in first-mention order
        for (_, symbol) in program.symbols.iter() {
            let decl = declaration(symbol);
            self.line(&decl);
        }

        for stmt in &program.statements {
            self.emit_stmt(stmt);
        }

        // string locals go away in reverse declaration order
        for (_, symbol) in program.symbols.iter().rev() {
            if symbol.ty.base == BaseType::String {
                let name = local_name(symbol);
                self.line(&format!("zrt_str_del({name});"));
            }
        }

        self.indent = 0;
        self.raw("}");
        self.raw("");
        self.raw("int main(int argc, char* argv[])");
        self.raw("{");
        self.raw("    zrt_init(argc, argv);");
        self.raw("    program();");
        self.raw("    return 0;");
        self.raw("}");

        debug_assert!(self.slots.is_empty(), "value stack not drained");
        self.out
    }

    fn emit_stmt(&mut self, stmt: &Stmt<'src>) {
        match stmt {
            Stmt::Assignment { symbol, expr, .. } => {
                self.emit_expr(expr);
                let value = self.pop();
                let value_name = self.slot_name(&value);

                let symbol = self.program.symbols.get(*symbol);
                let target = local_name(symbol);
                if symbol.ty.base == BaseType::String {
                    self.line(&format!("zrt_str_copy({target}, {value_name});"));
                } else {
                    self.line(&format!("{target} = {value_name};"));
                }

                self.destroy(value);
            }

            Stmt::Print { expr: Some(expr), .. } => {
                self.emit_expr(expr);
                let value = self.pop();
                let name = self.slot_name(&value);
                let suffix = match self.slot_type(&value).base {
                    BaseType::Boolean => "bool",
                    BaseType::Integer => "int",
                    BaseType::Real => "real",
                    BaseType::String => "str",
                    BaseType::Unknown => unreachable!("printed value must be typed"),
                };
                self.line(&format!("zrt_println_{suffix}({name});"));
                self.destroy(value);
            }

            Stmt::Print { expr: None, .. } => {
                self.line("zrt_println();");
            }
        }
    }

    /// Translate one expression; pushes exactly one slot.
    fn emit_expr(&mut self, expr: &Expr<'src>) {
        match &expr.kind {
            ExprKind::IntegerLiteral(value) => {
                let id = self.make_temp(expr.ty);
                self.line(&format!("zrt_Int t_{id} = {value};"));
            }

            ExprKind::BooleanLiteral(value) => {
                let id = self.make_temp(expr.ty);
                let value = if *value { 1 } else { 0 };
                self.line(&format!("zrt_Bool t_{id} = {value};"));
            }

            // the literal text passes through untouched
            ExprKind::RealLiteral(text) => {
                let id = self.make_temp(expr.ty);
                self.line(&format!("zrt_Real t_{id} = {text};"));
            }

            // no escaping: the lexer rejects newlines and the grammar has
            // no escape sequences, so the raw text is a valid C literal
            ExprKind::StringLiteral(text) => {
                let id = self.make_temp(expr.ty);
                self.line(&format!("zrt_String* t_{id} = zrt_str_new(\"{text}\");"));
            }

            ExprKind::Identifier(symbol) => {
                self.slots.push(ValueSlot::Local { symbol: *symbol });
            }

            ExprKind::Cast { to, operand } => {
                self.emit_expr(operand);
                let value = self.pop();
                let name = self.slot_name(&value);
                let from = self.slot_type(&value).base;

                let id = self.make_temp(expr.ty);
                let line = match (from, *to) {
                    (BaseType::Boolean, BaseType::Integer) => {
                        format!("zrt_Int t_{id} = {name} == 0 ? 0 : 1;")
                    }
                    (BaseType::Real, BaseType::Integer) => {
                        format!("zrt_Int t_{id} = (zrt_Int){name};")
                    }
                    (BaseType::Integer, BaseType::Real) => {
                        format!("zrt_Real t_{id} = (zrt_Real){name};")
                    }
                    _ => unreachable!("no implicit cast from {from:?} to {to:?}"),
                };
                self.line(&line);
                self.destroy(value);
            }

            ExprKind::Unary { op, operand } => {
                self.emit_expr(operand);
                let value = self.pop();
                let name = self.slot_name(&value);
                let ty = self.slot_type(&value);

                let id = self.make_temp(ty);
                let computed = match (op, ty.base) {
                    (UnaryOp::Negate, _) => format!("-{name}"),
                    (UnaryOp::BitwiseNot, BaseType::Boolean) => format!("!{name}"),
                    (UnaryOp::BitwiseNot, BaseType::Integer) => format!("~{name}"),
                    _ => unreachable!("unary {op:?} on {ty}"),
                };
                self.line(&format!("{} t_{id} = {computed};", c_type(ty.base)));
                self.destroy(value);
            }

            ExprKind::Binary { op, lhs, rhs } => {
                self.emit_expr(lhs);
                self.emit_expr(rhs);

                // operands come back off the stack right-to-left
                let rhs_slot = self.pop();
                let lhs_slot = self.pop();
                let l = self.slot_name(&lhs_slot);
                let r = self.slot_name(&rhs_slot);
                let operand = self.slot_type(&lhs_slot);

                let id = self.make_temp(expr.ty);
                let line = match op {
                    BinaryOp::Divide => {
                        format!("zrt_Real t_{id} = (zrt_Real){l} / (zrt_Real){r};")
                    }
                    BinaryOp::IntDivide => {
                        format!("zrt_Int t_{id} = (zrt_Int)({l} / {r});")
                    }
                    BinaryOp::Add if operand.base == BaseType::String => {
                        format!("zrt_String* t_{id} = zrt_str_concat({l}, {r});")
                    }
                    // C's % is integral; BASIC's MOD on reals rounds
                    // through the integer domain
                    BinaryOp::Modulus if operand.base == BaseType::Real => {
                        format!("zrt_Real t_{id} = (zrt_Real)((zrt_Int){l} % (zrt_Int){r});")
                    }
                    _ => {
                        let c_op = c_operator(*op, operand.base);
                        format!("{} t_{id} = {l} {c_op} {r};", c_type(expr.ty.base))
                    }
                };
                self.line(&line);

                self.destroy(rhs_slot);
                self.destroy(lhs_slot);
            }

            ExprKind::FunctionCall { args, .. } => {
                // STR$ is the only built-in; semantics fixed its arity
                self.emit_expr(&args[0]);
                let value = self.pop();
                let name = self.slot_name(&value);

                let id = self.make_temp(expr.ty);
                self.line(&format!("zrt_String* t_{id} = zrt_str_new_from_int({name});"));
                self.destroy(value);
            }
        }
    }

    /// Allocate the next temporary and push its slot.
    fn make_temp(&mut self, ty: Type) -> i32 {
        let id = self.next_temp_id;
        self.next_temp_id += 1;
        self.slots.push(ValueSlot::Temporary { ty, id });
        id
    }

    fn pop(&mut self) -> ValueSlot {
        self.slots.pop().expect("evaluation stack underflow")
    }

    /// Release a consumed slot. Only string temporaries own heap memory;
    /// string locals are released in bulk at the end of `program()`.
    fn destroy(&mut self, slot: ValueSlot) {
        if let ValueSlot::Temporary { ty, id } = slot {
            if ty.base == BaseType::String {
                self.line(&format!("zrt_str_del(t_{id});"));
            }
        }
    }

    fn slot_type(&self, slot: &ValueSlot) -> Type {
        match slot {
            ValueSlot::Temporary { ty, .. } => *ty,
            ValueSlot::Local { symbol } => self.program.symbols.get(*symbol).ty,
        }
    }

    fn slot_name(&self, slot: &ValueSlot) -> String {
        match slot {
            ValueSlot::Temporary { id, .. } => format!("t_{id}"),
            ValueSlot::Local { symbol } => local_name(self.program.symbols.get(*symbol)),
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }
}

/// The C spelling of a local: the sigil becomes a type suffix so `x$`,
/// `x?`, `x!` and `x%` stay distinct. The alphabetic part keeps the
/// spelling of the symbol's first mention.
fn local_name(symbol: &Symbol<'_>) -> String {
    let text = symbol.name.as_str();
    match text.as_bytes().last() {
        Some(b'$') => format!("v_{}_s", &text[..text.len() - 1]),
        Some(b'?') => format!("v_{}_b", &text[..text.len() - 1]),
        Some(b'!') => format!("v_{}_r", &text[..text.len() - 1]),
        Some(b'%') => format!("v_{}_i", &text[..text.len() - 1]),
        _ => format!("v_{text}"),
    }
}

/// Declaration with the type's zero value.
fn declaration(symbol: &Symbol<'_>) -> String {
    let name = local_name(symbol);
    match symbol.ty.base {
        BaseType::Boolean => format!("zrt_Bool {name} = 0;"),
        BaseType::Integer => format!("zrt_Int {name} = 0;"),
        BaseType::Real => format!("zrt_Real {name} = 0.0;"),
        BaseType::String => format!("zrt_String* {name} = zrt_str_empty();"),
        BaseType::Unknown => unreachable!("declared symbol must be typed"),
    }
}

fn c_type(base: BaseType) -> &'static str {
    match base {
        BaseType::Boolean => "zrt_Bool",
        BaseType::Integer => "zrt_Int",
        BaseType::Real => "zrt_Real",
        BaseType::String => "zrt_String*",
        BaseType::Unknown => unreachable!("emitted value must be typed"),
    }
}

/// Map an operator onto C. The bitwise family is logical on `zrt_Bool`
/// operands and bit-level on `zrt_Int`.
fn c_operator(op: BinaryOp, operand: BaseType) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Modulus => "%",
        BinaryOp::Equals => "==",
        BinaryOp::NotEquals => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEquals => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEquals => ">=",
        BinaryOp::BitwiseAnd => {
            if operand == BaseType::Boolean {
                "&&"
            } else {
                "&"
            }
        }
        BinaryOp::BitwiseOr => {
            if operand == BaseType::Boolean {
                "||"
            } else {
                "|"
            }
        }
        BinaryOp::BitwiseXor => "^",
        BinaryOp::Divide | BinaryOp::IntDivide => {
            unreachable!("division is emitted with explicit casts")
        }
    }
}
