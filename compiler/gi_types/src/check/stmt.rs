//! Statements.

use super::decl::repeated;
use super::{Checker, LocalKind, Mode, Operand};
use crate::error::CheckResult;
use crate::info::CallKind;
use crate::{Builtin, Signature, Type, TypeId};
use gi_ir::ast::{
    AssignOp, Block, BranchKind, CaseClause, ChanDir, CommClause, ExprId, ExprKind, Ident, Stmt,
    StmtKind, TypeCaseClause, UnaryOp,
};
use gi_ir::{ErrorCode, Span};

impl Checker<'_> {
    /// A statement typed at the prompt. A `:=` at this level declares
    /// top-level variables; everything else is checked as in a function.
    pub(super) fn top_level_stmt(&mut self, stmt: &Stmt) -> CheckResult<()> {
        match &stmt.kind {
            StmtKind::ShortVarDecl { names, values } => {
                self.global_short_var_decl(names, values, stmt.span)
            }
            StmtKind::Expr(expr) => self.expr_stmt(*expr, true),
            _ => self.stmt(stmt),
        }
    }

    pub(super) fn stmts(&mut self, stmts: &[Stmt]) -> CheckResult<()> {
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block) -> CheckResult<()> {
        self.push_scope();
        self.stmts(&block.stmts)?;
        self.pop_scope();
        Ok(())
    }

    pub(super) fn stmt(&mut self, stmt: &Stmt) -> CheckResult<()> {
        gi_stack::with_stack(|| self.stmt_inner(stmt))
    }

    fn stmt_inner(&mut self, stmt: &Stmt) -> CheckResult<()> {
        match &stmt.kind {
            StmtKind::Empty => Ok(()),
            StmtKind::Expr(expr) => self.expr_stmt(*expr, false),
            StmtKind::Send { chan, value } => self.send(*chan, *value),
            StmtKind::IncDec { target, inc } => {
                let x = self.expr(*target, None)?;
                self.check_assignable_target(*target, &x)?;
                if !x.ty.is_invalid() && !self.pool.is_numeric(x.ty) {
                    let op = if *inc { "++" } else { "--" };
                    return Err(self.error(
                        ErrorCode::E2010,
                        stmt.span,
                        format!(
                            "invalid operation: {}{op} (non-numeric type {})",
                            self.expr_str(*target),
                            self.type_str(x.ty)
                        ),
                    ));
                }
                Ok(())
            }
            StmtKind::Assign {
                lhs,
                op: AssignOp::Assign,
                rhs,
            } => self.assignment(lhs, rhs, stmt.span),
            StmtKind::Assign {
                lhs,
                op: AssignOp::Compound(op),
                rhs,
            } => {
                let (Some(target), Some(value)) = (lhs.first(), rhs.first()) else {
                    return Ok(());
                };
                let x = self.expr(*target, None)?;
                self.check_assignable_target(*target, &x)?;
                let y = self.value_expr(*value, None)?;
                let target_ty = x.ty;
                let mut result = self.binary_operands(*value, *op, (*target, x), (*value, y))?;
                self.assign_to(*value, &mut result, target_ty, "assignment")
            }
            StmtKind::ShortVarDecl { names, values } => {
                self.local_short_var_decl(names, values, stmt.span)
            }
            StmtKind::Decl(decl) => self.local_decl(decl, stmt.span),
            StmtKind::Block(block) => self.block(block),
            StmtKind::If {
                init,
                cond,
                then,
                els,
            } => {
                self.push_scope();
                if let Some(init) = init {
                    self.stmt(init)?;
                }
                self.condition(*cond, "if statement")?;
                self.block(then)?;
                if let Some(els) = els {
                    self.stmt(els)?;
                }
                self.pop_scope();
                Ok(())
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.push_scope();
                if let Some(init) = init {
                    self.stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.condition(*cond, "for loop")?;
                }
                if let Some(post) = post {
                    if matches!(post.kind, StmtKind::ShortVarDecl { .. }) {
                        return Err(self.error(
                            ErrorCode::E2009,
                            post.span,
                            "cannot declare in post statement of for loop",
                        ));
                    }
                    self.stmt(post)?;
                }
                self.loop_body(body)?;
                self.pop_scope();
                Ok(())
            }
            StmtKind::ForRange {
                key,
                value,
                define,
                expr,
                body,
            } => self.range(*key, *value, *define, *expr, body),
            StmtKind::Switch { init, tag, clauses } => {
                self.switch(init.as_deref(), *tag, clauses)
            }
            StmtKind::TypeSwitch {
                init,
                binding,
                subject,
                clauses,
            } => self.type_switch(init.as_deref(), binding.as_ref(), *subject, clauses),
            StmtKind::Select { clauses } => self.select(clauses),
            StmtKind::Go(call) => self.go_defer(*call, "go"),
            StmtKind::Defer(call) => self.go_defer(*call, "defer"),
            StmtKind::Return(values) => self.return_stmt(values, stmt.span),
            StmtKind::Branch { kind, label } => self.branch(*kind, label.as_ref(), stmt.span),
            StmtKind::Labeled { label, stmt } => {
                self.frame().labels.push(label.name);
                let result = self.stmt(stmt);
                self.frame().labels.pop();
                result
            }
        }
    }

    /// An expression statement. At the prompt (`shown`) any value is
    /// accepted since it gets printed.
    fn expr_stmt(&mut self, expr: ExprId, shown: bool) -> CheckResult<()> {
        let x = self.expr(expr, None)?;
        let inner = self.arena.unparen(expr);
        let used = match self.arena.kind(inner) {
            ExprKind::Call { .. } => match self.info.calls.get(&inner) {
                Some(CallKind::Conversion(_)) => false,
                Some(CallKind::Builtin(builtin)) => matches!(
                    builtin,
                    Builtin::Close
                        | Builtin::Copy
                        | Builtin::Delete
                        | Builtin::Panic
                        | Builtin::Print
                        | Builtin::Println
                        | Builtin::Recover
                ),
                _ => true,
            },
            ExprKind::Unary {
                op: UnaryOp::Recv, ..
            } => true,
            _ => false,
        };
        if used {
            return Ok(());
        }
        if !shown {
            self.require_value(expr, &x)?;
            return Err(self.error(
                ErrorCode::E2013,
                self.span(expr),
                format!("{} ({}) is not used", self.expr_str(expr), self.describe(&x)),
            ));
        }
        let mut x = x;
        self.single_value(expr, &x)?;
        if x.ty != TypeId::UNTYPED_NIL {
            self.default_operand(expr, &mut x, "expression")?;
        }
        Ok(())
    }

    fn send(&mut self, chan: ExprId, value: ExprId) -> CheckResult<()> {
        let c = self.value_expr(chan, None)?;
        match self.pool.underlying_type(c.ty).clone() {
            Type::Invalid => {
                self.value_expr(value, None)?;
                Ok(())
            }
            Type::Chan {
                dir: ChanDir::Recv, ..
            } => Err(self.error(
                ErrorCode::E2010,
                self.span(chan),
                format!(
                    "invalid operation: cannot send to receive-only channel {} ({})",
                    self.expr_str(chan),
                    self.describe(&c)
                ),
            )),
            Type::Chan { elem, .. } => {
                let mut v = self.value_expr(value, Some(elem))?;
                self.assign_to(value, &mut v, elem, "send")
            }
            _ => Err(self.error(
                ErrorCode::E2010,
                self.span(chan),
                format!(
                    "invalid operation: cannot send to non-channel {} ({})",
                    self.expr_str(chan),
                    self.describe(&c)
                ),
            )),
        }
    }

    fn condition(&mut self, cond: ExprId, what: &str) -> CheckResult<()> {
        let mut c = self.value_expr(cond, None)?;
        self.convert_untyped(cond, &mut c, TypeId::BOOL, what)?;
        if !c.ty.is_invalid() && !self.pool.is_boolean(c.ty) {
            return Err(self.error(
                ErrorCode::E2002,
                self.span(cond),
                format!(
                    "non-boolean condition in {what}: {} ({})",
                    self.expr_str(cond),
                    self.describe(&c)
                ),
            ));
        }
        Ok(())
    }

    fn loop_body(&mut self, body: &Block) -> CheckResult<()> {
        let frame = self.frame();
        frame.loops += 1;
        frame.breakable += 1;
        let result = self.block(body);
        let frame = self.frame();
        frame.loops -= 1;
        frame.breakable -= 1;
        result
    }

    fn breakable<T>(&mut self, f: impl FnOnce(&mut Self) -> CheckResult<T>) -> CheckResult<T> {
        self.frame().breakable += 1;
        let result = f(self);
        self.frame().breakable -= 1;
        result
    }

    // === Assignment ===

    fn check_assignable_target(&self, target: ExprId, x: &Operand) -> CheckResult<()> {
        if x.ty.is_invalid() || matches!(x.mode, Mode::Variable | Mode::MapIndex) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2010,
            self.span(target),
            format!(
                "cannot assign to {} (neither addressable nor a map index expression)",
                self.expr_str(target)
            ),
        ))
    }

    /// Type of an assignment target; `None` for `_`.
    fn lhs(&mut self, target: ExprId) -> CheckResult<Option<TypeId>> {
        if let ExprKind::Ident(name) = self.arena.kind(target) {
            if name.is_blank() {
                return Ok(None);
            }
        }
        let x = self.expr(target, None)?;
        self.check_assignable_target(target, &x)?;
        Ok(Some(x.ty))
    }

    fn assignment(&mut self, lhs: &[ExprId], rhs: &[ExprId], span: Span) -> CheckResult<()> {
        if lhs.len() == rhs.len() {
            for (target, value) in lhs.iter().zip(rhs) {
                let ty = self.lhs(*target)?;
                let mut x = self.value_expr(*value, ty)?;
                match ty {
                    Some(ty) => self.assign_to(*value, &mut x, ty, "assignment")?,
                    None if x.ty == TypeId::UNTYPED_NIL => {
                        return Err(self.error(
                            ErrorCode::E2002,
                            self.span(*value),
                            "use of untyped nil in assignment",
                        ))
                    }
                    None => self.default_operand(*value, &mut x, "assignment")?,
                }
            }
            return Ok(());
        }
        if rhs.len() == 1 {
            let mut targets = Vec::with_capacity(lhs.len());
            for target in lhs {
                targets.push(self.lhs(*target)?);
            }
            let types = self.multi_value(rhs[0], lhs.len())?;
            for (target, ty) in targets.into_iter().zip(types) {
                if let Some(target) = target {
                    if !self.assignable(ty, target) {
                        return Err(self.error(
                            ErrorCode::E2002,
                            self.span(rhs[0]),
                            format!(
                                "cannot use {} value as {} value in assignment",
                                self.type_str(ty),
                                self.type_str(target)
                            ),
                        ));
                    }
                }
            }
            return Ok(());
        }
        Err(self.assignment_mismatch(span, lhs.len(), rhs.len()))
    }

    /// Types of a single expression used for `n` values: a multi-result
    /// call, or the `v, ok` form of an index, assertion or receive.
    pub(super) fn multi_value(&mut self, value: ExprId, n: usize) -> CheckResult<Vec<TypeId>> {
        let x = self.expr(value, None)?;
        self.require_value(value, &x)?;
        if let Type::Tuple(elems) = self.pool.get(x.ty) {
            if elems.len() == n {
                return Ok(elems.clone());
            }
            let count = elems.len();
            return Err(self.error(
                ErrorCode::E2004,
                self.span(value),
                format!(
                    "assignment mismatch: {n} variables but {} returns {count} value{}",
                    self.expr_str(value),
                    if count == 1 { "" } else { "s" }
                ),
            ));
        }
        if n == 2 && matches!(x.mode, Mode::MapIndex | Mode::CommaOk) {
            let inner = self.arena.unparen(value);
            self.info.comma_ok.insert(inner);
            return Ok(vec![x.ty, TypeId::BOOL]);
        }
        Err(self.assignment_mismatch(self.span(value), n, 1))
    }

    /// A `:=` inside a block: at least one name must be new in the
    /// innermost scope; the others are assigned.
    pub(super) fn local_short_var_decl(
        &mut self,
        names: &[Ident],
        values: &[ExprId],
        span: Span,
    ) -> CheckResult<()> {
        if let Some(dup) = repeated(names) {
            return Err(self.error(
                ErrorCode::E2009,
                dup.span,
                format!("{} repeated on left side of :=", self.name_str(dup.name)),
            ));
        }
        let existing: Vec<_> = names
            .iter()
            .map(|n| {
                if n.name.is_blank() {
                    None
                } else {
                    self.in_current_scope(n.name)
                }
            })
            .collect();
        let any_new = names
            .iter()
            .zip(&existing)
            .any(|(n, e)| !n.name.is_blank() && e.is_none());
        if !any_new {
            return Err(self.error(
                ErrorCode::E2009,
                span,
                "no new variables on left side of :=",
            ));
        }

        let types = if names.len() == values.len() {
            let mut types = Vec::with_capacity(values.len());
            for (value, old) in values.iter().zip(&existing) {
                let old_ty = old.map(|id| self.local_var_type(id));
                let mut x = self.value_expr(*value, old_ty)?;
                match old_ty {
                    Some(ty) => self.assign_to(*value, &mut x, ty, "assignment")?,
                    None => self.default_operand(*value, &mut x, "assignment")?,
                }
                types.push(x.ty);
            }
            types
        } else if values.len() == 1 {
            let types = self.multi_value(values[0], names.len())?;
            for (ty, old) in types.iter().zip(&existing) {
                if let Some(id) = old {
                    let target = self.local_var_type(*id);
                    if !self.assignable(*ty, target) {
                        return Err(self.error(
                            ErrorCode::E2002,
                            self.span(values[0]),
                            format!(
                                "cannot use {} value as {} value in assignment",
                                self.type_str(*ty),
                                self.type_str(target)
                            ),
                        ));
                    }
                }
            }
            types
        } else {
            return Err(self.assignment_mismatch(span, names.len(), values.len()));
        };

        for ((name, ty), old) in names.iter().zip(types).zip(existing) {
            match old {
                Some(id) => {
                    self.info.reassigned.insert(name.span);
                    let ty = self.local_var_type(id);
                    self.info.defs.insert(name.span, ty);
                }
                None => {
                    self.declare_local(name, LocalKind::Var(ty));
                }
            }
        }
        Ok(())
    }

    // === Control flow ===

    fn range(
        &mut self,
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        expr: ExprId,
        body: &Block,
    ) -> CheckResult<()> {
        let mut x = self.value_expr(expr, None)?;
        if self.pool.is_untyped(x.ty) {
            self.default_operand(expr, &mut x, "range")?;
        }
        let (key_ty, value_ty) = match self.pool.underlying_type(x.ty).clone() {
            Type::Invalid => (TypeId::INVALID, Some(TypeId::INVALID)),
            Type::Basic(kind) if kind.is_string() => (TypeId::INT, Some(TypeId::RUNE)),
            Type::Basic(kind) if kind.is_integer() => (x.ty, None),
            Type::Slice(elem) | Type::Array { elem, .. } => (TypeId::INT, Some(elem)),
            Type::Pointer(inner) => match self.pool.underlying_type(inner).clone() {
                Type::Array { elem, .. } => (TypeId::INT, Some(elem)),
                _ => return Err(self.cannot_range(expr, &x)),
            },
            Type::Map { key, value } => (key, Some(value)),
            Type::Chan {
                dir: ChanDir::Send, ..
            } => {
                return Err(self.error(
                    ErrorCode::E2010,
                    self.span(expr),
                    format!(
                        "invalid operation: range {} receive from send-only channel",
                        self.expr_str(expr)
                    ),
                ))
            }
            Type::Chan { elem, .. } => (elem, None),
            _ => return Err(self.cannot_range(expr, &x)),
        };
        if value.is_some() && value_ty.is_none() {
            return Err(self.error(
                ErrorCode::E2004,
                self.span(expr),
                format!(
                    "range over {} permits only one iteration variable",
                    self.expr_str(expr)
                ),
            ));
        }

        self.push_scope();
        let vars = [(key, Some(key_ty)), (value, value_ty)];
        for (var, ty) in vars {
            let (Some(var), Some(ty)) = (var, ty) else {
                continue;
            };
            if define {
                let ExprKind::Ident(name) = self.arena.kind(var) else {
                    return Err(self.error(
                        ErrorCode::E2010,
                        self.span(var),
                        format!("non-name {} on left side of :=", self.expr_str(var)),
                    ));
                };
                let ident = Ident::new(*name, self.span(var));
                self.info.types.insert(var, ty);
                self.declare_local(&ident, LocalKind::Var(ty));
            } else if let Some(target) = self.lhs(var)? {
                if !self.assignable(ty, target) {
                    return Err(self.error(
                        ErrorCode::E2002,
                        self.span(var),
                        format!(
                            "cannot use {} (value of type {}) as {} value in range",
                            self.expr_str(var),
                            self.type_str(ty),
                            self.type_str(target)
                        ),
                    ));
                }
            }
        }
        self.loop_body(body)?;
        self.pop_scope();
        Ok(())
    }

    fn cannot_range(&self, expr: ExprId, x: &Operand) -> crate::TypeCheckError {
        self.error(
            ErrorCode::E2010,
            self.span(expr),
            format!(
                "cannot range over {} ({})",
                self.expr_str(expr),
                self.describe(x)
            ),
        )
    }

    fn switch(
        &mut self,
        init: Option<&Stmt>,
        tag: Option<ExprId>,
        clauses: &[CaseClause],
    ) -> CheckResult<()> {
        self.push_scope();
        if let Some(init) = init {
            self.stmt(init)?;
        }
        let tag_op = match tag {
            Some(tag) => {
                let mut x = self.value_expr(tag, None)?;
                self.default_operand(tag, &mut x, "switch expression")?;
                Some((tag, x))
            }
            None => None,
        };

        self.check_defaults(clauses.iter().map(|c| (c.is_default, c.span)))?;
        self.breakable(|c| {
            for (i, clause) in clauses.iter().enumerate() {
                for expr in &clause.exprs {
                    c.case_expr(*expr, tag_op.as_ref())?;
                }
                c.push_scope();
                let body = match clause.body.split_last() {
                    Some((last, rest)) if is_fallthrough(last) => {
                        if i + 1 == clauses.len() {
                            return Err(c.error(
                                ErrorCode::E2011,
                                last.span,
                                "cannot fallthrough final case in switch",
                            ));
                        }
                        rest
                    }
                    _ => &clause.body[..],
                };
                c.stmts(body)?;
                c.pop_scope();
            }
            Ok(())
        })?;
        self.pop_scope();
        Ok(())
    }

    fn case_expr(&mut self, expr: ExprId, tag: Option<&(ExprId, Operand)>) -> CheckResult<()> {
        let mut x = self.value_expr(expr, None)?;
        let Some((tag_id, tag)) = tag else {
            self.convert_untyped(expr, &mut x, TypeId::BOOL, "switch case")?;
            if !x.ty.is_invalid() && !self.pool.is_boolean(x.ty) {
                return Err(self.error(
                    ErrorCode::E2002,
                    self.span(expr),
                    format!(
                        "invalid case {} in switch (mismatched types {} and bool)",
                        self.expr_str(expr),
                        self.type_str(x.ty)
                    ),
                ));
            }
            return Ok(());
        };
        self.convert_untyped(expr, &mut x, tag.ty, "switch case")?;
        if !self.assignable(x.ty, tag.ty) && !self.assignable(tag.ty, x.ty) {
            return Err(self.error(
                ErrorCode::E2002,
                self.span(expr),
                format!(
                    "invalid case {} in switch on {} (mismatched types {} and {})",
                    self.expr_str(expr),
                    self.expr_str(*tag_id),
                    self.type_str(x.ty),
                    self.type_str(tag.ty)
                ),
            ));
        }
        Ok(())
    }

    fn check_defaults(&self, clauses: impl Iterator<Item = (bool, Span)>) -> CheckResult<()> {
        let mut seen = false;
        for (is_default, span) in clauses {
            if is_default {
                if seen {
                    return Err(self.error(ErrorCode::E2011, span, "multiple defaults in switch"));
                }
                seen = true;
            }
        }
        Ok(())
    }

    fn type_switch(
        &mut self,
        init: Option<&Stmt>,
        binding: Option<&Ident>,
        subject: ExprId,
        clauses: &[TypeCaseClause],
    ) -> CheckResult<()> {
        self.push_scope();
        if let Some(init) = init {
            self.stmt(init)?;
        }
        let x = self.value_expr(subject, None)?;
        if !x.ty.is_invalid() && !self.pool.is_interface(x.ty) {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(subject),
                format!(
                    "{} ({}) is not an interface",
                    self.expr_str(subject),
                    self.describe(&x)
                ),
            ));
        }
        self.check_defaults(clauses.iter().map(|c| (c.is_default, c.span)))?;
        self.breakable(|c| {
            for clause in clauses {
                let mut single = None;
                for texpr in &clause.types {
                    match texpr {
                        Some(texpr) => {
                            let ty = c.resolve_type(texpr)?;
                            c.check_dynamic_type(subject, x.ty, ty, texpr.span, "type switch case")?;
                            single = Some(ty);
                        }
                        None => single = Some(x.ty),
                    }
                }
                let bound = match (clause.types.len(), single) {
                    (1, Some(ty)) => ty,
                    _ => x.ty,
                };
                c.push_scope();
                if let Some(binding) = binding {
                    c.declare_local(binding, LocalKind::Var(bound));
                }
                c.stmts(&clause.body)?;
                c.pop_scope();
            }
            Ok(())
        })?;
        self.pop_scope();
        Ok(())
    }

    fn select(&mut self, clauses: &[CommClause]) -> CheckResult<()> {
        self.check_defaults(clauses.iter().map(|c| (c.comm.is_none(), c.span)))?;
        self.breakable(|c| {
            for clause in clauses {
                c.push_scope();
                if let Some(comm) = &clause.comm {
                    c.comm_clause(comm)?;
                }
                c.stmts(&clause.body)?;
                c.pop_scope();
            }
            Ok(())
        })
    }

    fn comm_clause(&mut self, comm: &Stmt) -> CheckResult<()> {
        let is_recv = |c: &Self, id: ExprId| {
            matches!(
                c.arena.kind(c.arena.unparen(id)),
                ExprKind::Unary {
                    op: UnaryOp::Recv,
                    ..
                }
            )
        };
        let valid = match &comm.kind {
            StmtKind::Send { .. } => true,
            StmtKind::Expr(e) => is_recv(self, *e),
            StmtKind::ShortVarDecl { values, .. }
            | StmtKind::Assign {
                op: AssignOp::Assign,
                rhs: values,
                ..
            } => values.len() == 1 && is_recv(self, values[0]),
            _ => false,
        };
        if !valid {
            return Err(self.error(
                ErrorCode::E2010,
                comm.span,
                "select case must be receive, send or assign recv",
            ));
        }
        self.stmt(comm)
    }

    fn go_defer(&mut self, call: ExprId, what: &str) -> CheckResult<()> {
        let inner = self.arena.unparen(call);
        if !matches!(self.arena.kind(inner), ExprKind::Call { .. }) {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(call),
                format!("expression in {what} must be function call"),
            ));
        }
        self.expr(call, None)?;
        if let Some(CallKind::Conversion(_)) = self.info.calls.get(&inner) {
            return Err(self.error(
                ErrorCode::E2010,
                self.span(call),
                format!("{what} requires function call, not conversion"),
            ));
        }
        Ok(())
    }

    fn return_stmt(&mut self, values: &[ExprId], span: Span) -> CheckResult<()> {
        let Some(frame) = self.frames.last() else {
            return Ok(());
        };
        let Some(results) = frame.results.clone() else {
            return Err(self.error(
                ErrorCode::E2011,
                span,
                "return statement outside function",
            ));
        };
        let named = frame.named_results;

        if values.is_empty() {
            if results.is_empty() || named {
                return Ok(());
            }
            return Err(self.error(ErrorCode::E2017, span, "not enough return values"));
        }

        if let ([value], true) = (values, results.len() > 1) {
            let x = self.expr(*value, None)?;
            self.require_value(*value, &x)?;
            if let Type::Tuple(elems) = self.pool.get(x.ty).clone() {
                if elems.len() != results.len() {
                    return Err(self.return_count(span, elems.len(), results.len()));
                }
                for (have, want) in elems.iter().zip(&results) {
                    if !self.assignable(*have, *want) {
                        return Err(self.error(
                            ErrorCode::E2002,
                            self.span(*value),
                            format!(
                                "cannot use {} value as {} value in return statement",
                                self.type_str(*have),
                                self.type_str(*want)
                            ),
                        ));
                    }
                }
                return Ok(());
            }
            return Err(self.return_count(span, 1, results.len()));
        }

        if values.len() != results.len() {
            return Err(self.return_count(span, values.len(), results.len()));
        }
        for (value, want) in values.iter().zip(&results) {
            let mut x = self.value_expr(*value, Some(*want))?;
            self.assign_to(*value, &mut x, *want, "return statement")?;
        }
        Ok(())
    }

    fn return_count(&self, span: Span, have: usize, want: usize) -> crate::TypeCheckError {
        let which = if have < want { "not enough" } else { "too many" };
        self.error(ErrorCode::E2017, span, format!("{which} return values"))
    }

    fn branch(&mut self, kind: BranchKind, label: Option<&Ident>, span: Span) -> CheckResult<()> {
        let frame = self.frame();
        let (loops, breakable) = (frame.loops, frame.breakable);
        let known = label.map(|l| frame.labels.contains(&l.name));
        match (kind, known) {
            (BranchKind::Fallthrough, _) => Err(self.error(
                ErrorCode::E2011,
                span,
                "fallthrough statement out of place",
            )),
            (BranchKind::Goto, _) => Ok(()),
            (BranchKind::Break | BranchKind::Continue, Some(false)) => {
                let label = label.map_or("", |l| self.name_str(l.name));
                let what = if kind == BranchKind::Break {
                    "break"
                } else {
                    "continue"
                };
                Err(self.error(
                    ErrorCode::E2011,
                    span,
                    format!("invalid {what} label {label}"),
                ))
            }
            (BranchKind::Break, None) if breakable == 0 => Err(self.error(
                ErrorCode::E2011,
                span,
                "break is not in a loop, switch, or select",
            )),
            (BranchKind::Continue, _) if loops == 0 => Err(self.error(
                ErrorCode::E2011,
                span,
                "continue is not in a loop",
            )),
            _ => Ok(()),
        }
    }

    // === Terminating statements ===

    pub(super) fn check_missing_return(&self, sig: &Signature, body: &Block) -> CheckResult<()> {
        if sig.results.is_empty() {
            return Ok(());
        }
        if body.stmts.last().is_some_and(|s| self.is_terminating(s, None)) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2017,
            Span::point(body.span.end.saturating_sub(1)),
            "missing return",
        ))
    }

    fn is_terminating(&self, stmt: &Stmt, label: Option<gi_ir::Name>) -> bool {
        match &stmt.kind {
            StmtKind::Return(_)
            | StmtKind::Branch {
                kind: BranchKind::Goto,
                ..
            } => true,
            StmtKind::Expr(e) => {
                let inner = self.arena.unparen(*e);
                matches!(
                    self.info.calls.get(&inner),
                    Some(CallKind::Builtin(Builtin::Panic))
                )
            }
            StmtKind::Block(block) => self.ends_terminating(&block.stmts),
            StmtKind::If {
                then,
                els: Some(els),
                ..
            } => self.ends_terminating(&then.stmts) && self.is_terminating(els, None),
            StmtKind::For {
                cond: None, body, ..
            } => !has_break(&body.stmts, label, true),
            StmtKind::Labeled { label, stmt } => self.is_terminating(stmt, Some(label.name)),
            StmtKind::Switch { clauses, .. } => {
                clauses.iter().any(|c| c.is_default)
                    && clauses.iter().all(|c| {
                        !has_break(&c.body, label, true)
                            && (c.body.last().is_some_and(is_fallthrough)
                                || self.ends_terminating(&c.body))
                    })
            }
            StmtKind::TypeSwitch { clauses, .. } => {
                clauses.iter().any(|c| c.is_default)
                    && clauses
                        .iter()
                        .all(|c| !has_break(&c.body, label, true) && self.ends_terminating(&c.body))
            }
            StmtKind::Select { clauses } => clauses
                .iter()
                .all(|c| !has_break(&c.body, label, true) && self.ends_terminating(&c.body)),
            _ => false,
        }
    }

    fn ends_terminating(&self, stmts: &[Stmt]) -> bool {
        stmts.last().is_some_and(|s| self.is_terminating(s, None))
    }
}

fn is_fallthrough(stmt: &Stmt) -> bool {
    matches!(
        stmt.kind,
        StmtKind::Branch {
            kind: BranchKind::Fallthrough,
            ..
        }
    )
}

/// Whether `stmts` contain a `break` leaving the enclosing statement:
/// unlabeled ones while `top` (not nested in another breakable statement),
/// or ones naming `label`.
fn has_break(stmts: &[Stmt], label: Option<gi_ir::Name>, top: bool) -> bool {
    stmts.iter().any(|s| stmt_has_break(s, label, top))
}

fn stmt_has_break(stmt: &Stmt, label: Option<gi_ir::Name>, top: bool) -> bool {
    match &stmt.kind {
        StmtKind::Branch {
            kind: BranchKind::Break,
            label: target,
        } => match target {
            None => top,
            Some(target) => Some(target.name) == label,
        },
        StmtKind::Block(block) => has_break(&block.stmts, label, top),
        StmtKind::If { then, els, .. } => {
            has_break(&then.stmts, label, top)
                || els.as_deref().is_some_and(|e| stmt_has_break(e, label, top))
        }
        StmtKind::Labeled { stmt, .. } => stmt_has_break(stmt, label, top),
        StmtKind::For { body, .. } | StmtKind::ForRange { body, .. } => {
            has_break(&body.stmts, label, false)
        }
        StmtKind::Switch { clauses, .. } => {
            clauses.iter().any(|c| has_break(&c.body, label, false))
        }
        StmtKind::TypeSwitch { clauses, .. } => {
            clauses.iter().any(|c| has_break(&c.body, label, false))
        }
        StmtKind::Select { clauses } => clauses.iter().any(|c| has_break(&c.body, label, false)),
        _ => false,
    }
}
