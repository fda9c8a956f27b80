//! Module execution and import/export binding.

use std::ops::ControlFlow;
use std::rc::Rc;

use hml_eval::errors::undefined_variable;
use hml_eval::{Environment, Interpreter, Mutability, ObjectRef, Value};
use hml_ir::{BindingSpec, ExportKind, ImportKind, Name, Stmt, StmtKind};

use super::{ModuleId, ModuleLoader};
use crate::errors::LoadError;

impl ModuleLoader {
    /// Run a loaded module after its dependencies. Running a module that
    /// has already finished is a no-op, so every importer shares one
    /// exports scope.
    pub fn execute(&mut self, id: ModuleId, interpreter: &mut Interpreter) -> Result<(), LoadError> {
        if self.is_executed(id) {
            return Ok(());
        }
        for dep in self.module(id).dependencies.clone() {
            self.execute(dep, interpreter)?;
        }

        let path = self.module(id).path.clone();
        tracing::debug!(path = %path.display(), "executing module");

        let env = interpreter.global_env().child();
        let statements = Rc::clone(&self.module(id).statements);
        let mut dependencies = self.module(id).dependencies.clone().into_iter();
        let mut exports = Vec::new();

        for stmt in statements.iter() {
            let dep = if stmt.dependency_path().is_some() {
                dependencies.next()
            } else {
                None
            };
            let flow = self
                .exec_module_stmt(stmt, dep, &env, &mut exports, interpreter)
                .map_err(|err| match err {
                    ModuleStmtError::Load(err) => err,
                    ModuleStmtError::Eval(err) => {
                        LoadError::runtime(path.clone(), &self.module(id).source, err)
                    }
                })?;
            if flow.is_break() {
                break;
            }
        }

        let module = self.module_mut(id);
        module.exports = exports;
        module.env = Some(env);
        Ok(())
    }

    fn exec_module_stmt(
        &self,
        stmt: &Stmt,
        dep: Option<ModuleId>,
        env: &Environment,
        exports: &mut Vec<Name>,
        interpreter: &mut Interpreter,
    ) -> Result<ControlFlow<()>, ModuleStmtError> {
        match (&stmt.kind, dep) {
            (StmtKind::Import { kind, .. }, Some(dep)) => {
                self.bind_import(kind, dep, env)?;
            }
            (StmtKind::Export(ExportKind::Reexport { specs, .. }), Some(dep)) => {
                for spec in specs {
                    let value = self.exported_value(dep, &spec.name)?;
                    let name = spec.local_name().clone();
                    env.define(name.clone(), value, Mutability::Immutable);
                    record_export(exports, name);
                }
            }
            (StmtKind::Export(ExportKind::Declaration(decl)), _) => {
                interpreter.exec_stmt(decl, env)?;
                if let Some(name) = decl.declared_name() {
                    record_export(exports, name.clone());
                }
            }
            (StmtKind::Export(ExportKind::List(specs)), _) => {
                for spec in specs {
                    export_local(env, spec, stmt)?;
                    record_export(exports, spec.local_name().clone());
                }
            }
            _ => return Ok(interpreter.exec_top_level(stmt, env)?),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Named imports copy values; a namespace import builds an object
    /// holding every export in export order. Both bind immutably.
    fn bind_import(
        &self,
        kind: &ImportKind,
        dep: ModuleId,
        env: &Environment,
    ) -> Result<(), LoadError> {
        match kind {
            ImportKind::Named(specs) => {
                for spec in specs {
                    let value = self.exported_value(dep, &spec.name)?;
                    env.define(spec.local_name().clone(), value, Mutability::Immutable);
                }
            }
            ImportKind::Namespace(alias) => {
                let fields = self.exports(dep).map_or_else(Vec::new, |(names, exports)| {
                    names
                        .iter()
                        .map(|name| (name.clone(), exports.get(name).unwrap_or(Value::Null)))
                        .collect()
                });
                env.define(
                    alias.clone(),
                    Value::Object(ObjectRef::new(fields)),
                    Mutability::Immutable,
                );
            }
        }
        Ok(())
    }

    fn exported_value(&self, dep: ModuleId, name: &Name) -> Result<Value, LoadError> {
        self.exports(dep)
            .filter(|(names, _)| names.contains(name))
            .and_then(|(_, exports)| exports.get(name))
            .ok_or_else(|| LoadError::UnresolvedImport {
                name: name.to_string(),
                module: self.module(dep).path.clone(),
            })
    }
}

/// `export { a as b }` binds `b` to the current value of `a`.
fn export_local(
    env: &Environment,
    spec: &BindingSpec,
    stmt: &Stmt,
) -> Result<(), hml_eval::EvalError> {
    let value = env
        .get(&spec.name)
        .ok_or_else(|| undefined_variable(&spec.name).with_span(stmt.span))?;
    if let Some(alias) = &spec.alias {
        if alias != &spec.name {
            env.define(alias.clone(), value, Mutability::Immutable);
        }
    }
    Ok(())
}

fn record_export(exports: &mut Vec<Name>, name: Name) {
    if !exports.contains(&name) {
        exports.push(name);
    }
}

/// A module statement fails either while linking or while running.
enum ModuleStmtError {
    Load(LoadError),
    Eval(hml_eval::EvalError),
}

impl From<LoadError> for ModuleStmtError {
    fn from(err: LoadError) -> Self {
        ModuleStmtError::Load(err)
    }
}

impl From<hml_eval::EvalError> for ModuleStmtError {
    fn from(err: hml_eval::EvalError) -> Self {
        ModuleStmtError::Eval(err)
    }
}
