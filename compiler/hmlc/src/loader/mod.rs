//! Module graph loading.
//!
//! Loading and execution are separate passes. [`ModuleLoader::load`]
//! resolves, reads and parses a file, then loads every import and
//! re-export target before the module counts as loaded. A module is
//! marked `Loading` before its dependencies are visited, so an import
//! cycle is reported the moment it closes. [`ModuleLoader::execute`] then
//! runs modules depth-first, each at most once.
//!
//! # Storage
//!
//! Modules live in an arena indexed by [`ModuleId`]; a hash map from
//! canonical path to id is the cache.

mod exec;

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hml_eval::{Environment, Interpreter};
use hml_ir::{Name, Stmt};
use hml_parse::parse;
use rustc_hash::FxHashMap;

use crate::config::RunConfig;
use crate::errors::LoadError;
use crate::resolve::{discover_stdlib, resolve_path};

/// Index of a module in the loader's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Load state of one module.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Not loaded, or a previous attempt failed.
    Unloaded,
    /// Parsed; dependencies are being loaded.
    Loading,
    /// Parsed with every dependency loaded.
    Loaded,
}

/// One source file in the graph.
struct Module {
    path: PathBuf,
    state: LoadState,
    source: String,
    statements: Rc<[Stmt]>,
    /// One entry per import or re-export statement, in source order.
    dependencies: Vec<ModuleId>,
    /// Set once the module has run; it doubles as the exports scope.
    env: Option<Environment>,
    /// Exported names in the order they were declared.
    exports: Vec<Name>,
}

impl Module {
    fn new(path: PathBuf) -> Self {
        Module {
            path,
            state: LoadState::Unloaded,
            source: String::new(),
            statements: Rc::from(Vec::new()),
            dependencies: Vec::new(),
            env: None,
            exports: Vec::new(),
        }
    }

    fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// Loads, caches and executes a module graph.
pub struct ModuleLoader {
    modules: Vec<Module>,
    cache: FxHashMap<PathBuf, ModuleId>,
    /// Modules currently `Loading`, outermost first.
    loading: Vec<ModuleId>,
    stdlib: Option<PathBuf>,
}

impl ModuleLoader {
    /// A loader using the configured stdlib directory, or the first one
    /// discovery finds.
    pub fn new(config: &RunConfig) -> Self {
        let stdlib = config.stdlib.clone().or_else(discover_stdlib);
        ModuleLoader {
            modules: Vec::new(),
            cache: FxHashMap::default(),
            loading: Vec::new(),
            stdlib,
        }
    }

    pub fn stdlib(&self) -> Option<&Path> {
        self.stdlib.as_deref()
    }

    /// Resolve `import_path` against `importer_dir`, then load it and its
    /// dependencies. Already-loaded modules come from the cache.
    pub fn load(&mut self, import_path: &str, importer_dir: &Path) -> Result<ModuleId, LoadError> {
        let path = resolve_path(import_path, importer_dir, self.stdlib())?;

        let id = match self.cache.get(&path) {
            Some(&id) => match self.module(id).state {
                LoadState::Loaded => return Ok(id),
                LoadState::Loading => return Err(self.cycle_error(id)),
                LoadState::Unloaded => id,
            },
            None => {
                let id = ModuleId(u32::try_from(self.modules.len()).unwrap_or(u32::MAX));
                self.modules.push(Module::new(path.clone()));
                self.cache.insert(path, id);
                id
            }
        };

        self.module_mut(id).state = LoadState::Loading;
        self.loading.push(id);
        let result = self.load_contents(id);
        self.loading.pop();

        match result {
            Ok(()) => {
                self.module_mut(id).state = LoadState::Loaded;
                Ok(id)
            }
            Err(err) => {
                self.module_mut(id).state = LoadState::Unloaded;
                Err(err)
            }
        }
    }

    fn load_contents(&mut self, id: ModuleId) -> Result<(), LoadError> {
        let path = self.module(id).path.clone();
        tracing::debug!(path = %path.display(), "loading module");

        let source =
            std::fs::read_to_string(&path).map_err(|err| LoadError::from_io(path.clone(), err))?;
        let parsed = parse(&source);
        if parsed.has_errors() {
            return Err(LoadError::Parse {
                path,
                source_text: source,
                errors: parsed.errors,
            });
        }

        let dir = self.module(id).directory();
        let mut dependencies = Vec::new();
        for stmt in &parsed.statements {
            if let Some(dep_path) = stmt.dependency_path() {
                dependencies.push(self.load(dep_path, &dir)?);
            }
        }

        let module = self.module_mut(id);
        module.source = source;
        module.statements = Rc::from(parsed.statements);
        module.dependencies = dependencies;
        Ok(())
    }

    fn cycle_error(&self, id: ModuleId) -> LoadError {
        let start = self.loading.iter().position(|&m| m == id).unwrap_or(0);
        let chain = self.loading[start..]
            .iter()
            .chain(std::iter::once(&id))
            .map(|&m| self.module(m).path.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        LoadError::CircularDependency { chain }
    }

    /// Load the entry file (relative to the working directory) and run it.
    pub fn run_entry(
        &mut self,
        entry: &Path,
        interpreter: &mut Interpreter,
    ) -> Result<ModuleId, LoadError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let id = self.load(&entry.to_string_lossy(), &cwd)?;
        self.execute(id, interpreter)?;
        Ok(id)
    }

    /// The id cached for a file, if it has been seen.
    pub fn module_id(&self, path: &Path) -> Option<ModuleId> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.cache.get(&key).copied()
    }

    pub fn state(&self, id: ModuleId) -> LoadState {
        self.module(id).state
    }

    pub fn path(&self, id: ModuleId) -> &Path {
        &self.module(id).path
    }

    pub fn is_executed(&self, id: ModuleId) -> bool {
        self.module(id).env.is_some()
    }

    /// Exported names and the exports scope, once the module has run.
    pub fn exports(&self, id: ModuleId) -> Option<(&[Name], &Environment)> {
        let module = self.module(id);
        module.env.as_ref().map(|env| (module.exports.as_slice(), env))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.index()]
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("modules", &self.modules.len())
            .field("stdlib", &self.stdlib)
            .finish_non_exhaustive()
    }
}
