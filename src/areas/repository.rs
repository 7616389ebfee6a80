use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::HEAD_REF_NAME;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::TwigError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const GIT_DIR: &str = ".git";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create repository directory {path}"))?;
        let path = Path::new(path)
            .canonicalize()
            .with_context(|| format!("failed to resolve repository path {path}"))?;

        let git_path = path.join(GIT_DIR);
        let index = Index::new(git_path.join("index").into_boxed_path());
        let database = Database::new(git_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> &Path {
        self.refs.path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Read `.git/config` afresh.
    pub fn config(&self) -> anyhow::Result<Config> {
        Config::load(&self.git_path().join("config"))
    }

    /// Turn a user-supplied object name into an id.
    ///
    /// Accepts `HEAD`, a full 40-character id, or an abbreviation of at
    /// least seven characters.
    pub fn resolve_object(&self, name: &str) -> anyhow::Result<ObjectId> {
        if name == HEAD_REF_NAME {
            return self
                .refs
                .read_head()?
                .ok_or_else(|| TwigError::ObjectNotFound(name.to_string()).into());
        }

        if name.len() == OBJECT_ID_LENGTH {
            let oid = ObjectId::try_parse(name.to_string())
                .map_err(|_| TwigError::ObjectNotFound(name.to_string()))?;
            if !self.database.contains(&oid) {
                return Err(TwigError::ObjectNotFound(name.to_string()).into());
            }
            return Ok(oid);
        }

        self.database.resolve_abbrev(name)
    }
}
