mod compiler;
mod database;
mod discovery;

pub use compiler::{
    compile_template_database, ContentCompileError, ContentErrorCode, SourceLocation,
};
pub use database::TemplateDatabase;
pub(crate) use discovery::collect_def_files_sorted;

pub const DEFS_DIR: &str = "defs";
pub const DEF_FILE_EXTENSION: &str = "json";
