mod book;
mod file;
mod sortdisplay;
mod template;
mod value;

pub use self::book::Book;
pub use self::file::{BookFile, FileHash, HashAlgorithm};
pub use self::sortdisplay::SortDisplay;
pub use self::template::{DirTemplate, is_var_name};
pub use self::value::FieldValue;
